//! Simulated document viewport: the terminal's stand-in for a browser
//! window.
//!
//! Scroll and resize calls queue one notification per registered listener;
//! the runtime drains the queue once per frame.  Frame requests are
//! one-shot, like `requestAnimationFrame`.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::core::host::{FrameRequest, HostEventKind, ListenerId, Notification, ScrollHost};

#[derive(Debug)]
pub struct Viewport {
    scroll_y: f64,
    viewport_height: f64,
    document_height: f64,
    next_id: u64,
    listeners: BTreeMap<ListenerId, HostEventKind>,
    frames: BTreeSet<FrameRequest>,
    queue: VecDeque<Notification>,
}

impl Viewport {
    pub fn new(viewport_height: f64, document_height: f64) -> Self {
        Self {
            scroll_y: 0.0,
            viewport_height: viewport_height.max(0.0),
            document_height: document_height.max(0.0),
            next_id: 0,
            listeners: BTreeMap::new(),
            frames: BTreeSet::new(),
            queue: VecDeque::new(),
        }
    }

    pub fn document_height(&self) -> f64 {
        self.document_height
    }

    /// Largest valid scroll offset.
    pub fn max_scroll(&self) -> f64 {
        (self.document_height - self.viewport_height).max(0.0)
    }

    /// Scroll to `y` (clamped).  Returns `true` if the offset changed.
    pub fn scroll_to(&mut self, y: f64) -> bool {
        if !y.is_finite() {
            return false;
        }
        let y = y.clamp(0.0, self.max_scroll());
        if y == self.scroll_y {
            return false;
        }
        self.scroll_y = y;
        self.notify(HostEventKind::Scroll);
        true
    }

    pub fn scroll_by(&mut self, dy: f64) -> bool {
        self.scroll_to(self.scroll_y + dy)
    }

    /// Change viewport and document size.  The scroll offset keeps its
    /// relative position in the document.
    pub fn resize(&mut self, viewport_height: f64, document_height: f64) {
        let ratio = if self.max_scroll() > 0.0 {
            self.scroll_y / self.max_scroll()
        } else {
            0.0
        };
        self.viewport_height = viewport_height.max(0.0);
        self.document_height = document_height.max(0.0);
        self.scroll_y = (ratio * self.max_scroll()).clamp(0.0, self.max_scroll());
        self.notify(HostEventKind::Resize);
    }

    /// Take every queued notification, oldest first.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.queue.drain(..).collect()
    }

    /// Take the frame requests due this frame.  Callers re-request to keep
    /// a loop going.
    pub fn take_frames(&mut self) -> Vec<FrameRequest> {
        std::mem::take(&mut self.frames).into_iter().collect()
    }

    fn notify(&mut self, kind: HostEventKind) {
        for (&listener, &k) in &self.listeners {
            if k == kind {
                self.queue.push_back(Notification { listener, kind });
            }
        }
    }

    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl ScrollHost for Viewport {
    fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    fn add_listener(&mut self, kind: HostEventKind) -> ListenerId {
        let id = ListenerId(self.next());
        self.listeners.insert(id, kind);
        id
    }

    fn remove_listener(&mut self, id: ListenerId) -> bool {
        // Queued deliveries die with the listener.
        self.queue.retain(|n| n.listener != id);
        self.listeners.remove(&id).is_some()
    }

    fn request_frame(&mut self) -> FrameRequest {
        let req = FrameRequest(self.next());
        self.frames.insert(req);
        req
    }

    fn cancel_frame(&mut self, request: FrameRequest) -> bool {
        self.frames.remove(&request)
    }

    fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn pending_frames(&self) -> usize {
        self.frames.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tracker::{ContainerGeometry, ScrollTracker};

    #[test]
    fn scroll_is_clamped_to_document() {
        let mut v = Viewport::new(100.0, 620.0);
        assert!(v.scroll_to(1_000.0));
        assert_eq!(v.scroll_y(), 520.0);
        assert!(!v.scroll_to(1_000.0));
        assert!(v.scroll_by(-600.0));
        assert_eq!(v.scroll_y(), 0.0);
    }

    #[test]
    fn notifications_fan_out_per_listener_kind() {
        let mut v = Viewport::new(100.0, 620.0);
        let scroll = v.add_listener(HostEventKind::Scroll);
        let resize = v.add_listener(HostEventKind::Resize);

        v.scroll_to(10.0);
        v.resize(120.0, 744.0);
        let got = v.drain_notifications();
        assert_eq!(
            got,
            vec![
                Notification {
                    listener: scroll,
                    kind: HostEventKind::Scroll
                },
                Notification {
                    listener: resize,
                    kind: HostEventKind::Resize
                },
            ]
        );
        assert!(v.drain_notifications().is_empty());
    }

    #[test]
    fn resize_keeps_relative_position() {
        let mut v = Viewport::new(100.0, 600.0);
        v.scroll_to(250.0);
        v.resize(200.0, 1200.0);
        assert_eq!(v.scroll_y(), 500.0);
    }

    #[test]
    fn removed_listener_loses_its_queued_deliveries() {
        let mut v = Viewport::new(100.0, 620.0);
        let id = v.add_listener(HostEventKind::Scroll);
        v.scroll_to(50.0);
        assert!(v.remove_listener(id));
        assert!(v.drain_notifications().is_empty());
        assert!(!v.remove_listener(id));
    }

    #[test]
    fn frames_are_one_shot() {
        let mut v = Viewport::new(100.0, 620.0);
        let a = v.request_frame();
        let b = v.request_frame();
        assert!(v.cancel_frame(b));
        assert_eq!(v.take_frames(), vec![a]);
        assert_eq!(v.pending_frames(), 0);
    }

    #[test]
    fn unmount_mid_scroll_leaves_no_residue() {
        let mut v = Viewport::new(100.0, 620.0);
        let before = (v.listener_count(), v.pending_frames());

        let mut tracker = ScrollTracker::new(ContainerGeometry::default(), Some(0.08));
        tracker.mount(&mut v);
        v.scroll_by(120.0);
        v.scroll_by(40.0);
        for frame in v.take_frames() {
            tracker.on_frame(&mut v, frame);
        }
        assert_eq!(v.pending_frames(), 1);

        // Teardown with scroll notifications still queued.
        assert!(tracker.unmount(&mut v));
        assert_eq!((v.listener_count(), v.pending_frames()), before);
        let leftover = v.drain_notifications();
        assert!(leftover.is_empty(), "{leftover:?}");
        assert!(v.take_frames().is_empty());
    }
}
