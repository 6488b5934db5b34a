//! The narrow capability the engine consumes from whatever hosts it.
//!
//! A host exposes a scroll offset and viewport height, lets callers
//! register scroll / resize listeners, and schedules one-shot animation
//! frames.  The terminal shell implements it in `app::viewport`.

/// Kind of host notification a listener subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostEventKind {
    Scroll,
    Resize,
}

/// Handle for a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// Handle for a pending animation-frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameRequest(pub u64);

/// One queued delivery to one listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notification {
    pub listener: ListenerId,
    pub kind: HostEventKind,
}

pub trait ScrollHost {
    /// Current document scroll offset, in host pixels.
    fn scroll_y(&self) -> f64;
    fn viewport_height(&self) -> f64;

    fn add_listener(&mut self, kind: HostEventKind) -> ListenerId;
    /// Returns `false` if `id` was not registered.
    fn remove_listener(&mut self, id: ListenerId) -> bool;

    /// Schedule a single callback on the next frame.
    fn request_frame(&mut self) -> FrameRequest;
    fn cancel_frame(&mut self, request: FrameRequest) -> bool;

    fn listener_count(&self) -> usize;
    fn pending_frames(&self) -> usize;
}
