//! Scroll tracker: reduces the host scroll offset to a normalized
//! progress value for one tall container.
//!
//! Progress is recomputed on every scroll and resize notification.  When
//! smoothing is on, the emitted value eases toward the latest target once
//! per animation frame, independently of scroll events, so it keeps
//! settling after the user stops scrolling.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::host::{FrameRequest, HostEventKind, ListenerId, Notification, ScrollHost};

/// Smoothing factor used when none is configured.
pub const DEFAULT_ALPHA: f64 = 0.08;

// ───────────────────────────────────────── lengths ───────────

/// A length in host pixels or as a multiple of the viewport height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    Px(f64),
    /// Percent of viewport height, CSS style (`420vh` = 4.2 viewports).
    Vh(f64),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid length {0:?}: expected e.g. \"420vh\", \"1200px\" or \"1200\"")]
pub struct ParseLengthError(pub String);

impl Length {
    pub fn resolve(self, viewport_height: f64) -> f64 {
        match self {
            Length::Px(px) => px,
            Length::Vh(vh) => vh / 100.0 * viewport_height,
        }
    }
}

impl FromStr for Length {
    type Err = ParseLengthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim().to_ascii_lowercase();
        let (num, vh) = if let Some(n) = t.strip_suffix("vh") {
            (n, true)
        } else if let Some(n) = t.strip_suffix("px") {
            (n, false)
        } else {
            (t.as_str(), false)
        };
        let value: f64 = num
            .trim()
            .parse()
            .map_err(|_| ParseLengthError(s.to_string()))?;
        if !value.is_finite() || value < 0.0 {
            return Err(ParseLengthError(s.to_string()));
        }
        Ok(if vh { Length::Vh(value) } else { Length::Px(value) })
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Length::Px(v) => write!(f, "{v}px"),
            Length::Vh(v) => write!(f, "{v}vh"),
        }
    }
}

/// Where the tracked container sits in the document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerGeometry {
    pub top: Length,
    pub height: Length,
}

impl Default for ContainerGeometry {
    fn default() -> Self {
        Self {
            top: Length::Vh(100.0),
            height: Length::Vh(420.0),
        }
    }
}

// ───────────────────────────────────────── progress ──────────

/// Snapshot of the inputs progress is derived from, in host pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollState {
    pub raw_offset: f64,
    pub container_top: f64,
    pub container_height: f64,
    pub viewport_height: f64,
}

/// `clamp((scroll - top) / (height - viewport), 0, 1)`.
///
/// A container no taller than the viewport has no scroll range and always
/// yields 0, as does any non-finite input.
pub fn raw_progress(state: &ScrollState) -> f64 {
    let range = state.container_height - state.viewport_height;
    if !(range.is_finite() && range > 0.0) {
        return 0.0;
    }
    let ratio = (state.raw_offset - state.container_top) / range;
    if ratio.is_finite() {
        ratio.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Exponential low-pass filter: `current += (target - current) * alpha`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Smoother {
    current: f64,
    alpha: f64,
}

/// A smoothing factor must lie in `(0, 1]`; anything else never converges
/// or overshoots.
pub fn is_valid_alpha(alpha: f64) -> bool {
    alpha > 0.0 && alpha <= 1.0
}

impl Smoother {
    /// Out-of-range factors are refused and replaced by [`DEFAULT_ALPHA`].
    pub fn new(alpha: f64) -> Self {
        let alpha = if is_valid_alpha(alpha) {
            alpha
        } else {
            tracing::warn!(alpha, default = DEFAULT_ALPHA, "smoothing alpha out of range");
            DEFAULT_ALPHA
        };
        Self { current: 0.0, alpha }
    }

    pub fn tick(&mut self, target: f64) -> f64 {
        self.current += (target - self.current) * self.alpha;
        self.current
    }

    pub fn snap(&mut self, value: f64) {
        self.current = value;
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

// ───────────────────────────────────────── tracker ───────────

/// Registrations held while mounted.  Dropping the option releases nothing
/// by itself; [`ScrollTracker::unmount`] must hand them back to the host.
#[derive(Debug, Clone, Copy)]
struct Mounted {
    scroll: ListenerId,
    resize: ListenerId,
    frame: Option<FrameRequest>,
}

/// Tracks one container for the lifetime of a mount.
#[derive(Debug, Clone)]
pub struct ScrollTracker {
    geometry: ContainerGeometry,
    smoother: Option<Smoother>,
    state: ScrollState,
    target: f64,
    mounted: Option<Mounted>,
}

impl ScrollTracker {
    /// `smoothing` is the filter alpha, or `None` to emit raw progress.
    pub fn new(geometry: ContainerGeometry, smoothing: Option<f64>) -> Self {
        Self {
            geometry,
            smoother: smoothing.map(Smoother::new),
            state: ScrollState::default(),
            target: 0.0,
            mounted: None,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    /// Register listeners (and the frame loop when smoothing).  Mounting an
    /// already-mounted tracker does nothing.
    pub fn mount(&mut self, host: &mut impl ScrollHost) {
        if self.mounted.is_some() {
            return;
        }
        let scroll = host.add_listener(HostEventKind::Scroll);
        let resize = host.add_listener(HostEventKind::Resize);
        let frame = self.smoother.is_some().then(|| host.request_frame());
        self.mounted = Some(Mounted {
            scroll,
            resize,
            frame,
        });

        self.sample(&*host);
        // Start settled instead of sweeping in from 0.
        let target = self.target;
        if let Some(s) = self.smoother.as_mut() {
            s.snap(target);
        }
        tracing::debug!(progress = self.target, "scroll tracker mounted");
    }

    /// Release every registration taken by [`mount`](Self::mount).  Returns
    /// `false` if the tracker was not mounted, so teardown happens once.
    pub fn unmount(&mut self, host: &mut impl ScrollHost) -> bool {
        let Some(m) = self.mounted.take() else {
            return false;
        };
        host.remove_listener(m.scroll);
        host.remove_listener(m.resize);
        if let Some(frame) = m.frame {
            host.cancel_frame(frame);
        }
        tracing::debug!("scroll tracker unmounted");
        true
    }

    /// Deliver a host notification.  Returns `true` if it belonged to this
    /// tracker and the target was recomputed.
    pub fn handle(&mut self, host: &impl ScrollHost, notification: Notification) -> bool {
        let Some(m) = self.mounted else {
            return false;
        };
        if notification.listener != m.scroll && notification.listener != m.resize {
            return false;
        }
        self.sample(host);
        true
    }

    /// Run one animation frame.  Advances the smoother and schedules the
    /// next frame.  Stale or foreign requests are ignored.
    pub fn on_frame(&mut self, host: &mut impl ScrollHost, request: FrameRequest) -> bool {
        let Some(m) = self.mounted.as_mut() else {
            return false;
        };
        if m.frame != Some(request) {
            return false;
        }
        let Some(smoother) = self.smoother.as_mut() else {
            m.frame = None;
            return false;
        };
        smoother.tick(self.target);
        m.frame = Some(host.request_frame());
        true
    }

    /// Switch smoothing on (with `alpha`) or off.  While mounted this
    /// starts or cancels the frame loop.
    pub fn set_smoothing(&mut self, host: &mut impl ScrollHost, alpha: Option<f64>) {
        match alpha {
            Some(alpha) => {
                let mut s = Smoother::new(alpha);
                s.snap(self.progress());
                self.smoother = Some(s);
                if let Some(m) = self.mounted.as_mut() {
                    if m.frame.is_none() {
                        m.frame = Some(host.request_frame());
                    }
                }
            }
            None => {
                self.smoother = None;
                if let Some(m) = self.mounted.as_mut() {
                    if let Some(frame) = m.frame.take() {
                        host.cancel_frame(frame);
                    }
                }
            }
        }
    }

    pub fn set_geometry(&mut self, host: &impl ScrollHost, geometry: ContainerGeometry) {
        self.geometry = geometry;
        if self.mounted.is_some() {
            self.sample(host);
        }
    }

    /// Emitted progress: smoothed when smoothing is on, raw otherwise.
    pub fn progress(&self) -> f64 {
        match &self.smoother {
            Some(s) => s.current(),
            None => self.target,
        }
    }

    /// Latest raw progress.
    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn alpha(&self) -> Option<f64> {
        self.smoother.map(|s| s.alpha())
    }

    pub fn scroll_state(&self) -> ScrollState {
        self.state
    }

    pub fn geometry(&self) -> ContainerGeometry {
        self.geometry
    }

    fn sample(&mut self, host: &impl ScrollHost) {
        let vh = host.viewport_height();
        self.state = ScrollState {
            raw_offset: host.scroll_y(),
            container_top: self.geometry.top.resolve(vh),
            container_height: self.geometry.height.resolve(vh),
            viewport_height: vh,
        };
        self.target = raw_progress(&self.state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    /// Minimal host that only counts registrations.
    #[derive(Default)]
    struct CountingHost {
        scroll_y: f64,
        viewport: f64,
        next: u64,
        listeners: BTreeMap<ListenerId, HostEventKind>,
        frames: Vec<FrameRequest>,
    }

    impl ScrollHost for CountingHost {
        fn scroll_y(&self) -> f64 {
            self.scroll_y
        }
        fn viewport_height(&self) -> f64 {
            self.viewport
        }
        fn add_listener(&mut self, kind: HostEventKind) -> ListenerId {
            self.next += 1;
            let id = ListenerId(self.next);
            self.listeners.insert(id, kind);
            id
        }
        fn remove_listener(&mut self, id: ListenerId) -> bool {
            self.listeners.remove(&id).is_some()
        }
        fn request_frame(&mut self) -> FrameRequest {
            self.next += 1;
            let r = FrameRequest(self.next);
            self.frames.push(r);
            r
        }
        fn cancel_frame(&mut self, request: FrameRequest) -> bool {
            let before = self.frames.len();
            self.frames.retain(|f| *f != request);
            before != self.frames.len()
        }
        fn listener_count(&self) -> usize {
            self.listeners.len()
        }
        fn pending_frames(&self) -> usize {
            self.frames.len()
        }
    }

    fn host(viewport: f64) -> CountingHost {
        CountingHost {
            viewport,
            ..Default::default()
        }
    }

    #[test]
    fn raw_progress_clamps_to_unit_range() {
        let mut s = ScrollState {
            raw_offset: 0.0,
            container_top: 100.0,
            container_height: 500.0,
            viewport_height: 100.0,
        };
        assert_eq!(raw_progress(&s), 0.0);
        s.raw_offset = 300.0;
        assert!((raw_progress(&s) - 0.5).abs() < 1e-12);
        s.raw_offset = 10_000.0;
        assert_eq!(raw_progress(&s), 1.0);
    }

    #[test]
    fn container_no_taller_than_viewport_is_always_zero() {
        for offset in [-50.0, 0.0, 99.0, 100.0, 250.0, 1e9] {
            for height in [100.0, 80.0] {
                let s = ScrollState {
                    raw_offset: offset,
                    container_top: 0.0,
                    container_height: height,
                    viewport_height: 100.0,
                };
                let p = raw_progress(&s);
                assert_eq!(p, 0.0, "offset={offset} height={height}");
            }
        }
    }

    #[test]
    fn smoothing_converges_within_200_ticks() {
        let mut s = Smoother::new(0.08);
        let mut ticks = 0;
        while (s.current() - 1.0).abs() > 1e-3 {
            s.tick(1.0);
            ticks += 1;
            assert!(ticks <= 200, "did not converge");
        }
    }

    #[test]
    fn smoother_rejects_out_of_range_alpha() {
        for bad in [f64::NAN, f64::INFINITY, 7.0, 0.0, -0.3] {
            assert_eq!(Smoother::new(bad).alpha(), DEFAULT_ALPHA, "{bad}");
        }
        assert_eq!(Smoother::new(1.0).alpha(), 1.0);
        assert_eq!(Smoother::new(0.2).alpha(), 0.2);
    }

    #[test]
    fn parses_lengths() {
        assert_eq!("420vh".parse::<Length>(), Ok(Length::Vh(420.0)));
        assert_eq!(" 1200px ".parse::<Length>(), Ok(Length::Px(1200.0)));
        assert_eq!("64".parse::<Length>(), Ok(Length::Px(64.0)));
        assert!("tall".parse::<Length>().is_err());
        assert!("-3vh".parse::<Length>().is_err());
        assert_eq!(Length::Vh(420.0).resolve(200.0), 840.0);
        assert_eq!(Length::Vh(420.0).to_string(), "420vh");
    }

    #[test]
    fn tracks_scroll_and_resize() {
        let mut h = host(100.0);
        let mut t = ScrollTracker::new(ContainerGeometry::default(), None);
        t.mount(&mut h);
        let scroll_id = ListenerId(1);

        // Container spans [100, 520); range is 320.
        h.scroll_y = 260.0;
        assert!(t.handle(
            &h,
            Notification {
                listener: scroll_id,
                kind: HostEventKind::Scroll
            }
        ));
        assert!((t.progress() - 0.5).abs() < 1e-12);

        // Viewport doubles: container moves to [200, 1040), range 640.
        h.viewport = 200.0;
        assert!(t.handle(
            &h,
            Notification {
                listener: ListenerId(2),
                kind: HostEventKind::Resize
            }
        ));
        assert!((t.progress() - 60.0 / 640.0).abs() < 1e-12);

        // A foreign listener id is not ours.
        assert!(!t.handle(
            &h,
            Notification {
                listener: ListenerId(99),
                kind: HostEventKind::Scroll
            }
        ));
    }

    #[test]
    fn smoothed_progress_keeps_easing_without_scroll_events() {
        let mut h = host(100.0);
        let mut t = ScrollTracker::new(ContainerGeometry::default(), Some(0.5));
        t.mount(&mut h);
        assert_eq!(t.progress(), 0.0);

        h.scroll_y = 420.0;
        let scroll = Notification {
            listener: ListenerId(1),
            kind: HostEventKind::Scroll,
        };
        t.handle(&h, scroll);
        assert_eq!(t.target(), 1.0);
        assert_eq!(t.progress(), 0.0);

        for _ in 0..3 {
            let frame = h.frames[0];
            h.frames.clear();
            assert!(t.on_frame(&mut h, frame));
        }
        assert!((t.progress() - 0.875).abs() < 1e-12);
        assert_eq!(h.pending_frames(), 1);
    }

    #[test]
    fn unmount_releases_everything_exactly_once() {
        let mut h = host(100.0);
        let before = (h.listener_count(), h.pending_frames());

        let mut t = ScrollTracker::new(ContainerGeometry::default(), Some(DEFAULT_ALPHA));
        t.mount(&mut h);
        t.mount(&mut h);
        assert_eq!(h.listener_count(), 2);
        assert_eq!(h.pending_frames(), 1);

        let stale = h.frames[0];
        assert!(t.unmount(&mut h));
        assert!(!t.unmount(&mut h));
        assert_eq!((h.listener_count(), h.pending_frames()), before);

        // Nothing fires after teardown.
        assert!(!t.on_frame(&mut h, stale));
        assert_eq!(h.pending_frames(), 0);
        assert!(!t.handle(
            &h,
            Notification {
                listener: ListenerId(1),
                kind: HostEventKind::Scroll
            }
        ));
    }

    #[test]
    fn toggling_smoothing_starts_and_stops_the_frame_loop() {
        let mut h = host(100.0);
        let mut t = ScrollTracker::new(ContainerGeometry::default(), None);
        t.mount(&mut h);
        assert_eq!(h.pending_frames(), 0);

        t.set_smoothing(&mut h, Some(0.2));
        assert_eq!(h.pending_frames(), 1);
        assert_eq!(t.alpha(), Some(0.2));

        t.set_smoothing(&mut h, None);
        assert_eq!(h.pending_frames(), 0);
        assert_eq!(t.alpha(), None);
    }
}
