//! Playback adapter: turns blend frames into play / pause / rewind calls.
//!
//! The weight math in [`super::blend`] is pure; this is the thin layer that
//! owns side effects on media handles.  A segment's media plays while its
//! weight is above zero and is paused and rewound as soon as it drops back
//! to zero, so re-entering a window always replays from the start.
//!
//! Media failures never escape [`PlaybackController::apply`]: a failing
//! segment switches to its fallback once, and after that is held at weight
//! 0 while every other segment keeps blending.

use thiserror::Error;

use super::blend::{segment_phase, BlendFrame, SegmentWeight};
use super::segment::{Segment, SegmentPhase};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    #[error("playback of {url} blocked by autoplay policy")]
    AutoplayBlocked { url: String },
    #[error("failed to load {url}: {reason}")]
    Load { url: String, reason: String },
    #[error("failed to decode {url}")]
    Decode { url: String },
}

/// Asynchronous notification from a media handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaEvent {
    Ended,
    Failed(MediaError),
}

/// A playable resource owned by the host.
pub trait MediaHandle {
    fn source(&self) -> &str;
    /// Ask the host to start (or resume) playback.
    fn play(&mut self) -> Result<(), MediaError>;
    fn pause(&mut self);
    /// Seek back to the first frame.
    fn rewind(&mut self);
    /// Replace the source.  Failures surface later through `poll_event`.
    fn load(&mut self, url: &str);
    fn poll_event(&mut self) -> Option<MediaEvent>;
}

/// Run-time view of one segment.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SegmentRuntime {
    pub phase: SegmentPhase,
    /// Effective weight from the last applied frame.
    pub weight: f64,
    /// Play was requested and not yet undone by a pause.
    pub playing: bool,
    /// The last play request was rejected by the autoplay policy.
    pub blocked: bool,
    pub using_fallback: bool,
    /// No usable source left; weight is pinned to 0.
    pub failed: bool,
}

/// Drives media handles from blend frames.
#[derive(Debug, Clone)]
pub struct PlaybackController {
    runtimes: Vec<SegmentRuntime>,
    loop_clips: bool,
}

impl PlaybackController {
    pub fn new(segment_count: usize, loop_clips: bool) -> Self {
        Self {
            runtimes: vec![SegmentRuntime::default(); segment_count],
            loop_clips,
        }
    }

    pub fn runtimes(&self) -> &[SegmentRuntime] {
        &self.runtimes
    }

    pub fn loop_clips(&self) -> bool {
        self.loop_clips
    }

    pub fn set_loop_clips(&mut self, on: bool) {
        self.loop_clips = on;
    }

    /// Apply one frame.  Returns the effective frame: identical to `frame`
    /// except that failed segments are forced to 0.
    pub fn apply<M: MediaHandle>(
        &mut self,
        frame: &BlendFrame,
        segments: &[Segment],
        media: &mut [M],
    ) -> BlendFrame {
        for (index, (seg, handle)) in segments.iter().zip(media.iter_mut()).enumerate() {
            while let Some(event) = handle.poll_event() {
                self.on_event(index, seg, handle, event);
            }
        }

        let mut weights = Vec::with_capacity(frame.weights.len());
        for w in &frame.weights {
            let (Some(seg), Some(handle), Some(rt)) = (
                segments.get(w.index),
                media.get_mut(w.index),
                self.runtimes.get_mut(w.index),
            ) else {
                continue;
            };

            let mut weight = if rt.failed { 0.0 } else { w.weight };
            if weight > 0.0 && !rt.playing {
                rt.playing = true;
                match start(handle, rt) {
                    Ok(()) => {}
                    Err(err @ MediaError::AutoplayBlocked { .. }) => {
                        tracing::debug!(segment = w.index, %err, "play rejected");
                    }
                    Err(err) => {
                        fail(w.index, seg, handle, rt, err);
                        if rt.failed {
                            weight = 0.0;
                        }
                    }
                }
            } else if weight <= 0.0 && rt.playing {
                handle.pause();
                handle.rewind();
                rt.playing = false;
                rt.blocked = false;
                tracing::debug!(segment = w.index, "paused and rewound");
            }

            rt.weight = weight;
            rt.phase = if weight <= 0.0 {
                SegmentPhase::Inactive
            } else {
                segment_phase(frame.progress, seg, frame.policy)
            };

            weights.push(SegmentWeight {
                index: w.index,
                weight,
            });
        }

        BlendFrame {
            progress: frame.progress,
            policy: frame.policy,
            weights,
        }
    }

    /// Re-issue play for active segments whose request was blocked, e.g.
    /// after a user gesture unlocked autoplay.  Returns how many started.
    pub fn retry_blocked<M: MediaHandle>(&mut self, media: &mut [M]) -> usize {
        let mut started = 0;
        for (rt, handle) in self.runtimes.iter_mut().zip(media.iter_mut()) {
            if rt.playing && rt.blocked && !rt.failed && start(handle, rt).is_ok() {
                started += 1;
            }
        }
        started
    }

    /// Forget failures and reload every failed segment from its primary url.
    pub fn reset_failures<M: MediaHandle>(&mut self, segments: &[Segment], media: &mut [M]) {
        for ((rt, seg), handle) in self
            .runtimes
            .iter_mut()
            .zip(segments)
            .zip(media.iter_mut())
        {
            if rt.failed || rt.using_fallback {
                rt.failed = false;
                rt.using_fallback = false;
                rt.playing = false;
                rt.blocked = false;
                handle.load(&seg.source().url);
            }
        }
    }

    fn on_event<M: MediaHandle>(
        &mut self,
        index: usize,
        seg: &Segment,
        handle: &mut M,
        event: MediaEvent,
    ) {
        let Some(rt) = self.runtimes.get_mut(index) else {
            return;
        };
        match event {
            MediaEvent::Ended => {
                if rt.playing && self.loop_clips {
                    handle.rewind();
                    match start(handle, rt) {
                        Ok(()) => {}
                        Err(err @ MediaError::AutoplayBlocked { .. }) => {
                            tracing::debug!(segment = index, %err, "loop restart rejected");
                        }
                        Err(err) => fail(index, seg, handle, rt, err),
                    }
                }
            }
            MediaEvent::Failed(err) => fail(index, seg, handle, rt, err),
        }
    }
}

/// Play and record whether the autoplay policy got in the way.
fn start<M: MediaHandle>(handle: &mut M, rt: &mut SegmentRuntime) -> Result<(), MediaError> {
    let result = handle.play();
    rt.blocked = matches!(result, Err(MediaError::AutoplayBlocked { .. }));
    result
}

fn fail<M: MediaHandle>(
    index: usize,
    seg: &Segment,
    handle: &mut M,
    rt: &mut SegmentRuntime,
    err: MediaError,
) {
    if rt.failed {
        return;
    }
    match seg.source().fallback.as_deref() {
        Some(fallback) if !rt.using_fallback => {
            tracing::warn!(segment = index, %err, fallback, "media failed, switching to fallback");
            rt.using_fallback = true;
            handle.pause();
            handle.load(fallback);
            // Next apply() starts the fallback if the segment is still active.
            rt.playing = false;
            rt.blocked = false;
        }
        _ => {
            tracing::warn!(segment = index, %err, "media failed, segment disabled");
            rt.failed = true;
            if rt.playing {
                handle.pause();
                handle.rewind();
            }
            rt.playing = false;
            rt.blocked = false;
        }
    }
}
