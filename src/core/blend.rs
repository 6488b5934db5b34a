//! Progress → per-segment weights.
//!
//! Two windowing policies are supported:
//!
//! * **Trapezoid**: each segment ramps up over `[a - ov, a + ov]`, holds at
//!   1, then ramps down over `[b - ov, b]`.  Adjacent segments overlap, so
//!   their weights can sum past 1 inside a seam; opacity is additive per
//!   layer.
//! * **Normalized**: each segment gets a triangle centred on its window and
//!   all triangles are divided by `max(sum, 1)`, so the weights never sum
//!   past 1.
//!
//! Both are pure: the same progress and segment list always produce the same
//! weights.  Segments are evaluated independently from one progress snapshot.

use super::segment::{ConfigError, Segment, SegmentPhase};

/// Windowing policy used by [`compute_weights`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendPolicy {
    #[default]
    Trapezoid,
    Normalized,
}

impl BlendPolicy {
    pub const ALL: &[BlendPolicy] = &[BlendPolicy::Trapezoid, BlendPolicy::Normalized];

    pub fn label(self) -> &'static str {
        match self {
            Self::Trapezoid => "trapezoid",
            Self::Normalized => "normalized",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.label().eq_ignore_ascii_case(s.trim()))
    }
}

/// Weight of one segment at one progress value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentWeight {
    pub index: usize,
    pub weight: f64,
}

/// All segment weights computed from a single progress snapshot.
///
/// The renderer applies a frame as a unit; never mix weights from two frames.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlendFrame {
    pub progress: f64,
    /// Policy the weights were computed with; phases follow the same shape.
    pub policy: BlendPolicy,
    pub weights: Vec<SegmentWeight>,
}

impl BlendFrame {
    pub fn weight(&self, index: usize) -> f64 {
        self.weights
            .iter()
            .find(|w| w.index == index)
            .map_or(0.0, |w| w.weight)
    }

    /// Heaviest active segment.  Ties go to the earlier index.
    pub fn dominant(&self) -> Option<usize> {
        let mut best: Option<SegmentWeight> = None;
        for w in &self.weights {
            if w.weight <= 0.0 {
                continue;
            }
            match best {
                Some(b) if w.weight <= b.weight => {}
                _ => best = Some(*w),
            }
        }
        best.map(|w| w.index)
    }

    pub fn total(&self) -> f64 {
        self.weights.iter().map(|w| w.weight).sum()
    }
}

/// Trapezoid weight of `seg` at `progress`.
///
/// A window that starts at 0 has no fade-in and one that ends at 1 has no
/// fade-out.  Zero overlap degenerates to a hard cut on `[a, b)`.
pub fn trapezoid_weight(progress: f64, seg: &Segment) -> f64 {
    if !progress.is_finite() {
        return 0.0;
    }
    let p = progress.clamp(0.0, 1.0);
    let (a, b, ov) = (seg.window_start(), seg.window_end(), seg.overlap());

    if ov <= 0.0 {
        let inside = p >= a && (p < b || seg.closes_sequence());
        return if inside { 1.0 } else { 0.0 };
    }

    if (!seg.opens_sequence() && p <= a - ov) || (!seg.closes_sequence() && p >= b) {
        return 0.0;
    }
    let rise = if seg.opens_sequence() {
        1.0
    } else {
        ((p - (a - ov)) / (2.0 * ov)).clamp(0.0, 1.0)
    };
    let fall = if seg.closes_sequence() {
        1.0
    } else {
        (1.0 - (p - (b - ov)) / ov).clamp(0.0, 1.0)
    };
    rise.min(fall)
}

/// Unnormalized triangle for the normalized policy, with the same edge
/// plateaus as the trapezoid.
fn triangle_weight(p: f64, seg: &Segment) -> f64 {
    let (a, b, ov) = (seg.window_start(), seg.window_end(), seg.overlap());
    let centre = (a + b) / 2.0;
    if (seg.opens_sequence() && p <= centre) || (seg.closes_sequence() && p >= centre) {
        return 1.0;
    }
    let half = (b - a) / 2.0 + ov;
    (1.0 - (p - centre).abs() / half).max(0.0)
}

/// Phase of `seg` at `progress` under `policy`.
///
/// `Inactive` exactly where the policy's weight is 0; otherwise the phase
/// follows the side of the ramp `progress` is on.
pub fn segment_phase(progress: f64, seg: &Segment, policy: BlendPolicy) -> SegmentPhase {
    if !progress.is_finite() {
        return SegmentPhase::Inactive;
    }
    let p = progress.clamp(0.0, 1.0);
    match policy {
        BlendPolicy::Trapezoid => seg.phase(p),
        BlendPolicy::Normalized => {
            let w = triangle_weight(p, seg);
            let centre = (seg.window_start() + seg.window_end()) / 2.0;
            if w <= 0.0 {
                SegmentPhase::Inactive
            } else if w >= 1.0 {
                SegmentPhase::FullyActive
            } else if p < centre {
                SegmentPhase::FadingIn
            } else {
                SegmentPhase::FadingOut
            }
        }
    }
}

/// Compute one weight per segment, in segment order.
pub fn compute_weights(progress: f64, segments: &[Segment], policy: BlendPolicy) -> Vec<SegmentWeight> {
    match policy {
        BlendPolicy::Trapezoid => segments
            .iter()
            .enumerate()
            .map(|(index, seg)| SegmentWeight {
                index,
                weight: trapezoid_weight(progress, seg),
            })
            .collect(),
        BlendPolicy::Normalized => {
            if !progress.is_finite() {
                return segments
                    .iter()
                    .enumerate()
                    .map(|(index, _)| SegmentWeight { index, weight: 0.0 })
                    .collect();
            }
            let p = progress.clamp(0.0, 1.0);
            let raw: Vec<f64> = segments.iter().map(|s| triangle_weight(p, s)).collect();
            let sum = raw.iter().sum::<f64>().max(1.0);
            raw.into_iter()
                .enumerate()
                .map(|(index, w)| SegmentWeight {
                    index,
                    weight: w / sum,
                })
                .collect()
        }
    }
}

/// Validated segment list plus the policy used to blend it.
#[derive(Debug, Clone)]
pub struct Blender {
    segments: Vec<Segment>,
    policy: BlendPolicy,
}

impl Blender {
    pub fn new(segments: Vec<Segment>, policy: BlendPolicy) -> Result<Self, ConfigError> {
        if segments.is_empty() {
            return Err(ConfigError::NoSegments);
        }
        Ok(Self { segments, policy })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn policy(&self) -> BlendPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: BlendPolicy) {
        self.policy = policy;
    }

    pub fn frame(&self, progress: f64) -> BlendFrame {
        BlendFrame {
            progress,
            policy: self.policy,
            weights: compute_weights(progress, &self.segments, self.policy),
        }
    }

    pub fn phases(&self, progress: f64) -> Vec<SegmentPhase> {
        self.segments
            .iter()
            .map(|s| segment_phase(progress, s, self.policy))
            .collect()
    }
}
