//! Segment configuration: one media unit and the progress window it owns.
//!
//! Segments are validated once when they are built and never mutated
//! afterwards.  Everything that changes at run time (play state, fallback
//! usage) lives in [`super::playback::SegmentRuntime`].

use thiserror::Error;

/// Where a segment's media comes from.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaSource {
    pub url: String,
    /// Alternate locator tried once if `url` fails to load.
    pub fallback: Option<String>,
}

impl MediaSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }
}

/// Rejected segment configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("segment {index}: window bounds must be finite")]
    NonFinite { index: usize },
    #[error("segment {index}: window [{start}, {end}] must satisfy 0 <= start < end <= 1")]
    InvalidWindow { index: usize, start: f64, end: f64 },
    #[error("segment {index}: overlap {overlap} must be >= 0 and at most half the window width ({max})")]
    InvalidOverlap { index: usize, overlap: f64, max: f64 },
    #[error("segment {index}: media url is empty")]
    EmptyUrl { index: usize },
    #[error("no segments configured")]
    NoSegments,
}

/// A media unit with a declared active window along the progress axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    source: MediaSource,
    window_start: f64,
    window_end: f64,
    overlap: f64,
}

/// Window of segment `i` out of `n` in the evenly spaced layout.
pub fn even_window(i: usize, n: usize) -> (f64, f64) {
    let n = n.max(1);
    let floor2 = |v: f64| (v * 100.0 + 1e-9).floor() / 100.0;
    let start = floor2(i as f64 / n as f64);
    let end = if i + 1 >= n {
        1.0
    } else {
        floor2((i + 1) as f64 / n as f64) + 0.01
    };
    (start, end)
}

/// Where progress sits relative to one segment's window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SegmentPhase {
    #[default]
    Inactive,
    FadingIn,
    FullyActive,
    FadingOut,
}

impl SegmentPhase {
    pub fn label(self) -> &'static str {
        match self {
            Self::Inactive => "inactive",
            Self::FadingIn => "fading in",
            Self::FullyActive => "active",
            Self::FadingOut => "fading out",
        }
    }
}

impl Segment {
    /// Build a segment, checking the window invariants.  `index` only feeds
    /// the error message.
    pub fn new(
        index: usize,
        source: MediaSource,
        window_start: f64,
        window_end: f64,
        overlap: f64,
    ) -> Result<Self, ConfigError> {
        if !(window_start.is_finite() && window_end.is_finite() && overlap.is_finite()) {
            return Err(ConfigError::NonFinite { index });
        }
        if !(0.0..=1.0).contains(&window_start) || window_end > 1.0 || window_start >= window_end {
            return Err(ConfigError::InvalidWindow {
                index,
                start: window_start,
                end: window_end,
            });
        }
        let max = (window_end - window_start) / 2.0;
        if overlap < 0.0 || overlap > max + 1e-9 {
            return Err(ConfigError::InvalidOverlap { index, overlap, max });
        }
        if source.url.trim().is_empty() {
            return Err(ConfigError::EmptyUrl { index });
        }
        Ok(Self {
            source,
            window_start,
            window_end,
            overlap,
        })
    }

    /// Page-style sequence: `n` windows splitting `[0, 1]` with a 0.01
    /// seam, each fading over `overlap`.
    ///
    /// Three urls give `(0, .34) (.33, .67) (.66, 1)`.
    pub fn evenly_spaced<I, S>(urls: I, overlap: f64) -> Result<Vec<Segment>, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let urls: Vec<String> = urls.into_iter().map(Into::into).collect();
        let n = urls.len();
        if n == 0 {
            return Err(ConfigError::NoSegments);
        }
        urls.into_iter()
            .enumerate()
            .map(|(i, url)| {
                let (start, end) = even_window(i, n);
                // Narrow windows can't carry the requested fade.
                let overlap = overlap.min((end - start) / 2.0);
                Segment::new(i, MediaSource::new(url), start, end, overlap)
            })
            .collect()
    }

    pub fn source(&self) -> &MediaSource {
        &self.source
    }

    pub fn window_start(&self) -> f64 {
        self.window_start
    }

    pub fn window_end(&self) -> f64 {
        self.window_end
    }

    pub fn overlap(&self) -> f64 {
        self.overlap
    }

    /// Window touches the start of the progress axis, so it has no fade-in.
    pub fn opens_sequence(&self) -> bool {
        self.window_start <= 0.0
    }

    /// Window touches the end of the progress axis, so it has no fade-out.
    pub fn closes_sequence(&self) -> bool {
        self.window_end >= 1.0
    }

    /// Classify `progress` against this segment's trapezoid thresholds.
    /// `Inactive` exactly where the trapezoid weight is 0.
    pub fn phase(&self, progress: f64) -> SegmentPhase {
        if !progress.is_finite() {
            return SegmentPhase::Inactive;
        }
        let (a, b, ov) = (self.window_start, self.window_end, self.overlap);
        let p = progress.clamp(0.0, 1.0);

        let before = if self.opens_sequence() || ov <= 0.0 {
            p < a
        } else {
            p <= a - ov
        };
        let after = !self.closes_sequence() && p >= b;
        if before || after {
            return SegmentPhase::Inactive;
        }
        if ov > 0.0 {
            if !self.opens_sequence() && p < a + ov {
                return SegmentPhase::FadingIn;
            }
            if !self.closes_sequence() && p > b - ov {
                return SegmentPhase::FadingOut;
            }
        }
        SegmentPhase::FullyActive
    }
}
