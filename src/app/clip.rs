//! Simulated media clips.
//!
//! The terminal can't decode video, so each clip is a playhead that
//! advances in real time while playing.  Loading still behaves like a real
//! element: remote urls resolve, local paths must exist, unknown containers
//! fail to decode, and failures arrive asynchronously as events.

use std::collections::VecDeque;
use std::path::Path;

use crate::core::playback::{MediaError, MediaEvent, MediaHandle};

const PLAYABLE_EXTENSIONS: &[&str] = &["mp4", "webm", "mov", "m4v", "ogv"];

#[derive(Debug)]
pub struct SimulatedClip {
    url: String,
    duration: f64,
    position: f64,
    playing: bool,
    ready: bool,
    /// Mirrors the browser rule: no unmuted playback before a user gesture.
    autoplay_unlocked: bool,
    events: VecDeque<MediaEvent>,
}

impl SimulatedClip {
    pub fn new(url: &str, duration_secs: f64, autoplay_unlocked: bool) -> Self {
        let mut clip = Self {
            url: String::new(),
            duration: duration_secs.max(0.1),
            position: 0.0,
            playing: false,
            ready: false,
            autoplay_unlocked,
            events: VecDeque::new(),
        };
        clip.load(url);
        clip
    }

    pub fn unlock_autoplay(&mut self) {
        self.autoplay_unlocked = true;
    }

    /// Move the playhead by `dt` seconds.  Queues `Ended` at the end.
    pub fn advance(&mut self, dt: f64) {
        if !self.playing || !self.ready || dt <= 0.0 {
            return;
        }
        self.position += dt;
        if self.position >= self.duration {
            self.position = self.duration;
            self.playing = false;
            self.events.push_back(MediaEvent::Ended);
        }
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }
}

impl MediaHandle for SimulatedClip {
    fn source(&self) -> &str {
        &self.url
    }

    fn play(&mut self) -> Result<(), MediaError> {
        if !self.ready {
            return Err(MediaError::Load {
                url: self.url.clone(),
                reason: "source not loaded".into(),
            });
        }
        if !self.autoplay_unlocked {
            return Err(MediaError::AutoplayBlocked {
                url: self.url.clone(),
            });
        }
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn rewind(&mut self) {
        self.position = 0.0;
    }

    fn load(&mut self, url: &str) {
        self.url = url.to_string();
        self.position = 0.0;
        self.playing = false;
        match check_source(url) {
            Ok(()) => self.ready = true,
            Err(err) => {
                tracing::debug!(url, %err, "clip load failed");
                self.ready = false;
                self.events.push_back(MediaEvent::Failed(err));
            }
        }
    }

    fn poll_event(&mut self) -> Option<MediaEvent> {
        self.events.pop_front()
    }
}

/// Decide whether `url` would load.
fn check_source(url: &str) -> Result<(), MediaError> {
    let load_err = |reason: &str| MediaError::Load {
        url: url.to_string(),
        reason: reason.to_string(),
    };

    let remote = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    let path = match remote {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => return Err(load_err("missing host")),
        Some(rest) => rest.split(['?', '#']).next().unwrap_or(rest),
        None => {
            let local = url.strip_prefix("file://").unwrap_or(url);
            if local.contains("://") {
                return Err(load_err("unsupported scheme"));
            }
            if !Path::new(local).is_file() {
                return Err(load_err("no such file"));
            }
            local
        }
    };

    let playable = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| PLAYABLE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
    if playable {
        Ok(())
    } else {
        Err(MediaError::Decode {
            url: url.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_urls_resolve() {
        let clip = SimulatedClip::new("https://example.com/v/hero.mp4?t=1", 5.0, true);
        assert!(clip.is_ready());
        assert_eq!(clip.source(), "https://example.com/v/hero.mp4?t=1");
    }

    #[test]
    fn missing_local_file_fails_asynchronously() {
        let mut clip = SimulatedClip::new("/definitely/not/here.mp4", 5.0, true);
        assert!(!clip.is_ready());
        assert!(matches!(
            clip.poll_event(),
            Some(MediaEvent::Failed(MediaError::Load { .. }))
        ));
        assert!(clip.poll_event().is_none());
        assert!(clip.play().is_err());
    }

    #[test]
    fn unknown_container_fails_to_decode() {
        let mut clip = SimulatedClip::new("https://example.com/doc.pdf", 5.0, true);
        assert_eq!(
            clip.poll_event(),
            Some(MediaEvent::Failed(MediaError::Decode {
                url: "https://example.com/doc.pdf".into()
            }))
        );
    }

    #[test]
    fn unsupported_scheme_fails() {
        let mut clip = SimulatedClip::new("ftp://example.com/a.mp4", 5.0, true);
        assert!(matches!(
            clip.poll_event(),
            Some(MediaEvent::Failed(MediaError::Load { .. }))
        ));
    }

    #[test]
    fn autoplay_needs_a_gesture() {
        let mut clip = SimulatedClip::new("https://example.com/a.webm", 5.0, false);
        assert!(matches!(clip.play(), Err(MediaError::AutoplayBlocked { .. })));
        clip.unlock_autoplay();
        assert!(clip.play().is_ok());
        assert!(clip.is_playing());
    }

    #[test]
    fn playhead_ends_and_rewinds() {
        let mut clip = SimulatedClip::new("https://example.com/a.mp4", 1.0, true);
        clip.play().unwrap();
        clip.advance(0.4);
        assert!((clip.position() - 0.4).abs() < 1e-12);
        clip.advance(1.0);
        assert_eq!(clip.position(), 1.0);
        assert!(!clip.is_playing());
        assert_eq!(clip.poll_event(), Some(MediaEvent::Ended));
        clip.rewind();
        assert_eq!(clip.position(), 0.0);
    }

    #[test]
    fn paused_clip_does_not_advance() {
        let mut clip = SimulatedClip::new("https://example.com/a.mp4", 1.0, true);
        clip.advance(0.5);
        assert_eq!(clip.position(), 0.0);
    }
}
