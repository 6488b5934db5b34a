//! Per-frame runtime.
//!
//! One [`step`] is one animation frame: host notifications and frame
//! callbacks go to the tracker, the resulting progress is blended, the
//! playback adapter applies the frame to the clips, and the clips advance.
//! The effective frame is stored whole for the renderer.

use std::io::{self, Write};

use crate::core::blend::{BlendFrame, BlendPolicy, Blender, SegmentWeight};
use crate::core::host::ScrollHost;
use crate::core::playback::PlaybackController;
use crate::core::tracker::ScrollTracker;

use super::state::{document_height, rows_to_px, AppState};

/// Advance everything by one frame of `dt` seconds.
pub fn step(state: &mut AppState, dt: f64) {
    for notification in state.viewport.drain_notifications() {
        state.tracker.handle(&state.viewport, notification);
    }
    for request in state.viewport.take_frames() {
        state.tracker.on_frame(&mut state.viewport, request);
    }

    let raw = if state.tracker.is_mounted() {
        state.blender.frame(state.tracker.progress())
    } else {
        // Unmounted: every segment is off, which pauses and rewinds.
        dark_frame(state.blender.segments().len())
    };
    state.frame = state
        .playback
        .apply(&raw, state.blender.segments(), &mut state.clips);

    for clip in &mut state.clips {
        clip.advance(dt);
    }
    state.tick = state.tick.wrapping_add(1);
}

fn dark_frame(n: usize) -> BlendFrame {
    BlendFrame {
        progress: 0.0,
        policy: BlendPolicy::default(),
        weights: (0..n).map(|index| SegmentWeight { index, weight: 0.0 }).collect(),
    }
}

/// Scroll the document by `rows` terminal rows (negative = up).
pub fn scroll_rows(state: &mut AppState, rows: i32) {
    state.viewport.scroll_by(f64::from(rows) * rows_to_px(1));
}

pub fn scroll_to_top(state: &mut AppState) {
    state.viewport.scroll_to(0.0);
}

pub fn scroll_to_bottom(state: &mut AppState) {
    let max = state.viewport.max_scroll();
    state.viewport.scroll_to(max);
}

/// Page area changed size; the document scales with it.
pub fn resize(state: &mut AppState, rows: u16) {
    if rows == state.page_rows {
        return;
    }
    state.page_rows = rows;
    let vh = rows_to_px(rows);
    let doc = document_height(&state.config.scene, vh);
    state.viewport.resize(vh, doc);
}

/// Unmount the container (releasing every listener and frame callback) or
/// mount a fresh tracker.  Returns the new mounted state.
pub fn toggle_mount(state: &mut AppState) -> bool {
    if state.tracker.is_mounted() {
        state.tracker.unmount(&mut state.viewport);
        // Pause and rewind now: a remount replaces the controller, and
        // the clips must not outlive the one that started them.
        let dark = dark_frame(state.blender.segments().len());
        state.frame = state
            .playback
            .apply(&dark, state.blender.segments(), &mut state.clips);
        tracing::info!(
            listeners = state.viewport.listener_count(),
            frames = state.viewport.pending_frames(),
            "container unmounted"
        );
        false
    } else {
        let scene = &state.config.scene;
        state.tracker = ScrollTracker::new(scene.geometry(), scene.smoothing_alpha());
        state.playback = PlaybackController::new(state.blender.segments().len(), scene.loop_clips);
        state.tracker.mount(&mut state.viewport);
        tracing::info!("container mounted");
        true
    }
}

pub fn set_smoothing(state: &mut AppState, on: bool) {
    state.config.scene.smoothing = on;
    let alpha = state.config.scene.smoothing_alpha();
    state.tracker.set_smoothing(&mut state.viewport, alpha);
}

pub fn set_alpha(state: &mut AppState, alpha: f64) {
    state.config.scene.alpha = alpha;
    if state.config.scene.smoothing {
        state.tracker.set_smoothing(&mut state.viewport, Some(alpha));
    }
}

pub fn set_policy(state: &mut AppState, policy: BlendPolicy) {
    state.config.scene.policy = policy;
    state.blender.set_policy(policy);
}

pub fn set_loop_clips(state: &mut AppState, on: bool) {
    state.config.scene.loop_clips = on;
    state.playback.set_loop_clips(on);
}

/// A key press or click counts as the user gesture that unlocks autoplay.
pub fn user_gesture(state: &mut AppState) {
    if state.autoplay_unlocked {
        return;
    }
    state.autoplay_unlocked = true;
    for clip in &mut state.clips {
        clip.unlock_autoplay();
    }
    let started = state.playback.retry_blocked(&mut state.clips);
    tracing::debug!(started, "autoplay unlocked");
}

/// Reload failed segments from their primary source.
pub fn retry_media(state: &mut AppState) {
    state
        .playback
        .reset_failures(state.blender.segments(), &mut state.clips);
}

/// Persist the config; failures only reach the status bar and the log.
pub fn save_config(state: &mut AppState) {
    if let Err(err) = state.config.save() {
        tracing::warn!(%err, "failed to save config");
        state.status_message = Some(format!("Could not save config: {err}"));
    }
}

/// Headless table of weights at `steps + 1` evenly spaced progress values.
pub fn write_sample_table(blender: &Blender, steps: usize, out: &mut impl Write) -> io::Result<()> {
    let steps = steps.max(1);
    let n = blender.segments().len();

    write!(out, "{:>8}", "progress")?;
    for i in 0..n {
        write!(out, " {:>7}", format!("seg{}", i + 1))?;
    }
    writeln!(out, " {:>8}", "dominant")?;

    for k in 0..=steps {
        let p = k as f64 / steps as f64;
        let frame = blender.frame(p);
        write!(out, "{p:>8.3}")?;
        for i in 0..n {
            write!(out, " {:>7.3}", frame.weight(i))?;
        }
        match frame.dominant() {
            Some(i) => writeln!(out, " {:>8}", i + 1)?,
            None => writeln!(out, " {:>8}", "-")?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, SegmentSpec};
    use std::path::PathBuf;

    fn state() -> AppState {
        let mut config = AppConfig::with_defaults(PathBuf::from("unused.toml"));
        config.scene.smoothing = false;
        config.scene.require_gesture = false;
        // 10 rows → 160px viewport; container at [160, 832), range 512.
        AppState::new(config, 10).unwrap()
    }

    #[test]
    fn scrolling_through_the_container_crossfades() {
        let mut s = state();
        step(&mut s, 0.016);
        assert_eq!(s.frame.dominant(), Some(0));
        assert!(s.clips[0].is_playing());

        // Halfway through the container.
        s.viewport.scroll_to(160.0 + 256.0);
        step(&mut s, 0.016);
        assert!((s.frame.progress - 0.5).abs() < 1e-9);
        assert_eq!(s.frame.dominant(), Some(1));
        assert!(!s.clips[0].is_playing());
        assert_eq!(s.clips[0].position(), 0.0);
        assert!(s.clips[1].is_playing());

        scroll_to_bottom(&mut s);
        step(&mut s, 0.016);
        assert_eq!(s.frame.dominant(), Some(2));
    }

    #[test]
    fn unmount_pauses_everything_and_releases_the_host() {
        let mut s = state();
        set_smoothing(&mut s, true);
        step(&mut s, 0.016);
        assert_eq!(s.viewport.listener_count(), 2);
        assert_eq!(s.viewport.pending_frames(), 1);

        s.viewport.scroll_by(100.0);
        assert!(!toggle_mount(&mut s));
        assert_eq!(s.viewport.listener_count(), 0);
        assert_eq!(s.viewport.pending_frames(), 0);
        step(&mut s, 0.016);
        assert!(s.clips.iter().all(|c| !c.is_playing()));
        assert_eq!(s.frame.total(), 0.0);

        assert!(toggle_mount(&mut s));
        step(&mut s, 0.016);
        assert_eq!(s.viewport.listener_count(), 2);
        assert!(s.frame.total() > 0.0);
    }

    #[test]
    fn quick_remount_does_not_leave_clips_playing() {
        let mut s = state();
        step(&mut s, 0.016);
        assert!(s.clips[0].is_playing());

        // Unmount, scroll and remount with no frame in between.
        assert!(!toggle_mount(&mut s));
        assert!(s.clips.iter().all(|c| !c.is_playing()));
        s.viewport.scroll_to(160.0 + 256.0);
        assert!(toggle_mount(&mut s));

        for _ in 0..3 {
            step(&mut s, 0.016);
        }
        assert_eq!(s.frame.weight(0), 0.0);
        assert!(!s.clips[0].is_playing());
        assert_eq!(s.clips[0].position(), 0.0);
        assert!(s.clips[1].is_playing());
    }

    #[test]
    fn smoothing_lags_behind_the_scroll() {
        let mut s = state();
        set_smoothing(&mut s, true);
        set_alpha(&mut s, 0.25);
        step(&mut s, 0.016);

        scroll_to_bottom(&mut s);
        step(&mut s, 0.016);
        let first = s.frame.progress;
        assert!(first > 0.0 && first < 1.0, "{first}");
        for _ in 0..100 {
            step(&mut s, 0.016);
        }
        assert!((s.frame.progress - 1.0).abs() < 1e-3);
    }

    #[test]
    fn gesture_unlocks_blocked_playback() {
        let mut config = AppConfig::with_defaults(PathBuf::from("unused.toml"));
        config.scene.smoothing = false;
        config.scene.require_gesture = true;
        let mut s = AppState::new(config, 10).unwrap();

        step(&mut s, 0.016);
        assert!(!s.clips[0].is_playing());
        assert!(s.playback.runtimes()[0].blocked);

        user_gesture(&mut s);
        assert!(s.clips[0].is_playing());
    }

    #[test]
    fn broken_segment_goes_dark_without_stopping_the_others() {
        let mut config = AppConfig::with_defaults(PathBuf::from("unused.toml"));
        config.scene.smoothing = false;
        config.scene.require_gesture = false;
        config.scene.segments = vec![
            SegmentSpec::from_url("/no/such/clip.mp4"),
            SegmentSpec::from_url("https://example.com/b.mp4"),
        ];
        let mut s = AppState::new(config, 10).unwrap();

        step(&mut s, 0.016);
        assert!(s.playback.runtimes()[0].failed);
        assert_eq!(s.frame.weight(0), 0.0);

        scroll_to_bottom(&mut s);
        step(&mut s, 0.016);
        assert_eq!(s.frame.weight(1), 1.0);
        assert!(s.clips[1].is_playing());
    }

    #[test]
    fn sample_table_lists_every_step() {
        let segments = crate::core::segment::Segment::evenly_spaced(["a.mp4", "b.mp4", "c.mp4"], 0.08).unwrap();
        let blender = Blender::new(segments, BlendPolicy::Trapezoid).unwrap();
        let mut out = Vec::new();
        write_sample_table(&blender, 2, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("seg3") && lines[0].contains("dominant"));
        assert_eq!(lines[1].split_whitespace().collect::<Vec<_>>(), ["0.000", "1.000", "0.000", "0.000", "1"]);
        assert_eq!(lines[2].split_whitespace().collect::<Vec<_>>(), ["0.500", "0.000", "1.000", "0.000", "2"]);
        assert_eq!(lines[3].split_whitespace().collect::<Vec<_>>(), ["1.000", "0.000", "0.000", "1.000", "3"]);
    }

    #[test]
    fn resize_keeps_progress() {
        let mut s = state();
        s.viewport.scroll_to(160.0 + 256.0);
        step(&mut s, 0.016);
        resize(&mut s, 20);
        step(&mut s, 0.016);
        assert!((s.frame.progress - 0.5).abs() < 1e-9, "{}", s.frame.progress);
    }
}
