//! Central application state.
//!
//! All mutable state lives here so that the rest of the app can be pure
//! functions over `&AppState` (rendering) or `&mut AppState` (event handling).

use ratatui::layout::Rect;

use crate::config::{AppConfig, SceneConfig};
use crate::core::blend::{BlendFrame, Blender};
use crate::core::playback::PlaybackController;
use crate::core::segment::ConfigError;
use crate::core::tracker::ScrollTracker;

use super::clip::SimulatedClip;
use super::viewport::Viewport;

/// Host pixels per terminal row.
pub const ROW_PX: f64 = 16.0;

/// Which view / overlay is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveView {
    #[default]
    Stage,
    SettingsMenu,
    ControlsSubmenu,
}

/// Top-level application state.
pub struct AppState {
    /// User configuration (bindings + scene).
    pub config: AppConfig,
    /// The simulated document the stage lives in.
    pub viewport: Viewport,
    pub tracker: ScrollTracker,
    pub blender: Blender,
    pub playback: PlaybackController,
    /// One clip per segment, same order.
    pub clips: Vec<SimulatedClip>,
    /// Last effective frame, rendered as a unit.
    pub frame: BlendFrame,
    /// Terminal rows the page area had on the last resize.
    pub page_rows: u16,
    /// Full terminal area from the last draw, for mouse hit testing.
    pub terminal_area: Rect,
    /// Set once a key press or click has unlocked autoplay.
    pub autoplay_unlocked: bool,
    /// Controls the main event loop.
    pub should_quit: bool,
    /// An optional status message shown in the bottom bar.
    pub status_message: Option<String>,
    pub active_view: ActiveView,
    pub settings_selected: usize,
    pub controls_selected: usize,
    /// When `true`, the controls submenu is waiting for a key to bind.
    pub awaiting_rebind: bool,
    /// Frames stepped since start (drives indicator animation).
    pub tick: u64,
}

impl AppState {
    /// Validate the scene and mount the tracker.  Fails before anything is
    /// mounted if a segment window is invalid.
    pub fn new(config: AppConfig, page_rows: u16) -> Result<Self, ConfigError> {
        let scene = &config.scene;
        let segments = scene.build_segments()?;
        let blender = Blender::new(segments, scene.policy)?;

        let autoplay_unlocked = !scene.require_gesture;
        let clips = blender
            .segments()
            .iter()
            .map(|s| SimulatedClip::new(&s.source().url, scene.clip_seconds, autoplay_unlocked))
            .collect();

        let vh = rows_to_px(page_rows);
        let mut viewport = Viewport::new(vh, document_height(scene, vh));
        let mut tracker = ScrollTracker::new(scene.geometry(), scene.smoothing_alpha());
        tracker.mount(&mut viewport);

        let playback = PlaybackController::new(blender.segments().len(), scene.loop_clips);
        tracing::info!(
            segments = blender.segments().len(),
            policy = blender.policy().label(),
            smoothing = ?scene.smoothing_alpha(),
            "stage ready"
        );

        Ok(Self {
            config,
            viewport,
            tracker,
            blender,
            playback,
            clips,
            frame: BlendFrame::default(),
            page_rows,
            terminal_area: Rect::default(),
            autoplay_unlocked,
            should_quit: false,
            status_message: None,
            active_view: ActiveView::default(),
            settings_selected: 0,
            controls_selected: 0,
            awaiting_rebind: false,
            tick: 0,
        })
    }
}

impl AppState {
    /// Container top and bottom in document pixels at the current viewport.
    pub fn container_span(&self) -> (f64, f64) {
        let vh = rows_to_px(self.page_rows);
        let scene = &self.config.scene;
        let top = scene.container_top.resolve(vh);
        (top, top + scene.container_height.resolve(vh))
    }
}

pub fn rows_to_px(rows: u16) -> f64 {
    f64::from(rows) * ROW_PX
}

/// Hero + container + footer, resolved against viewport height `vh`.
pub fn document_height(scene: &SceneConfig, vh: f64) -> f64 {
    scene.container_top.resolve(vh) + scene.container_height.resolve(vh) + scene.footer_height.resolve(vh)
}
