//! A scroll-driven crossfade stage in the terminal.
//!
//! Scroll the page with the wheel or keys; while the scroll container is in
//! view, its segments fade into each other and each clip plays only while
//! its segment is visible.
//! Run with `--sample N` to print the weight table and exit.

mod app;
mod config;
mod core;
mod ui;

use std::fs::File;
use std::io::{self, stderr, Stderr};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::Rect,
    widgets::Paragraph,
    Frame, Terminal,
};
use tracing_subscriber::EnvFilter;

use crate::app::{
    event::{frame_clock, spawn_event_reader, AppEvent},
    handler, runtime,
    state::{ActiveView, AppState},
};
use crate::config::{AppConfig, SceneConfig, SegmentSpec};
use crate::core::blend::{BlendPolicy, Blender};
use crate::core::host::ScrollHost;
use crate::core::tracker::{is_valid_alpha, Length};
use crate::ui::{
    layout::AppLayout, minimap::Minimap, popup, segment_panel::SegmentPanel,
    spinner::GestureIndicator, stage::StageWidget, theme::Theme,
};

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "Scroll-driven media crossfade stage")]
struct Cli {
    /// Config file to use instead of the default location.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Media source for one segment.  Repeat for more; replaces the
    /// configured segments with an evenly spaced sequence.
    #[arg(long = "video", value_name = "URL")]
    videos: Vec<String>,

    /// Scroll container height, e.g. `420vh` or `3000px`.
    #[arg(long, value_name = "LENGTH")]
    container_height: Option<Length>,

    /// Smoothing filter alpha in (0, 1].
    #[arg(long, value_parser = parse_alpha)]
    alpha: Option<f64>,

    /// Emit raw progress with no smoothing.
    #[arg(long)]
    no_smoothing: bool,

    /// Blend policy: `trapezoid` or `normalized`.
    #[arg(long, value_parser = parse_policy)]
    policy: Option<BlendPolicy>,

    /// Write logs here instead of stderr.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Print segment weights at N+1 evenly spaced progress values and exit.
    #[arg(long, value_name = "N")]
    sample: Option<usize>,
}

fn parse_policy(s: &str) -> Result<BlendPolicy, String> {
    BlendPolicy::from_label(s).ok_or_else(|| {
        let known: Vec<&str> = BlendPolicy::ALL.iter().map(|p| p.label()).collect();
        format!("unknown policy `{s}` (expected one of: {})", known.join(", "))
    })
}

fn parse_alpha(s: &str) -> Result<f64, String> {
    let alpha: f64 = s.trim().parse().map_err(|e| format!("`{s}` is not a number: {e}"))?;
    if is_valid_alpha(alpha) {
        Ok(alpha)
    } else {
        Err(format!("alpha must be in (0, 1], got {s}"))
    }
}

impl Cli {
    /// Command-line values win over the config file.
    fn apply_to(&self, scene: &mut SceneConfig) {
        if !self.videos.is_empty() {
            scene.segments = self.videos.iter().map(SegmentSpec::from_url).collect();
        }
        if let Some(height) = self.container_height {
            scene.container_height = height;
        }
        if let Some(alpha) = self.alpha {
            scene.alpha = alpha;
        }
        if self.no_smoothing {
            scene.smoothing = false;
        }
        if let Some(policy) = self.policy {
            scene.policy = policy;
        }
    }
}

fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::from_default_env();
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .init();
        }
    }
    Ok(())
}

// ───────────────────────────────────────── drawing ───────────

fn status_text(state: &AppState) -> String {
    let tracker = &state.tracker;
    let smoothing = match tracker.alpha() {
        Some(alpha) => format!("α {alpha:.2}"),
        None => "raw".to_string(),
    };
    let tail = match state.status_message.as_deref() {
        Some(msg) => msg.to_string(),
        None => state.config.status_bar_hint(),
    };
    format!(
        " p {:.3} → {:.3} ({smoothing}, {}) | listeners {} frames {} | {tail}",
        tracker.target(),
        state.frame.progress,
        state.blender.policy().label(),
        state.viewport.listener_count(),
        state.viewport.pending_frames(),
    )
}

fn draw(frame: &mut Frame, state: &AppState) {
    let layout = AppLayout::from_area(frame.area());
    let container = state.container_span();
    let runtimes = state.playback.runtimes();

    frame.render_widget(
        Minimap {
            scroll_y: state.viewport.scroll_y(),
            viewport_height: state.viewport.viewport_height(),
            document_height: state.viewport.document_height(),
            container,
        },
        layout.minimap_area,
    );
    frame.render_widget(
        StageWidget {
            frame: &state.frame,
            clips: &state.clips,
            runtimes,
            scroll_y: state.viewport.scroll_y(),
            container,
            document_height: state.viewport.document_height(),
            mounted: state.tracker.is_mounted(),
        },
        layout.stage_area,
    );
    frame.render_widget(
        GestureIndicator {
            visible: !state.autoplay_unlocked && runtimes.iter().any(|rt| rt.blocked),
            tick: state.tick,
        },
        layout.stage_area,
    );
    frame.render_widget(
        SegmentPanel {
            segments: state.blender.segments(),
            runtimes,
        },
        layout.panel_area,
    );

    let status = match state.active_view {
        ActiveView::Stage => status_text(state),
        ActiveView::SettingsMenu | ActiveView::ControlsSubmenu => String::new(),
    };
    frame.render_widget(
        Paragraph::new(status).style(Theme::status_bar_style()),
        layout.status_area,
    );

    match state.active_view {
        ActiveView::SettingsMenu => frame.render_widget(
            popup::SettingsPopup {
                state,
                selected: state.settings_selected,
            },
            frame.area(),
        ),
        ActiveView::ControlsSubmenu => frame.render_widget(
            popup::ControlsPopup {
                config: &state.config,
                selected: state.controls_selected,
                awaiting_rebind: state.awaiting_rebind,
            },
            frame.area(),
        ),
        ActiveView::Stage => {}
    }
}

// ───────────────────────────────────────── event loop ────────

type Tui = Terminal<CrosstermBackend<Stderr>>;

async fn run(terminal: &mut Tui, state: &mut AppState) -> Result<()> {
    let mut events = spawn_event_reader();
    let mut clock = frame_clock();
    let mut last_frame = Instant::now();

    loop {
        terminal.draw(|frame| draw(frame, state))?;

        tokio::select! {
            biased;

            Some(event) = events.recv() => match event {
                AppEvent::Key(k) => handler::handle_key(state, k),
                AppEvent::Mouse(m) => handler::handle_mouse(state, m),
                AppEvent::Resize(w, h) => {
                    state.terminal_area = Rect::new(0, 0, w, h);
                    runtime::resize(state, AppLayout::from_area(state.terminal_area).page_rows());
                }
            },

            _ = clock.tick() => {
                let now = Instant::now();
                runtime::step(state, now.duration_since(last_frame).as_secs_f64());
                last_frame = now;
            }
        }

        if state.should_quit {
            return Ok(());
        }
    }
}

// ───────────────────────────────────────── main ─────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_deref())?;

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    }
    .context("failed to load config")?;
    cli.apply_to(&mut config.scene);

    // ── headless mode ─────────────────────────────────────────
    if let Some(steps) = cli.sample {
        let segments = config
            .scene
            .build_segments()
            .context("invalid segment configuration")?;
        let blender = Blender::new(segments, config.scene.policy)?;
        runtime::write_sample_table(&blender, steps, &mut io::stdout().lock())?;
        return Ok(());
    }

    // Validate and mount before touching the terminal so configuration
    // errors print normally.
    let (cols, rows) = crossterm::terminal::size().context("cannot query terminal size")?;
    let area = Rect::new(0, 0, cols, rows);
    let mut state = AppState::new(config, AppLayout::from_area(area).page_rows())
        .context("invalid segment configuration")?;
    state.terminal_area = area;

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    execute!(stderr(), EnterAlternateScreen, EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stderr()))?;

    let result = run(&mut terminal, &mut state).await;

    // ── teardown ──────────────────────────────────────────────
    state.tracker.unmount(&mut state.viewport);
    tracing::info!(
        listeners = state.viewport.listener_count(),
        frames = state.viewport.pending_frames(),
        "stage torn down"
    );
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    result
}
