//! User configuration: keybindings, scene settings, and persistence.
//!
//! Stored as a simple key-value text file at
//! `$XDG_CONFIG_HOME/scroll-fade/config.toml` (default
//! `~/.config/scroll-fade/config.toml`).  Each `[segment]` header starts a
//! new media segment; the keys below it configure that segment.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use thiserror::Error;

use crate::core::blend::BlendPolicy;
use crate::core::segment::{self, ConfigError, MediaSource, Segment};
use crate::core::tracker::{ContainerGeometry, Length, DEFAULT_ALPHA};

// ───────────────────────────────────────── actions ───────────

/// All configurable user actions on the stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    JumpTop,
    JumpBottom,
    ToggleSmoothing,
    ToggleMount,
    RetryMedia,
    OpenSettings,
    Quit,
}

impl Action {
    /// Ordered list of all actions (used for the controls menu).
    pub const ALL: &[Action] = &[
        Action::ScrollUp,
        Action::ScrollDown,
        Action::PageUp,
        Action::PageDown,
        Action::JumpTop,
        Action::JumpBottom,
        Action::ToggleSmoothing,
        Action::ToggleMount,
        Action::RetryMedia,
        Action::OpenSettings,
        Action::Quit,
    ];

    /// `(action, config key, menu label)`.
    const TABLE: &[(Action, &'static str, &'static str)] = &[
        (Action::ScrollUp, "scroll_up", "Scroll Up"),
        (Action::ScrollDown, "scroll_down", "Scroll Down"),
        (Action::PageUp, "page_up", "Page Up"),
        (Action::PageDown, "page_down", "Page Down"),
        (Action::JumpTop, "jump_top", "Jump to Top"),
        (Action::JumpBottom, "jump_bottom", "Jump to Bottom"),
        (Action::ToggleSmoothing, "toggle_smoothing", "Toggle Smoothing"),
        (Action::ToggleMount, "toggle_mount", "Mount / Unmount"),
        (Action::RetryMedia, "retry_media", "Retry Failed Media"),
        (Action::OpenSettings, "open_settings", "Open Settings"),
        (Action::Quit, "quit", "Quit"),
    ];

    fn entry(self) -> (&'static str, &'static str) {
        Self::TABLE
            .iter()
            .find(|(a, _, _)| *a == self)
            .map_or(("", ""), |&(_, key, label)| (key, label))
    }

    /// Human-readable label for the UI.
    pub fn label(self) -> &'static str {
        self.entry().1
    }

    fn config_key(self) -> &'static str {
        self.entry().0
    }

    fn from_config_key(s: &str) -> Option<Self> {
        Self::TABLE.iter().find(|(_, key, _)| *key == s).map(|(a, _, _)| *a)
    }
}

// ───────────────────────────────────────── key bind ──────────

/// Named keys: `(code, config name, display name)`.
const NAMED_KEYS: &[(KeyCode, &str, &str)] = &[
    (KeyCode::Char(' '), "Space", "Space"),
    (KeyCode::Up, "Up", "↑"),
    (KeyCode::Down, "Down", "↓"),
    (KeyCode::Left, "Left", "←"),
    (KeyCode::Right, "Right", "→"),
    (KeyCode::Enter, "Enter", "Enter"),
    (KeyCode::Esc, "Esc", "Esc"),
    (KeyCode::Tab, "Tab", "Tab"),
    (KeyCode::Backspace, "Backspace", "Bksp"),
    (KeyCode::Delete, "Delete", "Del"),
    (KeyCode::Home, "Home", "Home"),
    (KeyCode::End, "End", "End"),
    (KeyCode::PageUp, "PageUp", "PgUp"),
    (KeyCode::PageDown, "PageDown", "PgDn"),
];

const MODIFIER_MASK: KeyModifiers = KeyModifiers::CONTROL
    .union(KeyModifiers::ALT)
    .union(KeyModifiers::SHIFT);

/// A single key binding: key code + modifier combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBind {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Only CTRL/ALT/SHIFT are compared.
    pub fn matches(&self, event: KeyEvent) -> bool {
        self.code == event.code && (self.modifiers & MODIFIER_MASK) == (event.modifiers & MODIFIER_MASK)
    }

    /// Binding captured from a key press (used during rebinding).
    pub fn from_key_event(event: KeyEvent) -> Self {
        Self {
            code: event.code,
            modifiers: event.modifiers & MODIFIER_MASK,
        }
    }

    fn prefix(&self) -> String {
        let mut s = String::new();
        for (m, name) in [
            (KeyModifiers::CONTROL, "Ctrl+"),
            (KeyModifiers::ALT, "Alt+"),
            (KeyModifiers::SHIFT, "Shift+"),
        ] {
            if self.modifiers.contains(m) {
                s.push_str(name);
            }
        }
        s
    }

    fn key_name(&self, display: bool) -> String {
        if let Some((_, cfg, disp)) = NAMED_KEYS.iter().find(|(c, _, _)| *c == self.code) {
            let name = if display { disp } else { cfg };
            return name.to_string();
        }
        match self.code {
            KeyCode::Char(c) => c.to_string(),
            KeyCode::F(n) => format!("F{n}"),
            other => format!("{other:?}"),
        }
    }

    /// User-friendly display string (e.g. `"Alt+↑"`, `"j"`).
    pub fn display(&self) -> String {
        format!("{}{}", self.prefix(), self.key_name(true))
    }

    fn to_config_string(&self) -> String {
        format!("{}{}", self.prefix(), self.key_name(false))
    }

    /// Parse `"Ctrl+c"`, `"Shift+Down"`, `"j"`, `"PgDn"`, `"F5"`.
    fn parse(s: &str) -> Option<Self> {
        let parts: Vec<&str> = s.split('+').collect();
        let (key_part, mods) = parts.split_last()?;

        let mut modifiers = KeyModifiers::NONE;
        for part in mods {
            modifiers |= match part.to_lowercase().as_str() {
                "ctrl" => KeyModifiers::CONTROL,
                "alt" => KeyModifiers::ALT,
                "shift" => KeyModifiers::SHIFT,
                _ => return None,
            };
        }

        let lower = key_part.to_lowercase();
        let named = NAMED_KEYS.iter().find(|(_, cfg, disp)| {
            cfg.eq_ignore_ascii_case(&lower) || disp.eq_ignore_ascii_case(&lower)
        });
        let code = match (named, lower.as_str()) {
            (Some((code, _, _)), _) => *code,
            (None, "return") => KeyCode::Enter,
            (None, "escape") => KeyCode::Esc,
            (None, "del") => KeyCode::Delete,
            (None, k) if k.starts_with('f') && k.len() > 1 => KeyCode::F(k[1..].parse().ok()?),
            (None, _) => {
                let mut chars = key_part.chars();
                let c = chars.next()?;
                if chars.next().is_some() {
                    return None;
                }
                KeyCode::Char(c)
            }
        };

        Some(KeyBind { code, modifiers })
    }
}

// ───────────────────────────────────────── scene ─────────────

/// One `[segment]` block as written by the user.  Missing windows are
/// filled in with the evenly spaced page layout.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SegmentSpec {
    pub url: String,
    pub fallback: Option<String>,
    pub start: Option<f64>,
    pub end: Option<f64>,
    pub overlap: Option<f64>,
}

impl SegmentSpec {
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }
}

/// Everything the stage needs to build its tracker, blender and clips.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub segments: Vec<SegmentSpec>,
    /// Overlap for segments that don't set their own.
    pub overlap: f64,
    pub smoothing: bool,
    pub alpha: f64,
    pub container_top: Length,
    pub container_height: Length,
    pub footer_height: Length,
    pub policy: BlendPolicy,
    pub loop_clips: bool,
    pub clip_seconds: f64,
    /// Hold playback until the first key press or click.
    pub require_gesture: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        let geometry = ContainerGeometry::default();
        Self {
            segments: vec![
                SegmentSpec::from_url("https://example.com/media/marketplace.mp4"),
                SegmentSpec {
                    fallback: Some("https://example.com/media/tourism.webm".into()),
                    ..SegmentSpec::from_url("https://example.com/media/tourism.mp4")
                },
                SegmentSpec::from_url("https://example.com/media/dating.mp4"),
            ],
            overlap: 0.08,
            smoothing: true,
            alpha: DEFAULT_ALPHA,
            container_top: geometry.top,
            container_height: geometry.height,
            footer_height: Length::Vh(100.0),
            policy: BlendPolicy::Trapezoid,
            loop_clips: true,
            clip_seconds: 8.0,
            require_gesture: true,
        }
    }
}

impl SceneConfig {
    /// Validate every segment.  Nothing should be mounted if this fails.
    pub fn build_segments(&self) -> Result<Vec<Segment>, ConfigError> {
        let n = self.segments.len();
        if n == 0 {
            return Err(ConfigError::NoSegments);
        }
        self.segments
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                let (even_start, even_end) = segment::even_window(i, n);
                let start = spec.start.unwrap_or(even_start);
                let end = spec.end.unwrap_or(even_end);
                let overlap = spec
                    .overlap
                    .unwrap_or_else(|| self.overlap.min((end - start).max(0.0) / 2.0));
                let mut source = MediaSource::new(spec.url.clone());
                if let Some(fb) = &spec.fallback {
                    source = source.with_fallback(fb.clone());
                }
                Segment::new(i, source, start, end, overlap)
            })
            .collect()
    }

    pub fn geometry(&self) -> ContainerGeometry {
        ContainerGeometry {
            top: self.container_top,
            height: self.container_height,
        }
    }

    /// Smoothing alpha, or `None` when smoothing is off.
    pub fn smoothing_alpha(&self) -> Option<f64> {
        self.smoothing.then_some(self.alpha)
    }
}

// ───────────────────────────────────────── errors ────────────

#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("{path}:{line}: {message}")]
    Syntax {
        path: PathBuf,
        line: usize,
        message: String,
    },
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ───────────────────────────────────────── config ────────────

/// Application configuration: keybindings and scene settings.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bindings: HashMap<Action, Vec<KeyBind>>,
    pub scene: SceneConfig,
    /// Rows scrolled per wheel notch or arrow press.
    pub wheel_rows: u16,
    /// Where `save` writes to.
    pub path: PathBuf,
}

impl AppConfig {
    pub fn default_bindings() -> HashMap<Action, Vec<KeyBind>> {
        use KeyCode::*;
        let n = KeyModifiers::NONE;
        let mut m = HashMap::new();

        m.insert(Action::ScrollUp, vec![KeyBind::new(Up, n), KeyBind::new(Char('k'), n)]);
        m.insert(Action::ScrollDown, vec![KeyBind::new(Down, n), KeyBind::new(Char('j'), n)]);
        m.insert(Action::PageUp, vec![KeyBind::new(PageUp, n), KeyBind::new(Char('b'), n)]);
        m.insert(Action::PageDown, vec![KeyBind::new(PageDown, n), KeyBind::new(Char(' '), n)]);
        m.insert(Action::JumpTop, vec![KeyBind::new(Home, n), KeyBind::new(Char('g'), n)]);
        m.insert(
            Action::JumpBottom,
            vec![KeyBind::new(End, n), KeyBind::new(Char('G'), KeyModifiers::SHIFT)],
        );
        m.insert(Action::ToggleSmoothing, vec![KeyBind::new(Char('s'), n)]);
        m.insert(Action::ToggleMount, vec![KeyBind::new(Char('m'), n)]);
        m.insert(Action::RetryMedia, vec![KeyBind::new(Char('r'), n)]);
        m.insert(Action::OpenSettings, vec![KeyBind::new(Char('?'), n)]);
        m.insert(Action::Quit, vec![KeyBind::new(Char('q'), n)]);

        m
    }

    pub fn with_defaults(path: PathBuf) -> Self {
        Self {
            bindings: Self::default_bindings(),
            scene: SceneConfig::default(),
            wheel_rows: 3,
            path,
        }
    }

    /// Find the action for a key event.  The binding with the most
    /// modifiers wins.
    pub fn match_key(&self, event: KeyEvent) -> Option<Action> {
        self.bindings
            .iter()
            .flat_map(|(&action, binds)| binds.iter().map(move |b| (action, b)))
            .filter(|(_, b)| b.matches(event))
            .max_by_key(|(_, b)| b.modifiers.bits().count_ones())
            .map(|(action, _)| action)
    }

    /// Add a binding for `action`, taking the key away from any other action.
    pub fn add_binding(&mut self, action: Action, bind: KeyBind) {
        for binds in self.bindings.values_mut() {
            binds.retain(|b| b != &bind);
        }
        self.bindings.entry(action).or_default().push(bind);
    }

    pub fn reset_defaults(&mut self) {
        self.bindings = Self::default_bindings();
    }

    /// Format the binding list for a given action (e.g. `"↓/j"`).
    pub fn display_bindings(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => {
                binds.iter().map(|b| b.display()).collect::<Vec<_>>().join("/")
            }
            _ => "unbound".into(),
        }
    }

    fn short_binding(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => binds[0].display(),
            _ => "?".into(),
        }
    }

    pub fn status_bar_hint(&self) -> String {
        format!(
            "{}/{}: scroll | {}: smoothing | {}: mount | {}: settings",
            self.short_binding(Action::ScrollUp),
            self.short_binding(Action::ScrollDown),
            self.short_binding(Action::ToggleSmoothing),
            self.short_binding(Action::ToggleMount),
            self.short_binding(Action::OpenSettings),
        )
    }

    // ── persistence ─────────────────────────────────────────────

    /// Load from the default location, falling back to defaults when the
    /// file doesn't exist.
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::with_defaults(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&contents, path)?;
        tracing::info!(path = %path.display(), segments = config.scene.segments.len(), "config loaded");
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, self.serialise())?;
        Ok(())
    }

    fn parse(s: &str, path: &Path) -> Result<Self, ConfigFileError> {
        let mut config = Self::with_defaults(path.to_path_buf());
        let mut segments: Vec<SegmentSpec> = Vec::new();
        // Line of each `[segment]` header, parallel to `segments`.
        let mut headers: Vec<usize> = Vec::new();
        let mut in_segment = false;

        for (idx, raw) in s.lines().enumerate() {
            let line_no = idx + 1;
            let syntax = |message: String| ConfigFileError::Syntax {
                path: path.to_path_buf(),
                line: line_no,
                message,
            };

            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if line.starts_with('[') {
                in_segment = matches!(line, "[segment]" | "[[segment]]");
                if in_segment {
                    segments.push(SegmentSpec::default());
                    headers.push(line_no);
                }
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim().trim_matches('"');

            let number = |v: &str| -> Result<f64, ConfigFileError> {
                v.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .ok_or_else(|| syntax(format!("{key}: expected a number, got {v:?}")))
            };
            let length = |v: &str| -> Result<Length, ConfigFileError> {
                v.parse::<Length>().map_err(|e| syntax(e.to_string()))
            };
            let boolean = |v: &str| -> Result<bool, ConfigFileError> {
                match v {
                    "true" => Ok(true),
                    "false" => Ok(false),
                    _ => Err(syntax(format!("{key}: expected true or false, got {v:?}"))),
                }
            };

            if in_segment {
                let Some(spec) = segments.last_mut() else {
                    continue;
                };
                match key {
                    "url" => spec.url = value.to_string(),
                    "fallback" => spec.fallback = Some(value.to_string()),
                    "start" => spec.start = Some(number(value)?),
                    "end" => spec.end = Some(number(value)?),
                    "overlap" => spec.overlap = Some(number(value)?),
                    other => return Err(syntax(format!("unknown segment key {other:?}"))),
                }
                continue;
            }

            let scene = &mut config.scene;
            match key {
                "smoothing" => scene.smoothing = boolean(value)?,
                "alpha" => scene.alpha = number(value)?.clamp(0.01, 1.0),
                "overlap" => scene.overlap = number(value)?.max(0.0),
                "container_top" => scene.container_top = length(value)?,
                "container_height" => scene.container_height = length(value)?,
                "footer_height" => scene.footer_height = length(value)?,
                "policy" => {
                    scene.policy = BlendPolicy::from_label(value)
                        .ok_or_else(|| syntax(format!("unknown policy {value:?}")))?
                }
                "loop_clips" => scene.loop_clips = boolean(value)?,
                "clip_seconds" => scene.clip_seconds = number(value)?.clamp(0.5, 600.0),
                "require_gesture" => scene.require_gesture = boolean(value)?,
                "wheel_rows" => {
                    let rows = value.parse::<u16>().map_err(|_| {
                        syntax(format!("{key}: expected a row count, got {value:?}"))
                    })?;
                    config.wheel_rows = rows.clamp(1, 20);
                }
                _ => {
                    // Anything else is a key binding; unknown keys are ignored.
                    let Some(action) = Action::from_config_key(key) else {
                        continue;
                    };
                    let parsed: Vec<KeyBind> = value
                        .split(',')
                        .filter_map(|part| KeyBind::parse(part.trim().trim_matches('"')))
                        .collect();
                    if !parsed.is_empty() {
                        config.bindings.insert(action, parsed);
                    }
                }
            }
        }

        if !segments.is_empty() {
            if let Some(pos) = segments.iter().position(|s| s.url.is_empty()) {
                return Err(ConfigFileError::Syntax {
                    path: path.to_path_buf(),
                    line: headers.get(pos).copied().unwrap_or_default(),
                    message: format!("segment {pos} has no url"),
                });
            }
            config.scene.segments = segments;
        }
        Ok(config)
    }

    fn serialise(&self) -> String {
        let scene = &self.scene;
        let mut lines = vec![
            "# scroll-fade configuration".to_string(),
            String::new(),
            "# Scene".to_string(),
            format!("smoothing = {}", scene.smoothing),
            format!("alpha = {}", scene.alpha),
            format!("overlap = {}", scene.overlap),
            format!("container_top = {}", scene.container_top),
            format!("container_height = {}", scene.container_height),
            format!("footer_height = {}", scene.footer_height),
            format!("policy = {}", scene.policy.label()),
            format!("loop_clips = {}", scene.loop_clips),
            format!("clip_seconds = {}", scene.clip_seconds),
            format!("require_gesture = {}", scene.require_gesture),
            format!("wheel_rows = {}", self.wheel_rows),
            String::new(),
            "# Key bindings".to_string(),
            "# Format: action = Key1, Key2, ...".to_string(),
            "# Modifiers: Ctrl+, Alt+, Shift+ (prefix)".to_string(),
            String::new(),
        ];

        for &action in Action::ALL {
            if let Some(binds) = self.bindings.get(&action) {
                let keys: Vec<String> = binds.iter().map(|b| b.to_config_string()).collect();
                lines.push(format!("{} = {}", action.config_key(), keys.join(", ")));
            }
        }

        for spec in &scene.segments {
            lines.push(String::new());
            lines.push("[segment]".to_string());
            lines.push(format!("url = {}", spec.url));
            if let Some(fb) = &spec.fallback {
                lines.push(format!("fallback = {fb}"));
            }
            if let Some(v) = spec.start {
                lines.push(format!("start = {v}"));
            }
            if let Some(v) = spec.end {
                lines.push(format!("end = {v}"));
            }
            if let Some(v) = spec.overlap {
                lines.push(format!("overlap = {v}"));
            }
        }
        lines.push(String::new());
        lines.join("\n")
    }
}

/// Return the config file path (`$XDG_CONFIG_HOME/scroll-fade/config.toml`).
pub fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
    config_dir.join("scroll-fade").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;

    fn parse(s: &str) -> Result<AppConfig, ConfigFileError> {
        AppConfig::parse(s, Path::new("test.toml"))
    }

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        let mut ev = KeyEvent::new(code, modifiers);
        ev.kind = KeyEventKind::Press;
        ev
    }

    #[test]
    fn defaults_build_three_valid_segments() {
        let segs = SceneConfig::default().build_segments().unwrap();
        assert_eq!(segs.len(), 3);
        assert_eq!(segs[1].source().fallback.as_deref(), Some("https://example.com/media/tourism.webm"));
        assert!((segs[2].window_start() - 0.66).abs() < 1e-9);
    }

    #[test]
    fn parses_scene_and_segments() {
        let cfg = parse(
            "# demo\n\
             smoothing = false\n\
             alpha = 0.2\n\
             container_height = 300vh\n\
             policy = normalized\n\
             [segment]\n\
             url = https://example.com/a.mp4\n\
             start = 0\n\
             end = 0.6\n\
             overlap = 0.1\n\
             [segment]\n\
             url = https://example.com/b.mp4\n\
             fallback = https://example.com/b.webm\n\
             start = 0.5\n\
             end = 1\n",
        )
        .unwrap();
        let scene = &cfg.scene;
        assert!(!scene.smoothing);
        assert_eq!(scene.smoothing_alpha(), None);
        assert_eq!(scene.alpha, 0.2);
        assert_eq!(scene.container_height, Length::Vh(300.0));
        assert_eq!(scene.policy, BlendPolicy::Normalized);
        assert_eq!(scene.segments.len(), 2);

        let segs = scene.build_segments().unwrap();
        assert_eq!(segs[0].overlap(), 0.1);
        assert_eq!(segs[1].overlap(), 0.08);
        assert_eq!(segs[1].source().fallback.as_deref(), Some("https://example.com/b.webm"));
    }

    #[test]
    fn invalid_window_is_rejected_before_mount() {
        let cfg = parse("[segment]\nurl = a.mp4\nstart = 0.7\nend = 0.2\n").unwrap();
        let err = cfg.scene.build_segments().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidWindow { index: 0, .. }));
    }

    #[test]
    fn malformed_values_report_their_line() {
        let err = parse("smoothing = true\nalpha = fast\n").unwrap_err();
        match err {
            ConfigFileError::Syntax { line, message, .. } => {
                assert_eq!(line, 2);
                assert!(message.contains("alpha"), "{message}");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(parse("container_height = tall\n").is_err());
        assert!(parse("[segment]\nurl = a.mp4\nspeed = 2\n").is_err());
        assert!(parse("[segment]\nstart = 0\n").is_err());
    }

    #[test]
    fn bad_wheel_rows_and_missing_url_name_their_line() {
        let line_of = |text: &str| match parse(text).unwrap_err() {
            ConfigFileError::Syntax { line, message, .. } => (line, message),
            other => panic!("unexpected {other:?}"),
        };

        let (line, message) = line_of("smoothing = true\nwheel_rows = lots\n");
        assert_eq!(line, 2);
        assert!(message.contains("wheel_rows"), "{message}");

        let (line, message) =
            line_of("[segment]\nurl = a.mp4\n\n[segment]\nstart = 0.5\nend = 1\n");
        assert_eq!(line, 4);
        assert!(message.contains("segment 1"), "{message}");

        assert_eq!(parse("wheel_rows = 0\n").unwrap().wheel_rows, 1);
    }

    #[test]
    fn round_trips_through_text() {
        let mut cfg = AppConfig::with_defaults(PathBuf::from("x.toml"));
        cfg.scene.smoothing = false;
        cfg.scene.container_height = Length::Px(2400.0);
        cfg.add_binding(Action::Quit, KeyBind::new(KeyCode::Char('x'), KeyModifiers::CONTROL));

        let back = parse(&cfg.serialise()).unwrap();
        assert_eq!(back.scene, cfg.scene);
        assert_eq!(back.bindings, cfg.bindings);
    }

    #[test]
    fn match_key_prefers_more_modifiers() {
        let mut cfg = AppConfig::with_defaults(PathBuf::from("x.toml"));
        cfg.add_binding(Action::JumpBottom, KeyBind::new(KeyCode::Down, KeyModifiers::ALT));
        assert_eq!(cfg.match_key(key(KeyCode::Down, KeyModifiers::NONE)), Some(Action::ScrollDown));
        assert_eq!(cfg.match_key(key(KeyCode::Down, KeyModifiers::ALT)), Some(Action::JumpBottom));
        assert_eq!(cfg.match_key(key(KeyCode::Char('z'), KeyModifiers::NONE)), None);
    }

    #[test]
    fn add_binding_steals_the_key() {
        let mut cfg = AppConfig::with_defaults(PathBuf::from("x.toml"));
        cfg.add_binding(Action::Quit, KeyBind::new(KeyCode::Char('j'), KeyModifiers::NONE));
        assert_eq!(cfg.display_bindings(Action::ScrollDown), "↓");
        assert_eq!(cfg.display_bindings(Action::Quit), "q/j");
    }

    #[test]
    fn key_strings_parse() {
        assert_eq!(
            KeyBind::parse("Shift+PageDown"),
            Some(KeyBind::new(KeyCode::PageDown, KeyModifiers::SHIFT))
        );
        assert_eq!(KeyBind::parse("pgdn"), Some(KeyBind::new(KeyCode::PageDown, KeyModifiers::NONE)));
        assert_eq!(KeyBind::parse("F5"), Some(KeyBind::new(KeyCode::F(5), KeyModifiers::NONE)));
        assert_eq!(KeyBind::parse("Space"), Some(KeyBind::new(KeyCode::Char(' '), KeyModifiers::NONE)));
        assert_eq!(KeyBind::parse("Hyper+x"), None);
        assert_eq!(KeyBind::parse("xy"), None);
    }
}
