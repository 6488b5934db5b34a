//! Colour palette and text styles used across the UI.

use ratatui::style::{Color, Modifier, Style};

/// Segment colours, cycled by index.  The stage mixes these additively.
pub const SEGMENT_PALETTE: &[(u8, u8, u8)] = &[
    (230, 120, 40),
    (40, 170, 220),
    (200, 60, 150),
    (90, 200, 90),
    (220, 200, 60),
    (140, 100, 230),
];

pub fn segment_rgb(index: usize) -> (u8, u8, u8) {
    SEGMENT_PALETTE[index % SEGMENT_PALETTE.len()]
}

/// Central theme.
pub struct Theme;

impl Theme {
    pub fn segment_style(index: usize) -> Style {
        let (r, g, b) = segment_rgb(index);
        Style::default().fg(Color::Rgb(r, g, b))
    }

    pub fn page_style() -> Style {
        Style::default().fg(Color::Gray)
    }

    pub fn failed_style() -> Style {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    }

    pub fn dim_style() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    pub fn caption_style() -> Style {
        Style::default()
            .fg(Color::White)
            .bg(Color::Black)
            .add_modifier(Modifier::BOLD)
    }

    // ── chrome ─────────────────────────────────────────────────
    pub fn border_style() -> Style {
        Style::default().fg(Color::Gray)
    }

    pub fn title_style() -> Style {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    }

    pub fn status_bar_style() -> Style {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    }

    pub fn viewport_marker_style() -> Style {
        Style::default().fg(Color::Yellow)
    }
}
