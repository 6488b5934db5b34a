//! The stage: the visible slice of the document.
//!
//! Rows inside the scroll container are painted with the segments' colours
//! mixed by their weights (earlier segments first, opacity adds up).  Rows
//! above and below are the plain page.  A caption names the dominant
//! segment and shows its playhead.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::app::clip::SimulatedClip;
use crate::app::state::ROW_PX;
use crate::core::blend::BlendFrame;
use crate::core::playback::{MediaHandle, SegmentRuntime};

use super::theme::{segment_rgb, Theme};

/// Additive mix of every segment colour at its weight, clamped per channel.
pub fn mix(frame: &BlendFrame) -> (u8, u8, u8) {
    let mut acc = [0.0f64; 3];
    for w in &frame.weights {
        let (r, g, b) = segment_rgb(w.index);
        let weight = w.weight.clamp(0.0, 1.0);
        acc[0] += f64::from(r) * weight;
        acc[1] += f64::from(g) * weight;
        acc[2] += f64::from(b) * weight;
    }
    let ch = |v: f64| v.round().clamp(0.0, 255.0) as u8;
    (ch(acc[0]), ch(acc[1]), ch(acc[2]))
}

/// Last path component of a media locator, without query or fragment.
pub fn clip_name(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/').find(|s| !s.is_empty()).unwrap_or(path)
}

pub struct StageWidget<'a> {
    pub frame: &'a BlendFrame,
    pub clips: &'a [SimulatedClip],
    pub runtimes: &'a [SegmentRuntime],
    /// Document scroll offset in pixels.
    pub scroll_y: f64,
    /// Container top and bottom in document pixels.
    pub container: (f64, f64),
    pub document_height: f64,
    pub mounted: bool,
}

impl StageWidget<'_> {
    fn doc_px(&self, row: u16) -> f64 {
        self.scroll_y + (f64::from(row) + 0.5) * ROW_PX
    }

    fn in_container(&self, px: f64) -> bool {
        px >= self.container.0 && px < self.container.1
    }

    /// Row whose pixel band contains `px`, if it is on screen.
    fn row_of(&self, px: f64, height: u16) -> Option<u16> {
        let row = ((px - self.scroll_y) / ROW_PX).floor();
        (row >= 0.0 && row < f64::from(height)).then_some(row as u16)
    }

    fn caption(&self) -> Option<(Line<'static>, Line<'static>)> {
        let index = self.frame.dominant()?;
        let clip = self.clips.get(index)?;
        let rt = self.runtimes.get(index).copied().unwrap_or_default();

        let mut title = vec![Span::styled(
            format!(" {}/{} {} ", index + 1, self.clips.len(), clip_name(clip.source())),
            Theme::caption_style(),
        )];
        if rt.using_fallback {
            title.push(Span::styled(" fallback ", Theme::dim_style()));
        }
        title.push(Span::styled(format!(" {} ", rt.phase.label()), Theme::dim_style()));

        const BAR: usize = 24;
        let filled = if clip.duration() > 0.0 {
            ((clip.position() / clip.duration()) * BAR as f64).round() as usize
        } else {
            0
        };
        let filled = filled.min(BAR);
        let bar = format!(
            " {}{} {} / {} ",
            "━".repeat(filled),
            "─".repeat(BAR - filled),
            timestamp(clip.position()),
            timestamp(clip.duration()),
        );
        let playhead = Line::from(Span::styled(bar, Theme::caption_style()));
        Some((Line::from(title), playhead))
    }
}

fn timestamp(secs: f64) -> String {
    let total = (secs.max(0.0) * 10.0).round() as u64;
    format!("{:02}:{:02}.{}", total / 600, (total / 10) % 60, total % 10)
}

impl Widget for StageWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let (r, g, b) = mix(self.frame);
        let media = Style::default().bg(Color::Rgb(r, g, b));
        let mut container_rows = Vec::new();

        for row in 0..area.height {
            let px = self.doc_px(row);
            let y = area.y + row;
            if self.in_container(px) {
                container_rows.push(row);
                let style = if self.mounted { media } else { Theme::dim_style() };
                let fill = if self.mounted { " " } else { "·" };
                for x in area.x..area.x + area.width {
                    buf[(x, y)].set_symbol(fill).set_style(style);
                }
            } else {
                buf.set_style(Rect::new(area.x, y, area.width, 1), Theme::page_style());
            }
        }

        // Page copy centred in the hero and footer bands.
        let hero_mid = self.container.0 / 2.0;
        let footer_mid = (self.container.1 + self.document_height) / 2.0;
        for (px, text) in [(hero_mid, "scroll down"), (footer_mid, "end of page")] {
            if let Some(row) = self.row_of(px, area.height) {
                if !self.in_container(self.doc_px(row)) {
                    let line = Line::from(Span::styled(text, Theme::page_style()));
                    centre_line(buf, area, area.y + row, &line);
                }
            }
        }

        if container_rows.is_empty() {
            return;
        }
        let mid = container_rows[container_rows.len() / 2];
        if !self.mounted {
            let line = Line::from(Span::styled(" container unmounted ", Theme::caption_style()));
            centre_line(buf, area, area.y + mid, &line);
            return;
        }
        if let Some((title, playhead)) = self.caption() {
            centre_line(buf, area, area.y + mid, &title);
            if container_rows.contains(&(mid + 1)) {
                centre_line(buf, area, area.y + mid + 1, &playhead);
            }
        }
    }
}

fn centre_line(buf: &mut Buffer, area: Rect, y: u16, line: &Line<'_>) {
    let width = (line.width() as u16).min(area.width);
    let x = area.x + (area.width - width) / 2;
    buf.set_line(x, y, line, width);
}
