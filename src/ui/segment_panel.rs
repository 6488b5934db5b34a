//! Side panel listing every segment with its window, phase, play state and
//! current weight.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::core::playback::SegmentRuntime;
use crate::core::segment::Segment;

use super::stage::clip_name;
use super::theme::Theme;

pub struct SegmentPanel<'a> {
    pub segments: &'a [Segment],
    pub runtimes: &'a [SegmentRuntime],
}

fn state_glyph(rt: &SegmentRuntime) -> (&'static str, &'static str) {
    if rt.failed {
        ("✗", "failed")
    } else if rt.playing && rt.blocked {
        ("…", "blocked")
    } else if rt.playing {
        ("▶", "playing")
    } else {
        ("■", "paused")
    }
}

/// `width` cells of bar, `weight` of them filled.
fn weight_bar(weight: f64, width: usize) -> String {
    let filled = ((weight.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

impl Widget for SegmentPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 4 || area.height < 3 {
            return;
        }
        let block = Block::default()
            .title(" Segments ")
            .title_style(Theme::title_style())
            .borders(Borders::ALL)
            .border_style(Theme::border_style());
        let inner = block.inner(area);
        block.render(area, buf);

        let bar_width = (inner.width as usize).saturating_sub(8).max(1);
        let mut lines = Vec::new();
        for (i, seg) in self.segments.iter().enumerate() {
            let rt = self.runtimes.get(i).copied().unwrap_or_default();
            let (glyph, state) = state_glyph(&rt);
            let name_style = if rt.failed {
                Theme::failed_style()
            } else {
                Theme::segment_style(i)
            };

            let mut head = vec![
                Span::styled(format!("{glyph} {} ", i + 1), name_style),
                Span::styled(clip_name(&seg.source().url).to_string(), name_style),
            ];
            if rt.using_fallback {
                head.push(Span::styled(" (fallback)", Theme::dim_style()));
            }
            head.push(Span::styled(format!(" · {state}"), Theme::dim_style()));
            lines.push(Line::from(head));
            lines.push(Line::from(Span::styled(
                format!(
                    "  {:.2}-{:.2} ov {:.2} {}",
                    seg.window_start(),
                    seg.window_end(),
                    seg.overlap(),
                    rt.phase.label(),
                ),
                Theme::dim_style(),
            )));
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(weight_bar(rt.weight, bar_width), name_style),
                Span::styled(format!(" {:.2}", rt.weight), Theme::dim_style()),
            ]));
        }

        Paragraph::new(lines).render(inner, buf);
    }
}
