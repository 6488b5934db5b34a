//! "Waiting for a gesture" indicator: a spinner + hint drawn on the stage's
//! top row while autoplay is blocked.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Frames per spinner step at ~60 fps.
const FRAMES_PER_STEP: u64 = 6;

pub struct GestureIndicator {
    pub visible: bool,
    /// Frame counter driving the spinner.
    pub tick: u64,
}

impl Widget for GestureIndicator {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let label_frame = SPINNER_FRAMES[((self.tick / FRAMES_PER_STEP) as usize) % SPINNER_FRAMES.len()];
        let label = format!(" {label_frame} press a key or click to play ");
        let width = label.chars().count() as u16;
        if !self.visible || area.width < width + 2 || area.height == 0 {
            return;
        }

        let x = area.x + area.width.saturating_sub(width + 1);
        let line = Line::from(Span::styled(
            label,
            Style::default()
                .fg(Color::Yellow)
                .bg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ));
        buf.set_line(x, area.y, &line, width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn hidden_when_not_blocked() {
        let area = Rect::new(0, 0, 60, 2);
        let mut buf = Buffer::empty(area);
        GestureIndicator { visible: false, tick: 0 }.render(area, &mut buf);
        assert_eq!(row(&buf, 0).trim(), "");
    }

    #[test]
    fn spinner_advances_with_ticks() {
        let area = Rect::new(0, 0, 60, 2);
        let mut a = Buffer::empty(area);
        let mut b = Buffer::empty(area);
        GestureIndicator { visible: true, tick: 0 }.render(area, &mut a);
        GestureIndicator { visible: true, tick: FRAMES_PER_STEP }.render(area, &mut b);
        assert!(row(&a, 0).contains("⠋ press a key"));
        assert!(row(&b, 0).contains("⠙ press a key"));
    }
}
