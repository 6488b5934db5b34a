//! Vertical strip showing the whole document: page, container, and where
//! the viewport currently sits.  Clicking it jumps there.

use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

use super::theme::Theme;

pub struct Minimap {
    pub scroll_y: f64,
    pub viewport_height: f64,
    pub document_height: f64,
    /// Container top and bottom in document pixels.
    pub container: (f64, f64),
}

impl Minimap {
    fn overlaps(lo: f64, hi: f64, a: f64, b: f64) -> bool {
        lo < b && hi > a
    }
}

impl Widget for Minimap {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 || self.document_height <= 0.0 {
            return;
        }
        let x = area.x + area.width / 2;
        let band = self.document_height / f64::from(area.height);
        let view = (self.scroll_y, self.scroll_y + self.viewport_height);

        for row in 0..area.height {
            let lo = f64::from(row) * band;
            let hi = lo + band;
            let (symbol, style) = if Self::overlaps(lo, hi, view.0, view.1) {
                ("█", Theme::viewport_marker_style())
            } else if Self::overlaps(lo, hi, self.container.0, self.container.1) {
                ("┃", Theme::border_style())
            } else {
                ("╎", Theme::dim_style())
            };
            buf[(x, area.y + row)].set_symbol(symbol).set_style(style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(buf: &Buffer, x: u16) -> String {
        (0..buf.area.height)
            .map(|y| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn marks_viewport_and_container() {
        let area = Rect::new(0, 0, 3, 10);
        let mut buf = Buffer::empty(area);
        Minimap {
            scroll_y: 0.0,
            viewport_height: 100.0,
            document_height: 1000.0,
            container: (200.0, 800.0),
        }
        .render(area, &mut buf);
        assert_eq!(column(&buf, 1), "█╎┃┃┃┃┃┃╎╎");
        assert_eq!(column(&buf, 0), "          ");
    }

    #[test]
    fn viewport_marker_follows_scroll() {
        let area = Rect::new(0, 0, 3, 10);
        let mut buf = Buffer::empty(area);
        Minimap {
            scroll_y: 900.0,
            viewport_height: 100.0,
            document_height: 1000.0,
            container: (200.0, 800.0),
        }
        .render(area, &mut buf);
        assert!(column(&buf, 1).ends_with("╎█"));
    }
}
