//! Layout helpers: split the terminal area into regions.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

const MINIMAP_WIDTH: u16 = 3;
const PANEL_WIDTH: u16 = 36;
/// Below this width the segment panel is dropped and the stage takes it all.
const PANEL_MIN_TERMINAL_WIDTH: u16 = 72;

/// Minimap strip, stage, segment panel, and a bottom status bar.
pub struct AppLayout {
    pub minimap_area: Rect,
    pub stage_area: Rect,
    pub panel_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    pub fn from_area(area: Rect) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(area);

        let panel = if area.width >= PANEL_MIN_TERMINAL_WIDTH {
            PANEL_WIDTH
        } else {
            0
        };
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(MINIMAP_WIDTH),
                Constraint::Min(10),
                Constraint::Length(panel),
            ])
            .split(rows[0]);

        Self {
            minimap_area: cols[0],
            stage_area: cols[1],
            panel_area: cols[2],
            status_area: rows[1],
        }
    }

    /// Rows of document visible on the stage.
    pub fn page_rows(&self) -> u16 {
        self.stage_area.height.max(1)
    }

    /// Position of a click inside the minimap as a fraction of its height.
    pub fn minimap_ratio(&self, col: u16, row: u16) -> Option<f64> {
        let a = self.minimap_area;
        let inside = col >= a.x && col < a.x + a.width && row >= a.y && row < a.y + a.height;
        if !inside {
            return None;
        }
        let span = a.height.saturating_sub(1).max(1);
        Some(f64::from(row - a.y) / f64::from(span))
    }
}
