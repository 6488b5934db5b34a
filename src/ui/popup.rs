//! Popup overlay widgets for the settings menu and controls submenu.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget},
};

use crate::app::settings::{SettingsItem, SETTINGS_ITEMS};
use crate::app::state::AppState;
use crate::config::{Action, AppConfig};

// ───────────────────────────────────────── settings popup ────

pub struct SettingsPopup<'a> {
    pub state: &'a AppState,
    pub selected: usize,
}

impl Widget for SettingsPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let height = (SETTINGS_ITEMS.len() as u16) + 6;
        let popup = centered_fixed(44, height, area);
        Clear.render(popup, buf);

        let block = titled_block(" Settings ");
        let inner = block.inner(popup);
        block.render(popup, buf);

        let mut lines = vec![Line::raw("")];
        for (i, item) in SETTINGS_ITEMS.iter().enumerate() {
            let (prefix, style) = if i == self.selected {
                (" ▸ ", selected_style())
            } else {
                ("   ", Style::default().fg(Color::White))
            };

            let value = match item {
                SettingsItem::Submenu { .. } => None,
                SettingsItem::Toggle { get, .. } => {
                    let on = get(self.state);
                    let style = if on {
                        Style::default().fg(Color::Green)
                    } else {
                        Style::default().fg(Color::DarkGray)
                    };
                    Some(Span::styled(if on { "  [ON]" } else { "  [OFF]" }, style))
                }
                SettingsItem::Cycle { value, .. } => Some(Span::styled(
                    format!("  {}", value(self.state)),
                    Style::default().fg(Color::Yellow),
                )),
            };

            let mut spans = vec![Span::styled(format!("{prefix}{}", item.label()), style)];
            spans.extend(value);
            lines.push(Line::from(spans));
        }
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            "  Enter/Space: change  Esc: close",
            Style::default().fg(Color::DarkGray),
        )));

        Paragraph::new(lines).render(inner, buf);
    }
}

// ───────────────────────────────────────── controls popup ────

/// Keybinding popup with interactive rebinding.
pub struct ControlsPopup<'a> {
    pub config: &'a AppConfig,
    pub selected: usize,
    pub awaiting_rebind: bool,
}

impl Widget for ControlsPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let height = (Action::ALL.len() as u16) + 7;
        let popup = centered_fixed(52, height, area);
        Clear.render(popup, buf);

        let block = titled_block(" Controls ");
        let inner = block.inner(popup);
        block.render(popup, buf);

        let mut lines = vec![Line::raw("")];
        for (i, &action) in Action::ALL.iter().enumerate() {
            let is_selected = i == self.selected;
            let rebinding = is_selected && self.awaiting_rebind;

            let keys = if rebinding {
                "Press a key…".to_string()
            } else {
                self.config.display_bindings(action)
            };
            let (label_style, key_style) = if is_selected {
                let keys = Style::default().fg(Color::Yellow).bg(Color::DarkGray);
                let keys = if rebinding { keys.add_modifier(Modifier::BOLD) } else { keys };
                (selected_style(), keys)
            } else {
                (Style::default().fg(Color::White), Style::default().fg(Color::Yellow))
            };

            let prefix = if is_selected { " ▸ " } else { "   " };
            let label_col = format!("{prefix}{:<22}", action.label());
            let keys_width = (inner.width as usize)
                .saturating_sub(label_col.chars().count())
                .max(1);
            lines.push(Line::from(vec![
                Span::styled(label_col, label_style),
                Span::styled(format!("{keys:>keys_width$}"), key_style),
            ]));
        }

        let reset_selected = self.selected == Action::ALL.len();
        let (prefix, style) = if reset_selected {
            (" ▸ ", selected_style())
        } else {
            ("   ", Style::default().fg(Color::White))
        };
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(format!("{prefix}⟳ Reset to defaults"), style)));

        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            "  Enter: add key  Del: clear  Esc: back",
            Style::default().fg(Color::DarkGray),
        )));

        Paragraph::new(lines).render(inner, buf);
    }
}

// ───────────────────────────────────────── helpers ───────────

fn titled_block(title: &'static str) -> Block<'static> {
    Block::default()
        .title(title)
        .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray))
}

fn selected_style() -> Style {
    Style::default()
        .fg(Color::White)
        .bg(Color::DarkGray)
        .add_modifier(Modifier::BOLD)
}

/// Centered rectangle with fixed dimensions, clamped to `area`.
fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    Rect::new(x, y, w, h)
}
