//! Input handling: maps key/mouse events to state mutations.

use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::config::{Action, KeyBind};
use crate::ui::layout::AppLayout;

use super::runtime;
use super::settings::{SettingsItem, SETTINGS_ITEMS};
use super::state::{ActiveView, AppState};

/// Total selectable rows in the controls submenu (actions + "Reset").
pub fn controls_item_count() -> usize {
    Action::ALL.len() + 1
}

/// Process a key event, dispatching based on the active view.
pub fn handle_key(state: &mut AppState, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return;
    }
    if key.kind == KeyEventKind::Press {
        runtime::user_gesture(state);
    }

    match state.active_view {
        ActiveView::Stage => handle_stage_key(state, key),
        ActiveView::SettingsMenu => handle_settings_key(state, key),
        ActiveView::ControlsSubmenu => {
            if state.awaiting_rebind {
                handle_rebind_key(state, key);
            } else {
                handle_controls_key(state, key);
            }
        }
    }
}

// ── Stage (configurable bindings) ───────────────────────────────

fn handle_stage_key(state: &mut AppState, key: KeyEvent) {
    let Some(action) = state.config.match_key(key) else {
        return;
    };
    state.status_message = None;

    match action {
        Action::Quit => state.should_quit = true,
        Action::OpenSettings => {
            state.active_view = ActiveView::SettingsMenu;
            state.settings_selected = 0;
        }
        Action::ScrollUp => runtime::scroll_rows(state, -1),
        Action::ScrollDown => runtime::scroll_rows(state, 1),
        Action::PageUp => runtime::scroll_rows(state, -i32::from(page_step(state))),
        Action::PageDown => runtime::scroll_rows(state, i32::from(page_step(state))),
        Action::JumpTop => runtime::scroll_to_top(state),
        Action::JumpBottom => runtime::scroll_to_bottom(state),
        Action::ToggleSmoothing => {
            let on = !state.config.scene.smoothing;
            runtime::set_smoothing(state, on);
            state.status_message = Some(if on {
                format!("Smoothing on (alpha {:.2})", state.config.scene.alpha)
            } else {
                "Smoothing off".to_string()
            });
        }
        Action::ToggleMount => {
            let mounted = runtime::toggle_mount(state);
            state.status_message = Some(if mounted {
                "Container mounted".to_string()
            } else {
                "Container unmounted".to_string()
            });
        }
        Action::RetryMedia => {
            runtime::retry_media(state);
            state.status_message = Some("Reloading failed media".to_string());
        }
    }
}

/// Keyboard paging moves most of a screen, keeping a row of context.
fn page_step(state: &AppState) -> u16 {
    state.page_rows.saturating_sub(1).max(1)
}

// ── Settings menu (hardcoded keys) ──────────────────────────────

fn handle_settings_key(state: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            state.active_view = ActiveView::Stage;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.settings_selected = state.settings_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if state.settings_selected + 1 < SETTINGS_ITEMS.len() {
                state.settings_selected += 1;
            }
        }
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => {
            match SETTINGS_ITEMS.get(state.settings_selected) {
                Some(SettingsItem::Submenu { view, .. }) => {
                    state.active_view = *view;
                    state.controls_selected = 0;
                }
                Some(SettingsItem::Toggle { get, set, .. }) => {
                    let current = get(state);
                    set(state, !current);
                }
                Some(SettingsItem::Cycle { cycle, .. }) => cycle(state),
                None => {}
            }
        }
        _ => {}
    }
}

// ── Controls submenu (interactive rebinding) ────────────────────

fn handle_controls_key(state: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => {
            state.active_view = ActiveView::Stage;
        }
        KeyCode::Left | KeyCode::Char('h') => {
            state.active_view = ActiveView::SettingsMenu;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.controls_selected = state.controls_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if state.controls_selected + 1 < controls_item_count() {
                state.controls_selected += 1;
            }
        }
        KeyCode::Enter => {
            if state.controls_selected < Action::ALL.len() {
                state.awaiting_rebind = true;
            } else {
                state.config.reset_defaults();
                runtime::save_config(state);
            }
        }
        KeyCode::Delete | KeyCode::Backspace => {
            if let Some(&action) = Action::ALL.get(state.controls_selected) {
                state.config.bindings.insert(action, Vec::new());
                runtime::save_config(state);
            }
        }
        _ => {}
    }
}

/// Capture the next key press as a new binding.
fn handle_rebind_key(state: &mut AppState, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    if key.code == KeyCode::Esc {
        state.awaiting_rebind = false;
        return;
    }
    // Ctrl+C stays reserved for quitting.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return;
    }

    if let Some(&action) = Action::ALL.get(state.controls_selected) {
        state.config.add_binding(action, KeyBind::from_key_event(key));
        runtime::save_config(state);
    }
    state.awaiting_rebind = false;
}

// ── Mouse ───────────────────────────────────────────────────────

pub fn handle_mouse(state: &mut AppState, mouse: MouseEvent) {
    if matches!(mouse.kind, MouseEventKind::Down(_)) {
        runtime::user_gesture(state);
    }
    if state.active_view != ActiveView::Stage {
        return;
    }

    let rows = i32::from(state.config.wheel_rows);
    match mouse.kind {
        MouseEventKind::ScrollUp => runtime::scroll_rows(state, -rows),
        MouseEventKind::ScrollDown => runtime::scroll_rows(state, rows),
        MouseEventKind::Down(MouseButton::Left) | MouseEventKind::Drag(MouseButton::Left) => {
            let layout = AppLayout::from_area(state.terminal_area);
            if let Some(ratio) = layout.minimap_ratio(mouse.column, mouse.row) {
                let y = ratio * state.viewport.max_scroll();
                state.viewport.scroll_to(y);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::runtime::step;
    use crate::config::AppConfig;
    use crate::core::host::ScrollHost;
    use crossterm::event::KeyEventState;
    use std::path::PathBuf;

    fn state() -> AppState {
        let mut config = AppConfig::with_defaults(PathBuf::from("unused.toml"));
        config.scene.smoothing = false;
        AppState::new(config, 10).unwrap()
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn wheel(kind: MouseEventKind) -> MouseEvent {
        MouseEvent {
            kind,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn first_key_press_unlocks_autoplay() {
        let mut s = state();
        step(&mut s, 0.016);
        assert!(!s.clips[0].is_playing());

        handle_key(&mut s, press(KeyCode::Char('x')));
        assert!(s.autoplay_unlocked);
        assert!(s.clips[0].is_playing());
    }

    #[test]
    fn wheel_scrolls_by_configured_rows() {
        let mut s = state();
        s.config.wheel_rows = 2;
        handle_mouse(&mut s, wheel(MouseEventKind::ScrollDown));
        assert_eq!(s.viewport.scroll_y(), 32.0);
        handle_mouse(&mut s, wheel(MouseEventKind::ScrollUp));
        assert_eq!(s.viewport.scroll_y(), 0.0);
    }

    #[test]
    fn bound_keys_drive_the_stage() {
        let mut s = state();
        handle_key(&mut s, press(KeyCode::End));
        assert_eq!(s.viewport.scroll_y(), s.viewport.max_scroll());
        handle_key(&mut s, press(KeyCode::Home));
        assert_eq!(s.viewport.scroll_y(), 0.0);

        handle_key(&mut s, press(KeyCode::Char('m')));
        assert!(!s.tracker.is_mounted());
        assert_eq!(s.status_message.as_deref(), Some("Container unmounted"));
    }

    #[test]
    fn settings_menu_navigation_wraps_to_stage() {
        let mut s = state();
        s.active_view = ActiveView::SettingsMenu;
        handle_key(&mut s, press(KeyCode::Down));
        handle_key(&mut s, press(KeyCode::Up));
        handle_key(&mut s, press(KeyCode::Up));
        assert_eq!(s.settings_selected, 0);
        handle_key(&mut s, press(KeyCode::Enter));
        assert_eq!(s.active_view, ActiveView::ControlsSubmenu);
        handle_key(&mut s, press(KeyCode::Left));
        assert_eq!(s.active_view, ActiveView::SettingsMenu);
        handle_key(&mut s, press(KeyCode::Esc));
        assert_eq!(s.active_view, ActiveView::Stage);
    }

    #[test]
    fn rebinding_can_be_cancelled() {
        let mut s = state();
        s.active_view = ActiveView::ControlsSubmenu;
        handle_key(&mut s, press(KeyCode::Enter));
        assert!(s.awaiting_rebind);
        handle_key(&mut s, press(KeyCode::Esc));
        assert!(!s.awaiting_rebind);
        assert_eq!(s.active_view, ActiveView::ControlsSubmenu);
    }
}
