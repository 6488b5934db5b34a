//! Settings menu model (data only).
//!
//! The handler and the popup renderer both read this table.

use super::runtime;
use super::state::{ActiveView, AppState};
use crate::core::blend::BlendPolicy;

pub enum SettingsItem {
    Submenu {
        label: &'static str,
        view: ActiveView,
    },
    Toggle {
        label: &'static str,
        get: fn(&AppState) -> bool,
        set: fn(&mut AppState, bool),
    },
    Cycle {
        label: &'static str,
        value: fn(&AppState) -> String,
        cycle: fn(&mut AppState),
    },
}

impl SettingsItem {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Submenu { label, .. }
            | Self::Toggle { label, .. }
            | Self::Cycle { label, .. } => label,
        }
    }
}

const ALPHAS: &[f64] = &[0.04, 0.08, 0.12, 0.2, 0.35];
const WHEEL_ROWS: &[u16] = &[1, 2, 3, 5, 8];

/// Next entry after `current`, or the first one if `current` isn't listed.
fn next_in<T: PartialEq + Copy>(values: &[T], current: T) -> T {
    let idx = values.iter().position(|v| *v == current);
    match idx {
        Some(i) => values[(i + 1) % values.len()],
        None => values[0],
    }
}

pub static SETTINGS_ITEMS: &[SettingsItem] = &[
    SettingsItem::Submenu {
        label: "Controls",
        view: ActiveView::ControlsSubmenu,
    },
    SettingsItem::Toggle {
        label: "Smoothing",
        get: |s| s.config.scene.smoothing,
        set: |s, v| {
            runtime::set_smoothing(s, v);
            runtime::save_config(s);
        },
    },
    SettingsItem::Cycle {
        label: "Smoothing Alpha",
        value: |s| format!("{:.2}", s.config.scene.alpha),
        cycle: |s| {
            let alpha = next_in(ALPHAS, s.config.scene.alpha);
            runtime::set_alpha(s, alpha);
            runtime::save_config(s);
            s.status_message = Some(format!("Smoothing alpha: {alpha:.2}"));
        },
    },
    SettingsItem::Cycle {
        label: "Blend Policy",
        value: |s| s.config.scene.policy.label().to_string(),
        cycle: |s| {
            let policy = next_in(BlendPolicy::ALL, s.config.scene.policy);
            runtime::set_policy(s, policy);
            runtime::save_config(s);
            s.status_message = Some(format!("Blend policy: {}", policy.label()));
        },
    },
    SettingsItem::Toggle {
        label: "Loop Clips",
        get: |s| s.config.scene.loop_clips,
        set: |s, v| {
            runtime::set_loop_clips(s, v);
            runtime::save_config(s);
        },
    },
    SettingsItem::Cycle {
        label: "Wheel Step",
        value: |s| format!("{} rows", s.config.wheel_rows),
        cycle: |s| {
            s.config.wheel_rows = next_in(WHEEL_ROWS, s.config.wheel_rows);
            runtime::save_config(s);
        },
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycling_wraps_and_recovers_from_unknown_values() {
        assert_eq!(next_in(ALPHAS, 0.35), 0.04);
        assert_eq!(next_in(ALPHAS, 0.08), 0.12);
        assert_eq!(next_in(ALPHAS, 0.5), 0.04);
        assert_eq!(next_in(BlendPolicy::ALL, BlendPolicy::Trapezoid), BlendPolicy::Normalized);
    }
}
