//! UI / rendering layer: everything that touches Ratatui widgets.
//!
//! Widgets read the engine's state and draw it; none of them mutate it.

pub mod layout;
pub mod minimap;
pub mod popup;
pub mod segment_panel;
pub mod spinner;
pub mod stage;
pub mod theme;
