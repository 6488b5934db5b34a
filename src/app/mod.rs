//! Application orchestration: the simulated page, state, the frame runtime,
//! and input handling.

pub mod clip;
pub mod event;
pub mod handler;
pub mod runtime;
pub mod settings;
pub mod state;
pub mod viewport;
