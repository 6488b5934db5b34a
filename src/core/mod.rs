//! Core engine – scroll progress, segment windows, weight blending, and the
//! playback adapter.
//!
//! Nothing in this module depends on any TUI or rendering crate.  The host
//! is reached only through the [`host::ScrollHost`] and
//! [`playback::MediaHandle`] traits.

pub mod blend;
pub mod host;
pub mod playback;
pub mod segment;
pub mod tracker;
