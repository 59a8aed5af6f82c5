//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events
//! - The headless test harness (web)
//! - Storage (LocalStorage on web)

pub mod input;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use input::{HostIntent, InputState};
