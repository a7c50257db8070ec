//! Chest Rush library crate.
//!
//! The binary crate (`main.rs`) opens the window and adds the HUD.
//! Everything else lives here so that `tests/` integration tests and an
//! embedding host can drive a session without a window or GPU.

pub mod shared;
pub mod data;
pub mod actor;
pub mod chests;
pub mod autoplay;
pub mod input;
pub mod bridge;
pub mod session;
pub mod ui;
