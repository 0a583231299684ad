// src/config/mod.rs

//! Configuration loading and validation for ogwatch.
//!
//! Responsibilities:
//! - Define the optional TOML file model and the frozen `WatchConfig` (`model.rs`).
//! - Merge CLI flags with the config file (`loader.rs`).
//! - Validate root, debounce window and backend availability (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_from_path, load_setup, WatchSetup};
pub use model::{ConfigFile, WatchConfig, WatchOptions, WatchSection, DEFAULT_DEBOUNCE};
