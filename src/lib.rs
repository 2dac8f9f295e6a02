//! Anakata - 4D polytope viewer
//!
//! The application layer on top of the kernel crates: layered
//! configuration and the [`HyperView`] session that drives rotation,
//! slicing and per-channel buffer derivation frame by frame.

pub mod config;
pub mod view;

pub use config::{AppConfig, ConfigError};
pub use view::{DirtyFlags, Frame, HyperView};
