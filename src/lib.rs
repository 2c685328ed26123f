// ABOUTME: Main library module for the hbs-helpers Handlebars helper collection
// ABOUTME: Exports context frames, helper groups, configuration and the helper engine

pub mod config;
pub mod engine;
pub mod error;
pub mod frame;
pub mod helpers;

// Re-export commonly used types
pub use config::{EscapeMode, HelperConfig};
pub use engine::HelperEngine;
pub use error::{FrameError, HelperError, Result};
pub use frame::{create_frame, Frame};
pub use helpers::{register_groups, register_helpers, HelperGroup};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
