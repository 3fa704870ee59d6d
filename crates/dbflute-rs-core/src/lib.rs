//! # dbflute-rs-core
//!
//! Error types, settings, and logging for the dbflute-rs condition-bean
//! engine. This crate has no dependency on the query builder itself.
//!
//! ## Modules
//!
//! - [`error`] - Error taxonomy and result alias
//! - [`settings`] - Engine defaults and global configuration
//! - [`settings_loader`] - TOML/JSON/environment loading
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;

// Re-export the most commonly used types at the crate root.
pub use error::{CBeanError, CBeanResult};
pub use settings::{BindStyle, CBeanSettings, SETTINGS};
