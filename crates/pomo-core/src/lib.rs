//! pomo-core - Shared functionality for the pomo tools
//!
//! Standard locations, the JSON config file, and the small formatting
//! helpers used when printing timers.

pub mod config;
pub mod format;
pub mod paths;

pub use config::Config;
pub use paths::Paths;
