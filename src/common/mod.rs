//! # Common Components
//!
//! Ambient pieces shared by the library and the binary.
//!
//! ## Modules
//!
//! - [`config`]: TOML configuration for the codec and output naming
//! - [`metrics`]: per-run timing and size report, exportable as JSON

pub mod config;
pub mod metrics;
