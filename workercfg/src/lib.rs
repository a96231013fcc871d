#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # workercfg
//!
//! A library for validating and normalizing multi-environment worker
//! deployment configurations.
//!
//! A hand-written document is checked field by field, named environments
//! are resolved against the top-level defaults, and the result is one
//! strictly typed configuration plus a report of every error and warning
//! found along the way. Validation never stops at the first problem.
//!
//! ## Core Types
//!
//! - [`Config`] and [`Environment`]: The normalized configuration
//! - [`Diagnostics`]: Nested error and warning report
//! - [`NormalizedConfig`]: A configuration together with its report
//! - [`PathContext`]: Working and document directories for path resolution
//! - [`Error`] and [`Result`]: Error handling types
//! - [`Logger`] and [`LogLevel`]: Logging infrastructure
//!
//! ## Examples
//!
//! ```
//! use serde_json::json;
//! use workercfg::{normalize_and_validate_config, PathContext};
//!
//! let raw = json!({
//!     "name": "my-worker",
//!     "compatibility_flags": ["nodejs_compat"],
//!     "env": { "staging": { "vars": { "MODE": "staging" } } }
//! });
//! let ctx = PathContext::new("/project", None);
//! let result = normalize_and_validate_config(&raw, None, Some("staging"), &ctx);
//!
//! assert!(!result.diagnostics.has_errors());
//! let config = result.into_result().unwrap();
//! assert_eq!(config.environment.compatibility_flags, vec!["nodejs_compat"]);
//! assert_eq!(config.environment.vars["MODE"], "staging");
//! ```

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod logging;
pub mod path;

// Re-export key types at crate root for convenience
pub use config::{
    normalize_and_validate_config, Config, ConfigLoader, Environment, NormalizedConfig,
};
pub use diagnostics::Diagnostics;
pub use error::{Error, Result};
pub use logging::{init_logger, LogLevel, Logger};
pub use path::PathContext;
