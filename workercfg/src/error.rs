//! Error types for the workercfg library.
//!
//! The validation core itself never fails: problems with a configuration
//! document are reported through [`crate::diagnostics::Diagnostics`]. This
//! module covers everything around the core that can genuinely fail, such as
//! locating, reading and parsing a document.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for operations that may fail with a workercfg error.
///
/// # Examples
///
/// ```
/// use workercfg::{Error, Result};
///
/// fn example_operation() -> Result<u16> {
///     Ok(8787)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the workercfg library.
#[derive(Debug, Error)]
pub enum Error {
    /// An invalid filesystem path was provided.
    #[error("invalid path {}: {reason}", path.display())]
    InvalidPath {
        /// The invalid path.
        path: PathBuf,
        /// The reason the path is invalid.
        reason: String,
    },

    /// No configuration document was found while searching upwards.
    #[error("no configuration file found in {} or any parent directory", start.display())]
    ConfigNotFound {
        /// Directory the search started from.
        start: PathBuf,
    },

    /// The document's extension does not map to a known encoding.
    #[error("unsupported configuration format for {}: expected .toml, .yaml, .yml or .json", path.display())]
    UnsupportedFormat {
        /// Path of the offending document.
        path: PathBuf,
    },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A TOML document could not be parsed.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A YAML document could not be parsed.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON document could not be parsed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Validation finished with at least one error.
    #[error("configuration is invalid ({errors} error(s)):\n{report}")]
    InvalidConfiguration {
        /// Number of errors found across the whole diagnostics tree.
        errors: usize,
        /// Rendered error report.
        report: String,
    },
}

impl Error {
    /// Check if error indicates that no configuration document exists.
    ///
    /// # Examples
    ///
    /// ```
    /// use workercfg::Error;
    /// use std::path::PathBuf;
    ///
    /// let err = Error::ConfigNotFound { start: PathBuf::from("/project") };
    /// assert!(err.is_not_found());
    /// ```
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ConfigNotFound { .. })
    }

    /// Check if error comes from decoding the document's text.
    #[must_use]
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::Toml(_) | Self::Yaml(_) | Self::Json(_))
    }
}
