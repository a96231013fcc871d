//! Configuration document discovery and loading.
//!
//! This is the only part of the configuration system that touches the
//! filesystem. Documents are parsed into raw [`Value`] trees according to
//! their extension and handed to the validation core unchanged.

use crate::config::normalize::{normalize_and_validate_config, NormalizedConfig};
use crate::error::{Error, Result};
use crate::path::PathContext;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Document names searched for in each directory, in order of preference.
pub const CONFIG_FILE_NAMES: [&str; 4] = ["worker.toml", "worker.yaml", "worker.yml", "worker.json"];

/// Encodings a document can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.toml`
    Toml,
    /// `.yaml` / `.yml`
    Yaml,
    /// `.json`
    Json,
}

impl ConfigFormat {
    /// Picks the format from a path's extension.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFormat`] for any other extension.
    ///
    /// # Examples
    ///
    /// ```
    /// use workercfg::config::ConfigFormat;
    /// use std::path::Path;
    ///
    /// assert_eq!(ConfigFormat::from_path(Path::new("worker.yml")).unwrap(), ConfigFormat::Yaml);
    /// assert!(ConfigFormat::from_path(Path::new("worker.ini")).is_err());
    /// ```
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("yaml" | "yml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            _ => Err(Error::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Parses document text into a raw tree.
    ///
    /// # Errors
    ///
    /// Returns the parser's error when the text is not valid in this format.
    pub fn parse(self, contents: &str) -> Result<Value> {
        Ok(match self {
            Self::Toml => toml::from_str(contents)?,
            Self::Yaml => serde_yaml::from_str(contents)?,
            Self::Json => serde_json::from_str(contents)?,
        })
    }
}

/// Loads configuration documents.
///
/// # Examples
///
/// ```no_run
/// use workercfg::config::ConfigLoader;
/// use std::path::Path;
///
/// let cwd = Path::new("/path/to/project");
/// let path = ConfigLoader::find_config(cwd).unwrap();
/// let result = ConfigLoader::load(&path, Some("staging"), cwd).unwrap();
/// println!("{} error(s)", result.diagnostics.error_count());
/// ```
pub struct ConfigLoader;

impl ConfigLoader {
    /// Walks up from `start_dir` and returns the first document found.
    ///
    /// Within one directory `worker.toml` wins over `worker.yaml`,
    /// `worker.yml` and `worker.json`, in that order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigNotFound`] if no directory up to the root
    /// contains a document.
    pub fn find_config(start_dir: &Path) -> Result<PathBuf> {
        let mut current = start_dir.to_path_buf();
        loop {
            for name in CONFIG_FILE_NAMES {
                let candidate = current.join(name);
                if candidate.is_file() {
                    log::debug!("found configuration at {}", candidate.display());
                    return Ok(candidate);
                }
            }
            if !current.pop() {
                return Err(Error::ConfigNotFound {
                    start: start_dir.to_path_buf(),
                });
            }
        }
    }

    /// Reads and parses a document into a raw tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the extension is not supported, the file cannot
    /// be read, or its contents do not parse.
    pub fn read_config(path: &Path) -> Result<Value> {
        let format = ConfigFormat::from_path(path)?;
        let contents = fs::read_to_string(path)?;
        format.parse(&contents)
    }

    /// Reads the document at `path` and validates it for `env_name`.
    ///
    /// `cwd` is the caller's working directory; relative `path`s are taken
    /// relative to it.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read or parsed. Validation
    /// problems are reported in the returned diagnostics instead.
    pub fn load(path: &Path, env_name: Option<&str>, cwd: &Path) -> Result<NormalizedConfig> {
        let ctx = PathContext::new(cwd, Some(path));
        let absolute = ctx.resolve_from_cwd(path);
        let raw = Self::read_config(&absolute)?;
        Ok(normalize_and_validate_config(&raw, Some(path), env_name, &ctx))
    }
}
