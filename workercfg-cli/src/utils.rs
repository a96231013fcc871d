//! Utility functions for CLI operations.
//!
//! Shared by every command: working directory resolution, document
//! discovery and loading.

use crate::error::CliError;
use std::env;
use std::path::{Path, PathBuf};
use workercfg::path::normalize::expand_tilde;
use workercfg::{init_logger, ConfigLoader, Logger, NormalizedConfig, PathContext};

/// Global CLI options shared across all commands.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    /// Enable verbose output.
    pub verbose: bool,

    /// Suppress non-essential output.
    pub quiet: bool,

    /// Explicit configuration document.
    pub config: Option<PathBuf>,

    /// Named environment to resolve.
    pub env_name: Option<String>,
}

impl GlobalOptions {
    /// Logger honoring `--verbose`, `--quiet` and `WORKERCFG_LOG_MODE`.
    pub fn logger(&self) -> Logger {
        init_logger(self.verbose, self.quiet)
    }
}

/// The process working directory.
pub fn current_dir() -> Result<PathBuf, CliError> {
    Ok(env::current_dir()?)
}

/// Locate the configuration document.
///
/// An explicit `--config` path has `~` expanded, is taken relative to
/// `cwd` and must exist. Otherwise the document is discovered by walking up
/// from `cwd`.
pub fn locate_config(global: &GlobalOptions, cwd: &Path) -> Result<PathBuf, CliError> {
    match &global.config {
        Some(path) => {
            let path = expand_tilde(path)?;
            let absolute = PathContext::new(cwd, None).resolve_from_cwd(&path);
            if !absolute.is_file() {
                return Err(CliError::Config(format!(
                    "configuration file not found: {}",
                    path.display()
                )));
            }
            Ok(path)
        }
        None => Ok(ConfigLoader::find_config(cwd)?),
    }
}

/// Locate, read and validate the configuration for the selected environment.
pub fn load_config(global: &GlobalOptions) -> Result<NormalizedConfig, CliError> {
    let cwd = current_dir()?;
    let path = locate_config(global, &cwd)?;
    let logger = global.logger();
    logger.debug(&format!("loading {}", path.display()));
    if let Some(name) = &global.env_name {
        logger.debug(&format!("selected environment \"{name}\""));
    }
    Ok(ConfigLoader::load(&path, global.env_name.as_deref(), &cwd)?)
}
