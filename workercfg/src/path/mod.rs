//! Path handling for configuration documents.
//!
//! Paths that appear inside a configuration document are interpreted
//! relative to the document's own directory, and a few outputs are rewritten
//! relative to the working directory of the caller. Both directories are
//! injected through a [`PathContext`]; the validation core never asks the
//! process for its current directory.
//!
//! ```
//! use workercfg::path::PathContext;
//! use std::path::{Path, PathBuf};
//!
//! let ctx = PathContext::new("/work", Some(Path::new("app/worker.toml")));
//! assert_eq!(ctx.config_dir(), Path::new("/work/app"));
//! assert_eq!(ctx.resolve("src/index.js"), PathBuf::from("/work/app/src/index.js"));
//! assert_eq!(
//!     ctx.relative_to_cwd(&ctx.resolve("blob.txt")),
//!     PathBuf::from("app/blob.txt")
//! );
//! ```

pub mod normalize;

use std::path::{Path, PathBuf};

/// Working directory and document directory for one validation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathContext {
    cwd: PathBuf,
    config_dir: PathBuf,
}

impl PathContext {
    /// Builds a context from the caller's working directory and the
    /// (optional) path of the document being validated.
    ///
    /// Without a document path the document directory is the working
    /// directory.
    pub fn new(cwd: impl Into<PathBuf>, config_path: Option<&Path>) -> Self {
        let cwd = cwd.into();
        let config_dir = config_path
            .and_then(Path::parent)
            .map_or_else(|| cwd.clone(), |dir| normalize::resolve_against(&cwd, dir));
        Self { cwd, config_dir }
    }

    /// The caller's working directory.
    #[must_use]
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Directory containing the configuration document.
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Resolves a path written in the document against the document's
    /// directory.
    #[must_use]
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        normalize::resolve_against(&self.config_dir, path.as_ref())
    }

    /// Resolves a path given by the caller (a command-line argument, say)
    /// against the working directory.
    #[must_use]
    pub fn resolve_from_cwd(&self, path: impl AsRef<Path>) -> PathBuf {
        normalize::resolve_against(&self.cwd, path.as_ref())
    }

    /// Rewrites an already-resolved path relative to the working directory.
    #[must_use]
    pub fn relative_to_cwd(&self, path: &Path) -> PathBuf {
        normalize::relative_to(&self.cwd, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir_defaults_to_cwd() {
        let ctx = PathContext::new("/work", None);
        assert_eq!(ctx.config_dir(), Path::new("/work"));
        assert_eq!(ctx.cwd(), Path::new("/work"));
    }

    #[test]
    fn test_bare_file_name_uses_cwd() {
        let ctx = PathContext::new("/work", Some(Path::new("worker.toml")));
        assert_eq!(ctx.config_dir(), Path::new("/work"));
    }

    #[test]
    #[cfg(unix)]
    fn test_resolve_from_cwd() {
        let ctx = PathContext::new("/work", Some(Path::new("app/worker.toml")));
        assert_eq!(
            ctx.resolve_from_cwd("app/worker.toml"),
            PathBuf::from("/work/app/worker.toml")
        );
        assert_eq!(ctx.resolve("worker.toml"), PathBuf::from("/work/app/worker.toml"));
    }

    #[test]
    #[cfg(unix)]
    fn test_absolute_config_path() {
        let ctx = PathContext::new("/work", Some(Path::new("/elsewhere/conf/worker.toml")));
        assert_eq!(ctx.config_dir(), Path::new("/elsewhere/conf"));
        assert_eq!(
            ctx.relative_to_cwd(&ctx.resolve("mod.wasm")),
            PathBuf::from("../elsewhere/conf/mod.wasm")
        );
    }
}
