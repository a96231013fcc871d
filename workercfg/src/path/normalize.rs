//! Lexical path normalization.
//!
//! Nothing in here touches the filesystem or reads the process working
//! directory. Callers supply the base directory explicitly.

use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Expand tilde (~) to the home directory.
///
/// Handles `~` and `~/path`; `~user` syntax is rejected. Used for explicit
/// path arguments given on the command line, never for paths found inside a
/// configuration document.
///
/// # Errors
///
/// Returns an error if the path is not valid UTF-8, the home directory cannot
/// be determined, or the path uses `~user` syntax.
///
/// # Examples
///
/// ```
/// use workercfg::path::normalize::expand_tilde;
/// use std::path::Path;
///
/// let expanded = expand_tilde(Path::new("~/project/worker.toml")).unwrap();
/// assert!(expanded.is_absolute());
///
/// let untouched = expand_tilde(Path::new("/absolute")).unwrap();
/// assert_eq!(untouched, Path::new("/absolute"));
/// ```
pub fn expand_tilde(path: &Path) -> Result<PathBuf> {
    let path_str = path.to_str().ok_or_else(|| Error::InvalidPath {
        path: path.to_path_buf(),
        reason: "Path contains invalid UTF-8".to_string(),
    })?;

    if !path_str.starts_with('~') {
        return Ok(path.to_path_buf());
    }

    let home = home::home_dir().ok_or_else(|| Error::InvalidPath {
        path: path.to_path_buf(),
        reason: "Cannot determine home directory".to_string(),
    })?;

    if path_str == "~" {
        Ok(home)
    } else if let Some(rest) = path_str
        .strip_prefix("~/")
        .or_else(|| path_str.strip_prefix("~\\"))
    {
        Ok(home.join(rest))
    } else {
        Err(Error::InvalidPath {
            path: path.to_path_buf(),
            reason: "~user syntax is not supported; use ~ or ~/path".to_string(),
        })
    }
}

/// Resolve `.` and `..` components lexically.
///
/// # Errors
///
/// Returns an error if a `..` would climb above the root of an absolute path.
///
/// # Examples
///
/// ```
/// use workercfg::path::normalize::resolve_components;
/// use std::path::{Path, PathBuf};
///
/// let resolved = resolve_components(Path::new("/a/./b/../c")).unwrap();
/// assert_eq!(resolved, PathBuf::from("/a/c"));
/// ```
pub fn resolve_components(path: &Path) -> Result<PathBuf> {
    collapse(path, false).ok_or_else(|| Error::InvalidPath {
        path: path.to_path_buf(),
        reason: "Path contains too many '..' components (escapes root)".to_string(),
    })
}

/// Join `path` onto `base` (unless already absolute) and resolve it
/// lexically.
///
/// Never fails: a `..` that would climb above the root is dropped, the way
/// `/..` names `/`.
///
/// ```
/// use workercfg::path::normalize::resolve_against;
/// use std::path::{Path, PathBuf};
///
/// let p = resolve_against(Path::new("/project"), Path::new("./src/../dist/index.js"));
/// assert_eq!(p, PathBuf::from("/project/dist/index.js"));
///
/// let p = resolve_against(Path::new("/project"), Path::new("../../../x.js"));
/// assert_eq!(p, PathBuf::from("/x.js"));
/// ```
#[must_use]
pub fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };
    collapse(&joined, true).unwrap_or(joined)
}

/// Drop `.` and fold `..` into its parent. Returns `None` when a `..` meets
/// the root and `clamp_at_root` is off.
fn collapse(path: &Path, clamp_at_root: bool) -> Option<PathBuf> {
    let mut parts: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => {
                parts.push(component);
            }
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {
                    if !clamp_at_root {
                        return None;
                    }
                }
                // Relative path climbing above its start: keep the `..`.
                _ => parts.push(component),
            },
        }
    }

    Some(parts.iter().map(|c| c.as_os_str()).collect())
}

/// Express `target` relative to `base`, lexically.
///
/// Both paths should already be resolved. When they share no root (for
/// example different drive prefixes) `target` is returned unchanged. Equal
/// paths give `.`.
///
/// ```
/// use workercfg::path::normalize::relative_to;
/// use std::path::{Path, PathBuf};
///
/// let rel = relative_to(Path::new("/project/app"), Path::new("/project/assets/a.wasm"));
/// assert_eq!(rel, PathBuf::from("../assets/a.wasm"));
/// ```
#[must_use]
pub fn relative_to(base: &Path, target: &Path) -> PathBuf {
    let base_parts: Vec<Component<'_>> = base.components().collect();
    let target_parts: Vec<Component<'_>> = target.components().collect();

    let common = base_parts
        .iter()
        .zip(&target_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let anchored = |parts: &[Component<'_>]| {
        matches!(
            parts.first(),
            Some(Component::RootDir | Component::Prefix(_))
        )
    };
    if common == 0 && (anchored(&base_parts) || anchored(&target_parts)) {
        return target.to_path_buf();
    }

    let mut out = PathBuf::new();
    for _ in common..base_parts.len() {
        out.push("..");
    }
    for component in &target_parts[common..] {
        out.push(component.as_os_str());
    }

    if out.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        out
    }
}
