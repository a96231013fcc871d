//! Deprecated and experimental field annotations.
//!
//! Both annotators look a field up by path segments in a raw object and only
//! act when the field is defined. They never stop processing of the rest of
//! the document.
//!
//! ```
//! use serde_json::json;
//! use workercfg::config::deprecation::{deprecated, experimental, Severity};
//! use workercfg::Diagnostics;
//!
//! let mut raw = json!({ "type": "webpack", "unsafe": {} }).as_object().cloned().unwrap();
//! let mut diagnostics = Diagnostics::new("test");
//!
//! deprecated(&mut diagnostics, &mut raw, &["type"], "Use a custom build.", true, Severity::Warning);
//! experimental(&mut diagnostics, &raw, &["unsafe"]);
//!
//! assert!(!raw.contains_key("type"));
//! assert_eq!(diagnostics.warnings.len(), 2);
//! ```

use serde_json::{Map, Value};

use crate::diagnostics::Diagnostics;

/// Resolves a defined value by walking `path` through nested objects.
#[must_use]
pub fn lookup<'a>(object: &'a Map<String, Value>, path: &[&str]) -> Option<&'a Value> {
    let (last, parents) = path.split_last()?;
    let mut current = object;
    for segment in parents {
        current = current.get(*segment)?.as_object()?;
    }
    current.get(*last).filter(|value| !value.is_null())
}

/// Removes the value at `path`, returning it when it was present.
pub fn remove(object: &mut Map<String, Value>, path: &[&str]) -> Option<Value> {
    let (last, parents) = path.split_last()?;
    let mut current = object;
    for segment in parents {
        current = current.get_mut(*segment)?.as_object_mut()?;
    }
    current.remove(*last)
}

/// How a deprecated field is reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Severity {
    /// Reported, processing accepts the document.
    #[default]
    Warning,
    /// The field is no longer supported.
    Error,
}

/// Flags a deprecated field.
///
/// When the field is defined, pushes `Deprecation: "<path>":\n<message>` with
/// the given `severity`. With `remove_value` the field is deleted from `raw`
/// so it cannot reach the normalized output.
///
/// Returns whether the field was present.
pub fn deprecated(
    diagnostics: &mut Diagnostics,
    raw: &mut Map<String, Value>,
    path: &[&str],
    message: &str,
    remove_value: bool,
    severity: Severity,
) -> bool {
    if lookup(raw, path).is_none() {
        return false;
    }
    let dotted = path.join(".");
    let diagnostic = format!("Deprecation: \"{dotted}\":\n{message}");
    match severity {
        Severity::Warning => diagnostics.warnings.push(diagnostic),
        Severity::Error => diagnostics.errors.push(diagnostic),
    }
    if remove_value {
        remove(raw, path);
    }
    true
}

/// Flags use of an experimental field. The value is left in place.
///
/// Returns whether the field was present.
pub fn experimental(diagnostics: &mut Diagnostics, raw: &Map<String, Value>, path: &[&str]) -> bool {
    if lookup(raw, path).is_none() {
        return false;
    }
    diagnostics.warnings.push(format!(
        "\"{}\" fields are experimental and may change or break at any time.",
        path.join(".")
    ));
    true
}
