//! Name to path maps (`wasm_modules`, `text_blobs`).
//!
//! Paths are written relative to the document and rewritten relative to the
//! caller's working directory.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;

use crate::config::validator::{validate_type, ExpectedType};
use crate::diagnostics::Diagnostics;
use crate::path::PathContext;

/// Normalizes one module map. Entries whose path is not a string are
/// reported and left out.
pub fn normalize_module_paths(
    diagnostics: &mut Diagnostics,
    field: &str,
    value: Option<&Value>,
    ctx: &PathContext,
) -> Option<BTreeMap<String, String>> {
    let value = value?;
    if !validate_type(diagnostics, field, value, ExpectedType::Object) {
        return None;
    }
    let entries = value.as_object()?;

    let mut out = BTreeMap::new();
    for (name, path) in entries {
        let entry_path = format!("{field}['{name}']");
        if !validate_type(diagnostics, &entry_path, path, ExpectedType::String) {
            continue;
        }
        if let Some(path) = path.as_str() {
            let rewritten = ctx.relative_to_cwd(&ctx.resolve(Path::new(path)));
            out.insert(name.clone(), rewritten.to_string_lossy().into_owned());
        }
    }
    Some(out)
}
