//! Durable Object migrations.
//!
//! Only the shape of each step is checked. Steps keep their position even
//! when malformed so that later diagnostics and consumers see indices that
//! match the document.

use serde_json::{Map, Value};

use crate::config::schema::{Migration, RenamedClass};
use crate::config::validator::{
    describe, get_defined, string_array, validate_additional_properties, validate_type, ExpectedType,
};
use crate::diagnostics::Diagnostics;

const STEP_FIELDS: [&str; 4] = ["tag", "new_classes", "renamed_classes", "deleted_classes"];

const SHAPE: &str = "{tag: string, new_classes?: string[], renamed_classes?: {from: string, to: string}[], deleted_classes?: string[]}";

/// Normalizes `migrations`. Anything but an array is an error and yields no
/// steps.
pub fn normalize_migrations(diagnostics: &mut Diagnostics, value: Option<&Value>) -> Vec<Migration> {
    let Some(value) = value else {
        return Vec::new();
    };
    if !validate_type(diagnostics, "migrations", value, ExpectedType::Array) {
        return Vec::new();
    }
    value
        .as_array()
        .map(|steps| {
            steps
                .iter()
                .enumerate()
                .map(|(index, step)| normalize_step(diagnostics, index, step))
                .collect()
        })
        .unwrap_or_default()
}

fn normalize_step(diagnostics: &mut Diagnostics, index: usize, step: &Value) -> Migration {
    let path = format!("migrations[{index}]");
    let Some(raw) = step.as_object() else {
        diagnostics.errors.push(format!(
            "Expected \"{path}\" to be an object with shape {SHAPE} but got {}.",
            describe(step)
        ));
        return Migration::default();
    };
    validate_additional_properties(diagnostics, &format!("\"{path}\""), raw, &STEP_FIELDS);

    let tag = match get_defined(raw, "tag") {
        Some(Value::String(tag)) => tag.clone(),
        Some(other) => {
            validate_type(diagnostics, &format!("{path}.tag"), other, ExpectedType::String);
            String::new()
        }
        None => {
            diagnostics
                .errors
                .push(format!("\"{path}.tag\" is a required field."));
            String::new()
        }
    };

    let new_classes = class_list(raw, "new_classes");
    let deleted_classes = class_list(raw, "deleted_classes");
    let renamed_classes = renamed_list(raw);

    if new_classes.is_none() || deleted_classes.is_none() || renamed_classes.is_none() {
        diagnostics.errors.push(format!(
            "Expected \"{path}\" to be an object with shape {SHAPE} but got {}.",
            describe(step)
        ));
    }

    Migration {
        tag,
        new_classes: new_classes.unwrap_or_default(),
        renamed_classes: renamed_classes.unwrap_or_default(),
        deleted_classes: deleted_classes.unwrap_or_default(),
    }
}

/// `Some` when the property is absent or a string array.
fn class_list(raw: &Map<String, Value>, field: &str) -> Option<Vec<String>> {
    match get_defined(raw, field) {
        None => Some(Vec::new()),
        Some(value) => string_array(value),
    }
}

fn renamed_list(raw: &Map<String, Value>) -> Option<Vec<RenamedClass>> {
    match get_defined(raw, "renamed_classes") {
        None => Some(Vec::new()),
        Some(value) => value
            .as_array()?
            .iter()
            .map(|item| {
                let from = item.get("from")?.as_str()?;
                let to = item.get("to")?.as_str()?;
                Some(RenamedClass {
                    from: from.to_string(),
                    to: to.to_string(),
                })
            })
            .collect(),
    }
}
