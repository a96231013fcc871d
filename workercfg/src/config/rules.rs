//! Module rules, including the legacy `build.upload.rules` form.

use serde_json::{json, Map, Value};

use crate::config::deprecation::{deprecated, lookup, Severity};
use crate::config::inheritance::EnvironmentScope;
use crate::config::schema::{Rule, RuleType};
use crate::config::snippet::fenced;
use crate::config::validator::{
    all_valid, describe, get_defined, validate_additional_properties, validate_one_of,
    validate_optional_property, validate_type, validate_type_array, ExpectedType,
};
use crate::diagnostics::Diagnostics;

const RULE_FIELDS: [&str; 3] = ["type", "globs", "fallthrough"];

/// Validates a raw rule list. Any invalid rule rejects the whole list.
pub fn validate_rules(diagnostics: &mut Diagnostics, path: &str, value: &Value) -> Option<Vec<Rule>> {
    if !validate_type(diagnostics, path, value, ExpectedType::Array) {
        return None;
    }
    let items = value.as_array()?;
    let checks: Vec<bool> = items
        .iter()
        .enumerate()
        .map(|(index, item)| validate_rule(diagnostics, &format!("{path}[{index}]"), item))
        .collect();
    if !all_valid(checks) {
        return None;
    }
    match serde_json::from_value(value.clone()) {
        Ok(rules) => Some(rules),
        Err(e) => {
            diagnostics
                .errors
                .push(format!("\"{path}\" could not be read as rules: {e}."));
            None
        }
    }
}

fn validate_rule(diagnostics: &mut Diagnostics, path: &str, item: &Value) -> bool {
    let Some(rule) = item.as_object() else {
        diagnostics.errors.push(format!(
            "\"{path}\" should be an object with \"type\" and \"globs\" fields but got {}.",
            describe(item)
        ));
        return false;
    };
    let rule_type = match get_defined(rule, "type") {
        Some(value) => validate_one_of(diagnostics, &format!("{path}.type"), value, &RuleType::NAMES),
        None => {
            diagnostics
                .errors
                .push(format!("\"{path}.type\" is a required field."));
            false
        }
    };
    let globs = match get_defined(rule, "globs") {
        Some(value) => validate_type_array(diagnostics, &format!("{path}.globs"), value, ExpectedType::String),
        None => {
            diagnostics
                .errors
                .push(format!("\"{path}.globs\" is a required field."));
            false
        }
    };
    all_valid([
        rule_type,
        globs,
        validate_optional_property(diagnostics, path, rule, "fallthrough", ExpectedType::Boolean),
        validate_additional_properties(diagnostics, &format!("\"{path}\""), rule, &RULE_FIELDS),
    ])
}

/// Annotates `build.upload.rules` with migration guidance.
pub fn deprecate_upload_rules(diagnostics: &mut Diagnostics, raw_env: &mut Map<String, Value>) {
    let Some(rules) = lookup(raw_env, &["build", "upload", "rules"]).cloned() else {
        return;
    };
    let message = format!(
        "The `build.upload.rules` config field is no longer used, the rules should be specified via the `rules` config field.\n\
         Delete the `build.upload.rules` field, and instead add this to your configuration file:\n{}",
        fenced(&json!({ "rules": rules }))
    );
    deprecated(
        diagnostics,
        raw_env,
        &["build", "upload", "rules"],
        &message,
        false,
        Severity::Warning,
    );
}

/// Default for the `rules` field taken from `build.upload.rules`.
///
/// Declaring both forms is an error, checked only in the top-level pass.
pub fn upload_rules_default(
    diagnostics: &mut Diagnostics,
    scope: &EnvironmentScope<'_>,
) -> Option<Vec<Rule>> {
    let legacy = lookup(scope.raw_env(), &["build", "upload", "rules"])?;
    if scope.is_top_level() && scope.defines("rules") {
        diagnostics.errors.push(
            "You cannot configure both [rules] and [build.upload.rules] in your configuration.\n\
             Delete the `build.upload.rules` field and use only `rules`."
                .to_string(),
        );
        return None;
    }
    validate_rules(diagnostics, &scope.path("build.upload.rules"), legacy)
}
