//! Field validators.
//!
//! Each validator inspects one raw value, pushes a descriptive error into a
//! [`Diagnostics`] scope when the value is unacceptable, and returns whether
//! it was acceptable. Validators never stop at the first problem: compound
//! checks evaluate every part (see [`all_valid`]) so one pass reports
//! everything that is wrong.
//!
//! `null` values are treated exactly like missing ones.

use std::collections::BTreeSet;
use std::fmt;

use serde_json::{Map, Value};

use crate::diagnostics::Diagnostics;

/// Scalar shapes a raw field can be checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedType {
    /// A string.
    String,
    /// Any number.
    Number,
    /// `true` or `false`.
    Boolean,
    /// A table / map (arrays excluded).
    Object,
    /// A list of any values.
    Array,
}

impl ExpectedType {
    /// Whether `value` has this shape.
    #[must_use]
    pub fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Object => value.is_object(),
            Self::Array => value.is_array(),
        }
    }
}

impl fmt::Display for ExpectedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Number => write!(f, "number"),
            Self::Boolean => write!(f, "boolean"),
            Self::Object => write!(f, "object"),
            Self::Array => write!(f, "array"),
        }
    }
}

/// The document-level type name of a raw value.
#[must_use]
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Compact JSON rendering of a value for use inside messages.
#[must_use]
pub fn describe(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("<{}>", type_name(value)))
}

/// Looks up a key, treating `null` as absent.
#[must_use]
pub fn get_defined<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object.get(key).filter(|value| !value.is_null())
}

/// Joins a dotted field path. An empty prefix yields `field` alone.
#[must_use]
pub fn field_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{prefix}.{field}")
    }
}

/// Logical AND over already-evaluated checks.
///
/// Callers build the check list eagerly, so every check runs and reports
/// even after one has failed.
///
/// ```
/// use workercfg::config::validator::all_valid;
///
/// assert!(all_valid([true, true]));
/// assert!(!all_valid([true, false, true]));
/// ```
pub fn all_valid(checks: impl IntoIterator<Item = bool>) -> bool {
    checks.into_iter().fold(true, |acc, ok| acc & ok)
}

/// Checks that `value` has the expected type.
pub fn validate_type(
    diagnostics: &mut Diagnostics,
    path: &str,
    value: &Value,
    expected: ExpectedType,
) -> bool {
    if expected.matches(value) {
        return true;
    }
    diagnostics.errors.push(format!(
        "\"{path}\" should be of type \"{expected}\" but got {}.",
        describe(value)
    ));
    false
}

/// Checks an optional property of `object`: absent is fine, present must
/// have the expected type.
pub fn validate_optional_property(
    diagnostics: &mut Diagnostics,
    container: &str,
    object: &Map<String, Value>,
    property: &str,
    expected: ExpectedType,
) -> bool {
    match get_defined(object, property) {
        None => true,
        Some(value) => validate_type(
            diagnostics,
            &field_path(container, property),
            value,
            expected,
        ),
    }
}

/// Checks a required property of `object`: it must exist and have the
/// expected type.
pub fn validate_required_property(
    diagnostics: &mut Diagnostics,
    container: &str,
    object: &Map<String, Value>,
    property: &str,
    expected: ExpectedType,
) -> bool {
    let path = field_path(container, property);
    match get_defined(object, property) {
        None => {
            diagnostics
                .errors
                .push(format!("\"{path}\" is a required field."));
            false
        }
        Some(value) => validate_type(diagnostics, &path, value, expected),
    }
}

/// Checks that `value` is an array whose every element has the expected
/// type.
pub fn validate_type_array(
    diagnostics: &mut Diagnostics,
    path: &str,
    value: &Value,
    expected: ExpectedType,
) -> bool {
    let uniform = value
        .as_array()
        .is_some_and(|items| items.iter().all(|item| expected.matches(item)));
    if !uniform {
        diagnostics.errors.push(format!(
            "\"{path}\" should be of type \"{expected}[]\" but got {}.",
            describe(value)
        ));
    }
    uniform
}

/// Optional variant of [`validate_type_array`] on a property of `object`.
pub fn validate_optional_type_array(
    diagnostics: &mut Diagnostics,
    container: &str,
    object: &Map<String, Value>,
    property: &str,
    expected: ExpectedType,
) -> bool {
    match get_defined(object, property) {
        None => true,
        Some(value) => validate_type_array(
            diagnostics,
            &field_path(container, property),
            value,
            expected,
        ),
    }
}

/// Checks that `value` is one of a fixed set of strings.
pub fn validate_one_of(
    diagnostics: &mut Diagnostics,
    path: &str,
    value: &Value,
    choices: &[&str],
) -> bool {
    if value.as_str().is_some_and(|s| choices.contains(&s)) {
        return true;
    }
    let listed = choices
        .iter()
        .map(|c| format!("\"{c}\""))
        .collect::<Vec<_>>()
        .join(",");
    diagnostics.errors.push(format!(
        "\"{path}\" field should be one of [{listed}] but got {}.",
        describe(value)
    ));
    false
}

/// Optional variant of [`validate_one_of`] on a property of `object`.
pub fn validate_optional_one_of(
    diagnostics: &mut Diagnostics,
    container: &str,
    object: &Map<String, Value>,
    property: &str,
    choices: &[&str],
) -> bool {
    match get_defined(object, property) {
        None => true,
        Some(value) => validate_one_of(
            diagnostics,
            &field_path(container, property),
            value,
            choices,
        ),
    }
}

/// Errors once per key of `object` that is not in `allowed`.
///
/// `scope` is a human label such as `"dev"` or `the top-level configuration`.
pub fn validate_additional_properties(
    diagnostics: &mut Diagnostics,
    scope: &str,
    object: &Map<String, Value>,
    allowed: &[&str],
) -> bool {
    let allowed: BTreeSet<&str> = allowed.iter().copied().collect();
    let mut valid = true;
    for key in object.keys() {
        if !allowed.contains(key.as_str()) {
            diagnostics
                .errors
                .push(format!("Unexpected field \"{key}\" found in {scope}."));
            valid = false;
        }
    }
    valid
}

/// Errors when more than one of `fields` is defined on `object`.
pub fn validate_mutually_exclusive(
    diagnostics: &mut Diagnostics,
    object: &Map<String, Value>,
    fields: &[&str],
) -> bool {
    let defined = fields
        .iter()
        .filter(|f| get_defined(object, f).is_some())
        .count();
    if defined <= 1 {
        return true;
    }
    let listed = fields
        .iter()
        .map(|f| format!("\"{f}\""))
        .collect::<Vec<_>>()
        .join(",");
    diagnostics.errors.push(format!(
        "Expected exactly one of the following fields [{listed}]."
    ));
    false
}

/// Reads an optional string property. A mismatched type is reported and
/// read as `None`.
pub fn optional_string(
    diagnostics: &mut Diagnostics,
    container: &str,
    object: &Map<String, Value>,
    property: &str,
) -> Option<String> {
    if !validate_optional_property(diagnostics, container, object, property, ExpectedType::String) {
        return None;
    }
    get_defined(object, property)?.as_str().map(str::to_string)
}

/// Reads an optional string-array property. A mismatched shape is reported
/// and read as `None`.
pub fn optional_string_array(
    diagnostics: &mut Diagnostics,
    container: &str,
    object: &Map<String, Value>,
    property: &str,
) -> Option<Vec<String>> {
    if !validate_optional_type_array(diagnostics, container, object, property, ExpectedType::String) {
        return None;
    }
    string_array(get_defined(object, property)?)
}

/// Converts an already validated string array.
#[must_use]
pub fn string_array(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}

/// Whether `name` is an acceptable worker name: empty, or lowercase ASCII
/// letters, digits, `-` and `_`, not starting with `-`.
///
/// ```
/// use workercfg::config::validator::is_valid_name;
///
/// assert!(is_valid_name("my-worker_2"));
/// assert!(is_valid_name(""));
/// assert!(!is_valid_name("-leading"));
/// assert!(!is_valid_name("Upper"));
/// ```
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    let allowed = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_';
    match name.chars().next() {
        None => true,
        Some('-') => false,
        Some(_) => name.chars().all(allowed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_validate_type_message() {
        let mut d = Diagnostics::new("test");
        assert!(!validate_type(
            &mut d,
            "dev.port",
            &json!("8787"),
            ExpectedType::Number
        ));
        assert_eq!(
            d.errors,
            vec![r#""dev.port" should be of type "number" but got "8787"."#]
        );
    }

    #[test]
    fn test_object_excludes_arrays() {
        assert!(ExpectedType::Object.matches(&json!({})));
        assert!(!ExpectedType::Object.matches(&json!([])));
    }

    #[test]
    fn test_optional_property_absent_or_null() {
        let mut d = Diagnostics::new("test");
        let obj = object(json!({ "ip": null }));
        assert!(validate_optional_property(
            &mut d,
            "dev",
            &obj,
            "ip",
            ExpectedType::String
        ));
        assert!(validate_optional_property(
            &mut d,
            "dev",
            &obj,
            "port",
            ExpectedType::Number
        ));
        assert!(d.errors.is_empty());
    }

    #[test]
    fn test_required_property_missing() {
        let mut d = Diagnostics::new("test");
        let obj = object(json!({}));
        assert!(!validate_required_property(
            &mut d,
            "site",
            &obj,
            "bucket",
            ExpectedType::String
        ));
        assert_eq!(d.errors, vec![r#""site.bucket" is a required field."#]);
    }

    #[test]
    fn test_type_array() {
        let mut d = Diagnostics::new("test");
        assert!(validate_type_array(
            &mut d,
            "flags",
            &json!(["a", "b"]),
            ExpectedType::String
        ));
        assert!(validate_type_array(
            &mut d,
            "flags",
            &json!([]),
            ExpectedType::String
        ));
        assert!(!validate_type_array(
            &mut d,
            "flags",
            &json!(["a", 1]),
            ExpectedType::String
        ));
        assert!(!validate_type_array(
            &mut d,
            "flags",
            &json!("a"),
            ExpectedType::String
        ));
        assert_eq!(d.errors.len(), 2);
        assert!(d.errors[0].contains("\"string[]\""));
    }

    #[test]
    fn test_one_of() {
        let mut d = Diagnostics::new("test");
        assert!(validate_one_of(
            &mut d,
            "dev.local_protocol",
            &json!("https"),
            &["http", "https"]
        ));
        assert!(!validate_one_of(
            &mut d,
            "dev.local_protocol",
            &json!("ftp"),
            &["http", "https"]
        ));
        assert_eq!(
            d.errors,
            vec![r#""dev.local_protocol" field should be one of ["http","https"] but got "ftp"."#]
        );
    }

    #[test]
    fn test_additional_properties_one_error_per_key() {
        let mut d = Diagnostics::new("test");
        let obj = object(json!({ "ip": "x", "prot": 1, "hots": "y" }));
        assert!(!validate_additional_properties(
            &mut d,
            "\"dev\"",
            &obj,
            &["ip", "port"]
        ));
        assert_eq!(d.errors.len(), 2);
        assert!(d.errors.iter().any(|e| e.contains("\"prot\"")));
        assert!(d.errors.iter().any(|e| e.contains("\"hots\"")));
    }

    #[test]
    fn test_mutually_exclusive() {
        let mut d = Diagnostics::new("test");
        let both = object(json!({ "route": "a", "routes": ["b"] }));
        let one = object(json!({ "routes": ["b"] }));
        assert!(validate_mutually_exclusive(&mut d, &one, &["routes", "route"]));
        assert!(!validate_mutually_exclusive(
            &mut d,
            &both,
            &["routes", "route"]
        ));
        assert_eq!(d.errors.len(), 1);
    }

    #[test]
    fn test_all_valid_evaluates_everything() {
        let mut d = Diagnostics::new("test");
        let ok = all_valid([
            validate_type(&mut d, "a", &json!(1), ExpectedType::String),
            validate_type(&mut d, "b", &json!("x"), ExpectedType::String),
            validate_type(&mut d, "c", &json!(true), ExpectedType::Number),
        ]);
        assert!(!ok);
        assert_eq!(d.errors.len(), 2);
    }

    #[test]
    fn test_optional_readers() {
        let mut d = Diagnostics::new("test");
        let obj = object(json!({ "ip": "0.0.0.0", "include": ["a"], "exclude": "b" }));
        assert_eq!(
            optional_string(&mut d, "dev", &obj, "ip").as_deref(),
            Some("0.0.0.0")
        );
        assert_eq!(optional_string(&mut d, "dev", &obj, "host"), None);
        assert_eq!(
            optional_string_array(&mut d, "site", &obj, "include"),
            Some(vec!["a".to_string()])
        );
        assert_eq!(optional_string_array(&mut d, "site", &obj, "exclude"), None);
        assert_eq!(d.errors.len(), 1);
    }

    #[test]
    fn test_field_path() {
        assert_eq!(field_path("", "vars"), "vars");
        assert_eq!(field_path("env.prod", "vars"), "env.prod.vars");
    }
}
