//! Binding collections and variables.
//!
//! None of these fields are inherited. Each element is checked by a
//! kind-specific validator; rejected elements are reported and left out of
//! the normalized collection. In a named environment the binding names the
//! top level declares are cross-checked and every missing one is a warning.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::config::inheritance::EnvironmentScope;
use crate::config::schema::{
    DurableObjectBinding, DurableObjects, KvNamespace, R2Bucket, ServiceBinding, UnsafeBinding,
    UnsafeConfig, SAFE_BINDING_TYPES,
};
use crate::config::validator::{
    all_valid, describe, field_path, validate_additional_properties, validate_optional_property,
    validate_required_property, validate_type, ExpectedType,
};
use crate::diagnostics::Diagnostics;

/// The binding collections an environment can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// `durable_objects = { bindings = [...] }`
    DurableObjects,
    /// `kv_namespaces = [...]`
    KvNamespaces,
    /// `r2_buckets = [...]`
    R2Buckets,
    /// `experimental_services = [...]`
    Services,
    /// `unsafe = { bindings = [...] }`
    Unsafe,
}

impl BindingKind {
    /// Document field holding the collection.
    #[must_use]
    pub const fn field(self) -> &'static str {
        match self {
            Self::DurableObjects => "durable_objects",
            Self::KvNamespaces => "kv_namespaces",
            Self::R2Buckets => "r2_buckets",
            Self::Services => "experimental_services",
            Self::Unsafe => "unsafe",
        }
    }

    /// Element key holding the binding name.
    #[must_use]
    pub const fn name_key(self) -> &'static str {
        match self {
            Self::KvNamespaces | Self::R2Buckets => "binding",
            Self::DurableObjects | Self::Services | Self::Unsafe => "name",
        }
    }

    /// Whether elements are wrapped as `{ bindings = [...] }`.
    #[must_use]
    pub const fn is_container(self) -> bool {
        matches!(self, Self::DurableObjects | Self::Unsafe)
    }

    /// Raw element list of a collection value, when it has the right shape.
    #[must_use]
    pub fn elements(self, value: &Value) -> Option<&Vec<Value>> {
        if self.is_container() {
            value.get("bindings")?.as_array()
        } else {
            value.as_array()
        }
    }

    /// Binding names found in a raw collection value. Elements without a
    /// string name are skipped.
    #[must_use]
    pub fn names(self, value: &Value) -> Vec<String> {
        self.elements(value)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.get(self.name_key())?.as_str())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Keys an element may carry. `None` for free-form `unsafe` elements.
    #[must_use]
    pub const fn element_keys(self) -> Option<&'static [&'static str]> {
        match self {
            Self::KvNamespaces => Some(&["binding", "id", "preview_id"]),
            Self::R2Buckets => Some(&["binding", "bucket_name", "preview_bucket_name"]),
            Self::DurableObjects => Some(&["name", "class_name", "script_name"]),
            Self::Services => Some(&["name", "service", "environment"]),
            Self::Unsafe => None,
        }
    }

    fn validate_element(self, diagnostics: &mut Diagnostics, path: &str, item: &Map<String, Value>) -> bool {
        use ExpectedType::String as Str;
        let known_keys = self.element_keys().map_or(true, |keys| {
            validate_additional_properties(diagnostics, &format!("\"{path}\""), item, keys)
        });
        let fields_valid = match self {
            Self::KvNamespaces => all_valid([
                validate_required_property(diagnostics, path, item, "binding", Str),
                validate_required_property(diagnostics, path, item, "id", Str),
                validate_optional_property(diagnostics, path, item, "preview_id", Str),
            ]),
            Self::R2Buckets => all_valid([
                validate_required_property(diagnostics, path, item, "binding", Str),
                validate_required_property(diagnostics, path, item, "bucket_name", Str),
                validate_optional_property(diagnostics, path, item, "preview_bucket_name", Str),
            ]),
            Self::DurableObjects => all_valid([
                validate_required_property(diagnostics, path, item, "name", Str),
                validate_required_property(diagnostics, path, item, "class_name", Str),
                validate_optional_property(diagnostics, path, item, "script_name", Str),
            ]),
            Self::Services => all_valid([
                validate_required_property(diagnostics, path, item, "name", Str),
                validate_required_property(diagnostics, path, item, "service", Str),
                validate_optional_property(diagnostics, path, item, "environment", Str),
            ]),
            Self::Unsafe => {
                let valid = all_valid([
                    validate_required_property(diagnostics, path, item, "name", Str),
                    validate_required_property(diagnostics, path, item, "type", Str),
                ]);
                if let Some(binding_type) = item.get("type").and_then(Value::as_str) {
                    if let Some(field) = safe_binding_field(binding_type) {
                        diagnostics.warnings.push(format!(
                            "The binding type \"{binding_type}\" of \"{path}\" is directly supported by the configuration.\n\
                             Use the \"{field}\" field instead of \"unsafe.bindings\"."
                        ));
                    }
                }
                valid
            }
        };
        known_keys && fields_valid
    }
}

/// Document field that natively covers an unsafe binding type.
fn safe_binding_field(binding_type: &str) -> Option<&'static str> {
    if !SAFE_BINDING_TYPES.contains(&binding_type) {
        return None;
    }
    Some(match binding_type {
        "plain_text" | "json" => "vars",
        "wasm_module" => "wasm_modules",
        "text_blob" => "text_blobs",
        "kv_namespace" => "kv_namespaces",
        "durable_object_namespace" => "durable_objects",
        "r2_bucket" => "r2_buckets",
        _ => "experimental_services",
    })
}

/// Validates a raw collection and converts its valid elements.
///
/// Returns the elements in document order, or `None` when the collection
/// itself has the wrong shape.
fn validate_collection<T: DeserializeOwned>(
    diagnostics: &mut Diagnostics,
    kind: BindingKind,
    path: &str,
    value: &Value,
) -> Option<Vec<T>> {
    let items_path = if kind.is_container() {
        if !validate_type(diagnostics, path, value, ExpectedType::Object) {
            return None;
        }
        if let Some(container) = value.as_object() {
            validate_additional_properties(diagnostics, &format!("\"{path}\""), container, &["bindings"]);
        }
        let bindings_path = field_path(path, "bindings");
        match value.get("bindings").filter(|b| !b.is_null()) {
            None => return Some(Vec::new()),
            Some(bindings) => {
                if !validate_type(diagnostics, &bindings_path, bindings, ExpectedType::Array) {
                    return None;
                }
            }
        }
        bindings_path
    } else {
        if !validate_type(diagnostics, path, value, ExpectedType::Array) {
            return None;
        }
        path.to_string()
    };

    let items = kind.elements(value)?;
    let mut out = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let item_path = format!("{items_path}[{index}]");
        let Some(object) = item.as_object() else {
            diagnostics.errors.push(format!(
                "\"{item_path}\" bindings should be objects, but got {}.",
                describe(item)
            ));
            continue;
        };
        if !kind.validate_element(diagnostics, &item_path, object) {
            continue;
        }
        match serde_json::from_value(item.clone()) {
            Ok(binding) => out.push(binding),
            Err(e) => diagnostics
                .errors
                .push(format!("\"{item_path}\" is not a valid binding: {e}.")),
        }
    }
    Some(out)
}

/// Normalizes one binding collection of the environment in `scope`.
fn normalize_collection<T: DeserializeOwned>(
    diagnostics: &mut Diagnostics,
    scope: &EnvironmentScope<'_>,
    kind: BindingKind,
) -> Vec<T> {
    let field = kind.field();
    let top_level_names = scope
        .top_level_value(field)
        .map(|value| kind.names(value))
        .unwrap_or_default();
    scope.not_inheritable(
        diagnostics,
        field,
        |diagnostics, path, value| {
            let bindings = validate_collection(diagnostics, kind, path, value)?;
            scope.warn_missing_names(
                diagnostics,
                field,
                &top_level_names,
                &kind.names(value),
                |name| format!("\"{field}\" binding \"{name}\""),
            );
            Some(bindings)
        },
        |value| kind.names(value),
        Vec::new(),
    )
}

/// `durable_objects` of the environment in `scope`.
pub fn normalize_durable_objects(
    diagnostics: &mut Diagnostics,
    scope: &EnvironmentScope<'_>,
) -> DurableObjects {
    let bindings: Vec<DurableObjectBinding> =
        normalize_collection(diagnostics, scope, BindingKind::DurableObjects);
    DurableObjects { bindings }
}

/// `kv_namespaces` of the environment in `scope`.
pub fn normalize_kv_namespaces(
    diagnostics: &mut Diagnostics,
    scope: &EnvironmentScope<'_>,
) -> Vec<KvNamespace> {
    normalize_collection(diagnostics, scope, BindingKind::KvNamespaces)
}

/// `r2_buckets` of the environment in `scope`.
pub fn normalize_r2_buckets(
    diagnostics: &mut Diagnostics,
    scope: &EnvironmentScope<'_>,
) -> Vec<R2Bucket> {
    normalize_collection(diagnostics, scope, BindingKind::R2Buckets)
}

/// `experimental_services` of the environment in `scope`.
pub fn normalize_services(
    diagnostics: &mut Diagnostics,
    scope: &EnvironmentScope<'_>,
) -> Vec<ServiceBinding> {
    normalize_collection(diagnostics, scope, BindingKind::Services)
}

/// `unsafe` of the environment in `scope`.
pub fn normalize_unsafe(diagnostics: &mut Diagnostics, scope: &EnvironmentScope<'_>) -> UnsafeConfig {
    let bindings: Vec<UnsafeBinding> = normalize_collection(diagnostics, scope, BindingKind::Unsafe);
    UnsafeConfig { bindings }
}

fn var_names(value: &Value) -> Vec<String> {
    value
        .as_object()
        .map(|vars| vars.keys().cloned().collect())
        .unwrap_or_default()
}

/// `vars` of the environment in `scope`.
///
/// Values are free-form; only the container must be a table.
pub fn normalize_vars(diagnostics: &mut Diagnostics, scope: &EnvironmentScope<'_>) -> Map<String, Value> {
    let top_level_names = scope
        .top_level_value("vars")
        .map(var_names)
        .unwrap_or_default();
    scope.not_inheritable(
        diagnostics,
        "vars",
        |diagnostics, path, value| {
            if !validate_type(diagnostics, path, value, ExpectedType::Object) {
                return None;
            }
            scope.warn_missing_names(
                diagnostics,
                "vars",
                &top_level_names,
                &var_names(value),
                |name| format!("\"vars.{name}\""),
            );
            value.as_object().cloned()
        },
        var_names,
        Map::new(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::Environment;
    use serde_json::json;

    fn raw(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_kv_namespaces_valid() {
        let config = raw(json!({
            "kv_namespaces": [
                { "binding": "KV", "id": "abc" },
                { "binding": "CACHE", "id": "def", "preview_id": "ghi" }
            ]
        }));
        let scope = EnvironmentScope::top_level(&config, true);
        let mut d = Diagnostics::new("test");
        let kv = normalize_kv_namespaces(&mut d, &scope);
        assert!(!d.has_errors());
        assert_eq!(kv.len(), 2);
        assert_eq!(kv[1].preview_id.as_deref(), Some("ghi"));
    }

    #[test]
    fn test_invalid_elements_are_dropped() {
        let config = raw(json!({
            "kv_namespaces": [
                { "binding": "KV" },
                "nope",
                { "binding": "OK", "id": "1" }
            ]
        }));
        let scope = EnvironmentScope::top_level(&config, true);
        let mut d = Diagnostics::new("test");
        let kv = normalize_kv_namespaces(&mut d, &scope);
        assert_eq!(kv.len(), 1);
        assert_eq!(kv[0].binding, "OK");
        assert_eq!(
            d.errors,
            vec![
                "\"kv_namespaces[0].id\" is a required field.",
                "\"kv_namespaces[1]\" bindings should be objects, but got \"nope\"."
            ]
        );
    }

    #[test]
    fn test_container_shape_required() {
        let config = raw(json!({ "durable_objects": [{ "name": "A", "class_name": "B" }] }));
        let scope = EnvironmentScope::top_level(&config, true);
        let mut d = Diagnostics::new("test");
        let objects = normalize_durable_objects(&mut d, &scope);
        assert!(objects.bindings.is_empty());
        assert_eq!(d.error_count(), 1);
        assert!(d.errors[0].contains("\"durable_objects\" should be of type \"object\""));
    }

    #[test]
    fn test_container_without_bindings_is_empty() {
        let config = raw(json!({ "durable_objects": {} }));
        let scope = EnvironmentScope::top_level(&config, true);
        let mut d = Diagnostics::new("test");
        assert!(normalize_durable_objects(&mut d, &scope).bindings.is_empty());
        assert!(!d.has_errors());
    }

    #[test]
    fn test_misspelled_container_key_reported() {
        let config = raw(json!({
            "durable_objects": { "binding": [{ "name": "DO", "class_name": "C" }] }
        }));
        let scope = EnvironmentScope::top_level(&config, true);
        let mut d = Diagnostics::new("test");
        let objects = normalize_durable_objects(&mut d, &scope);
        assert!(objects.bindings.is_empty());
        assert_eq!(
            d.errors,
            vec!["Unexpected field \"binding\" found in \"durable_objects\"."]
        );
    }

    #[test]
    fn test_misspelled_element_key_drops_element() {
        let config = raw(json!({
            "kv_namespaces": [
                { "binding": "KV", "id": "a", "preview_idd": "b" },
                { "binding": "OK", "id": "c" }
            ],
            "r2_buckets": [{ "binding": "R2", "bucket_name": "b", "region": "eu" }]
        }));
        let scope = EnvironmentScope::top_level(&config, true);
        let mut d = Diagnostics::new("test");
        let kv = normalize_kv_namespaces(&mut d, &scope);
        let r2 = normalize_r2_buckets(&mut d, &scope);
        assert_eq!(kv.len(), 1);
        assert_eq!(kv[0].binding, "OK");
        assert!(r2.is_empty());
        assert_eq!(
            d.errors,
            vec![
                "Unexpected field \"preview_idd\" found in \"kv_namespaces[0]\".",
                "Unexpected field \"region\" found in \"r2_buckets[0]\"."
            ]
        );
    }

    #[test]
    fn test_service_element_keys_checked() {
        let config = raw(json!({
            "experimental_services": [{ "name": "AUTH", "service": "auth", "env": "prod" }]
        }));
        let scope = EnvironmentScope::top_level(&config, true);
        let mut d = Diagnostics::new("test");
        assert!(normalize_services(&mut d, &scope).is_empty());
        assert_eq!(
            d.errors,
            vec!["Unexpected field \"env\" found in \"experimental_services[0]\"."]
        );
    }

    #[test]
    fn test_unsafe_safe_type_warns() {
        let config = raw(json!({
            "unsafe": { "bindings": [{ "name": "KV", "type": "kv_namespace", "id": "x" }] }
        }));
        let scope = EnvironmentScope::top_level(&config, true);
        let mut d = Diagnostics::new("test");
        let unsafe_config = normalize_unsafe(&mut d, &scope);
        assert_eq!(unsafe_config.bindings.len(), 1);
        assert_eq!(unsafe_config.bindings[0].extra.get("id"), Some(&json!("x")));
        assert_eq!(d.warnings.len(), 1);
        assert!(d.warnings[0].contains("\"kv_namespaces\""));
    }

    #[test]
    fn test_named_env_missing_binding_warns() {
        let config = raw(json!({
            "kv_namespaces": [{ "binding": "KV", "id": "abc" }],
            "env": { "prod": { "kv_namespaces": [] } }
        }));
        let env = raw(json!({ "kv_namespaces": [] }));
        let top = Environment::default();
        let scope = EnvironmentScope::named(&config, &env, "prod", &top, true);
        let mut d = Diagnostics::new("test");
        let kv = normalize_kv_namespaces(&mut d, &scope);
        assert!(kv.is_empty());
        assert!(!d.has_errors());
        assert_eq!(d.warnings.len(), 1);
        assert!(d.warnings[0].contains("binding \"KV\""));
        assert!(d.warnings[0].contains("env.prod.kv_namespaces"));
    }

    #[test]
    fn test_vars_cross_check() {
        let config = raw(json!({ "vars": { "A": "1", "B": 2 } }));
        let env = raw(json!({ "vars": { "A": "x" } }));
        let top = Environment::default();
        let scope = EnvironmentScope::named(&config, &env, "dev", &top, true);
        let mut d = Diagnostics::new("test");
        let vars = normalize_vars(&mut d, &scope);
        assert_eq!(vars.get("A"), Some(&json!("x")));
        assert_eq!(d.warnings.len(), 1);
        assert!(d.warnings[0].starts_with("\"vars.B\" exists at the top level"));
    }

    #[test]
    fn test_vars_must_be_table() {
        let config = raw(json!({ "vars": ["A"] }));
        let scope = EnvironmentScope::top_level(&config, true);
        let mut d = Diagnostics::new("test");
        assert!(normalize_vars(&mut d, &scope).is_empty());
        assert_eq!(d.error_count(), 1);
    }

    #[test]
    fn test_names() {
        assert_eq!(
            BindingKind::DurableObjects.names(&json!({ "bindings": [{ "name": "X" }, {}] })),
            vec!["X"]
        );
        assert_eq!(
            BindingKind::KvNamespaces.names(&json!([{ "binding": "KV" }])),
            vec!["KV"]
        );
        assert!(BindingKind::R2Buckets.names(&json!("oops")).is_empty());
    }
}
