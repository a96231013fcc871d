//! Environment normalization.
//!
//! The top-level environment is normalized first and becomes the inheritance
//! source for the requested named environment. Both passes share
//! [`normalize_environment`]; they differ only in their
//! [`EnvironmentScope`].

use serde_json::Value;

use crate::config::bindings;
use crate::config::build::{self, deprecate_upload_fields};
use crate::config::deprecation::experimental;
use crate::config::inheritance::EnvironmentScope;
use crate::config::rules::{self, deprecate_upload_rules};
use crate::config::schema::{
    Build, Environment, RawConfig, RawEnvironment, Route, Triggers, UsageModel,
    DEFAULT_JSX_FACTORY, DEFAULT_JSX_FRAGMENT,
};
use crate::config::validator::{
    all_valid, describe, get_defined, is_valid_name, string_array,
    validate_additional_properties, validate_mutually_exclusive, validate_one_of,
    validate_optional_type_array, validate_type, validate_type_array, ExpectedType,
};
use crate::diagnostics::Diagnostics;
use crate::path::PathContext;

/// Keys an environment (top-level or named) may declare.
pub const ENVIRONMENT_FIELDS: [&str; 20] = [
    "name",
    "main",
    "account_id",
    "compatibility_date",
    "compatibility_flags",
    "jsx_factory",
    "jsx_fragment",
    "rules",
    "route",
    "routes",
    "triggers",
    "usage_model",
    "workers_dev",
    "build",
    "vars",
    "durable_objects",
    "kv_namespaces",
    "r2_buckets",
    "experimental_services",
    "unsafe",
];

/// Normalizes the top-level environment of a raw document.
pub fn normalize_top_level_environment(
    diagnostics: &mut Diagnostics,
    raw_config: &RawConfig,
    legacy_env: bool,
    ctx: &PathContext,
) -> Environment {
    let mut raw = raw_config.clone();
    annotate(diagnostics, &mut raw);
    let scope = EnvironmentScope::top_level(&raw, legacy_env);
    normalize_environment(diagnostics, &scope, ctx)
}

/// Normalizes `env.<env_name>`, inheriting from the normalized `top_level`.
///
/// Keys that are not environment fields are errors scoped to the
/// environment.
pub fn normalize_named_environment(
    diagnostics: &mut Diagnostics,
    raw_config: &RawConfig,
    raw_env: &RawEnvironment,
    env_name: &str,
    top_level: &Environment,
    legacy_env: bool,
    ctx: &PathContext,
) -> Environment {
    validate_additional_properties(
        diagnostics,
        &format!("\"env.{env_name}\""),
        raw_env,
        &ENVIRONMENT_FIELDS,
    );
    let mut raw = raw_env.clone();
    annotate(diagnostics, &mut raw);
    let scope = EnvironmentScope::named(raw_config, &raw, env_name, top_level, legacy_env);
    normalize_environment(diagnostics, &scope, ctx)
}

/// Deprecation and experimental annotations of one raw environment.
fn annotate(diagnostics: &mut Diagnostics, raw: &mut RawEnvironment) {
    deprecate_upload_fields(diagnostics, raw);
    deprecate_upload_rules(diagnostics, raw);
    experimental(diagnostics, raw, &["unsafe"]);
    experimental(diagnostics, raw, &["experimental_services"]);
}

/// Resolves every field of the environment described by `scope`.
pub fn normalize_environment(
    diagnostics: &mut Diagnostics,
    scope: &EnvironmentScope<'_>,
    ctx: &PathContext,
) -> Environment {
    let label = scope.env_name().unwrap_or("<top-level>");
    log::debug!("normalizing environment {label}");

    let upload_rules = rules::upload_rules_default(diagnostics, scope);
    let rules = scope.inheritable(
        diagnostics,
        "rules",
        rules::validate_rules,
        |top| top.rules.clone(),
        upload_rules.unwrap_or_default(),
    );

    let name = scope.inheritable_in_legacy_env(
        diagnostics,
        "name",
        |d, path, value| worker_name(d, path, value).map(Some),
        |top| top.name.clone(),
        None,
    );
    let main = build::resolve_main(diagnostics, scope, ctx);
    let account_id = scope.inheritable(
        diagnostics,
        "account_id",
        |d, path, value| string_value(d, path, value).map(Some),
        |top| top.account_id.clone(),
        None,
    );
    let compatibility_date = scope.inheritable(
        diagnostics,
        "compatibility_date",
        |d, path, value| string_value(d, path, value).map(Some),
        |top| top.compatibility_date.clone(),
        None,
    );
    let compatibility_flags = scope.inheritable(
        diagnostics,
        "compatibility_flags",
        string_list,
        |top| top.compatibility_flags.clone(),
        Vec::new(),
    );
    let jsx_factory = scope.inheritable(
        diagnostics,
        "jsx_factory",
        string_value,
        |top| top.jsx_factory.clone(),
        DEFAULT_JSX_FACTORY.to_string(),
    );
    let jsx_fragment = scope.inheritable(
        diagnostics,
        "jsx_fragment",
        string_value,
        |top| top.jsx_fragment.clone(),
        DEFAULT_JSX_FRAGMENT.to_string(),
    );

    let (route, routes) = resolve_routing(diagnostics, scope);
    let routed = route.is_some() || routes.is_some() || scope.defines("route") || scope.defines("routes");
    // Only an explicit top-level value is inherited; the computed default
    // follows this environment's own routing.
    let top_level_explicit = get_defined(scope.raw_config(), "workers_dev").is_some();
    let workers_dev = scope.inheritable(
        diagnostics,
        "workers_dev",
        bool_value,
        |top| if top_level_explicit { top.workers_dev } else { !routed },
        !routed,
    );

    let triggers = scope.inheritable(
        diagnostics,
        "triggers",
        triggers_value,
        |top| top.triggers.clone(),
        Triggers::default(),
    );
    let usage_model = scope.inheritable(
        diagnostics,
        "usage_model",
        |d, path, value| usage_model_value(d, path, value).map(Some),
        |top| top.usage_model,
        None,
    );
    let build = scope.inheritable(
        diagnostics,
        "build",
        |d, path, value| build::normalize_build(d, path, value, ctx),
        |top| top.build.clone(),
        Build::default(),
    );

    let vars = bindings::normalize_vars(diagnostics, scope);
    let durable_objects = bindings::normalize_durable_objects(diagnostics, scope);
    let kv_namespaces = bindings::normalize_kv_namespaces(diagnostics, scope);
    let r2_buckets = bindings::normalize_r2_buckets(diagnostics, scope);
    let experimental_services = bindings::normalize_services(diagnostics, scope);
    let unsafe_bindings = bindings::normalize_unsafe(diagnostics, scope);

    Environment {
        name,
        main,
        account_id,
        compatibility_date,
        compatibility_flags,
        jsx_factory,
        jsx_fragment,
        rules,
        route,
        routes,
        triggers,
        usage_model,
        workers_dev,
        build,
        vars,
        durable_objects,
        kv_namespaces,
        r2_buckets,
        experimental_services,
        unsafe_bindings,
    }
}

/// `route` and `routes` are resolved together: an environment that declares
/// either one owns its routing, otherwise both are inherited.
fn resolve_routing(
    diagnostics: &mut Diagnostics,
    scope: &EnvironmentScope<'_>,
) -> (Option<Route>, Option<Vec<Route>>) {
    let owns_routing = scope.defines("route") || scope.defines("routes");
    if let (Some(top), false) = (scope.inherited(), owns_routing) {
        return (top.route.clone(), top.routes.clone());
    }

    let raw = scope.raw_env();
    validate_mutually_exclusive(diagnostics, raw, &["routes", "route"]);
    let route = get_defined(raw, "route")
        .and_then(|value| route_value(diagnostics, &scope.path("route"), value));
    let routes = get_defined(raw, "routes")
        .and_then(|value| routes_value(diagnostics, &scope.path("routes"), value));
    (route, routes)
}

fn string_value(diagnostics: &mut Diagnostics, path: &str, value: &Value) -> Option<String> {
    validate_type(diagnostics, path, value, ExpectedType::String)
        .then(|| value.as_str().map(str::to_string))
        .flatten()
}

fn bool_value(diagnostics: &mut Diagnostics, path: &str, value: &Value) -> Option<bool> {
    validate_type(diagnostics, path, value, ExpectedType::Boolean)
        .then(|| value.as_bool())
        .flatten()
}

fn string_list(diagnostics: &mut Diagnostics, path: &str, value: &Value) -> Option<Vec<String>> {
    validate_type_array(diagnostics, path, value, ExpectedType::String)
        .then(|| string_array(value))
        .flatten()
}

fn worker_name(diagnostics: &mut Diagnostics, path: &str, value: &Value) -> Option<String> {
    let name = string_value(diagnostics, path, value)?;
    if is_valid_name(&name) {
        return Some(name);
    }
    diagnostics.errors.push(format!(
        "\"{path}\" should contain only lowercase letters, digits, \"-\" and \"_\", and must not start with \"-\", but got {}.",
        describe(value)
    ));
    None
}

const ROUTE_FIELDS: [&str; 3] = ["pattern", "zone_id", "zone_name"];

fn route_value(diagnostics: &mut Diagnostics, path: &str, value: &Value) -> Option<Route> {
    if let Some(object) = value.as_object() {
        let known_keys =
            validate_additional_properties(diagnostics, &format!("\"{path}\""), object, &ROUTE_FIELDS);
        let both_zones =
            get_defined(object, "zone_id").is_some() && get_defined(object, "zone_name").is_some();
        if both_zones {
            diagnostics.errors.push(format!(
                "\"{path}\" should set either \"zone_id\" or \"zone_name\", not both."
            ));
        }
        if !known_keys || both_zones {
            return None;
        }
    }
    match serde_json::from_value(value.clone()) {
        Ok(route) => Some(route),
        Err(_) => {
            diagnostics.errors.push(format!(
                "\"{path}\" should be either a string, or an object with shape {{ pattern, zone_id | zone_name }}, but got {}.",
                describe(value)
            ));
            None
        }
    }
}

fn routes_value(diagnostics: &mut Diagnostics, path: &str, value: &Value) -> Option<Vec<Route>> {
    if !validate_type(diagnostics, path, value, ExpectedType::Array) {
        return None;
    }
    let routes: Vec<Option<Route>> = value
        .as_array()?
        .iter()
        .enumerate()
        .map(|(index, item)| route_value(diagnostics, &format!("{path}[{index}]"), item))
        .collect();
    routes.into_iter().collect()
}

fn triggers_value(diagnostics: &mut Diagnostics, path: &str, value: &Value) -> Option<Triggers> {
    if !validate_type(diagnostics, path, value, ExpectedType::Object) {
        return None;
    }
    let raw = value.as_object()?;
    let valid = all_valid([
        validate_additional_properties(diagnostics, &format!("\"{path}\""), raw, &["crons"]),
        validate_optional_type_array(diagnostics, path, raw, "crons", ExpectedType::String),
    ]);
    if !valid {
        return None;
    }
    Some(Triggers {
        crons: get_defined(raw, "crons")
            .and_then(string_array)
            .unwrap_or_default(),
    })
}

fn usage_model_value(diagnostics: &mut Diagnostics, path: &str, value: &Value) -> Option<UsageModel> {
    if !validate_one_of(diagnostics, path, value, &["bundled", "unbound"]) {
        return None;
    }
    match value.as_str()? {
        "bundled" => Some(UsageModel::Bundled),
        _ => Some(UsageModel::Unbound),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    fn raw(value: Value) -> RawConfig {
        value.as_object().cloned().unwrap()
    }

    fn ctx() -> PathContext {
        PathContext::new("/project", None)
    }

    #[test]
    fn test_empty_top_level_defaults() {
        let mut d = Diagnostics::new("test");
        let env = normalize_top_level_environment(&mut d, &raw(json!({})), true, &ctx());
        assert!(!d.has_errors());
        assert!(!d.has_warnings());
        assert_eq!(env, Environment::default());
    }

    #[test]
    fn test_routes_disable_workers_dev() {
        let mut d = Diagnostics::new("test");
        let env = normalize_top_level_environment(
            &mut d,
            &raw(json!({ "routes": ["example.com/*", { "pattern": "a.com/*", "zone_id": "z" }] })),
            true,
            &ctx(),
        );
        assert!(!env.workers_dev);
        assert_eq!(env.routes.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn test_route_and_routes_conflict() {
        let mut d = Diagnostics::new("test");
        let env = normalize_top_level_environment(
            &mut d,
            &raw(json!({ "route": "a.com/*", "routes": ["b.com/*"] })),
            true,
            &ctx(),
        );
        assert_eq!(
            d.errors,
            vec!["Expected exactly one of the following fields [\"routes\",\"route\"]."]
        );
        assert!(env.route.is_some());
        assert!(env.routes.is_some());
        assert!(!env.workers_dev);
    }

    #[test]
    fn test_invalid_route_shape() {
        let mut d = Diagnostics::new("test");
        let env = normalize_top_level_environment(
            &mut d,
            &raw(json!({ "route": { "pattern": 1 } })),
            true,
            &ctx(),
        );
        assert!(env.route.is_none());
        assert!(!env.workers_dev);
        assert!(d.errors[0].starts_with("\"route\" should be either a string"));
    }

    #[test]
    fn test_route_object_rejects_both_zones() {
        let mut d = Diagnostics::new("test");
        let env = normalize_top_level_environment(
            &mut d,
            &raw(json!({ "route": { "pattern": "a.com/*", "zone_id": "z", "zone_name": "a.com" } })),
            true,
            &ctx(),
        );
        assert!(env.route.is_none());
        assert!(!env.workers_dev);
        assert_eq!(
            d.errors,
            vec!["\"route\" should set either \"zone_id\" or \"zone_name\", not both."]
        );
    }

    #[test]
    fn test_route_object_rejects_unknown_keys() {
        let mut d = Diagnostics::new("test");
        let env = normalize_top_level_environment(
            &mut d,
            &raw(json!({ "routes": ["b.com/*", { "pattern": "a.com/*", "zone": "a.com" }] })),
            true,
            &ctx(),
        );
        assert!(env.routes.is_none());
        assert_eq!(
            d.errors,
            vec!["Unexpected field \"zone\" found in \"routes[1]\"."]
        );
    }

    #[test]
    fn test_named_environment_inherits_and_overrides() {
        let config = raw(json!({
            "name": "app",
            "compatibility_flags": ["nodejs_compat"],
            "jsx_factory": "h",
            "routes": ["example.com/*"],
            "env": { "staging": { "route": "staging.example.com/*" } }
        }));
        let mut d = Diagnostics::new("test");
        let top = normalize_top_level_environment(&mut d, &config, true, &ctx());
        let staging_raw = raw(json!({ "route": "staging.example.com/*" }));
        let staging = normalize_named_environment(
            &mut d, &config, &staging_raw, "staging", &top, true, &ctx(),
        );
        assert!(!d.has_errors());
        assert_eq!(staging.compatibility_flags, top.compatibility_flags);
        assert_eq!(staging.jsx_factory, "h");
        assert_eq!(staging.name.as_deref(), Some("app"));
        assert_eq!(
            staging.route,
            Some(Route::Pattern("staging.example.com/*".to_string()))
        );
        assert_eq!(staging.routes, None);
        assert!(!staging.workers_dev);
    }

    #[test]
    fn test_named_route_overrides_default_workers_dev() {
        let config = raw(json!({ "env": { "prod": { "route": "example.com/*" } } }));
        let mut d = Diagnostics::new("test");
        let top = normalize_top_level_environment(&mut d, &config, true, &ctx());
        assert!(top.workers_dev);

        let prod_raw = raw(json!({ "route": "example.com/*" }));
        let prod = normalize_named_environment(&mut d, &config, &prod_raw, "prod", &top, true, &ctx());
        assert!(!d.has_errors());
        assert_eq!(prod.route, Some(Route::Pattern("example.com/*".to_string())));
        assert!(!prod.workers_dev);
    }

    #[test]
    fn test_named_route_keeps_explicit_workers_dev() {
        let config = raw(json!({
            "workers_dev": true,
            "env": { "prod": { "routes": ["example.com/*"] } }
        }));
        let mut d = Diagnostics::new("test");
        let top = normalize_top_level_environment(&mut d, &config, true, &ctx());
        let prod_raw = raw(json!({ "routes": ["example.com/*"] }));
        let prod = normalize_named_environment(&mut d, &config, &prod_raw, "prod", &top, true, &ctx());
        assert!(prod.workers_dev);
    }

    #[test]
    fn test_named_environment_unexpected_key() {
        let config = raw(json!({}));
        let mut d = Diagnostics::new("test");
        let top = normalize_top_level_environment(&mut d, &config, true, &ctx());
        normalize_named_environment(
            &mut d,
            &config,
            &raw(json!({ "dev": {} })),
            "prod",
            &top,
            true,
            &ctx(),
        );
        assert_eq!(
            d.errors,
            vec!["Unexpected field \"dev\" found in \"env.prod\"."]
        );
    }

    #[test]
    fn test_invalid_name() {
        let mut d = Diagnostics::new("test");
        let env = normalize_top_level_environment(&mut d, &raw(json!({ "name": "My Worker" })), true, &ctx());
        assert_eq!(env.name, None);
        assert_eq!(d.error_count(), 1);
    }

    #[test]
    fn test_experimental_and_usage_model() {
        let mut d = Diagnostics::new("test");
        let env = normalize_top_level_environment(
            &mut d,
            &raw(json!({
                "usage_model": "unbound",
                "experimental_services": [{ "name": "AUTH", "service": "auth" }],
                "unsafe": { "bindings": [{ "name": "RL", "type": "ratelimit" }] }
            })),
            true,
            &ctx(),
        );
        assert!(!d.has_errors());
        assert_eq!(d.warnings.len(), 2);
        assert_eq!(env.usage_model, Some(UsageModel::Unbound));
        assert_eq!(env.experimental_services[0].service, "auth");
        assert_eq!(env.unsafe_bindings.bindings[0].binding_type, "ratelimit");
    }

    #[test]
    fn test_build_and_main() {
        let mut d = Diagnostics::new("test");
        let env = normalize_top_level_environment(
            &mut d,
            &raw(json!({
                "main": "src/index.ts",
                "build": { "command": "make", "watch_dir": "lib" },
                "triggers": { "crons": ["*/5 * * * *"] }
            })),
            true,
            &ctx(),
        );
        assert!(!d.has_errors());
        assert_eq!(env.main, Some(PathBuf::from("/project/src/index.ts")));
        assert_eq!(env.build.watch_dir, Some(PathBuf::from("/project/lib")));
        assert_eq!(env.triggers.crons, vec!["*/5 * * * *"]);
    }
}
