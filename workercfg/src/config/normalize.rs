//! Top-level validation and normalization of a raw document.
//!
//! [`normalize_and_validate_config`] never fails. It always returns a
//! complete [`Config`] (defaults substituted for anything invalid) together
//! with every problem it found; the caller decides whether errors are fatal.

use std::path::Path;

use serde_json::{json, Map, Value};

use crate::config::deprecation::{deprecated, Severity};
use crate::config::dev::normalize_dev;
use crate::config::environment::{
    normalize_named_environment, normalize_top_level_environment, ENVIRONMENT_FIELDS,
};
use crate::config::migrations::normalize_migrations;
use crate::config::module_paths::normalize_module_paths;
use crate::config::schema::{Config, Environment, RawConfig};
use crate::config::site::normalize_site;
use crate::config::snippet::fenced;
use crate::config::validator::{
    get_defined, type_name, validate_additional_properties, validate_type, ExpectedType,
};
use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::path::PathContext;

/// Keys only valid at the top level of a document.
///
/// `miniflare` belongs to an external tool and is accepted without being
/// read.
pub const TOP_LEVEL_FIELDS: [&str; 8] = [
    "legacy_env",
    "dev",
    "migrations",
    "site",
    "wasm_modules",
    "text_blobs",
    "env",
    "miniflare",
];

const BUILD_TOOLING_MESSAGE: &str = "Most common features now work out of the box, including modules, jsx, typescript, etc.\n\
     If you need anything more, use a custom build.";

/// Result of one validation pass.
#[derive(Debug, Clone)]
pub struct NormalizedConfig {
    /// The resolved configuration for the active environment.
    pub config: Config,
    /// Everything found while producing it.
    pub diagnostics: Diagnostics,
}

impl NormalizedConfig {
    /// Returns the configuration, or [`Error::InvalidConfiguration`] when the
    /// pass recorded any error.
    ///
    /// # Errors
    ///
    /// Returns an error carrying the rendered report if the diagnostics tree
    /// holds at least one error.
    pub fn into_result(self) -> Result<Config> {
        if self.diagnostics.has_errors() {
            return Err(Error::InvalidConfiguration {
                errors: self.diagnostics.error_count(),
                report: self.diagnostics.render_errors(),
            });
        }
        Ok(self.config)
    }
}

/// Validates `raw` and resolves the configuration for `env_name`.
///
/// `config_path` labels the report and is copied into the result; relative
/// paths inside the document are resolved through `ctx`.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use workercfg::config::normalize_and_validate_config;
/// use workercfg::path::PathContext;
///
/// let ctx = PathContext::new("/project", None);
/// let raw = json!({ "dev": { "port": "8787" } });
/// let result = normalize_and_validate_config(&raw, None, None, &ctx);
///
/// assert_eq!(result.config.dev.port, 8787);
/// assert_eq!(
///     result.diagnostics.errors,
///     vec!["\"dev.port\" should be of type \"number\" but got \"8787\"."]
/// );
/// ```
#[must_use]
pub fn normalize_and_validate_config(
    raw: &Value,
    config_path: Option<&Path>,
    env_name: Option<&str>,
    ctx: &PathContext,
) -> NormalizedConfig {
    let label = config_path.map_or_else(
        || "worker".to_string(),
        |path| ctx.relative_to_cwd(&ctx.resolve_from_cwd(path)).display().to_string(),
    );
    let mut diagnostics = Diagnostics::new(format!("Processing {label} configuration:"));

    let mut raw_config: RawConfig = if let Some(object) = raw.as_object() {
        object.clone()
    } else {
        diagnostics.errors.push(format!(
            "The configuration should be a table of fields but got {}.",
            type_name(raw)
        ));
        Map::new()
    };

    annotate_top_level(&mut diagnostics, &mut raw_config);

    let legacy_env = match get_defined(&raw_config, "legacy_env") {
        None => true,
        Some(value) => {
            validate_type(&mut diagnostics, "legacy_env", value, ExpectedType::Boolean);
            value.as_bool().unwrap_or(true)
        }
    };

    if let Some(envs) = get_defined(&raw_config, "env") {
        validate_type(&mut diagnostics, "env", envs, ExpectedType::Object);
    }

    let top_level = normalize_top_level_environment(&mut diagnostics, &raw_config, legacy_env, ctx);
    let environment = match env_name {
        None => top_level,
        Some(name) => select_environment(&mut diagnostics, &raw_config, name, top_level, legacy_env, ctx),
    };

    let config = Config {
        config_path: config_path.map(Path::to_path_buf),
        legacy_env,
        dev: normalize_dev(&mut diagnostics, get_defined(&raw_config, "dev")),
        migrations: normalize_migrations(&mut diagnostics, get_defined(&raw_config, "migrations")),
        site: normalize_site(&mut diagnostics, get_defined(&raw_config, "site")),
        wasm_modules: normalize_module_paths(
            &mut diagnostics,
            "wasm_modules",
            get_defined(&raw_config, "wasm_modules"),
            ctx,
        ),
        text_blobs: normalize_module_paths(
            &mut diagnostics,
            "text_blobs",
            get_defined(&raw_config, "text_blobs"),
            ctx,
        ),
        environment,
    };

    let allowed: Vec<&str> = TOP_LEVEL_FIELDS
        .iter()
        .chain(ENVIRONMENT_FIELDS.iter())
        .copied()
        .collect();
    validate_additional_properties(
        &mut diagnostics,
        "the top-level configuration",
        &raw_config,
        &allowed,
    );

    log::debug!(
        "validation finished with {} error(s) and {} warning(s)",
        diagnostics.error_count(),
        diagnostics.warning_count()
    );
    NormalizedConfig {
        config,
        diagnostics,
    }
}

/// Deprecations that only exist at the top level of a document.
fn annotate_top_level(diagnostics: &mut Diagnostics, raw: &mut RawConfig) {
    deprecated(diagnostics, raw, &["type"], BUILD_TOOLING_MESSAGE, true, Severity::Warning);
    deprecated(diagnostics, raw, &["webpack_config"], BUILD_TOOLING_MESSAGE, true, Severity::Warning);

    if let Some(entry_point) = raw
        .get("site")
        .and_then(|site| site.get("entry-point"))
        .and_then(Value::as_str)
    {
        let main = Path::new(entry_point).join("index.js");
        let message = format!(
            "The `site.entry-point` config field is no longer used.\n\
             The entry-point should be specified via the command line or the `main` config field.\n\
             Delete the `site.entry-point` field, then add the top level `main` field to your configuration file:\n{}",
            fenced(&json!({ "main": main.display().to_string() }))
        );
        deprecated(diagnostics, raw, &["site", "entry-point"], &message, false, Severity::Warning);
    }
}

/// Declared environment names, sorted.
#[must_use]
pub fn environment_names(raw: &Value) -> Vec<String> {
    raw.get("env")
        .and_then(Value::as_object)
        .map(|envs| envs.keys().cloned().collect())
        .unwrap_or_default()
}

fn select_environment(
    diagnostics: &mut Diagnostics,
    raw_config: &RawConfig,
    name: &str,
    top_level: Environment,
    legacy_env: bool,
    ctx: &PathContext,
) -> Environment {
    let envs = get_defined(raw_config, "env").and_then(Value::as_object);

    let Some(raw_env) = envs.and_then(|envs| envs.get(name)) else {
        let configured: Vec<String> = envs
            .map(|envs| envs.keys().map(|k| format!("\"{k}\"")).collect())
            .unwrap_or_default();
        let message = format!(
            "No environment found in configuration with name \"{name}\".\n\
             Before using `--env={name}` there should be an equivalent environment section in the configuration.\n\
             Consider adding an environment configuration section to the configuration file:\n{}",
            fenced(&json!({ "env": { name: {} } }))
        );
        if configured.is_empty() {
            diagnostics.warnings.push(message);
        } else {
            diagnostics.errors.push(format!(
                "{message}\n\nAvailable environments: {}",
                configured.join(", ")
            ));
        }
        return top_level;
    };

    log::debug!("using environment \"{name}\"");
    let mut scope = Diagnostics::new(format!("\"env.{name}\" environment configuration"));
    let raw_env = if let Some(object) = raw_env.as_object() {
        object.clone()
    } else {
        validate_type(&mut scope, &format!("env.{name}"), raw_env, ExpectedType::Object);
        Map::new()
    };
    let environment = normalize_named_environment(
        &mut scope,
        raw_config,
        &raw_env,
        name,
        &top_level,
        legacy_env,
        ctx,
    );
    diagnostics.add_child(scope);
    environment
}
