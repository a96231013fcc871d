//! Inheritance between the top-level environment and named environments.
//!
//! Every environment field follows one policy:
//!
//! - **inheritable**: a named environment that leaves the field out gets the
//!   already-normalized top-level value;
//! - **inheritable in legacy mode** (`name` only): as above, but only while
//!   `legacy_env` is on;
//! - **not inheritable**: each environment defines its own value, and the
//!   top-level names that a named environment forgot are reported as
//!   warnings.
//!
//! Validators receive the field path and the present raw value and return
//! `None` when they rejected it (after recording an error). Validation
//! failures substitute the default and never stop the pass.

use serde_json::Value;

use crate::config::schema::{Environment, RawConfig, RawEnvironment};
use crate::config::validator::{field_path, get_defined};
use crate::diagnostics::Diagnostics;

/// The raw inputs and inheritance source for one environment pass.
#[derive(Debug, Clone, Copy)]
pub struct EnvironmentScope<'a> {
    raw_config: &'a RawConfig,
    raw_env: &'a RawEnvironment,
    top_level: Option<&'a Environment>,
    env_name: Option<&'a str>,
    legacy_env: bool,
}

impl<'a> EnvironmentScope<'a> {
    /// Scope for the top-level environment. It has nothing to inherit from.
    #[must_use]
    pub fn top_level(raw_config: &'a RawConfig, legacy_env: bool) -> Self {
        Self {
            raw_config,
            raw_env: raw_config,
            top_level: None,
            env_name: None,
            legacy_env,
        }
    }

    /// Scope for the named environment `env_name`, inheriting from the
    /// normalized `top_level` environment.
    #[must_use]
    pub fn named(
        raw_config: &'a RawConfig,
        raw_env: &'a RawEnvironment,
        env_name: &'a str,
        top_level: &'a Environment,
        legacy_env: bool,
    ) -> Self {
        Self {
            raw_config,
            raw_env,
            top_level: Some(top_level),
            env_name: Some(env_name),
            legacy_env,
        }
    }

    /// The raw fragment being normalized.
    #[must_use]
    pub fn raw_env(&self) -> &'a RawEnvironment {
        self.raw_env
    }

    /// The raw top-level document.
    #[must_use]
    pub fn raw_config(&self) -> &'a RawConfig {
        self.raw_config
    }

    /// The environment name, `None` for the top-level pass.
    #[must_use]
    pub fn env_name(&self) -> Option<&'a str> {
        self.env_name
    }

    /// Whether this is the top-level pass.
    #[must_use]
    pub fn is_top_level(&self) -> bool {
        self.top_level.is_none()
    }

    /// Whether legacy environment mode is active.
    #[must_use]
    pub fn legacy_env(&self) -> bool {
        self.legacy_env
    }

    /// The normalized top-level environment, when this is a named pass.
    #[must_use]
    pub fn inherited(&self) -> Option<&'a Environment> {
        self.top_level
    }

    /// Prefix for field paths in messages: `""` or `env.<name>`.
    #[must_use]
    pub fn prefix(&self) -> String {
        self.env_name
            .map_or_else(String::new, |name| format!("env.{name}"))
    }

    /// Field path as shown in messages, e.g. `env.prod.vars`.
    #[must_use]
    pub fn path(&self, field: &str) -> String {
        field_path(&self.prefix(), field)
    }

    /// Whether the raw fragment defines `field`.
    #[must_use]
    pub fn defines(&self, field: &str) -> bool {
        get_defined(self.raw_env, field).is_some()
    }

    /// Resolves an inheritable field.
    ///
    /// A defined raw value is validated and used, or replaced by `default`
    /// when rejected. An undefined one is copied from the top-level
    /// environment, or is `default` in the top-level pass.
    pub fn inheritable<T>(
        &self,
        diagnostics: &mut Diagnostics,
        field: &str,
        validate: impl FnOnce(&mut Diagnostics, &str, &Value) -> Option<T>,
        inherit: impl FnOnce(&Environment) -> T,
        default: T,
    ) -> T {
        if let Some(value) = get_defined(self.raw_env, field) {
            return validate(diagnostics, &self.path(field), value).unwrap_or(default);
        }
        match self.top_level {
            Some(top_level) => {
                log::trace!("{} inherited from the top-level environment", self.path(field));
                inherit(top_level)
            }
            None => default,
        }
    }

    /// Resolves a field that is inherited only in legacy environment mode.
    ///
    /// Outside legacy mode a named environment uses its own value or
    /// `default`, without any warning about the top-level value.
    pub fn inheritable_in_legacy_env<T>(
        &self,
        diagnostics: &mut Diagnostics,
        field: &str,
        validate: impl FnOnce(&mut Diagnostics, &str, &Value) -> Option<T>,
        inherit: impl FnOnce(&Environment) -> T,
        default: T,
    ) -> T {
        if self.legacy_env || self.is_top_level() {
            return self.inheritable(diagnostics, field, validate, inherit, default);
        }
        match get_defined(self.raw_env, field) {
            Some(value) => validate(diagnostics, &self.path(field), value).unwrap_or(default),
            None => default,
        }
    }

    /// Resolves a field that every environment must define on its own.
    ///
    /// The top-level value is never copied. When a named environment leaves
    /// out a field the top level defines, one warning lists the names
    /// `names_of` finds in the top-level value. Cross-checks for a field that
    /// is present are up to `validate` (see [`Self::warn_missing_names`]).
    pub fn not_inheritable<T>(
        &self,
        diagnostics: &mut Diagnostics,
        field: &str,
        validate: impl FnOnce(&mut Diagnostics, &str, &Value) -> Option<T>,
        names_of: impl FnOnce(&Value) -> Vec<String>,
        default: T,
    ) -> T {
        if let Some(value) = get_defined(self.raw_env, field) {
            return validate(diagnostics, &self.path(field), value).unwrap_or(default);
        }
        if let (Some(name), Some(top_value)) =
            (self.env_name, self.top_level_value(field))
        {
            let names = names_of(top_value);
            let listed = if names.is_empty() {
                String::new()
            } else {
                format!(
                    " It should include {}.",
                    names
                        .iter()
                        .map(|n| format!("\"{n}\""))
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            };
            diagnostics.warnings.push(format!(
                "\"{field}\" exists at the top level, but not on \"env.{name}\".\n\
                 This is not what you probably want, since \"{field}\" is not inherited by environments.\n\
                 Please add \"{field}\" to \"env.{name}\".{listed}"
            ));
        }
        default
    }

    /// Warns once per top-level name that is missing from `present`.
    ///
    /// `describe_missing` renders the subject of one warning, for example
    /// `"kv_namespaces" binding "KV"` or `"vars.API_HOST"`. Does nothing in
    /// the top-level pass.
    pub fn warn_missing_names(
        &self,
        diagnostics: &mut Diagnostics,
        field: &str,
        top_level_names: &[String],
        present: &[String],
        describe_missing: impl Fn(&str) -> String,
    ) {
        let Some(env_name) = self.env_name else {
            return;
        };
        for name in top_level_names {
            if present.contains(name) {
                continue;
            }
            diagnostics.warnings.push(format!(
                "{} exists at the top level, but not on \"env.{env_name}.{field}\".\n\
                 This is not what you probably want, since \"{field}\" is not inherited by environments.\n\
                 Please add \"{name}\" to \"env.{env_name}.{field}\".",
                describe_missing(name)
            ));
        }
    }

    /// The raw top-level value of `field`, only in a named pass.
    #[must_use]
    pub fn top_level_value(&self, field: &str) -> Option<&'a Value> {
        if self.is_top_level() {
            return None;
        }
        get_defined(self.raw_config, field)
    }
}
