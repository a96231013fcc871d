//! Normalized configuration types.
//!
//! These are the strictly-typed results of a validation pass. Raw documents
//! are plain [`serde_json::Value`] trees (see [`RawConfig`]); everything here
//! has already been checked and carries concrete values or documented
//! defaults.
//!
//! Serialization uses the same field names as the raw document, so a
//! normalized [`Config`] can be written back out and validated again.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// A raw, as-authored configuration document.
pub type RawConfig = Map<String, Value>;

/// A raw environment fragment (the top-level defaults or one `env.<name>`).
pub type RawEnvironment = Map<String, Value>;

/// Default JSX factory.
pub const DEFAULT_JSX_FACTORY: &str = "React.createElement";

/// Default JSX fragment.
pub const DEFAULT_JSX_FRAGMENT: &str = "React.Fragment";

/// Default local dev server address.
pub const DEFAULT_DEV_IP: &str = "localhost";

/// Default local dev server port.
pub const DEFAULT_DEV_PORT: u16 = 8787;

/// Default build watch directory, relative to the document.
pub const DEFAULT_WATCH_DIR: &str = "./src";

/// The fully-resolved configuration for the active environment.
///
/// The active [`Environment`] is flattened into the top level, next to the
/// sections that only exist once per document.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Config {
    /// Path of the document this was read from, if any.
    #[serde(rename = "configPath", skip_serializing_if = "Option::is_none")]
    pub config_path: Option<PathBuf>,

    /// Whether legacy environment mode is active.
    pub legacy_env: bool,

    /// Local dev server settings.
    pub dev: DevConfig,

    /// Ordered Durable Object migrations.
    pub migrations: Vec<Migration>,

    /// Static-site asset settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site: Option<SiteConfig>,

    /// Name to path map of WebAssembly modules, relative to the working
    /// directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wasm_modules: Option<BTreeMap<String, String>>,

    /// Name to path map of text blobs, relative to the working directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_blobs: Option<BTreeMap<String, String>>,

    /// The active environment.
    #[serde(flatten)]
    pub environment: Environment,
}

/// One normalized environment scope.
///
/// Inheritable fields fall back to the top-level environment; binding fields
/// never do.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Environment {
    /// Worker name. Inherited only in legacy environment mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Absolute path of the entry-point module.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main: Option<PathBuf>,

    /// Account the worker is deployed to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,

    /// Runtime compatibility date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compatibility_date: Option<String>,

    /// Runtime compatibility flags.
    pub compatibility_flags: Vec<String>,

    /// JSX factory function name.
    pub jsx_factory: String,

    /// JSX fragment name.
    pub jsx_fragment: String,

    /// Module rules.
    pub rules: Vec<Rule>,

    /// Single route (mutually exclusive with `routes`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<Route>,

    /// Route list (mutually exclusive with `route`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routes: Option<Vec<Route>>,

    /// Scheduled triggers.
    pub triggers: Triggers,

    /// Billing usage model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_model: Option<UsageModel>,

    /// Whether to publish to the shared development subdomain.
    pub workers_dev: bool,

    /// Custom build settings.
    pub build: Build,

    /// Plain-text and JSON variables.
    pub vars: Map<String, Value>,

    /// Durable Object namespace bindings.
    pub durable_objects: DurableObjects,

    /// KV namespace bindings.
    pub kv_namespaces: Vec<KvNamespace>,

    /// R2 bucket bindings.
    pub r2_buckets: Vec<R2Bucket>,

    /// Bindings to other workers.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub experimental_services: Vec<ServiceBinding>,

    /// Bindings passed through without validation of their contents.
    #[serde(rename = "unsafe", skip_serializing_if = "UnsafeConfig::is_empty")]
    pub unsafe_bindings: UnsafeConfig,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            name: None,
            main: None,
            account_id: None,
            compatibility_date: None,
            compatibility_flags: Vec::new(),
            jsx_factory: DEFAULT_JSX_FACTORY.to_string(),
            jsx_fragment: DEFAULT_JSX_FRAGMENT.to_string(),
            rules: Vec::new(),
            route: None,
            routes: None,
            triggers: Triggers::default(),
            usage_model: None,
            workers_dev: true,
            build: Build::default(),
            vars: Map::new(),
            durable_objects: DurableObjects::default(),
            kv_namespaces: Vec::new(),
            r2_buckets: Vec::new(),
            experimental_services: Vec::new(),
            unsafe_bindings: UnsafeConfig::default(),
        }
    }
}

/// Local dev server settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DevConfig {
    /// Address to listen on.
    pub ip: String,
    /// Port to listen on.
    pub port: u16,
    /// Protocol of the local server.
    pub local_protocol: Protocol,
    /// Protocol used to reach the upstream.
    pub upstream_protocol: Protocol,
    /// Host to forward requests to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

impl Default for DevConfig {
    fn default() -> Self {
        Self {
            ip: DEFAULT_DEV_IP.to_string(),
            port: DEFAULT_DEV_PORT,
            local_protocol: Protocol::Http,
            upstream_protocol: Protocol::Https,
            host: None,
        }
    }
}

/// `http` or `https`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Plain HTTP.
    Http,
    /// HTTP over TLS.
    Https,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => write!(f, "http"),
            Self::Https => write!(f, "https"),
        }
    }
}

/// One Durable Object migration step.
///
/// Entries keep their position even when invalid; malformed parts are
/// replaced by empty values and reported.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct Migration {
    /// Unique tag for this step.
    pub tag: String,
    /// Classes introduced by this step.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub new_classes: Vec<String>,
    /// Classes renamed by this step.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub renamed_classes: Vec<RenamedClass>,
    /// Classes removed by this step.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub deleted_classes: Vec<String>,
}

/// A class rename inside a migration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenamedClass {
    /// Old class name.
    pub from: String,
    /// New class name.
    pub to: String,
}

/// Static-site asset settings.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SiteConfig {
    /// Directory holding the static assets.
    pub bucket: String,
    /// Deprecated entry-point directory for the site worker.
    #[serde(rename = "entry-point", skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<String>,
    /// Globs of files to upload.
    pub include: Vec<String>,
    /// Globs of files to skip.
    pub exclude: Vec<String>,
}

/// How files matching a set of globs are treated when bundling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rule {
    /// Module type.
    #[serde(rename = "type")]
    pub rule_type: RuleType,
    /// Globs this rule matches.
    pub globs: Vec<String>,
    /// Whether later rules of the same type still apply.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallthrough: Option<bool>,
}

/// Module type of a [`Rule`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RuleType {
    /// ECMAScript module.
    ESModule,
    /// CommonJS module.
    CommonJS,
    /// Pre-compiled WebAssembly.
    CompiledWasm,
    /// Text imported as a string.
    Text,
    /// Binary data imported as an array buffer.
    Data,
}

impl RuleType {
    /// All accepted spellings, in documentation order.
    pub const NAMES: [&'static str; 5] = ["ESModule", "CommonJS", "CompiledWasm", "Text", "Data"];
}

/// A route pattern, optionally tied to a zone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Route {
    /// Pattern only.
    Pattern(String),
    /// Pattern scoped to a zone id.
    ZoneId {
        /// Route pattern.
        pattern: String,
        /// Zone identifier.
        zone_id: String,
    },
    /// Pattern scoped to a zone name.
    ZoneName {
        /// Route pattern.
        pattern: String,
        /// Zone name.
        zone_name: String,
    },
}

/// Scheduled triggers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Triggers {
    /// Cron expressions.
    pub crons: Vec<String>,
}

/// Billing usage model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UsageModel {
    /// Bundled pricing.
    Bundled,
    /// Unbound pricing.
    Unbound,
}

/// Custom build settings.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct Build {
    /// Command that produces the worker bundle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Directory to run `command` in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
    /// Absolute directory watched for changes; set only with `command`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watch_dir: Option<PathBuf>,
}

/// Durable Object bindings container.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct DurableObjects {
    /// The bindings.
    pub bindings: Vec<DurableObjectBinding>,
}

/// Binding to a Durable Object class.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DurableObjectBinding {
    /// Binding name visible to the worker.
    pub name: String,
    /// Exported class implementing the object.
    pub class_name: String,
    /// Worker that exports the class, when not this one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_name: Option<String>,
}

/// Binding to a KV namespace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KvNamespace {
    /// Binding name visible to the worker.
    pub binding: String,
    /// Namespace id.
    pub id: String,
    /// Namespace id used by the dev server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_id: Option<String>,
}

/// Binding to an R2 bucket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct R2Bucket {
    /// Binding name visible to the worker.
    pub binding: String,
    /// Bucket name.
    pub bucket_name: String,
    /// Bucket used by the dev server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_bucket_name: Option<String>,
}

/// Binding to another worker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceBinding {
    /// Binding name visible to the worker.
    pub name: String,
    /// Target worker.
    pub service: String,
    /// Target worker environment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
}

/// Container for unsafe bindings.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct UnsafeConfig {
    /// The bindings.
    pub bindings: Vec<UnsafeBinding>,
}

impl UnsafeConfig {
    /// No bindings configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// A binding passed through as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnsafeBinding {
    /// Binding name visible to the worker.
    pub name: String,
    /// Free-form binding type.
    #[serde(rename = "type")]
    pub binding_type: String,
    /// Remaining fields, untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Binding types that have a first-class configuration field.
pub const SAFE_BINDING_TYPES: [&str; 8] = [
    "plain_text",
    "json",
    "wasm_module",
    "text_blob",
    "kv_namespace",
    "durable_object_namespace",
    "r2_bucket",
    "service",
];
