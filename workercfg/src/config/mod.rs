//! Configuration validation and normalization.
//!
//! A raw document (any [`serde_json::Value`]) goes in; a fully resolved
//! [`Config`] and a [`Diagnostics`](crate::Diagnostics) tree come out.
//!
//! The pipeline, leaf first:
//!
//! - [`validator`]: type, shape, enum and unexpected-key checks;
//! - [`deprecation`]: deprecated and experimental field annotations;
//! - [`inheritance`]: per-field inheritance between the top level and a
//!   named environment;
//! - section normalizers ([`build`], [`dev`], [`migrations`], [`site`],
//!   [`module_paths`], [`rules`], [`bindings`]);
//! - [`environment`]: one fully resolved environment;
//! - [`normalize`]: environment selection and assembly of the result.
//!
//! [`loader`] reads documents from disk.
//!
//! # Configuration Document
//!
//! ```toml
//! name = "my-worker"
//! main = "src/index.ts"
//! compatibility_date = "2022-05-01"
//!
//! kv_namespaces = [{ binding = "CACHE", id = "0f2ac74b" }]
//!
//! [env.staging]
//! route = "staging.example.com/*"
//! kv_namespaces = [{ binding = "CACHE", id = "9e1d22aa" }]
//! ```
//!
//! # Examples
//!
//! ```
//! use serde_json::json;
//! use workercfg::config::normalize_and_validate_config;
//! use workercfg::path::PathContext;
//!
//! let raw = json!({
//!     "kv_namespaces": [{ "binding": "KV", "id": "abc" }],
//!     "env": { "prod": { "kv_namespaces": [] } }
//! });
//! let ctx = PathContext::new("/project", None);
//! let result = normalize_and_validate_config(&raw, None, Some("prod"), &ctx);
//!
//! assert!(!result.diagnostics.has_errors());
//! assert_eq!(result.diagnostics.warning_count(), 1);
//! assert!(result.config.environment.kv_namespaces.is_empty());
//! ```

pub mod bindings;
pub mod build;
pub mod deprecation;
pub mod dev;
pub mod environment;
pub mod inheritance;
pub mod loader;
pub mod migrations;
pub mod module_paths;
pub mod normalize;
pub mod rules;
pub mod schema;
pub mod site;
pub mod snippet;
pub mod validator;

pub use loader::{ConfigFormat, ConfigLoader, CONFIG_FILE_NAMES};
pub use normalize::{environment_names, normalize_and_validate_config, NormalizedConfig};
pub use schema::{
    Build, Config, DevConfig, DurableObjectBinding, DurableObjects, Environment, KvNamespace,
    Migration, Protocol, R2Bucket, RawConfig, RawEnvironment, RenamedClass, Route, Rule, RuleType,
    ServiceBinding, SiteConfig, Triggers, UnsafeBinding, UnsafeConfig, UsageModel,
};
