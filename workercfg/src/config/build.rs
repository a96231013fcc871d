//! The `build` section and the worker entry point.
//!
//! `build.upload` is the older way of pointing at the bundled entry point;
//! its fields are still read, with deprecation warnings, until `main` fully
//! replaces them.

use std::path::{Path, PathBuf};

use serde_json::{json, Map, Value};

use crate::config::deprecation::{deprecated, lookup, Severity};
use crate::config::inheritance::EnvironmentScope;
use crate::config::schema::{Build, DEFAULT_WATCH_DIR};
use crate::config::snippet::fenced;
use crate::config::validator::{
    all_valid, field_path, get_defined, optional_string, validate_additional_properties,
    validate_optional_one_of, validate_optional_property, validate_type, ExpectedType,
};
use crate::diagnostics::Diagnostics;
use crate::path::PathContext;

/// Keys accepted in `build`.
pub const BUILD_FIELDS: [&str; 4] = ["command", "cwd", "watch_dir", "upload"];

/// Keys accepted in `build.upload`.
pub const UPLOAD_FIELDS: [&str; 4] = ["format", "dir", "main", "rules"];

/// Directory `build.upload.main` is relative to when `build.upload.dir` is
/// not given.
pub const DEFAULT_UPLOAD_DIR: &str = "./dist";

/// Validates a raw `build` table.
///
/// `watch_dir` is resolved against the document directory (default `./src`)
/// and only kept when a `command` is configured.
pub fn normalize_build(
    diagnostics: &mut Diagnostics,
    path: &str,
    value: &Value,
    ctx: &PathContext,
) -> Option<Build> {
    if !validate_type(diagnostics, path, value, ExpectedType::Object) {
        return None;
    }
    let raw = value.as_object()?;
    validate_additional_properties(diagnostics, &format!("\"{path}\""), raw, &BUILD_FIELDS);

    let command = optional_string(diagnostics, path, raw, "command");
    let cwd = optional_string(diagnostics, path, raw, "cwd");
    let watch_dir = optional_string(diagnostics, path, raw, "watch_dir");

    if let Some(upload) = get_defined(raw, "upload") {
        validate_upload(diagnostics, &field_path(path, "upload"), upload);
    }

    let watch_dir = command
        .as_ref()
        .map(|_| ctx.resolve(watch_dir.as_deref().unwrap_or(DEFAULT_WATCH_DIR)));
    log::trace!("{path}: command={command:?} watch_dir={watch_dir:?}");

    Some(Build {
        command,
        cwd,
        watch_dir,
    })
}

fn validate_upload(diagnostics: &mut Diagnostics, path: &str, upload: &Value) -> bool {
    let Some(raw) = upload.as_object() else {
        return validate_type(diagnostics, path, upload, ExpectedType::Object);
    };
    all_valid([
        validate_additional_properties(diagnostics, &format!("\"{path}\""), raw, &UPLOAD_FIELDS),
        validate_optional_one_of(diagnostics, path, raw, "format", &["modules", "service-worker"]),
        validate_optional_property(diagnostics, path, raw, "dir", ExpectedType::String),
        validate_optional_property(diagnostics, path, raw, "main", ExpectedType::String),
    ])
}

/// The entry point `build.upload` describes, relative to the document.
fn upload_entry_point(raw_env: &Map<String, Value>) -> Option<PathBuf> {
    let main = lookup(raw_env, &["build", "upload", "main"])?.as_str()?;
    let dir = lookup(raw_env, &["build", "upload", "dir"])
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_UPLOAD_DIR);
    Some(Path::new(dir).join(main))
}

/// Annotates the deprecated `build.upload` fields of a raw environment.
///
/// `format` is dropped; `main` and `dir` keep working with a warning that
/// shows the equivalent `main` entry.
pub fn deprecate_upload_fields(diagnostics: &mut Diagnostics, raw_env: &mut Map<String, Value>) {
    deprecated(
        diagnostics,
        raw_env,
        &["build", "upload", "format"],
        "The format is inferred automatically from the code.",
        true,
        Severity::Warning,
    );

    let Some(entry_point) = upload_entry_point(raw_env) else {
        return;
    };
    let message = format!(
        "Delete the `build.upload.main` and `build.upload.dir` fields.\n\
         Then add the top level `main` field to your configuration file:\n{}",
        fenced(&json!({ "main": entry_point.display().to_string() }))
    );
    for field in ["main", "dir"] {
        deprecated(
            diagnostics,
            raw_env,
            &["build", "upload", field],
            &message,
            false,
            Severity::Warning,
        );
    }
}

/// Resolves the absolute entry point of the environment in `scope`.
///
/// `main` wins; otherwise the deprecated `build.upload.dir` and
/// `build.upload.main` pair is used; otherwise the top-level value is
/// inherited. Declaring both `main` and `build.upload.main` is an error.
pub fn resolve_main(
    diagnostics: &mut Diagnostics,
    scope: &EnvironmentScope<'_>,
    ctx: &PathContext,
) -> Option<PathBuf> {
    let raw_env = scope.raw_env();
    let main = get_defined(raw_env, "main");
    let upload_main = lookup(raw_env, &["build", "upload", "main"]);

    if main.is_some() && upload_main.is_some() {
        diagnostics.errors.push(
            "Don't define both the `main` and `build.upload.main` fields in your configuration.\n\
             They serve the same purpose: to point to the entry-point of your worker.\n\
             Delete the `build.upload.main` and `build.upload.dir` field from your config."
                .to_string(),
        );
    }

    if let Some(main) = main {
        if !validate_type(diagnostics, &scope.path("main"), main, ExpectedType::String) {
            return None;
        }
        return main.as_str().map(|m| ctx.resolve(m));
    }
    if upload_main.is_some() {
        return upload_entry_point(raw_env).map(|p| ctx.resolve(p));
    }
    scope.inherited().and_then(|top_level| top_level.main.clone())
}
