//! The `site` section: static assets served by the worker.

use serde_json::Value;

use crate::config::schema::SiteConfig;
use crate::config::validator::{
    optional_string, optional_string_array, validate_additional_properties,
    validate_required_property, validate_type, ExpectedType,
};
use crate::diagnostics::Diagnostics;

const SITE_FIELDS: [&str; 4] = ["bucket", "entry-point", "include", "exclude"];

/// Normalizes `site`. Without a valid `bucket` there is no site.
pub fn normalize_site(diagnostics: &mut Diagnostics, value: Option<&Value>) -> Option<SiteConfig> {
    let value = value?;
    if !validate_type(diagnostics, "site", value, ExpectedType::Object) {
        return None;
    }
    let raw = value.as_object()?;

    validate_additional_properties(diagnostics, "\"site\"", raw, &SITE_FIELDS);
    validate_required_property(diagnostics, "site", raw, "bucket", ExpectedType::String);
    let entry_point = optional_string(diagnostics, "site", raw, "entry-point");
    let include = optional_string_array(diagnostics, "site", raw, "include").unwrap_or_default();
    let exclude = optional_string_array(diagnostics, "site", raw, "exclude").unwrap_or_default();

    let bucket = raw.get("bucket")?.as_str()?.to_string();
    Some(SiteConfig {
        bucket,
        entry_point,
        include,
        exclude,
    })
}
