//! TOML snippets embedded in diagnostic messages.
//!
//! Corrective guidance ("add this to your configuration instead") is shown as
//! TOML, the format most documents are written in.

use serde_json::Value;

use crate::config::validator::describe;

/// Renders a table as TOML. Values TOML cannot express at the root (a bare
/// string, an array) fall back to their JSON rendering.
///
/// ```
/// use serde_json::json;
/// use workercfg::config::snippet::toml_snippet;
///
/// assert_eq!(toml_snippet(&json!({ "main": "dist/index.js" })), "main = \"dist/index.js\"");
/// ```
#[must_use]
pub fn toml_snippet(value: &Value) -> String {
    toml::to_string(value).map_or_else(
        |_| describe(value),
        |rendered| rendered.trim_end().to_string(),
    )
}

/// [`toml_snippet`] wrapped in a fenced block.
#[must_use]
pub fn fenced(value: &Value) -> String {
    format!("```\n{}\n```", toml_snippet(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_array_of_tables() {
        let snippet = toml_snippet(&json!({
            "rules": [{ "type": "Text", "globs": ["**/*.txt"] }]
        }));
        assert!(snippet.contains("[[rules]]"));
        assert!(snippet.contains("type = \"Text\""));
    }

    #[test]
    fn test_non_table_falls_back_to_json() {
        assert_eq!(toml_snippet(&json!("plain")), "\"plain\"");
    }

    #[test]
    fn test_fenced() {
        let block = fenced(&json!({ "main": "index.js" }));
        assert!(block.starts_with("```\n"));
        assert!(block.ends_with("\n```"));
    }
}
