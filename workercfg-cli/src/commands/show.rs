//! Show command implementation.
//!
//! This module implements the `show` command, which prints the normalized
//! configuration for the selected environment as JSON, YAML or TOML.

use crate::error::CliError;
use crate::utils::{load_config, GlobalOptions};
use clap::{Args, ValueEnum};
use workercfg::Config;

/// Print the normalized configuration.
#[derive(Args)]
pub struct ShowCommand {
    /// Output format
    #[arg(long, value_enum, default_value = "json", ignore_case = true)]
    pub format: OutputFormat,

    /// Print the best-effort configuration even when validation failed
    #[arg(long)]
    pub allow_errors: bool,
}

/// Output format for the show command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed JSON
    Json,
    /// YAML document
    Yaml,
    /// TOML document
    Toml,
}

impl ShowCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let result = load_config(global)?;

        if global.logger().report(&result.diagnostics) && !self.allow_errors {
            return Err(CliError::ValidationFailed(format!(
                "Configuration has {} error(s); use --allow-errors to print it anyway",
                result.diagnostics.error_count()
            )));
        }

        let rendered = render(&result.config, self.format)?;
        println!("{}", rendered.trim_end());
        Ok(())
    }
}

/// Serialize a configuration in the requested format.
pub fn render(config: &Config, format: OutputFormat) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(config).map_err(|e| CliError::Output(e.to_string()))
        }
        OutputFormat::Yaml => {
            serde_yaml::to_string(config).map_err(|e| CliError::Output(e.to_string()))
        }
        OutputFormat::Toml => toml::to_string(config).map_err(|e| CliError::Output(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use workercfg::{normalize_and_validate_config, PathContext};

    fn sample() -> Config {
        let raw = json!({
            "name": "app",
            "routes": ["example.com/*"],
            "vars": { "MODE": "prod" },
            "kv_namespaces": [{ "binding": "KV", "id": "abc" }]
        });
        normalize_and_validate_config(&raw, None, None, &PathContext::new("/project", None))
            .config
    }

    #[test]
    fn test_render_json() {
        let out = render(&sample(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["name"], "app");
        assert_eq!(value["workers_dev"], false);
        assert_eq!(value["kv_namespaces"][0]["binding"], "KV");
    }

    #[test]
    fn test_render_yaml() {
        let out = render(&sample(), OutputFormat::Yaml).unwrap();
        let value: serde_json::Value = serde_yaml::from_str(&out).unwrap();
        assert_eq!(value["vars"]["MODE"], "prod");
    }

    #[test]
    fn test_render_toml() {
        let out = render(&sample(), OutputFormat::Toml).unwrap();
        let value: toml::Value = toml::from_str(&out).unwrap();
        assert_eq!(value["name"].as_str(), Some("app"));
        assert_eq!(value["dev"]["port"].as_integer(), Some(8787));
    }
}
