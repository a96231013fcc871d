//! The `dev` section: local development server settings.

use serde_json::{Map, Value};

use crate::config::schema::{DevConfig, Protocol};
use crate::config::validator::{
    describe, get_defined, optional_string, validate_additional_properties,
    validate_optional_one_of, validate_type, ExpectedType,
};
use crate::diagnostics::Diagnostics;

const DEV_FIELDS: [&str; 5] = ["ip", "port", "local_protocol", "upstream_protocol", "host"];
const PROTOCOLS: [&str; 2] = ["http", "https"];

/// Normalizes `dev`. Every rejected field falls back to its default.
pub fn normalize_dev(diagnostics: &mut Diagnostics, value: Option<&Value>) -> DevConfig {
    let defaults = DevConfig::default();
    let Some(value) = value else {
        return defaults;
    };
    if !validate_type(diagnostics, "dev", value, ExpectedType::Object) {
        return defaults;
    }
    let Some(raw) = value.as_object() else {
        return defaults;
    };
    validate_additional_properties(diagnostics, "\"dev\"", raw, &DEV_FIELDS);

    let ip = optional_string(diagnostics, "dev", raw, "ip").unwrap_or(defaults.ip);
    let port = match get_defined(raw, "port") {
        None => defaults.port,
        Some(port) => parse_port(diagnostics, port).unwrap_or(defaults.port),
    };
    let local_protocol = protocol(diagnostics, raw, "local_protocol").unwrap_or(defaults.local_protocol);
    let upstream_protocol =
        protocol(diagnostics, raw, "upstream_protocol").unwrap_or(defaults.upstream_protocol);
    let host = optional_string(diagnostics, "dev", raw, "host");

    DevConfig {
        ip,
        port,
        local_protocol,
        upstream_protocol,
        host,
    }
}

fn parse_port(diagnostics: &mut Diagnostics, value: &Value) -> Option<u16> {
    if !validate_type(diagnostics, "dev.port", value, ExpectedType::Number) {
        return None;
    }
    let port = value.as_u64().and_then(|p| u16::try_from(p).ok());
    if port.is_none() {
        diagnostics.errors.push(format!(
            "\"dev.port\" should be an integer between 0 and 65535 but got {}.",
            describe(value)
        ));
    }
    port
}

fn protocol(
    diagnostics: &mut Diagnostics,
    raw: &Map<String, Value>,
    field: &str,
) -> Option<Protocol> {
    if !validate_optional_one_of(diagnostics, "dev", raw, field, &PROTOCOLS) {
        return None;
    }
    match get_defined(raw, field)?.as_str()? {
        "http" => Some(Protocol::Http),
        _ => Some(Protocol::Https),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_when_absent() {
        let mut d = Diagnostics::new("test");
        assert_eq!(normalize_dev(&mut d, None), DevConfig::default());
        assert!(!d.has_errors());
    }

    #[test]
    fn test_string_port_falls_back() {
        let mut d = Diagnostics::new("test");
        let dev = normalize_dev(&mut d, Some(&json!({ "port": "8787" })));
        assert_eq!(dev.port, 8787);
        assert_eq!(
            d.errors,
            vec!["\"dev.port\" should be of type \"number\" but got \"8787\"."]
        );
    }

    #[test]
    fn test_port_out_of_range() {
        let mut d = Diagnostics::new("test");
        let dev = normalize_dev(&mut d, Some(&json!({ "port": 70000 })));
        assert_eq!(dev.port, 8787);
        assert_eq!(d.error_count(), 1);
        let dev = normalize_dev(&mut d, Some(&json!({ "port": 1.5 })));
        assert_eq!(dev.port, 8787);
        assert_eq!(d.error_count(), 2);
    }

    #[test]
    fn test_all_fields() {
        let mut d = Diagnostics::new("test");
        let dev = normalize_dev(
            &mut d,
            Some(&json!({
                "ip": "0.0.0.0",
                "port": 3000,
                "local_protocol": "https",
                "upstream_protocol": "http",
                "host": "example.com"
            })),
        );
        assert!(!d.has_errors());
        assert_eq!(dev.ip, "0.0.0.0");
        assert_eq!(dev.port, 3000);
        assert_eq!(dev.local_protocol, Protocol::Https);
        assert_eq!(dev.upstream_protocol, Protocol::Http);
        assert_eq!(dev.host.as_deref(), Some("example.com"));
    }

    #[test]
    fn test_bad_protocol_and_unknown_key() {
        let mut d = Diagnostics::new("test");
        let dev = normalize_dev(&mut d, Some(&json!({ "local_protocol": "ftp", "prot": 1 })));
        assert_eq!(dev.local_protocol, Protocol::Http);
        assert_eq!(d.error_count(), 2);
        assert!(d.errors.iter().any(|e| e.contains("Unexpected field \"prot\"")));
    }
}
