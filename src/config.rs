// Copyright 2025 Cowboy AI, LLC.

//! Platform connection configuration
//!
//! Connection settings for the remote flow store, parseable from the compact
//! `key=value; key=value` string form used by job runners, or deserialized
//! from a structured config file.

use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::{FlowError, FlowResult};

/// Connection settings for a remote flow store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct PlatformConfig {
    /// Base URL of the platform
    pub server: String,
    /// API key used for authenticated calls
    #[serde(default)]
    pub api_key: Option<String>,
    /// Skip uploading a flow when one with the same name is already stored
    #[serde(default)]
    pub avoid_duplicate_uploads: bool,
    /// Tags attached to every composed flow
    #[serde(default)]
    pub tags: Vec<String>,
}

impl PlatformConfig {
    /// Create a configuration for a server with defaults otherwise
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            api_key: None,
            avoid_duplicate_uploads: false,
            tags: Vec::new(),
        }
    }

    /// True when an API key is configured
    pub fn is_authenticated(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

impl FromStr for PlatformConfig {
    type Err = FlowError;

    /// Parse the compact form: `server=...; api_key=...; tags=a,b`
    ///
    /// Keys may appear in any order; `server` is required. Unknown keys are
    /// rejected so typos do not silently lose settings.
    fn from_str(input: &str) -> FlowResult<Self> {
        let mut server = None;
        let mut api_key = None;
        let mut avoid_duplicate_uploads = false;
        let mut tags = Vec::new();

        for segment in input.split(';') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            let Some((key, value)) = segment.split_once('=') else {
                return Err(FlowError::ConfigError(format!(
                    "expected key=value, got '{segment}'"
                )));
            };
            let key = key.trim();
            let value = value.trim();
            match key {
                "server" => server = Some(value.to_string()),
                "api_key" => api_key = Some(value.to_string()),
                "avoid_duplicate_uploads" => {
                    avoid_duplicate_uploads = match value {
                        "true" => true,
                        "false" => false,
                        other => {
                            return Err(FlowError::ConfigError(format!(
                                "avoid_duplicate_uploads must be true or false, got '{other}'"
                            )))
                        }
                    }
                }
                "tags" => {
                    tags = value
                        .split(',')
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .map(str::to_string)
                        .collect()
                }
                other => {
                    return Err(FlowError::ConfigError(format!("unknown key '{other}'")));
                }
            }
        }

        let server = server
            .ok_or_else(|| FlowError::ConfigError("missing required key 'server'".to_string()))?;

        Ok(Self {
            server,
            api_key,
            avoid_duplicate_uploads,
            tags,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Test parsing the full compact form
    #[test]
    fn test_parse_compact_form() {
        let config: PlatformConfig =
            "server=https://flows.example.org/; avoid_duplicate_uploads=true; \
             api_key=8baa83ecddfe44b561fd3d92442e3319; tags=cim-flow,learn"
                .parse()
                .unwrap();

        assert_eq!(config.server, "https://flows.example.org/");
        assert_eq!(
            config.api_key.as_deref(),
            Some("8baa83ecddfe44b561fd3d92442e3319")
        );
        assert!(config.avoid_duplicate_uploads);
        assert_eq!(config.tags, vec!["cim-flow", "learn"]);
        assert!(config.is_authenticated());
    }

    /// Test defaults when only the server is given
    #[test]
    fn test_parse_minimal_form() {
        let config: PlatformConfig = "server=https://flows.example.org/".parse().unwrap();
        assert!(config.api_key.is_none());
        assert!(!config.avoid_duplicate_uploads);
        assert!(config.tags.is_empty());
        assert!(!config.is_authenticated());
    }

    /// Test the server key is required
    #[test]
    fn test_missing_server_rejected() {
        let err = "api_key=abc".parse::<PlatformConfig>().unwrap_err();
        assert!(matches!(err, FlowError::ConfigError(_)));
        assert!(err.to_string().contains("server"));
    }

    /// Test unknown keys are rejected
    #[test]
    fn test_unknown_key_rejected() {
        let err = "server=x; api_kye=abc".parse::<PlatformConfig>().unwrap_err();
        assert!(err.to_string().contains("api_kye"));
    }

    /// Test malformed segments are rejected
    #[test]
    fn test_malformed_segment_rejected() {
        let err = "server=x; just-a-word".parse::<PlatformConfig>().unwrap_err();
        assert!(matches!(err, FlowError::ConfigError(_)));
    }

    /// Test structured deserialization rejects unknown fields
    #[test]
    fn test_serde_deny_unknown_fields() {
        let ok: PlatformConfig =
            serde_json::from_str("{\"server\":\"https://x/\",\"tags\":[\"a\"]}").unwrap();
        assert_eq!(ok.tags, vec!["a"]);

        let err = serde_json::from_str::<PlatformConfig>(
            "{\"server\":\"https://x/\",\"api_kye\":\"oops\"}",
        );
        assert!(err.is_err());
    }
}
