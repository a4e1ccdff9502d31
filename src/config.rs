//! Provider configuration
//!
//! Attributes set in configuration win; otherwise the environment is
//! consulted, then built-in defaults.

use serde::{Deserialize, Serialize};

use crate::error::{ProviderError, Result};

/// Environment variable holding the server `host:port`
pub const ENV_ADDRESS: &str = "TEMPORAL_CLI_ADDRESS";
/// Environment variable holding the namespace
pub const ENV_NAMESPACE: &str = "TEMPORAL_NAMESPACE";
/// Any non-empty value switches logging to debug
pub const ENV_DEBUG: &str = "TF_DEBUG";

const DEFAULT_NAMESPACE: &str = "default";

/// Provider block as written by the user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// `host:port` of the Temporal server. Overrides TEMPORAL_CLI_ADDRESS
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostport: Option<String>,

    /// Temporal namespace. Overrides TEMPORAL_NAMESPACE or "default"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// Configuration after defaults and environment have been applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedConfig {
    pub hostport: String,
    pub namespace: String,
    /// Client identity reported to the server (`terraform@<host>`)
    pub identity: String,
    pub debug: bool,
}

impl ProviderConfig {
    pub fn with_hostport(mut self, hostport: impl Into<String>) -> Self {
        self.hostport = Some(hostport.into());
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Resolve against the process environment
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.resolve_with(|key| std::env::var(key).ok())
    }

    /// Resolve against an arbitrary variable lookup
    pub fn resolve_with<F>(&self, lookup: F) -> Result<ResolvedConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let hostport = non_blank(&self.hostport)
            .or_else(|| env(ENV_ADDRESS))
            .ok_or_else(|| {
                ProviderError::Config(format!(
                    "attribute 'hostport' or environment '{}' must be set",
                    ENV_ADDRESS
                ))
            })?;

        let namespace = non_blank(&self.namespace)
            .or_else(|| env(ENV_NAMESPACE))
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());

        let host = env("HOSTNAME").unwrap_or_else(|| "unknown".to_string());

        Ok(ResolvedConfig {
            hostport,
            namespace,
            identity: format!("terraform@{}", host),
            debug: debug_requested(&lookup),
        })
    }
}

/// Whether `TF_DEBUG` asks for debug logging
pub fn debug_requested<F>(lookup: F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup(ENV_DEBUG).map_or(false, |v| !v.trim().is_empty())
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_values_win() {
        let config = ProviderConfig::default()
            .with_hostport("temporal:7233")
            .with_namespace("orders");
        let resolved = config
            .resolve_with(lookup(&[
                (ENV_ADDRESS, "env:7233"),
                (ENV_NAMESPACE, "env-ns"),
            ]))
            .unwrap();
        assert_eq!(resolved.hostport, "temporal:7233");
        assert_eq!(resolved.namespace, "orders");
    }

    #[test]
    fn test_environment_fallback() {
        let resolved = ProviderConfig::default()
            .resolve_with(lookup(&[
                (ENV_ADDRESS, "env:7233"),
                (ENV_NAMESPACE, "env-ns"),
                ("HOSTNAME", "runner-1"),
                (ENV_DEBUG, "1"),
            ]))
            .unwrap();
        assert_eq!(resolved.hostport, "env:7233");
        assert_eq!(resolved.namespace, "env-ns");
        assert_eq!(resolved.identity, "terraform@runner-1");
        assert!(resolved.debug);
    }

    #[test]
    fn test_defaults() {
        let resolved = ProviderConfig::default()
            .with_hostport("localhost:7233")
            .resolve_with(lookup(&[]))
            .unwrap();
        assert_eq!(resolved.namespace, "default");
        assert_eq!(resolved.identity, "terraform@unknown");
        assert!(!resolved.debug);
    }

    #[test]
    fn test_missing_hostport() {
        let err = ProviderConfig::default()
            .resolve_with(lookup(&[]))
            .unwrap_err();
        assert!(matches!(err, ProviderError::Config(_)));
        assert!(err.to_string().contains("TEMPORAL_CLI_ADDRESS"));
    }

    #[test]
    fn test_blank_values_are_unset() {
        let resolved = ProviderConfig::default()
            .with_hostport("  ")
            .with_namespace("")
            .resolve_with(lookup(&[(ENV_ADDRESS, "env:7233"), (ENV_NAMESPACE, " ")]))
            .unwrap();
        assert_eq!(resolved.hostport, "env:7233");
        assert_eq!(resolved.namespace, "default");
    }

    #[test]
    fn test_debug_requested() {
        assert!(debug_requested(lookup(&[(ENV_DEBUG, "1")])));
        assert!(!debug_requested(lookup(&[(ENV_DEBUG, " ")])));
        assert!(!debug_requested(lookup(&[])));

        let resolved = ProviderConfig::default()
            .with_hostport("localhost:7233")
            .resolve_with(lookup(&[(ENV_DEBUG, "")]))
            .unwrap();
        assert!(!resolved.debug);
    }

    #[test]
    fn test_config_deserialize() {
        let config: ProviderConfig =
            serde_json::from_str(r#"{"hostport": "temporal:7233"}"#).unwrap();
        assert_eq!(config.hostport.as_deref(), Some("temporal:7233"));
        assert_eq!(config.namespace, None);
    }
}
