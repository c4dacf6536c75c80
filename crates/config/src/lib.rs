//! Configuration loading, validation, and management for productdesk.
//!
//! Loads configuration from `~/.productdesk/config.toml` with environment
//! variable overrides. Validates all settings at startup. The library crates
//! never read the environment themselves: the binary resolves an [`AppConfig`]
//! and hands it to the components that need it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.productdesk/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default completion provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Orchestration protocol tuning
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_provider() -> String {
    "anthropic".into()
}
fn default_model() -> String {
    "claude-sonnet-4-20250514".into()
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("orchestrator", &self.orchestrator)
            .field("gateway", &self.gateway)
            .field("providers", &self.providers)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

/// Knobs for the consult / assess / backfill / merge protocol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Upper bound on first-round domains (also the fallback selection size).
    #[serde(default = "default_max_selected")]
    pub max_selected: usize,

    /// Upper bound on backfill domains.
    #[serde(default = "default_max_backfill")]
    pub max_backfill: usize,

    /// Characters of each first-round answer shown to the backfill selector.
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,

    /// Ceiling for a single completion call.
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,

    /// Deadline for a whole query, shared by every call it makes.
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,

    /// Sampling temperature for domain agents.
    #[serde(default = "default_agent_temperature")]
    pub agent_temperature: f32,

    /// Output token bound for domain agents.
    #[serde(default = "default_agent_max_tokens")]
    pub agent_max_tokens: u32,

    /// Confidence reported by every domain agent.
    #[serde(default = "default_confidence")]
    pub confidence: f32,
}

fn default_max_selected() -> usize {
    3
}
fn default_max_backfill() -> usize {
    2
}
fn default_preview_chars() -> usize {
    200
}
fn default_call_timeout_secs() -> u64 {
    30
}
fn default_query_timeout_secs() -> u64 {
    120
}
fn default_agent_temperature() -> f32 {
    0.3
}
fn default_agent_max_tokens() -> u32 {
    600
}
fn default_confidence() -> f32 {
    0.5
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_selected: default_max_selected(),
            max_backfill: default_max_backfill(),
            preview_chars: default_preview_chars(),
            call_timeout_secs: default_call_timeout_secs(),
            query_timeout_secs: default_query_timeout_secs(),
            agent_temperature: default_agent_temperature(),
            agent_max_tokens: default_agent_max_tokens(),
            confidence: default_confidence(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    8000
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.productdesk/config.toml).
    ///
    /// Also checks environment variables for API keys:
    /// - `PRODUCTDESK_API_KEY` (highest priority, any provider)
    /// - the vendor variable of the selected provider, e.g. `ANTHROPIC_API_KEY`
    ///   for `anthropic` or `OPENAI_API_KEY` for `openai`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup`.
    ///
    /// Blank variables count as unset. The provider override is applied first
    /// so the key is taken from the variable belonging to that provider.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let nonblank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(provider) = nonblank("PRODUCTDESK_PROVIDER") {
            self.default_provider = provider;
        }

        if let Some(model) = nonblank("PRODUCTDESK_MODEL") {
            self.default_model = model;
        }

        if self.api_key.is_none() {
            self.api_key = nonblank("PRODUCTDESK_API_KEY").or_else(|| {
                vendor_key_var(&self.default_provider).and_then(|var| nonblank(var))
            });
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".productdesk")
    }

    /// Get the configuration file path.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let o = &self.orchestrator;

        if o.max_selected == 0 {
            return Err(ConfigError::ValidationError(
                "orchestrator.max_selected must be at least 1".into(),
            ));
        }

        if o.call_timeout_secs == 0 || o.query_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "orchestrator timeouts must be greater than zero".into(),
            ));
        }

        if o.call_timeout_secs > o.query_timeout_secs {
            return Err(ConfigError::ValidationError(
                "orchestrator.call_timeout_secs cannot exceed query_timeout_secs".into(),
            ));
        }

        if !(0.0..=1.0).contains(&o.agent_temperature) {
            return Err(ConfigError::ValidationError(
                "orchestrator.agent_temperature must be between 0.0 and 1.0".into(),
            ));
        }

        if !(0.0..=1.0).contains(&o.confidence) {
            return Err(ConfigError::ValidationError(
                "orchestrator.confidence must be between 0.0 and 1.0".into(),
            ));
        }

        Ok(())
    }

    /// API key for the given provider: per-provider key first, then the global one.
    pub fn api_key_for(&self, provider: &str) -> Option<String> {
        self.providers
            .get(provider)
            .and_then(|p| p.api_key.clone())
            .or_else(|| self.api_key.clone())
    }

    /// Check if an API key is available for the default provider.
    pub fn has_api_key(&self) -> bool {
        self.api_key_for(&self.default_provider).is_some()
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            orchestrator: OrchestratorConfig::default(),
            gateway: GatewayConfig::default(),
            providers: HashMap::new(),
        }
    }
}

/// The conventional API-key variable for a provider, if it has one.
pub fn vendor_key_var(provider: &str) -> Option<&'static str> {
    match provider {
        "anthropic" => Some("ANTHROPIC_API_KEY"),
        "openai" => Some("OPENAI_API_KEY"),
        "openrouter" => Some("OPENROUTER_API_KEY"),
        "together" => Some("TOGETHER_API_KEY"),
        _ => None,
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.default_provider, "anthropic");
        assert_eq!(config.gateway.port, 8000);
        assert_eq!(config.orchestrator.max_selected, 3);
        assert_eq!(config.orchestrator.max_backfill, 2);
        assert_eq!(config.orchestrator.preview_chars, 200);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.default_provider, config.default_provider);
        assert_eq!(
            parsed.orchestrator.call_timeout_secs,
            config.orchestrator.call_timeout_secs
        );
    }

    #[test]
    fn call_timeout_longer_than_query_rejected() {
        let mut config = AppConfig::default();
        config.orchestrator.call_timeout_secs = 200;
        config.orchestrator.query_timeout_secs = 100;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_selection_rejected() {
        let mut config = AppConfig::default();
        config.orchestrator.max_selected = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn out_of_range_temperature_rejected() {
        let mut config = AppConfig::default();
        config.orchestrator.agent_temperature = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.default_provider, "anthropic");
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_model = "claude-3-5-haiku-20241022"

[orchestrator]
max_selected = 2
query_timeout_secs = 60

[gateway]
port = 9100
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.default_model, "claude-3-5-haiku-20241022");
        assert_eq!(config.orchestrator.max_selected, 2);
        assert_eq!(config.orchestrator.query_timeout_secs, 60);
        assert_eq!(config.orchestrator.max_backfill, 2);
        assert_eq!(config.gateway.port, 9100);
    }

    #[test]
    fn unparseable_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "default_model = [").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn env_key_priority() {
        let mut config = AppConfig::default();
        config.apply_env(env(&[
            ("ANTHROPIC_API_KEY", "sk-ant-env"),
            ("PRODUCTDESK_API_KEY", "sk-pd-env"),
        ]));
        assert_eq!(config.api_key.as_deref(), Some("sk-pd-env"));
    }

    #[test]
    fn env_does_not_replace_file_key() {
        let mut config = AppConfig {
            api_key: Some("from-file".into()),
            ..AppConfig::default()
        };
        config.apply_env(env(&[("ANTHROPIC_API_KEY", "from-env")]));
        assert_eq!(config.api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn blank_env_key_is_ignored() {
        let mut config = AppConfig::default();
        config.apply_env(env(&[("ANTHROPIC_API_KEY", "  ")]));
        assert!(!config.has_api_key());
    }

    #[test]
    fn blank_generic_key_falls_through_to_vendor_key() {
        let mut config = AppConfig::default();
        config.apply_env(env(&[
            ("PRODUCTDESK_API_KEY", ""),
            ("ANTHROPIC_API_KEY", "sk-ant-real"),
        ]));
        assert_eq!(config.api_key.as_deref(), Some("sk-ant-real"));
    }

    #[test]
    fn vendor_key_follows_selected_provider() {
        let mut config = AppConfig::default();
        config.apply_env(env(&[
            ("PRODUCTDESK_PROVIDER", "openai"),
            ("ANTHROPIC_API_KEY", "sk-ant-real"),
            ("OPENAI_API_KEY", "sk-openai-real"),
        ]));
        assert_eq!(config.default_provider, "openai");
        assert_eq!(config.api_key_for("openai").as_deref(), Some("sk-openai-real"));
    }

    #[test]
    fn other_vendor_key_is_not_borrowed() {
        let mut config = AppConfig::default();
        config.apply_env(env(&[
            ("PRODUCTDESK_PROVIDER", "openai"),
            ("ANTHROPIC_API_KEY", "sk-ant-real"),
        ]));
        assert!(!config.has_api_key());
    }

    #[test]
    fn blank_provider_override_is_ignored() {
        let mut config = AppConfig::default();
        config.apply_env(env(&[("PRODUCTDESK_PROVIDER", " ")]));
        assert_eq!(config.default_provider, "anthropic");
    }

    #[test]
    fn env_overrides_provider_and_model() {
        let mut config = AppConfig::default();
        config.apply_env(env(&[
            ("PRODUCTDESK_PROVIDER", "openrouter"),
            ("PRODUCTDESK_MODEL", "anthropic/claude-sonnet-4"),
        ]));
        assert_eq!(config.default_provider, "openrouter");
        assert_eq!(config.default_model, "anthropic/claude-sonnet-4");
    }

    #[test]
    fn per_provider_key_wins() {
        let mut config = AppConfig {
            api_key: Some("global".into()),
            ..AppConfig::default()
        };
        config.providers.insert(
            "anthropic".into(),
            ProviderConfig {
                api_key: Some("scoped".into()),
                api_url: None,
                default_model: None,
            },
        );
        assert_eq!(config.api_key_for("anthropic").as_deref(), Some("scoped"));
        assert_eq!(config.api_key_for("openai").as_deref(), Some("global"));
    }

    #[test]
    fn debug_redacts_secrets() {
        let config = AppConfig {
            api_key: Some("sk-ant-secret".into()),
            ..AppConfig::default()
        };
        let dbg = format!("{config:?}");
        assert!(!dbg.contains("sk-ant-secret"));
        assert!(dbg.contains("[REDACTED]"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("anthropic"));
        assert!(toml_str.contains("max_selected"));
    }
}
