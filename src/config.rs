use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::core::{
    encoding::default_columns, AuditPolicy, AuditRule, ColumnMapping, ContractError,
    FeatureContract, PolicyError, PolicyPreset,
};
use crate::core::audit::AUDIT_PASSED_NOTE;
use crate::models::Label;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub model: ModelSettings,
    #[serde(default)]
    pub features: FeatureSettings,
    #[serde(default)]
    pub decision: DecisionSettings,
    #[serde(default)]
    pub policy: PolicySettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
    /// Empty means any origin is allowed
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
            cors_allowed_origins: Vec::new(),
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8000 }

/// What to do when the model file cannot be loaded at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadFailurePolicy {
    /// Keep serving; predict answers 503
    #[default]
    Reject,
    /// Serve a fixed label from `mock_label`
    Mock,
    /// Exit at startup
    Abort,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelSettings {
    #[serde(default = "default_model_path")]
    pub path: String,
    #[serde(default)]
    pub on_load_failure: LoadFailurePolicy,
    #[serde(default = "default_mock_label")]
    pub mock_label: Label,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            path: default_model_path(),
            on_load_failure: LoadFailurePolicy::default(),
            mock_label: default_mock_label(),
        }
    }
}

fn default_model_path() -> String { "models/fair_model.json".to_string() }
fn default_mock_label() -> Label { Label::One }

#[derive(Debug, Clone, Deserialize)]
pub struct FeatureSettings {
    #[serde(default = "default_columns")]
    pub columns: Vec<ColumnMapping>,
}

impl Default for FeatureSettings {
    fn default() -> Self {
        Self { columns: default_columns() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DecisionSettings {
    #[serde(default = "default_approved_label")]
    pub approved_label: Label,
}

impl Default for DecisionSettings {
    fn default() -> Self {
        Self { approved_label: default_approved_label() }
    }
}

fn default_approved_label() -> Label { Label::One }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PolicySettings {
    #[serde(default)]
    pub preset: PolicyPreset,
    /// Replaces the preset's rule table when set
    pub rules: Option<Vec<AuditRule>>,
    pub default_note: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

/// Settings that deserialized but describe an unusable service
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid feature contract: {0}")]
    Contract(#[from] ContractError),

    #[error("invalid audit policy: {0}")]
    Policy(#[from] PolicyError),
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with GUARDRAIL_)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., GUARDRAIL__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("GUARDRAIL")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("GUARDRAIL")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    pub fn feature_contract(&self) -> Result<FeatureContract, SettingsError> {
        Ok(FeatureContract::new(self.features.columns.clone())?)
    }

    /// Build the audit policy, custom rules taking precedence over the preset
    pub fn audit_policy(&self) -> Result<AuditPolicy, SettingsError> {
        let policy = &self.policy;
        if policy.rules.is_none() && policy.default_note.is_none() {
            return Ok(AuditPolicy::preset(policy.preset));
        }

        let (version, rules) = match &policy.rules {
            Some(rules) => ("custom", rules.clone()),
            None => (
                policy.preset.name(),
                AuditPolicy::preset(policy.preset).rules().to_vec(),
            ),
        };
        let note = policy
            .default_note
            .clone()
            .unwrap_or_else(|| AUDIT_PASSED_NOTE.to_string());

        Ok(AuditPolicy::new(version, rules, note)?)
    }
}
