//! Configuration management for NotesAI
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::context::ContextFormat;
use crate::error::{NotesAiError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Upper bound accepted for `assistant.timeout_seconds`
const MAX_TIMEOUT_SECONDS: u64 = 600;

/// Main configuration structure for NotesAI
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Completion provider configuration (OpenAI-compatible, Ollama)
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Context formatting and answer handling
    #[serde(default)]
    pub assistant: AssistantConfig,
    /// Note storage location
    #[serde(default)]
    pub storage: StorageConfig,
    /// Caller identity
    #[serde(default)]
    pub identity: IdentityConfig,
}

/// Provider configuration
///
/// Specifies which completion service to use and its settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Type of provider to use
    #[serde(rename = "type", default = "default_provider_type")]
    pub provider_type: String,

    /// OpenAI-compatible endpoint configuration
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Ollama configuration
    #[serde(default)]
    pub ollama: OllamaConfig,
}

fn default_provider_type() -> String {
    "openai".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_type: default_provider_type(),
            openai: OpenAiConfig::default(),
            ollama: OllamaConfig::default(),
        }
    }
}

/// OpenAI-compatible endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Base URL; `/chat/completions` is appended
    #[serde(default = "default_openai_api_base")]
    pub api_base: String,

    /// Model identifier sent with each request
    #[serde(default = "default_openai_model")]
    pub model: String,

    /// Inline API key; prefer `api_key_env`
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Environment variable holding the API key
    #[serde(default = "default_openai_api_key_env")]
    pub api_key_env: String,
}

fn default_openai_api_base() -> String {
    "https://api.deepseek.com".to_string()
}

fn default_openai_model() -> String {
    "deepseek-chat".to_string()
}

fn default_openai_api_key_env() -> String {
    "DEEPSEEK_API_KEY".to_string()
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_base: default_openai_api_base(),
            model: default_openai_model(),
            api_key: None,
            api_key_env: default_openai_api_key_env(),
        }
    }
}

/// Ollama provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Ollama server host
    #[serde(default = "default_ollama_host")]
    pub host: String,

    /// Model to use
    #[serde(default = "default_ollama_model")]
    pub model: String,
}

fn default_ollama_host() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2:latest".to_string()
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: default_ollama_host(),
            model: default_ollama_model(),
        }
    }
}

/// Assistant behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// How notes are serialized into the context message
    #[serde(default)]
    pub context_format: ContextFormat,

    /// Strip active content from answers
    #[serde(default = "default_sanitize_answers")]
    pub sanitize_answers: bool,

    /// Per-request transport timeout
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_sanitize_answers() -> bool {
    true
}

fn default_timeout() -> u64 {
    120
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            context_format: ContextFormat::default(),
            sanitize_answers: default_sanitize_answers(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl AssistantConfig {
    /// Transport timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Note storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database path; platform data dir when unset
    #[serde(default)]
    pub db_path: Option<String>,
}

/// Caller identity configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// User the CLI acts as; unset means anonymous
    #[serde(default)]
    pub user_id: Option<String>,
}

impl Config {
    /// Load configuration from file, environment, and CLI overrides
    ///
    /// A missing file is not an error: defaults are used and a warning is
    /// logged.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the YAML configuration file
    /// * `cli` - Parsed command line, applied last
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| NotesAiError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| NotesAiError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        // Provider overrides
        if let Ok(provider_type) = std::env::var("NOTESAI_PROVIDER") {
            self.provider.provider_type = provider_type;
        }

        if let Ok(api_base) = std::env::var("NOTESAI_OPENAI_API_BASE") {
            self.provider.openai.api_base = api_base;
        }

        if let Ok(model) = std::env::var("NOTESAI_OPENAI_MODEL") {
            self.provider.openai.model = model;
        }

        if let Ok(ollama_host) = std::env::var("NOTESAI_OLLAMA_HOST") {
            self.provider.ollama.host = ollama_host;
        }

        if let Ok(ollama_model) = std::env::var("NOTESAI_OLLAMA_MODEL") {
            self.provider.ollama.model = ollama_model;
        }

        // Assistant overrides
        if let Ok(format) = std::env::var("NOTESAI_CONTEXT_FORMAT") {
            match ContextFormat::parse_str(&format) {
                Ok(value) => self.assistant.context_format = value,
                Err(_) => tracing::warn!("Invalid NOTESAI_CONTEXT_FORMAT: {}", format),
            }
        }

        if let Ok(timeout) = std::env::var("NOTESAI_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.assistant.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid NOTESAI_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(db_path) = std::env::var("NOTESAI_NOTES_DB") {
            self.storage.db_path = Some(db_path);
        }

        if let Ok(user) = std::env::var("NOTESAI_USER") {
            self.identity.user_id = Some(user);
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        if let Some(user) = &cli.user {
            self.identity.user_id = Some(user.clone());
        }

        if let Some(provider) = &cli.provider {
            tracing::debug!("Using provider override: {}", provider);
            self.provider.provider_type = provider.clone();
        }

        if let Some(model) = &cli.model {
            tracing::debug!("Using model override: {}", model);
            match self.provider.provider_type.as_str() {
                "ollama" => self.provider.ollama.model = model.clone(),
                _ => self.provider.openai.model = model.clone(),
            }
        }
    }

    /// Model of the selected provider
    pub fn active_model(&self) -> &str {
        match self.provider.provider_type.as_str() {
            "ollama" => &self.provider.ollama.model,
            _ => &self.provider.openai.model,
        }
    }

    /// Validate the configuration
    ///
    /// Ensures all configuration values are within acceptable ranges
    /// and that required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.provider.provider_type.is_empty() {
            return Err(NotesAiError::Config("Provider type cannot be empty".to_string()).into());
        }

        let valid_providers = ["openai", "ollama"];
        if !valid_providers.contains(&self.provider.provider_type.as_str()) {
            return Err(NotesAiError::Config(format!(
                "Invalid provider type: {}. Must be one of: {}",
                self.provider.provider_type,
                valid_providers.join(", ")
            ))
            .into());
        }

        if self.assistant.timeout_seconds == 0 {
            return Err(NotesAiError::Config(
                "timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.assistant.timeout_seconds > MAX_TIMEOUT_SECONDS {
            return Err(NotesAiError::Config(format!(
                "timeout_seconds must be less than or equal to {}",
                MAX_TIMEOUT_SECONDS
            ))
            .into());
        }

        match self.provider.provider_type.as_str() {
            "ollama" => validate_url("provider.ollama.host", &self.provider.ollama.host)?,
            _ => validate_url("provider.openai.api_base", &self.provider.openai.api_base)?,
        }

        if self.active_model().trim().is_empty() {
            return Err(NotesAiError::Config(format!(
                "Model for provider {} cannot be empty",
                self.provider.provider_type
            ))
            .into());
        }

        Ok(())
    }
}

fn validate_url(field: &str, value: &str) -> Result<()> {
    let parsed = url::Url::parse(value)
        .map_err(|e| NotesAiError::Config(format!("Invalid {}: {} ({})", field, value, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(NotesAiError::Config(format!(
            "Invalid {}: {} (scheme must be http or https)",
            field, value
        ))
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use serial_test::serial;

    const ENV_VARS: &[&str] = &[
        "NOTESAI_PROVIDER",
        "NOTESAI_OPENAI_API_BASE",
        "NOTESAI_OPENAI_MODEL",
        "NOTESAI_OLLAMA_HOST",
        "NOTESAI_OLLAMA_MODEL",
        "NOTESAI_CONTEXT_FORMAT",
        "NOTESAI_TIMEOUT_SECONDS",
        "NOTESAI_NOTES_DB",
        "NOTESAI_USER",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.provider.provider_type, "openai");
        assert_eq!(config.provider.openai.api_base, "https://api.deepseek.com");
        assert_eq!(config.provider.openai.model, "deepseek-chat");
        assert_eq!(config.assistant.context_format, ContextFormat::Html);
        assert!(config.assistant.sanitize_answers);
        assert_eq!(config.assistant.timeout_seconds, 120);
        assert!(config.identity.user_id.is_none());
    }

    #[test]
    fn test_config_validation_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_empty_provider() {
        let mut config = Config::default();
        config.provider.provider_type = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_invalid_provider() {
        let mut config = Config::default();
        config.provider.provider_type = "bard".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Invalid provider type"));
    }

    #[test]
    fn test_config_validation_zero_timeout() {
        let mut config = Config::default();
        config.assistant.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_timeout_too_large() {
        let mut config = Config::default();
        config.assistant.timeout_seconds = 601;
        assert!(config.validate().is_err());
        config.assistant.timeout_seconds = 600;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_bad_api_base() {
        let mut config = Config::default();
        config.provider.openai.api_base = "not a url".to_string();
        assert!(config.validate().is_err());

        config.provider.openai.api_base = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_checks_only_selected_provider() {
        let mut config = Config::default();
        config.provider.ollama.host = "::bad::".to_string();
        assert!(config.validate().is_ok());

        config.provider.provider_type = "ollama".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_empty_model() {
        let mut config = Config::default();
        config.provider.openai.model = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
provider:
  type: ollama
  ollama:
    host: http://gpu-box:11434
    model: qwen2.5

assistant:
  context_format: plain
  sanitize_answers: false
  timeout_seconds: 30

storage:
  db_path: /tmp/notes.db

identity:
  user_id: alice
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.provider.provider_type, "ollama");
        assert_eq!(config.provider.ollama.host, "http://gpu-box:11434");
        assert_eq!(config.active_model(), "qwen2.5");
        assert_eq!(config.provider.openai.model, "deepseek-chat");
        assert_eq!(config.assistant.context_format, ContextFormat::Plain);
        assert!(!config.assistant.sanitize_answers);
        assert_eq!(config.assistant.timeout(), Duration::from_secs(30));
        assert_eq!(config.storage.db_path.as_deref(), Some("/tmp/notes.db"));
        assert_eq!(config.identity.user_id.as_deref(), Some("alice"));
    }

    #[test]
    fn test_config_from_partial_yaml_fills_defaults() {
        let config: Config = serde_yaml::from_str("assistant:\n  timeout_seconds: 5\n").unwrap();
        assert_eq!(config.provider.provider_type, "openai");
        assert!(config.assistant.sanitize_answers);
        assert_eq!(config.assistant.timeout_seconds, 5);
    }

    #[test]
    fn test_api_key_not_serialized() {
        let mut config = Config::default();
        config.provider.openai.api_key = Some("sk-secret".to_string());
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(!yaml.contains("sk-secret"));
    }

    #[test]
    #[serial]
    fn test_load_nonexistent_file_uses_defaults() {
        clear_env();
        let config = Config::load("nonexistent.yaml", &Cli::default()).unwrap();
        assert_eq!(config.provider.provider_type, "openai");
        assert!(config.identity.user_id.is_none());
    }

    #[test]
    #[serial]
    fn test_load_reads_file() {
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "provider:\n  type: ollama\n").unwrap();

        let config = Config::load(path.to_str().unwrap(), &Cli::default()).unwrap();
        assert_eq!(config.provider.provider_type, "ollama");
    }

    #[test]
    #[serial]
    fn test_load_invalid_yaml_is_error() {
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "provider: [unclosed").unwrap();

        let err = Config::load(path.to_str().unwrap(), &Cli::default()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        std::env::set_var("NOTESAI_PROVIDER", "ollama");
        std::env::set_var("NOTESAI_OLLAMA_MODEL", "mistral");
        std::env::set_var("NOTESAI_CONTEXT_FORMAT", "plain");
        std::env::set_var("NOTESAI_TIMEOUT_SECONDS", "45");
        std::env::set_var("NOTESAI_NOTES_DB", "/tmp/x.db");
        std::env::set_var("NOTESAI_USER", "bob");

        let config = Config::load("nonexistent.yaml", &Cli::default()).unwrap();
        clear_env();

        assert_eq!(config.provider.provider_type, "ollama");
        assert_eq!(config.active_model(), "mistral");
        assert_eq!(config.assistant.context_format, ContextFormat::Plain);
        assert_eq!(config.assistant.timeout_seconds, 45);
        assert_eq!(config.storage.db_path.as_deref(), Some("/tmp/x.db"));
        assert_eq!(config.identity.user_id.as_deref(), Some("bob"));
    }

    #[test]
    #[serial]
    fn test_invalid_env_values_are_ignored() {
        clear_env();
        std::env::set_var("NOTESAI_TIMEOUT_SECONDS", "soon");
        std::env::set_var("NOTESAI_CONTEXT_FORMAT", "pdf");

        let config = Config::load("nonexistent.yaml", &Cli::default()).unwrap();
        clear_env();

        assert_eq!(config.assistant.timeout_seconds, 120);
        assert_eq!(config.assistant.context_format, ContextFormat::Html);
    }

    #[test]
    #[serial]
    fn test_cli_overrides_win_over_env() {
        clear_env();
        std::env::set_var("NOTESAI_USER", "bob");

        let cli = Cli {
            user: Some("alice".to_string()),
            provider: Some("ollama".to_string()),
            model: Some("phi3".to_string()),
            ..Cli::default()
        };
        let config = Config::load("nonexistent.yaml", &cli).unwrap();
        clear_env();

        assert_eq!(config.identity.user_id.as_deref(), Some("alice"));
        assert_eq!(config.provider.provider_type, "ollama");
        assert_eq!(config.provider.ollama.model, "phi3");
        assert_eq!(config.provider.openai.model, "deepseek-chat");
    }
}
