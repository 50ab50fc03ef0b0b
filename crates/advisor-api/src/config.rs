//! Application configuration
//!
//! Read once at start-up from a TOML file; every section has defaults so an
//! absent file yields a usable config. Secrets never live in the file: the
//! file names the environment variables that hold them.

use std::path::{Path, PathBuf};
use std::time::Duration;

use advisor_cloud::MANAGEMENT_ENDPOINT;
use advisor_core::AdvisorError;
use advisor_llm::{LlmError, ModelSettings, ServiceType};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Overrides `plugin.prompts_dir`.
pub const PROMPTS_DIR_ENV: &str = "SEMANTIC_SKILLS_FOLDER";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {message}")]
    Read { path: String, message: String },
    #[error("cannot parse {path}: {message}")]
    Parse { path: String, message: String },
    #[error("environment variable {0} is not set")]
    MissingEnv(String),
    #[error("{0}")]
    Invalid(String),
}

impl From<ConfigError> for AdvisorError {
    fn from(err: ConfigError) -> Self {
        AdvisorError::Config(err.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub plugin: PluginConfig,
    #[serde(default)]
    pub kernel: KernelConfig,
    #[serde(default)]
    pub azure: AzureConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[server]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0:8787".into()
}

/// `[plugin]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Namespace the prompt operations are registered and looked up under.
    #[serde(default = "default_name_for_model")]
    pub name_for_model: String,
    #[serde(default = "default_prompts_dir")]
    pub prompts_dir: PathBuf,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            name_for_model: default_name_for_model(),
            prompts_dir: default_prompts_dir(),
        }
    }
}

fn default_name_for_model() -> String {
    "AzureAdvisor".into()
}
fn default_prompts_dir() -> PathBuf {
    PathBuf::from("Prompts")
}

/// `[kernel]` section: model backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KernelConfig {
    #[serde(default = "default_service_type")]
    pub service_type: String,
    #[serde(default = "default_chat_model")]
    pub chat_deployment_or_model_id: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_deployment_or_model_id: String,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub org_id: String,
    /// Name of the env var holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_model_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            service_type: default_service_type(),
            chat_deployment_or_model_id: default_chat_model(),
            embedding_deployment_or_model_id: default_embedding_model(),
            endpoint: String::new(),
            org_id: String::new(),
            api_key_env: default_api_key_env(),
            api_version: default_api_version(),
            request_timeout_secs: default_model_timeout_secs(),
        }
    }
}

fn default_service_type() -> String {
    "OpenAI".into()
}
fn default_chat_model() -> String {
    "gpt-3.5-turbo".into()
}
fn default_embedding_model() -> String {
    "text-embedding-ada-002".into()
}
fn default_api_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn default_api_version() -> String {
    "2023-05-15".into()
}
fn default_model_timeout_secs() -> u64 {
    120
}

/// `[azure]` section: Resource Manager access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AzureConfig {
    #[serde(default = "default_management_endpoint")]
    pub management_endpoint: String,
    /// Name of the env var holding the bearer token.
    #[serde(default = "default_access_token_env")]
    pub access_token_env: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            management_endpoint: default_management_endpoint(),
            access_token_env: default_access_token_env(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_management_endpoint() -> String {
    MANAGEMENT_ENDPOINT.into()
}
fn default_access_token_env() -> String {
    "AZURE_ACCESS_TOKEN".into()
}
fn default_request_timeout_secs() -> u64 {
    60
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

impl AppConfig {
    /// Loads `path` when given, defaults otherwise, then applies env
    /// overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        if let Ok(dir) = std::env::var(PROMPTS_DIR_ENV) {
            if !dir.trim().is_empty() {
                config.plugin.prompts_dir = PathBuf::from(dir);
            }
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Model settings with the API key resolved from the environment.
    pub fn model_settings(&self) -> Result<ModelSettings, ConfigError> {
        let service_type: ServiceType = self
            .kernel
            .service_type
            .parse()
            .map_err(|e| match e {
                LlmError::Config(msg) => ConfigError::Invalid(msg),
                other => ConfigError::Invalid(other.to_string()),
            })?;
        let api_key = read_secret(&self.kernel.api_key_env)?;

        Ok(ModelSettings {
            service_type,
            chat_model: self.kernel.chat_deployment_or_model_id.clone(),
            embedding_model: self.kernel.embedding_deployment_or_model_id.clone(),
            endpoint: self.kernel.endpoint.clone(),
            api_key,
            org_id: Some(self.kernel.org_id.clone()).filter(|o| !o.is_empty()),
            api_version: self.kernel.api_version.clone(),
        })
    }

    /// Bearer token for Resource Manager; `None` when the variable is unset.
    pub fn access_token(&self) -> Option<String> {
        std::env::var(&self.azure.access_token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.azure.request_timeout_secs.max(1))
    }

    /// Per-request bound for chat and embedding calls.
    pub fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.kernel.request_timeout_secs.max(1))
    }
}

fn read_secret(var: &str) -> Result<String, ConfigError> {
    std::env::var(var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingEnv(var.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.listen, "0.0.0.0:8787");
        assert_eq!(config.plugin.name_for_model, "AzureAdvisor");
        assert_eq!(config.plugin.prompts_dir, PathBuf::from("Prompts"));
        assert_eq!(config.azure.management_endpoint, "https://management.azure.com");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.model_timeout(), Duration::from_secs(120));
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_kernel_timeout_and_legacy_keys() {
        let config: AppConfig = toml::from_str(
            r#"
[kernel]
service_id = "advisor"
request_timeout_secs = 15

[azure]
request_timeout_secs = 0
"#,
        )
        .unwrap();

        assert_eq!(config.model_timeout(), Duration::from_secs(15));
        assert_eq!(config.request_timeout(), Duration::from_secs(1));
        let expected = KernelConfig {
            request_timeout_secs: 15,
            ..KernelConfig::default()
        };
        assert_eq!(config.kernel, expected);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
[plugin]
name_for_model = "Advisor"

[kernel]
service_type = "AzureOpenAI"
endpoint = "https://example.openai.azure.com"
"#,
        )
        .unwrap();

        assert_eq!(config.plugin.name_for_model, "Advisor");
        assert_eq!(config.plugin.prompts_dir, PathBuf::from("Prompts"));
        assert_eq!(config.kernel.service_type, "AzureOpenAI");
        assert_eq!(config.kernel.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.server.listen, "0.0.0.0:8787");
    }

    #[test]
    fn test_from_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = AppConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Read { .. }));

        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[server\nlisten = 1").unwrap();
        assert!(matches!(AppConfig::from_file(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_invalid_service_type() {
        let mut config = AppConfig::default();
        config.kernel.service_type = "Bard".to_string();
        let err = config.model_settings().unwrap_err();
        assert_eq!(err.to_string(), "Invalid service type value: Bard");
    }

    #[test]
    fn test_missing_api_key_env() {
        let mut config = AppConfig::default();
        config.kernel.api_key_env = "ADVISOR_TEST_KEY_THAT_IS_NEVER_SET".to_string();
        assert!(matches!(config.model_settings(), Err(ConfigError::MissingEnv(_))));
    }
}
