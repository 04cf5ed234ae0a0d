//! Configuration management for Margie
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.
//!
//! Precedence, lowest first: built-in defaults, the optional YAML file, then
//! environment variables. A `.env` file in the working directory is loaded
//! into the environment at startup without overriding variables that are
//! already set.

use crate::agent::DEFAULT_SYSTEM_PROMPT;
use crate::cli::{Cli, Commands};
use crate::error::{MargieError, Result};
use crate::rag::{Composer, QueryType, RetrievalConfig};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Azure OpenAI API version used when none is configured
pub const DEFAULT_API_VERSION: &str = "2024-12-01-preview";

/// Address the chat UI listens on when none is configured
pub const DEFAULT_BIND: &str = "127.0.0.1:8501";

/// Main configuration structure for Margie
///
/// Read once at startup and shared immutably afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Hosted chat-completion service
    #[serde(default)]
    pub openai: OpenAiConfig,
    /// Search index the answers are grounded in
    #[serde(default)]
    pub search: SearchConfig,
    /// Conversation behavior
    #[serde(default)]
    pub assistant: AssistantConfig,
    /// Chat UI server
    #[serde(default)]
    pub server: ServerConfig,
}

/// Azure OpenAI resource settings
#[derive(Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Resource base URL (`OPENAI_ENDPOINT`)
    #[serde(default)]
    pub endpoint: String,

    /// Resource key (`OPENAI_API_KEY`)
    #[serde(default)]
    pub api_key: String,

    /// Chat deployment name (`CHAT_MODEL`)
    #[serde(default)]
    pub chat_model: String,

    /// REST API version (`MARGIE_API_VERSION`)
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// HTTP client timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_timeout() -> u64 {
    600
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            chat_model: String::new(),
            api_version: default_api_version(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &redact(&self.api_key))
            .field("chat_model", &self.chat_model)
            .field("api_version", &self.api_version)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

/// Azure AI Search settings
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Search service base URL (`SEARCH_ENDPOINT`)
    #[serde(default)]
    pub endpoint: String,

    /// Search service key (`SEARCH_API_KEY`)
    #[serde(default)]
    pub api_key: String,

    /// Index to query (`INDEX_NAME`)
    #[serde(default)]
    pub index_name: String,

    /// Embedding deployment used for vector queries (`EMBEDDING_MODEL`)
    #[serde(default)]
    pub embedding_model: String,

    /// Matching strategy (`MARGIE_QUERY_TYPE`)
    #[serde(default)]
    pub query_type: QueryType,
}

impl fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &redact(&self.api_key))
            .field("index_name", &self.index_name)
            .field("embedding_model", &self.embedding_model)
            .field("query_type", &self.query_type)
            .finish()
    }
}

/// Conversation behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Instruction seeded as the first message of every conversation
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
        }
    }
}

/// Chat UI server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address (`MARGIE_BIND`, `serve --bind`)
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Minutes of inactivity before a browser session is dropped
    #[serde(default = "default_session_idle_minutes")]
    pub session_idle_minutes: u64,

    /// Most browser sessions kept at once
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

fn default_session_idle_minutes() -> u64 {
    60
}

fn default_max_sessions() -> usize {
    1000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            session_idle_minutes: default_session_idle_minutes(),
            max_sessions: default_max_sessions(),
        }
    }
}

impl ServerConfig {
    /// How long an unused browser session is kept
    pub fn session_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.session_idle_minutes.saturating_mul(60))
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

/// Reads an environment variable, treating blank values as unset
fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Optional path to a YAML configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the merged configuration; call [`Config::validate`] before use
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: Option<&str>, cli: &Cli) -> Result<Self> {
        let mut config = match path {
            Some(path) if Path::new(path).exists() => Self::from_file(path)?,
            Some(path) => {
                tracing::warn!("Config file not found at {}, using defaults", path);
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        tracing::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Parse a YAML configuration file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or is not valid YAML
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| MargieError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| MargieError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Some(endpoint) = env_value("OPENAI_ENDPOINT") {
            self.openai.endpoint = endpoint;
        }

        if let Some(api_key) = env_value("OPENAI_API_KEY") {
            self.openai.api_key = api_key;
        }

        if let Some(chat_model) = env_value("CHAT_MODEL") {
            self.openai.chat_model = chat_model;
        }

        if let Some(api_version) = env_value("MARGIE_API_VERSION") {
            self.openai.api_version = api_version;
        }

        if let Some(embedding_model) = env_value("EMBEDDING_MODEL") {
            self.search.embedding_model = embedding_model;
        }

        if let Some(endpoint) = env_value("SEARCH_ENDPOINT") {
            self.search.endpoint = endpoint;
        }

        if let Some(api_key) = env_value("SEARCH_API_KEY") {
            self.search.api_key = api_key;
        }

        if let Some(index_name) = env_value("INDEX_NAME") {
            self.search.index_name = index_name;
        }

        if let Some(query_type) = env_value("MARGIE_QUERY_TYPE") {
            match query_type.parse() {
                Ok(value) => self.search.query_type = value,
                Err(_) => tracing::warn!("Invalid MARGIE_QUERY_TYPE: {}", query_type),
            }
        }

        if let Some(bind) = env_value("MARGIE_BIND") {
            self.server.bind = bind;
        }
    }

    fn apply_cli_overrides(&mut self, cli: &Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        if let Commands::Serve {
            bind: Some(bind), ..
        } = &cli.command
        {
            self.server.bind = bind.clone();
        }
    }

    /// Validate the configuration
    ///
    /// Every required setting must be present, and both endpoints must be
    /// http(s) URLs.
    ///
    /// # Errors
    ///
    /// Returns `ConfigIncomplete` naming each missing environment variable,
    /// or `Config` for a malformed value
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("OPENAI_ENDPOINT", &self.openai.endpoint),
            ("OPENAI_API_KEY", &self.openai.api_key),
            ("CHAT_MODEL", &self.openai.chat_model),
            ("EMBEDDING_MODEL", &self.search.embedding_model),
            ("SEARCH_ENDPOINT", &self.search.endpoint),
            ("SEARCH_API_KEY", &self.search.api_key),
            ("INDEX_NAME", &self.search.index_name),
        ];
        let missing: Vec<String> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(MargieError::ConfigIncomplete(missing).into());
        }

        validate_endpoint("OPENAI_ENDPOINT", &self.openai.endpoint)?;
        validate_endpoint("SEARCH_ENDPOINT", &self.search.endpoint)?;

        if self.openai.api_version.trim().is_empty() {
            return Err(MargieError::Config("api_version cannot be empty".to_string()).into());
        }

        if self.openai.timeout_seconds == 0 {
            return Err(
                MargieError::Config("timeout_seconds must be greater than 0".to_string()).into(),
            );
        }

        if self.server.bind.trim().is_empty() {
            return Err(MargieError::Config("bind address cannot be empty".to_string()).into());
        }

        if self.server.session_idle_minutes == 0 || self.server.max_sessions == 0 {
            return Err(MargieError::Config(
                "session_idle_minutes and max_sessions must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }

    /// Search settings attached to every request
    pub fn retrieval(&self) -> RetrievalConfig {
        RetrievalConfig {
            endpoint: self.search.endpoint.clone(),
            index_name: self.search.index_name.clone(),
            api_key: self.search.api_key.clone(),
            query_type: self.search.query_type,
            embedding_deployment: self.search.embedding_model.clone(),
        }
    }

    /// Request composer for the configured chat deployment and index
    pub fn composer(&self) -> Composer {
        Composer::new(self.openai.chat_model.clone(), self.retrieval())
    }
}

fn validate_endpoint(name: &str, value: &str) -> Result<()> {
    let url = Url::parse(value)
        .map_err(|e| MargieError::Config(format!("{} is not a valid URL: {}", name, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(MargieError::Config(format!(
            "{} must use http or https, got {}",
            name, other
        ))
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{assert_error_contains, test_config};
    use clap::Parser;
    use serial_test::serial;

    const ENV_VARS: [&str; 10] = [
        "OPENAI_ENDPOINT",
        "OPENAI_API_KEY",
        "CHAT_MODEL",
        "EMBEDDING_MODEL",
        "SEARCH_ENDPOINT",
        "SEARCH_API_KEY",
        "INDEX_NAME",
        "MARGIE_API_VERSION",
        "MARGIE_QUERY_TYPE",
        "MARGIE_BIND",
    ];

    fn clear_env() {
        for name in ENV_VARS {
            std::env::remove_var(name);
        }
    }

    fn chat_cli() -> Cli {
        Cli::try_parse_from(["margie", "chat"]).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.openai.api_version, "2024-12-01-preview");
        assert_eq!(config.openai.timeout_seconds, 600);
        assert_eq!(config.search.query_type, QueryType::Vector);
        assert_eq!(config.assistant.system_prompt, DEFAULT_SYSTEM_PROMPT);
        assert_eq!(config.server.bind, "127.0.0.1:8501");
        assert_eq!(config.server.session_idle_timeout(), Duration::from_secs(3600));
        assert_eq!(config.server.max_sessions, 1000);
    }

    #[test]
    fn test_validation_rejects_unbounded_sessions() {
        let mut config = test_config();
        config.server.max_sessions = 0;
        assert_error_contains(config.validate(), "max_sessions");

        let mut config = test_config();
        config.server.session_idle_minutes = 0;
        assert_error_contains(config.validate(), "session_idle_minutes");
    }

    #[test]
    fn test_config_validation_success() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn test_validation_lists_every_missing_variable() {
        let err = Config::default().validate().unwrap_err();
        match err.downcast_ref::<MargieError>() {
            Some(MargieError::ConfigIncomplete(missing)) => assert_eq!(
                missing,
                &vec![
                    "OPENAI_ENDPOINT",
                    "OPENAI_API_KEY",
                    "CHAT_MODEL",
                    "EMBEDDING_MODEL",
                    "SEARCH_ENDPOINT",
                    "SEARCH_API_KEY",
                    "INDEX_NAME",
                ]
            ),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_validation_names_single_missing_variable() {
        let mut config = test_config();
        config.search.index_name = "  ".to_string();
        assert_error_contains(config.validate(), "missing: INDEX_NAME");
    }

    #[test]
    fn test_validation_rejects_non_http_endpoint() {
        let mut config = test_config();
        config.openai.endpoint = "ftp://openai.example.net".to_string();
        assert_error_contains(config.validate(), "OPENAI_ENDPOINT must use http or https");

        let mut config = test_config();
        config.search.endpoint = "not a url".to_string();
        assert_error_contains(config.validate(), "SEARCH_ENDPOINT is not a valid URL");
    }

    #[test]
    fn test_validation_rejects_zero_timeout() {
        let mut config = test_config();
        config.openai.timeout_seconds = 0;
        assert_error_contains(config.validate(), "timeout_seconds");
    }

    #[test]
    fn test_debug_redacts_keys() {
        let rendered = format!("{:?}", test_config());
        assert!(!rendered.contains("openai-secret"));
        assert!(!rendered.contains("search-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_composer_uses_chat_model_and_index() {
        let composer = test_config().composer();
        assert_eq!(composer.model(), "gpt-4o");
        assert_eq!(composer.retrieval().index_name, "margies-travel");
        assert_eq!(
            composer.retrieval().embedding_deployment,
            "text-embedding-ada-002"
        );
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
openai:
  endpoint: https://yaml.openai.example.net
  chat_model: gpt-35-turbo
search:
  query_type: hybrid
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.openai.endpoint, "https://yaml.openai.example.net");
        assert_eq!(config.openai.chat_model, "gpt-35-turbo");
        assert_eq!(config.openai.api_version, DEFAULT_API_VERSION);
        assert_eq!(config.search.query_type, QueryType::Hybrid);
        assert_eq!(config.server.bind, DEFAULT_BIND);
    }

    #[test]
    #[serial]
    fn test_env_vars_override_file() {
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("margie.yaml");
        std::fs::write(
            &path,
            "openai:\n  endpoint: https://yaml.example.net\n  chat_model: from-yaml\n",
        )
        .unwrap();

        std::env::set_var("CHAT_MODEL", "from-env");
        std::env::set_var("MARGIE_QUERY_TYPE", "text");
        let config = Config::load(path.to_str(), &chat_cli()).unwrap();
        clear_env();

        assert_eq!(config.openai.endpoint, "https://yaml.example.net");
        assert_eq!(config.openai.chat_model, "from-env");
        assert_eq!(config.search.query_type, QueryType::Text);
    }

    #[test]
    #[serial]
    fn test_blank_and_invalid_env_values_are_ignored() {
        clear_env();
        std::env::set_var("INDEX_NAME", "   ");
        std::env::set_var("MARGIE_QUERY_TYPE", "semantic");
        let config = Config::load(None, &chat_cli()).unwrap();
        clear_env();

        assert!(config.search.index_name.is_empty());
        assert_eq!(config.search.query_type, QueryType::Vector);
    }

    #[test]
    #[serial]
    fn test_bind_flag_overrides_env() {
        clear_env();
        std::env::set_var("MARGIE_BIND", "0.0.0.0:9000");
        let from_env = Config::load(None, &chat_cli()).unwrap();

        let cli = Cli::try_parse_from(["margie", "serve", "--bind", "127.0.0.1:7000"]).unwrap();
        let from_flag = Config::load(None, &cli).unwrap();
        clear_env();

        assert_eq!(from_env.server.bind, "0.0.0.0:9000");
        assert_eq!(from_flag.server.bind, "127.0.0.1:7000");
    }

    #[test]
    #[serial]
    fn test_missing_file_falls_back_to_defaults() {
        clear_env();
        let config = Config::load(Some("/nonexistent/margie.yaml"), &chat_cli()).unwrap();
        assert_eq!(config.openai.api_version, DEFAULT_API_VERSION);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, "openai: [unterminated").unwrap();
        assert_error_contains(
            Config::from_file(path.to_str().unwrap()),
            "Failed to parse config",
        );
    }
}
