//! Startup configuration, resolved once and passed by reference.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

pub const ENV_COMPLETION_ENDPOINT: &str = "AZURE_OPENAI_ENDPOINT";
pub const ENV_COMPLETION_API_KEY: &str = "AZURE_OPENAI_API_KEY";
pub const ENV_EXECUTION_ENDPOINT: &str = "EXECUTION_API_ENDPOINT";

const DEFAULT_PROMPT_DIR: &str = "prompt";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variables: {0}")]
    MissingVariables(String),

    #[error("Invalid URL in {variable}: {source}")]
    InvalidUrl {
        variable: &'static str,
        source: url::ParseError,
    },
}

/// Everything the pipeline needs to talk to the outside world.
///
/// Built once at process start; a missing variable fails here instead of
/// surfacing later as an authentication or connection error.
#[derive(Debug, Clone)]
pub struct Config {
    /// Full URL of the chat-completion endpoint.
    pub completion_endpoint: Url,
    pub completion_api_key: String,
    /// Base URL of the code-execution service; always ends with `/`.
    pub execution_endpoint: Url,
    /// Directory holding `<purpose>/prompt.txt` templates.
    pub prompt_dir: PathBuf,
    /// Applied to every outbound HTTP call.
    pub request_timeout: Duration,
}

impl Config {
    /// Read the three required variables, after a best-effort `.env` load.
    ///
    /// All missing variables are reported in a single error.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let completion_endpoint = std::env::var(ENV_COMPLETION_ENDPOINT).ok();
        let completion_api_key = std::env::var(ENV_COMPLETION_API_KEY).ok();
        let execution_endpoint = std::env::var(ENV_EXECUTION_ENDPOINT).ok();

        let mut missing_vars = Vec::new();
        if completion_endpoint.is_none() {
            missing_vars.push(ENV_COMPLETION_ENDPOINT);
        }
        if completion_api_key.is_none() {
            missing_vars.push(ENV_COMPLETION_API_KEY);
        }
        if execution_endpoint.is_none() {
            missing_vars.push(ENV_EXECUTION_ENDPOINT);
        }
        if !missing_vars.is_empty() {
            return Err(ConfigError::MissingVariables(missing_vars.join(", ")));
        }

        match (completion_endpoint, completion_api_key, execution_endpoint) {
            (Some(endpoint), Some(api_key), Some(execution)) => {
                Self::from_parts(&endpoint, api_key, &execution)
            }
            _ => unreachable!("missing variables reported above"),
        }
    }

    /// Build a configuration from explicit values, validating both URLs.
    pub fn from_parts(
        completion_endpoint: &str,
        completion_api_key: String,
        execution_endpoint: &str,
    ) -> Result<Self, ConfigError> {
        let completion_endpoint =
            Url::parse(completion_endpoint).map_err(|source| ConfigError::InvalidUrl {
                variable: ENV_COMPLETION_ENDPOINT,
                source,
            })?;

        let mut execution_endpoint =
            Url::parse(execution_endpoint).map_err(|source| ConfigError::InvalidUrl {
                variable: ENV_EXECUTION_ENDPOINT,
                source,
            })?;
        // Url::join treats a path without a trailing slash as a file name.
        if !execution_endpoint.path().ends_with('/') {
            let path = format!("{}/", execution_endpoint.path());
            execution_endpoint.set_path(&path);
        }

        Ok(Self {
            completion_endpoint,
            completion_api_key,
            execution_endpoint,
            prompt_dir: PathBuf::from(DEFAULT_PROMPT_DIR),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_parts_normalizes_execution_base() {
        let config = Config::from_parts(
            "https://example.openai.azure.com/chat/completions",
            "key".to_string(),
            "http://127.0.0.1:8000",
        )
        .unwrap();

        assert_eq!(config.execution_endpoint.as_str(), "http://127.0.0.1:8000/");
        assert_eq!(config.prompt_dir, PathBuf::from("prompt"));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn from_parts_rejects_bad_url() {
        let err = Config::from_parts("not a url", "key".to_string(), "http://127.0.0.1:8000")
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidUrl {
                variable: ENV_COMPLETION_ENDPOINT,
                ..
            }
        ));
    }

    #[test]
    fn from_env_reports_every_missing_variable() {
        // Serialized in one test: the variables are process-wide state.
        std::env::remove_var(ENV_COMPLETION_ENDPOINT);
        std::env::remove_var(ENV_COMPLETION_API_KEY);
        std::env::remove_var(ENV_EXECUTION_ENDPOINT);

        let err = Config::from_env().unwrap_err();
        let message = err.to_string();
        assert!(message.contains(ENV_COMPLETION_ENDPOINT));
        assert!(message.contains(ENV_COMPLETION_API_KEY));
        assert!(message.contains(ENV_EXECUTION_ENDPOINT));

        std::env::set_var(ENV_COMPLETION_ENDPOINT, "https://example.test/completions");
        std::env::set_var(ENV_COMPLETION_API_KEY, "key");
        std::env::set_var(ENV_EXECUTION_ENDPOINT, "http://127.0.0.1:8000");

        let config = Config::from_env().unwrap();
        assert_eq!(config.completion_api_key, "key");

        std::env::remove_var(ENV_COMPLETION_ENDPOINT);
        std::env::remove_var(ENV_COMPLETION_API_KEY);
        std::env::remove_var(ENV_EXECUTION_ENDPOINT);
    }
}
