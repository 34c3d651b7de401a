//! Client for the external code-execution service.

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::config::Config;

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Request timeout - the execution service took too long to respond")]
    Timeout,

    #[error("Connection error - unable to reach the execution service")]
    Connect,

    #[error("Network error: {0}")]
    Network(reqwest::Error),

    #[error("HTTP error {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Failed to parse execution response as JSON: {0}")]
    MalformedResponse(reqwest::Error),

    #[error("Invalid execution URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Failed to create HTTP client: {0}")]
    ClientBuild(reqwest::Error),
}

/// What `POST /execute` returns. Only `result` matters downstream; it is
/// carried opaque into the card prompt.
#[derive(Deserialize, Debug, Clone)]
pub struct ExecutionOutcome {
    pub result: Value,
}

impl ExecutionOutcome {
    /// The `result` field as prompt-ready text.
    pub fn result_text(&self) -> String {
        match &self.result {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Seam between the workflows and the execution service.
#[async_trait::async_trait]
pub trait ExecutionBackend: Send + Sync {
    /// Submit generated code for execution.
    ///
    /// The body is the raw completion reply, not an extracted `code`
    /// field: the service deserializes `{code, query}` itself.
    async fn execute(&self, raw_reply: &str) -> Result<ExecutionOutcome, ExecutionError>;

    /// Fetch area data by id. A missing id is sent as the literal path
    /// segment `null`, which the service rejects; the caller contains the
    /// failure.
    async fn area(&self, id: Option<u64>) -> Result<String, ExecutionError>;
}

pub struct ExecutionClient {
    client: Client,
    base: Url,
}

impl ExecutionClient {
    pub fn new(config: &Config) -> Result<Self, ExecutionError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(ExecutionError::ClientBuild)?;

        Ok(Self {
            client,
            base: config.execution_endpoint.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ExecutionError> {
        Ok(self.base.join(path)?)
    }
}

fn map_send_error(e: reqwest::Error) -> ExecutionError {
    if e.is_timeout() {
        ExecutionError::Timeout
    } else if e.is_connect() {
        ExecutionError::Connect
    } else {
        ExecutionError::Network(e)
    }
}

async fn reject_on_status(response: reqwest::Response) -> Result<reqwest::Response, ExecutionError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(ExecutionError::Http {
        status: status.as_u16(),
        body,
    })
}

#[async_trait::async_trait]
impl ExecutionBackend for ExecutionClient {
    async fn execute(&self, raw_reply: &str) -> Result<ExecutionOutcome, ExecutionError> {
        let url = self.endpoint("execute")?;
        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .body(raw_reply.to_string())
            .send()
            .await
            .map_err(map_send_error)?;

        let response = reject_on_status(response).await?;
        response
            .json()
            .await
            .map_err(ExecutionError::MalformedResponse)
    }

    async fn area(&self, id: Option<u64>) -> Result<String, ExecutionError> {
        let segment = match id {
            Some(id) => id.to_string(),
            None => "null".to_string(),
        };
        let url = self.endpoint(&format!("area/{}", segment))?;
        let response = self
            .client
            .get(url)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(map_send_error)?;

        let response = reject_on_status(response).await?;
        response.text().await.map_err(ExecutionError::Network)
    }
}
