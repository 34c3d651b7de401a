//! Chat-completion invoker: role-tagged messages in, first choice text out.

mod client;

pub use client::CompletionClient;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("Request timeout - the API took too long to respond")]
    Timeout,

    #[error("Connection error - unable to reach the API")]
    Connect,

    #[error("Network error: {0}")]
    Network(reqwest::Error),

    #[error("Authentication failed - check your API key")]
    Authentication,

    #[error("Access forbidden - insufficient permissions")]
    Forbidden,

    #[error("Rate limit exceeded - too many requests")]
    RateLimited,

    #[error("Server error ({status}): {body}")]
    Server { status: u16, body: String },

    #[error("HTTP error {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Failed to parse API response as JSON: {0}")]
    MalformedResponse(reqwest::Error),

    #[error("API returned empty response")]
    EmptyChoices,

    #[error("API returned empty content")]
    EmptyContent,

    #[error("Failed to create HTTP client: {0}")]
    ClientBuild(reqwest::Error),
}

/// Seam between the workflows and the completion endpoint.
///
/// No retry at this layer; bounded retries belong to the callers, which
/// know what a failed attempt means for the user.
#[async_trait::async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Send the ordered message list and return the first choice's content.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError>;
}
