//! HTTP client for the completion endpoint.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::Config;

use super::{ChatCompletion, ChatMessage, CompletionError};

/// Fixed by contract; neither is configurable.
const DEPLOYMENT_ID: &str = "gpt-35-turbo";
const TEMPERATURE: f32 = 0.4;

#[derive(Serialize, Debug)]
struct CompletionRequest<'a> {
    model: &'static str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Deserialize, Debug)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize, Debug)]
struct ChoiceMessage {
    content: String,
}

pub struct CompletionClient {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl CompletionClient {
    pub fn new(config: &Config) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(CompletionError::ClientBuild)?;

        Ok(Self {
            client,
            endpoint: config.completion_endpoint.clone(),
            api_key: config.completion_api_key.clone(),
        })
    }
}

#[async_trait::async_trait]
impl ChatCompletion for CompletionClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError> {
        let request_body = CompletionRequest {
            model: DEPLOYMENT_ID,
            messages,
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CompletionError::Timeout
                } else if e.is_connect() {
                    CompletionError::Connect
                } else {
                    CompletionError::Network(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(match status.as_u16() {
                401 => CompletionError::Authentication,
                403 => CompletionError::Forbidden,
                429 => CompletionError::RateLimited,
                500..=599 => CompletionError::Server {
                    status: status.as_u16(),
                    body,
                },
                _ => CompletionError::Http {
                    status: status.as_u16(),
                    body,
                },
            });
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(CompletionError::MalformedResponse)?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .ok_or(CompletionError::EmptyChoices)?
            .message
            .content;

        if content.trim().is_empty() {
            return Err(CompletionError::EmptyContent);
        }

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_carries_fixed_deployment_and_temperature() {
        let messages = vec![
            ChatMessage::system("You only return JSON."),
            ChatMessage::user("classify this"),
        ];
        let body = CompletionRequest {
            model: DEPLOYMENT_ID,
            messages: &messages,
            temperature: TEMPERATURE,
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gpt-35-turbo");
        let temperature = json["temperature"].as_f64().unwrap();
        assert!((temperature - 0.4).abs() < 1e-6);
        assert_eq!(json["messages"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn response_shape_parses_first_choice() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"{\"type\":\"code\"}"}}]}"#;
        let parsed: CompletionResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content, r#"{"type":"code"}"#);
    }
}
