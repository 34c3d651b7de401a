//! LLM-backed classification of inbound messages into handling routes.

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::llm::{ChatCompletion, ChatMessage, CompletionError};
use crate::prompt::{Purpose, TemplateStore};

const CLASSIFIER_SYSTEM_PROMPT: &str = "You are an intent classifier. You only return JSON.";

/// Where a message should be routed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Describe,
    Code,
    Other(String),
}

impl Intent {
    /// Case-insensitive mapping from the classifier's `type` label.
    pub fn from_label(label: &str) -> Self {
        match label.to_lowercase().as_str() {
            "describe" => Intent::Describe,
            "code" => Intent::Code,
            _ => Intent::Other(label.to_string()),
        }
    }
}

#[derive(Error, Debug)]
pub enum IntentError {
    /// The reply was not JSON at all.
    #[error("Classifier reply is not valid JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),

    /// Well-formed JSON, but nothing usable under `type`.
    #[error("Classifier reply has no `type` field")]
    MissingType,

    #[error("Completion failed: {0}")]
    Completion(#[from] CompletionError),
}

/// Classify one inbound message. Not retried: a failure here aborts the
/// turn and is reported by the dispatcher.
pub async fn classify<L>(
    templates: &TemplateStore,
    llm: &L,
    text: &str,
) -> Result<Intent, IntentError>
where
    L: ChatCompletion + ?Sized,
{
    let prompt = templates.render(Purpose::Intent, text);
    let messages = vec![
        ChatMessage::system(CLASSIFIER_SYSTEM_PROMPT),
        ChatMessage::user(prompt),
    ];

    let reply = llm.complete(&messages).await?;
    let intent = parse_reply(&reply)?;
    debug!(?intent, "classified inbound message");
    Ok(intent)
}

/// Parse the classifier's JSON reply into an [`Intent`].
pub(crate) fn parse_reply(reply: &str) -> Result<Intent, IntentError> {
    let value: Value = serde_json::from_str(reply.trim())?;
    let label = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or(IntentError::MissingType)?;
    Ok(Intent::from_label(label))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_match_case_insensitively() {
        assert_eq!(Intent::from_label("describe"), Intent::Describe);
        assert_eq!(Intent::from_label("Describe"), Intent::Describe);
        assert_eq!(Intent::from_label("CODE"), Intent::Code);
        assert_eq!(
            Intent::from_label("weather"),
            Intent::Other("weather".to_string())
        );
    }

    #[test]
    fn parse_accepts_well_formed_reply() {
        let intent = parse_reply(r#"{"type": "Code"}"#).unwrap();
        assert_eq!(intent, Intent::Code);
    }

    #[test]
    fn parse_distinguishes_malformed_from_missing() {
        assert!(matches!(
            parse_reply("not json at all"),
            Err(IntentError::MalformedJson(_))
        ));
        assert!(matches!(
            parse_reply(r#"{"intent": "code"}"#),
            Err(IntentError::MissingType)
        ));
        // A `type` that is not a string is as unusable as an absent one.
        assert!(matches!(
            parse_reply(r#"{"type": 3}"#),
            Err(IntentError::MissingType)
        ));
    }

    #[test]
    fn parse_tolerates_surrounding_whitespace() {
        let intent = parse_reply("\n  {\"type\": \"describe\"}\n").unwrap();
        assert_eq!(intent, Intent::Describe);
    }
}
