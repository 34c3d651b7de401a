//! Transport-facing data shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::card::CARD_CONTENT_TYPE;

/// One inbound chat message. Owned by the transport; read-only here.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Message {
    pub text: String,
    /// Sender id as the transport knows it.
    pub from: String,
    /// Conversation id; turns in the same conversation share nothing.
    pub conversation: String,
}

impl Message {
    pub fn new(
        text: impl Into<String>,
        from: impl Into<String>,
        conversation: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            from: from.into(),
            conversation: conversation.into(),
        }
    }
}

/// One outgoing activity handed to the transport.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Activity {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: ActivityKind,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ActivityKind {
    /// Plain text reply.
    Message { text: String },
    /// Best-effort "the bot is working" signal.
    Typing,
    /// An Adaptive Card attachment.
    Attachment {
        #[serde(rename = "contentType")]
        content_type: String,
        content: Value,
    },
}

impl Activity {
    fn stamped(kind: ActivityKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            kind,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::stamped(ActivityKind::Message { text: text.into() })
    }

    pub fn typing() -> Self {
        Self::stamped(ActivityKind::Typing)
    }

    pub fn card(content: Value) -> Self {
        Self::stamped(ActivityKind::Attachment {
            content_type: CARD_CONTENT_TYPE.to_string(),
            content,
        })
    }

    /// The text body, if this is a plain message.
    pub fn as_text(&self) -> Option<&str> {
        match &self.kind {
            ActivityKind::Message { text } => Some(text),
            _ => None,
        }
    }

    pub fn is_typing(&self) -> bool {
        matches!(self.kind, ActivityKind::Typing)
    }

    pub fn is_card(&self) -> bool {
        matches!(self.kind, ActivityKind::Attachment { .. })
    }
}
