//! Intent-driven dispatcher and the two message workflows.

mod code;
mod describe;
mod dispatcher;
pub mod traits;
pub mod types;


pub use dispatcher::{Bot, GENERIC_RETRY_REPLY, GREETING};
pub use traits::ActivitySink;
pub use types::{Activity, ActivityKind, Message};

use thiserror::Error;

use crate::execution::ExecutionError;
use crate::intent::IntentError;
use crate::llm::CompletionError;

/// Everything that can go wrong inside a single turn.
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Intent classification failed: {0}")]
    Intent(#[from] IntentError),

    #[error("Completion failed: {0}")]
    Completion(#[from] CompletionError),

    #[error("Execution service call failed: {0}")]
    Execution(#[from] ExecutionError),

    #[error("Code generation reply is not valid JSON: {0}")]
    MalformedCodegen(serde_json::Error),

    #[error("Code generation reply has no `code` field")]
    MissingCode,

    #[error("Transport send failed: {0}")]
    Transport(anyhow::Error),
}
