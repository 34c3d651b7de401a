//! Building Copilot: an intent-driven chat pipeline over an LLM
//! completion endpoint and an external code-execution service.
//!
//! ```text
//! Message → intent (LLM) → code workflow     → execute   → Adaptive Card
//!                        → describe workflow → area data → funny tweet
//! ```
//!
//! The chat transport is not part of this crate; hosts implement
//! [`bot::ActivitySink`] and feed inbound [`bot::Message`]s to a
//! [`bot::Bot`] built from a [`config::Config`].

pub mod bot;
pub mod card;
pub mod config;
pub mod execution;
pub mod intent;
pub mod llm;
pub mod prompt;
pub mod retry;

pub use bot::{Activity, ActivityKind, ActivitySink, Bot, BotError, Message};
pub use config::{Config, ConfigError};
