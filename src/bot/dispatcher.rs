//! One turn at a time: classify, branch, contain failures.

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::execution::{ExecutionBackend, ExecutionClient};
use crate::intent::{self, Intent};
use crate::llm::{ChatCompletion, CompletionClient};
use crate::prompt::TemplateStore;
use crate::retry::RetryPolicy;

use super::types::{Activity, Message};
use super::{code, describe, ActivitySink};

/// Sent whenever a turn fails in a way the user can do something about.
pub const GENERIC_RETRY_REPLY: &str =
    "Could not perform the operation. Please try again with other phrase.";

/// Sent when the bot is added to a conversation.
pub const GREETING: &str =
    "Hi there! I'm Building Copilot that will help you managing your building.";

/// The dispatcher. Holds no conversational state: every turn is
/// independent, and templates are re-read per invocation.
pub struct Bot<L, E> {
    pub(super) llm: L,
    pub(super) execution: E,
    pub(super) templates: TemplateStore,
    pub(super) execution_retry: RetryPolicy,
    pub(super) card_retry: RetryPolicy,
}

impl Bot<CompletionClient, ExecutionClient> {
    /// Wire the real HTTP clients from a resolved configuration.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self::new(
            CompletionClient::new(config)?,
            ExecutionClient::new(config)?,
            TemplateStore::new(config.prompt_dir.clone()),
        ))
    }
}

impl<L, E> Bot<L, E>
where
    L: ChatCompletion,
    E: ExecutionBackend,
{
    pub fn new(llm: L, execution: E, templates: TemplateStore) -> Self {
        Self {
            llm,
            execution,
            templates,
            execution_retry: RetryPolicy::execution(),
            card_retry: RetryPolicy::card(),
        }
    }

    pub fn with_retry_policies(mut self, execution: RetryPolicy, card: RetryPolicy) -> Self {
        self.execution_retry = execution;
        self.card_retry = card;
        self
    }

    /// Drive one conversational turn.
    ///
    /// Classification happens exactly once; its failure aborts the turn
    /// with the generic reply. Workflow failures are contained the same
    /// way, so no turn can poison the next.
    #[instrument(
        skip_all,
        fields(turn_id = %Uuid::new_v4(), conversation = %message.conversation)
    )]
    pub async fn handle_message(
        &self,
        message: &Message,
        sink: &dyn ActivitySink,
    ) -> anyhow::Result<()> {
        let intent = match intent::classify(&self.templates, &self.llm, &message.text).await {
            Ok(intent) => intent,
            Err(err) => {
                warn!(%err, "intent classification failed");
                return sink.send(Activity::text(GENERIC_RETRY_REPLY)).await;
            }
        };

        match intent {
            Intent::Describe => describe::run(self, message, sink).await,
            Intent::Code => code::run(self, message, sink).await,
            Intent::Other(label) => {
                info!(intent = %label, "no workflow for this intent");
                sink.send(Activity::text(format!(
                    "Sorry, I don't know how to handle \"{}\" yet.",
                    label
                )))
                .await
            }
        }
    }

    /// Membership-added events get a static greeting and nothing else.
    pub async fn handle_members_added(&self, sink: &dyn ActivitySink) -> anyhow::Result<()> {
        sink.send(Activity::text(GREETING)).await
    }
}
