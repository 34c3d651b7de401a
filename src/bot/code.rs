//! Code workflow: generate Python, execute it, render the result as a card.

use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::card;
use crate::execution::{ExecutionBackend, ExecutionOutcome};
use crate::llm::{ChatCompletion, ChatMessage};
use crate::prompt::Purpose;
use crate::retry::TerminalAction;

use super::dispatcher::{Bot, GENERIC_RETRY_REPLY};
use super::types::{Activity, Message};
use super::{ActivitySink, BotError};

const CODEGEN_SYSTEM_PROMPT: &str = "You are a Python code generator. You only return JSON.";
const CARD_SYSTEM_PROMPT: &str = "You are a JSON generator for Adaptive Cards.";
const CARD_FAILURE_REPLY: &str =
    "Could not parse the generated adaptive card. Please try again with other phrase.";

pub(super) async fn run<L, E>(
    bot: &Bot<L, E>,
    message: &Message,
    sink: &dyn ActivitySink,
) -> anyhow::Result<()>
where
    L: ChatCompletion,
    E: ExecutionBackend,
{
    match drive(bot, message, sink).await {
        Ok(()) => Ok(()),
        // A dead transport cannot carry an apology either.
        Err(BotError::Transport(err)) => Err(err),
        Err(err) => {
            warn!(%err, "code workflow failed");
            sink.send(Activity::text(format!("{} {}", GENERIC_RETRY_REPLY, err)))
                .await
        }
    }
}

async fn drive<L, E>(
    bot: &Bot<L, E>,
    message: &Message,
    sink: &dyn ActivitySink,
) -> Result<(), BotError>
where
    L: ChatCompletion,
    E: ExecutionBackend,
{
    // GenerateCode
    let prompt = bot.templates.render(Purpose::Building, &message.text);
    let messages = vec![
        ChatMessage::system(CODEGEN_SYSTEM_PROMPT),
        ChatMessage::user(prompt),
    ];
    let reply = bot.llm.complete(&messages).await?;
    let code = extract_code(&reply)?;
    send(sink, Activity::text(format!("```python\n{}\n```", code))).await?;

    // SubmitExecution. The body is the raw reply, not the extracted code:
    // the execution service unwraps `{code, query}` itself.
    let outcome = match submit_execution(bot, &reply, sink).await? {
        Some(outcome) => outcome,
        None => return Ok(()),
    };
    debug!(result = %outcome.result_text(), "execution succeeded");

    // GenerateCard, on its own fresh attempt budget.
    generate_card(bot, &outcome, sink).await
}

/// Bounded submission loop. `Ok(None)` means the budget ran out and the
/// policy's terminal action has already been applied.
async fn submit_execution<L, E>(
    bot: &Bot<L, E>,
    raw_reply: &str,
    sink: &dyn ActivitySink,
) -> Result<Option<ExecutionOutcome>, BotError>
where
    L: ChatCompletion,
    E: ExecutionBackend,
{
    let policy = bot.execution_retry;
    for attempt in policy.attempts() {
        send(sink, Activity::typing()).await?;
        match bot.execution.execute(raw_reply).await {
            Ok(outcome) => return Ok(Some(outcome)),
            Err(err) => {
                warn!(attempt, %err, "execution attempt failed");
                send(
                    sink,
                    Activity::text(format!(
                        "Run {}. Could not perform the operation. Please try again with other phrase.",
                        attempt
                    )),
                )
                .await?;
                if !policy.is_last(attempt) {
                    sleep(policy.backoff_for(attempt)).await;
                }
            }
        }
    }

    match policy.terminal {
        TerminalAction::AbortSilently => {
            warn!("execution retries exhausted; no card will be sent");
        }
        TerminalAction::ReportFailure => {
            send(sink, Activity::text(GENERIC_RETRY_REPLY)).await?;
        }
    }
    Ok(None)
}

async fn generate_card<L, E>(
    bot: &Bot<L, E>,
    outcome: &ExecutionOutcome,
    sink: &dyn ActivitySink,
) -> Result<(), BotError>
where
    L: ChatCompletion,
    E: ExecutionBackend,
{
    send(sink, Activity::typing()).await?;

    let prompt = bot.templates.render(Purpose::AdaptiveCard, &outcome.result_text());
    let messages = vec![
        ChatMessage::system(CARD_SYSTEM_PROMPT),
        ChatMessage::user(prompt),
    ];

    let policy = bot.card_retry;
    for attempt in policy.attempts() {
        let reply = bot.llm.complete(&messages).await?;
        match card::extract_card(&reply) {
            Ok(payload) => {
                return send(sink, Activity::card(payload.0)).await;
            }
            Err(err) => {
                warn!(attempt, %err, "card generation attempt failed");
                if policy.is_last(attempt) {
                    break;
                }
                send(
                    sink,
                    Activity::text(format!("Retry generating adaptive card {}.", attempt)),
                )
                .await?;
                sleep(policy.backoff_for(attempt)).await;
            }
        }
    }

    match policy.terminal {
        TerminalAction::AbortSilently => {
            warn!("card generation retries exhausted");
            Ok(())
        }
        TerminalAction::ReportFailure => send(sink, Activity::text(CARD_FAILURE_REPLY)).await,
    }
}

fn extract_code(reply: &str) -> Result<String, BotError> {
    let value: Value = serde_json::from_str(reply.trim()).map_err(BotError::MalformedCodegen)?;
    value
        .get("code")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or(BotError::MissingCode)
}

async fn send(sink: &dyn ActivitySink, activity: Activity) -> Result<(), BotError> {
    sink.send(activity).await.map_err(BotError::Transport)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_code_takes_the_code_field() {
        let reply = r#"{"code": "output = 1 + 1", "query": "what is one plus one"}"#;
        assert_eq!(extract_code(reply).unwrap(), "output = 1 + 1");
    }

    #[test]
    fn extract_code_separates_malformed_from_missing() {
        assert!(matches!(
            extract_code("def f(): pass"),
            Err(BotError::MalformedCodegen(_))
        ));
        assert!(matches!(
            extract_code(r#"{"query": "no code here"}"#),
            Err(BotError::MissingCode)
        ));
    }
}
