//! Area-description workflow: mention-stripped digits, area data, one tweet.

use regex::Regex;
use tracing::{debug, warn};

use crate::execution::ExecutionBackend;
use crate::llm::{ChatCompletion, ChatMessage};
use crate::prompt::Purpose;

use super::dispatcher::{Bot, GENERIC_RETRY_REPLY};
use super::types::{Activity, Message};
use super::{ActivitySink, BotError};

const DESCRIBE_SYSTEM_PROMPT: &str = "You are a funny tweet generator.";

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
        Err(BotError::Transport(err)) => Err(err),
        Err(err) => {
            warn!(%err, "describe workflow failed");
            sink.send(Activity::text(GENERIC_RETRY_REPLY)).await
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
    sink.send(Activity::typing())
        .await
        .map_err(BotError::Transport)?;

    let text = strip_mentions(&message.text);
    let area_id = extract_area_id(&text);
    debug!(?area_id, "resolved area identifier");

    // With no id this targets `area/null` and fails; the failure is
    // contained by `run` like any other.
    let area_data = bot.execution.area(area_id).await?;

    let prompt = bot.templates.render(Purpose::DescribeFunny, &area_data);
    let messages = vec![
        ChatMessage::system(DESCRIBE_SYSTEM_PROMPT),
        ChatMessage::user(prompt),
    ];
    let reply = bot.llm.complete(&messages).await?;

    sink.send(Activity::text(reply))
        .await
        .map_err(BotError::Transport)
}

/// Remove transport mention markup (`<at>…</at>`).
pub(super) fn strip_mentions(text: &str) -> String {
    match Regex::new(r"<at>.*?</at>") {
        Ok(mentions) => mentions.replace_all(text, "").to_string(),
        Err(_) => text.to_string(),
    }
}

/// First contiguous digit run, if any.
pub(super) fn extract_area_id(text: &str) -> Option<u64> {
    let digits = Regex::new(r"\d+").ok()?;
    digits.find(text)?.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mentions_are_stripped() {
        assert_eq!(
            strip_mentions("<at>Bot</at> tell me about area 42"),
            " tell me about area 42"
        );
        assert_eq!(
            strip_mentions("<at>Bot</at><at>Other</at> hi"),
            " hi"
        );
        assert_eq!(strip_mentions("no markup"), "no markup");
    }

    #[test]
    fn first_digit_run_wins() {
        assert_eq!(extract_area_id(" tell me about area 42"), Some(42));
        assert_eq!(extract_area_id("areas 7 and 12"), Some(7));
        assert_eq!(extract_area_id("what is going on"), None);
    }

    #[test]
    fn digit_runs_are_contiguous() {
        assert_eq!(extract_area_id("room 4-2"), Some(4));
    }
}
