//! Extraction of an Adaptive Card JSON object from free-form model output.

use serde_json::Value;
use thiserror::Error;

/// Attachment content type understood by the chat client.
pub const CARD_CONTENT_TYPE: &str = "application/vnd.microsoft.card.adaptive";

#[derive(Error, Debug)]
pub enum CardError {
    #[error("Reply contains no parseable JSON object")]
    NoObject,
}

/// A parsed Adaptive Card payload, validated as JSON before sending.
#[derive(Debug, Clone, PartialEq)]
pub struct CardPayload(pub Value);

/// Find the first syntactically valid JSON object embedded in `reply`.
///
/// Each `{` starts a candidate; the candidate ends at its balanced `}`
/// (string- and escape-aware) and must survive a real JSON parse. This
/// will not over-capture across several embedded objects the way a
/// first-`{`-to-last-`}` substring does.
pub fn extract_card(reply: &str) -> Result<CardPayload, CardError> {
    for (start, c) in reply.char_indices() {
        if c != '{' {
            continue;
        }
        if let Some(len) = balanced_object_len(&reply[start..]) {
            let candidate = &reply[start..start + len];
            if let Ok(value) = serde_json::from_str::<Value>(candidate) {
                if value.is_object() {
                    return Ok(CardPayload(value));
                }
            }
        }
    }
    Err(CardError::NoObject)
}

/// Length in bytes of the brace-balanced prefix of `s`, which must start
/// with `{`. Braces inside JSON strings do not count.
fn balanced_object_len(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + c.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_object_embedded_in_prose() {
        let reply = r#"Here is your card:

{"type": "AdaptiveCard", "version": "1.4", "body": []}

Let me know if you need anything else."#;
        let card = extract_card(reply).unwrap();
        assert_eq!(card.0["type"], "AdaptiveCard");
    }

    #[test]
    fn rejects_reply_with_no_braces() {
        let err = extract_card("I could not generate a card this time.").unwrap_err();
        assert!(matches!(err, CardError::NoObject));
    }

    #[test]
    fn takes_the_first_object_not_the_widest_span() {
        let reply = r#"{"a": 1} trailing prose with another {"b": 2}"#;
        let card = extract_card(reply).unwrap();
        assert_eq!(card.0, serde_json::json!({"a": 1}));
    }

    #[test]
    fn skips_unparseable_brace_runs() {
        let reply = r#"{oops not json} but then {"type": "AdaptiveCard"}"#;
        let card = extract_card(reply).unwrap();
        assert_eq!(card.0["type"], "AdaptiveCard");
    }

    #[test]
    fn braces_inside_strings_do_not_end_the_object() {
        let reply = r#"{"text": "a literal } inside", "n": 1}"#;
        let card = extract_card(reply).unwrap();
        assert_eq!(card.0["n"], 1);
    }

    #[test]
    fn escaped_quotes_keep_string_state() {
        let reply = r#"{"text": "she said \"hi}\" loudly"}"#;
        let card = extract_card(reply).unwrap();
        assert_eq!(card.0["text"], r#"she said "hi}" loudly"#);
    }

    #[test]
    fn unterminated_object_is_rejected() {
        assert!(extract_card(r#"{"type": "AdaptiveCard""#).is_err());
    }
}
