//! Result extraction from a completed run's conversation thread.
//!
//! The thread holds the whole multi-party exchange, including intermediate
//! delegation results. By convention the most recent agent-authored message
//! is the authoritative final answer.

use crate::hosted::{MessageAuthor, MessagePart, ThreadMessage};

/// Outcome of scanning a thread for the final answer.
///
/// `found == false` means no agent-authored message exists. That is a
/// reportable condition, not a fault: a completed run with an empty thread
/// still yields a usable (empty) result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalReply {
    pub text: String,
    pub found: bool,
}

/// Scan a newest-first message sequence and return the text of the most
/// recent agent-authored message, concatenating its text parts in order.
pub fn extract_final_reply(messages: &[ThreadMessage]) -> FinalReply {
    for message in messages {
        if message.author != MessageAuthor::Agent {
            continue;
        }
        let mut text = String::new();
        for part in &message.parts {
            if let MessagePart::Text { text: t } = part {
                text.push_str(t);
            }
        }
        return FinalReply { text, found: true };
    }
    FinalReply {
        text: String::new(),
        found: false,
    }
}
