//! Chat fan-out types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ChatMessageId, SessionId};

pub const MESSAGE_MAX_CHARS: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Discord,
    Slack,
    Llm,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Platform::Discord => "discord",
            Platform::Slack => "slack",
            Platform::Llm => "llm",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: ChatMessageId,
    pub session_id: SessionId,
    pub sender_display_name: String,
    pub platform: Platform,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Truncates `content` to `MESSAGE_MAX_CHARS`, appending an ellipsis
    /// when truncation occurs.
    pub fn truncate_content(content: &str) -> String {
        if content.chars().count() <= MESSAGE_MAX_CHARS {
            return content.to_string();
        }
        let mut truncated: String = content.chars().take(MESSAGE_MAX_CHARS - 1).collect();
        truncated.push('…');
        truncated
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatBotEndpoint {
    pub session_id: SessionId,
    pub platform: Platform,
    pub endpoint_url: String,
    pub is_active: bool,
    pub last_broadcast_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_content_is_unchanged() {
        assert_eq!(ChatMessage::truncate_content("hello"), "hello");
    }

    #[test]
    fn long_content_is_truncated_with_ellipsis() {
        let long = "a".repeat(2001);
        let truncated = ChatMessage::truncate_content(&long);
        assert_eq!(truncated.chars().count(), MESSAGE_MAX_CHARS);
        assert!(truncated.ends_with('…'));
    }
}
