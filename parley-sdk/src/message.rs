//! Inbound chat messages as they appear on the display and history channels.

use chrono::{DateTime, Local};

/// One decoded line off the broadcast feed, stamped at receipt.
///
/// Created by the reader loop and forwarded unchanged to both the display
/// and the history channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub received_at: DateTime<Local>,
    pub text: String,
}

impl ChatMessage {
    pub fn now(text: impl Into<String>) -> Self {
        Self {
            received_at: Local::now(),
            text: text.into(),
        }
    }
}

impl std::fmt::Display for ChatMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {}",
            self.received_at.format("%d %m %Y %H:%M:%S"),
            self.text
        )
    }
}
