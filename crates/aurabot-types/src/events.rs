use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{ChatId, UserRef};

/// Events delivered by the transport to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum InboundEvent {
    /// A user was seen in a chat
    Activity(ActivityEvent),

    /// A `/command` was invoked
    Command(CommandEvent),

    /// The "accept" button of a challenge was pressed
    Accept(AcceptEvent),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub chat_id: ChatId,
    pub private: bool,
    pub user: UserRef,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandEvent {
    pub chat_id: ChatId,
    pub private: bool,
    /// Id of the message carrying the command.
    pub message_id: i64,
    pub invoker: UserRef,
    /// Author of the message the command replied to, if any.
    pub reply_target: Option<UserRef>,
    /// Command name, lowercase, without the leading slash or `@botname`.
    pub command: String,
    pub args: Vec<String>,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptEvent {
    pub chat_id: ChatId,
    pub duel_id: Uuid,
    pub acting: UserRef,
    /// Transport correlation token (callback query id), echoed back in the answer.
    pub token: String,
    pub at: DateTime<Utc>,
}

/// Outbound message produced by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reply {
    /// Post a message into the chat.
    Message {
        text: String,
        parse_mode: ParseMode,
        keyboard: Vec<Vec<Button>>,
        reply_to: Option<i64>,
    },

    /// Answer an interaction (button press) with a short notice.
    Notice { token: String, text: String, alert: bool },
}

impl Reply {
    pub fn plain(text: impl Into<String>) -> Self {
        Self::Message {
            text: text.into(),
            parse_mode: ParseMode::Plain,
            keyboard: Vec::new(),
            reply_to: None,
        }
    }

    pub fn html(text: impl Into<String>) -> Self {
        Self::Message {
            text: text.into(),
            parse_mode: ParseMode::Html,
            keyboard: Vec::new(),
            reply_to: None,
        }
    }

    pub fn with_keyboard(mut self, rows: Vec<Vec<Button>>) -> Self {
        if let Self::Message { keyboard, .. } = &mut self {
            *keyboard = rows;
        }
        self
    }

    pub fn replying_to(mut self, message_id: i64) -> Self {
        if let Self::Message { reply_to, .. } = &mut self {
            *reply_to = Some(message_id);
        }
        self
    }

    /// Message text, or the notice text.
    pub fn text(&self) -> &str {
        match self {
            Self::Message { text, .. } | Self::Notice { text, .. } => text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseMode {
    Plain,
    Html,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub text: String,
    pub action: ButtonAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum ButtonAction {
    Url(String),
    Callback(String),
}

impl Button {
    pub fn url(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: ButtonAction::Url(url.into()),
        }
    }

    pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: ButtonAction::Callback(data.into()),
        }
    }
}

/// Callback payload for accepting a duel.
pub fn accept_payload(duel_id: Uuid) -> String {
    format!("accept:{}", duel_id)
}

/// Inverse of [`accept_payload`].
pub fn parse_accept_payload(data: &str) -> Option<Uuid> {
    data.strip_prefix("accept:")?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accept_payload_fits_callback_limit() {
        let id = Uuid::new_v4();
        let payload = accept_payload(id);
        // Telegram caps callback_data at 64 bytes
        assert!(payload.len() <= 64);
        assert_eq!(parse_accept_payload(&payload), Some(id));
    }

    #[test]
    fn foreign_payloads_are_ignored() {
        assert_eq!(parse_accept_payload("decline:abc"), None);
        assert_eq!(parse_accept_payload("accept:not-a-uuid"), None);
    }

    #[test]
    fn builders_only_touch_messages() {
        let reply = Reply::plain("hi").replying_to(9);
        assert!(matches!(reply, Reply::Message { reply_to: Some(9), .. }));

        let notice = Reply::Notice {
            token: "t".into(),
            text: "nope".into(),
            alert: true,
        }
        .replying_to(9);
        assert_eq!(notice.text(), "nope");
    }
}
