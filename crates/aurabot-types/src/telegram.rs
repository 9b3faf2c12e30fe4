//! Subset of the Telegram Bot API wire format used by the webhook transport.

use serde::{Deserialize, Serialize};

use crate::models::UserRef;

// -- Inbound --

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    /// Unix seconds.
    pub date: i64,
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
    pub reply_to_message: Option<Box<Message>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Chat {
    pub fn is_private(&self) -> bool {
        self.kind == "private"
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: String,
    pub username: Option<String>,
}

impl From<&User> for UserRef {
    fn from(user: &User) -> Self {
        UserRef::new(user.id, user.username.clone(), user.first_name.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    pub message: Option<Message>,
    pub data: Option<String>,
}

// -- Outbound --

/// A Bot API method returned in the body of the webhook response.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "method")]
pub enum WebhookReply {
    #[serde(rename = "sendMessage")]
    SendMessage {
        chat_id: i64,
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        parse_mode: Option<&'static str>,
        #[serde(skip_serializing_if = "Option::is_none")]
        reply_markup: Option<InlineKeyboardMarkup>,
        #[serde(skip_serializing_if = "Option::is_none")]
        reply_parameters: Option<ReplyParameters>,
    },

    #[serde(rename = "answerCallbackQuery")]
    AnswerCallbackQuery {
        callback_query_id: String,
        text: String,
        show_alert: bool,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_data: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplyParameters {
    pub message_id: i64,
    pub allow_sending_without_reply: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_group_command_with_reply() {
        let raw = r#"{
            "update_id": 10,
            "message": {
                "message_id": 5,
                "date": 1700000000,
                "chat": {"id": -100, "type": "supergroup", "title": "x"},
                "from": {"id": 1, "is_bot": false, "first_name": "Ann", "username": "ann"},
                "text": "/fight",
                "reply_to_message": {
                    "message_id": 4,
                    "date": 1699999990,
                    "chat": {"id": -100, "type": "supergroup"},
                    "from": {"id": 2, "is_bot": false, "first_name": "Bob"}
                }
            }
        }"#;
        let update: Update = serde_json::from_str(raw).unwrap();
        let message = update.message.unwrap();
        assert!(!message.chat.is_private());
        let target = message.reply_to_message.unwrap();
        assert_eq!(target.from.unwrap().username, None);
    }

    #[test]
    fn send_message_is_tagged_with_method() {
        let reply = WebhookReply::SendMessage {
            chat_id: -1,
            text: "hi".into(),
            parse_mode: Some("HTML"),
            reply_markup: None,
            reply_parameters: None,
        };
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["method"], "sendMessage");
        assert_eq!(json["parse_mode"], "HTML");
        assert!(json.get("reply_markup").is_none());
    }
}
