//! Mapping between Telegram webhook updates and engine events.
//!
//! Replies travel in the webhook response body, which carries exactly one
//! Bot API call. A failed accept is answered with `answerCallbackQuery` (an
//! alert on the button). A successful accept is answered with `sendMessage`
//! so the whole chat sees the result; the callback itself then goes
//! unanswered, so the presser's client shows its progress indicator until
//! Telegram times it out, and the Accept button stays on the challenge.
//! Pressing it again is answered with "already over". Doing both would need
//! an outbound Bot API client, which this server does not have.

use aurabot_types::events::{
    AcceptEvent, ActivityEvent, ButtonAction, CommandEvent, InboundEvent, ParseMode, Reply, parse_accept_payload,
};
use aurabot_types::models::UserRef;
use aurabot_types::telegram::{
    InlineKeyboardButton, InlineKeyboardMarkup, ReplyParameters, Update, WebhookReply,
};
use chrono::{DateTime, Utc};

/// Events extracted from one update, all scoped to one chat.
#[derive(Debug)]
pub struct Inbound {
    pub chat_id: i64,
    pub events: Vec<InboundEvent>,
}

/// Split `/name@bot arg1 arg2` into a lowercase name and its arguments.
/// Commands addressed to a different bot yield `None`.
pub fn parse_command(text: &str, bot_username: Option<&str>) -> Option<(String, Vec<String>)> {
    let mut parts = text.split_whitespace();
    let head = parts.next()?.strip_prefix('/')?;
    let (name, addressee) = match head.split_once('@') {
        Some((name, addressee)) => (name, Some(addressee)),
        None => (head, None),
    };
    if let (Some(addressee), Some(me)) = (addressee, bot_username) {
        if !addressee.eq_ignore_ascii_case(me) {
            return None;
        }
    }
    if name.is_empty() {
        return None;
    }
    Some((name.to_ascii_lowercase(), parts.map(String::from).collect()))
}

pub fn inbound(update: &Update, bot_username: Option<&str>) -> Option<Inbound> {
    if let Some(message) = &update.message {
        let from = message.from.as_ref().filter(|user| !user.is_bot)?;
        let chat_id = message.chat.id;
        let private = message.chat.is_private();
        let at = DateTime::from_timestamp(message.date, 0).unwrap_or_else(Utc::now);
        let invoker = UserRef::from(from);

        let mut events = vec![InboundEvent::Activity(ActivityEvent {
            chat_id,
            private,
            user: invoker.clone(),
            at,
        })];

        let reply_target = message
            .reply_to_message
            .as_ref()
            .and_then(|replied| replied.from.as_ref())
            .filter(|user| !user.is_bot)
            .map(UserRef::from);
        if let Some(target) = &reply_target {
            events.push(InboundEvent::Activity(ActivityEvent {
                chat_id,
                private,
                user: target.clone(),
                at,
            }));
        }

        if let Some((command, args)) = message
            .text
            .as_deref()
            .and_then(|text| parse_command(text, bot_username))
        {
            events.push(InboundEvent::Command(CommandEvent {
                chat_id,
                private,
                message_id: message.message_id,
                invoker,
                reply_target,
                command,
                args,
                at,
            }));
        }

        return Some(Inbound { chat_id, events });
    }

    if let Some(query) = &update.callback_query {
        let chat_id = query.message.as_ref()?.chat.id;
        let duel_id = query.data.as_deref().and_then(parse_accept_payload)?;
        return Some(Inbound {
            chat_id,
            events: vec![InboundEvent::Accept(AcceptEvent {
                chat_id,
                duel_id,
                acting: UserRef::from(&query.from),
                token: query.id.clone(),
                at: Utc::now(),
            })],
        });
    }

    None
}

pub fn webhook_reply(chat_id: i64, reply: Reply) -> WebhookReply {
    match reply {
        Reply::Message {
            text,
            parse_mode,
            keyboard,
            reply_to,
        } => WebhookReply::SendMessage {
            chat_id,
            text,
            parse_mode: match parse_mode {
                ParseMode::Html => Some("HTML"),
                ParseMode::Plain => None,
            },
            reply_markup: (!keyboard.is_empty()).then(|| InlineKeyboardMarkup {
                inline_keyboard: keyboard
                    .into_iter()
                    .map(|row| {
                        row.into_iter()
                            .map(|button| match button.action {
                                ButtonAction::Url(url) => InlineKeyboardButton {
                                    text: button.text,
                                    url: Some(url),
                                    callback_data: None,
                                },
                                ButtonAction::Callback(data) => InlineKeyboardButton {
                                    text: button.text,
                                    url: None,
                                    callback_data: Some(data),
                                },
                            })
                            .collect()
                    })
                    .collect(),
            }),
            reply_parameters: reply_to.map(|message_id| ReplyParameters {
                message_id,
                allow_sending_without_reply: true,
            }),
        },
        Reply::Notice { token, text, alert } => WebhookReply::AnswerCallbackQuery {
            callback_query_id: token,
            text,
            show_alert: alert,
        },
    }
}
