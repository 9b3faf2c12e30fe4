use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Telegram chat identifier. Group chats are negative.
pub type ChatId = i64;

/// Telegram user identifier.
pub type UserId = i64;

/// Display identity of a user, independent of any live chat membership lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: UserId,
    pub username: Option<String>,
    pub display_name: String,
}

impl UserRef {
    pub fn new(id: UserId, username: Option<String>, display_name: impl Into<String>) -> Self {
        Self {
            id,
            username,
            display_name: display_name.into(),
        }
    }

    /// Name as shown to humans: `@username` when known, otherwise the display name.
    pub fn label(&self) -> String {
        match &self.username {
            Some(username) if !username.is_empty() => format!("@{}", username),
            _ if !self.display_name.is_empty() => self.display_name.clone(),
            _ => "unknown".to_string(),
        }
    }

    /// HTML deep link that pings the user.
    pub fn mention_html(&self) -> String {
        format!(
            "<a href=\"tg://user?id={}\">{}</a>",
            self.id,
            escape_html(&self.label())
        )
    }

    /// Same identity without a deep link, so the user is not notified.
    pub fn plain_name(&self) -> String {
        escape_html(&self.label())
    }
}

/// Escape text for Telegram's HTML parse mode.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// A user observed active in a non-private chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub user: UserRef,
    pub chat_id: ChatId,
    pub last_active: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub user: UserRef,
    pub balance: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuelStatus {
    Pending,
    Accepted,
    Expired,
}

impl DuelStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Expired => "expired",
        }
    }
}

impl fmt::Display for DuelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DuelStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "expired" => Ok(Self::Expired),
            other => Err(format!("unknown duel status '{}'", other)),
        }
    }
}

/// A challenge issued by one user against another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Duel {
    pub id: Uuid,
    pub chat_id: ChatId,
    pub challenger_id: UserId,
    pub opponent_id: UserId,
    /// Message the challenge was issued from; at most one pending duel per ref.
    pub message_ref: i64,
    pub status: DuelStatus,
    pub winner_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mention_prefers_username() {
        let user = UserRef::new(42, Some("neo".into()), "Thomas");
        assert_eq!(user.mention_html(), "<a href=\"tg://user?id=42\">@neo</a>");
        assert_eq!(user.plain_name(), "@neo");
    }

    #[test]
    fn mention_escapes_display_name() {
        let user = UserRef::new(7, None, "<b>Tom & Jerry</b>");
        assert_eq!(user.plain_name(), "&lt;b&gt;Tom &amp; Jerry&lt;/b&gt;");
        assert!(user.mention_html().contains("tg://user?id=7"));
    }

    #[test]
    fn empty_identity_falls_back_to_unknown() {
        let user = UserRef::new(1, Some(String::new()), "");
        assert_eq!(user.label(), "unknown");
    }

    #[test]
    fn duel_status_parses_its_own_names() {
        for status in [DuelStatus::Pending, DuelStatus::Accepted, DuelStatus::Expired] {
            assert_eq!(status.as_str().parse::<DuelStatus>().unwrap(), status);
        }
        assert!("resolved".parse::<DuelStatus>().is_err());
    }
}
