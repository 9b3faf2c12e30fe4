//! Database row types, mapped directly from SQLite rows.
//! Distinct from aurabot-types models to keep the DB layer independent.

use aurabot_types::models::{Duel, DuelStatus, LeaderboardEntry, Participant, UserRef};
use chrono::{DateTime, Utc};
use tracing::warn;

pub struct ParticipantRow {
    pub user_id: i64,
    pub chat_id: i64,
    pub username: Option<String>,
    pub display_name: String,
    pub last_active: i64,
}

pub struct LeaderboardRow {
    pub user_id: i64,
    pub username: Option<String>,
    pub display_name: String,
    pub balance: i64,
}

pub struct DuelRow {
    pub id: String,
    pub chat_id: i64,
    pub challenger_id: i64,
    pub opponent_id: i64,
    pub message_ref: i64,
    pub status: String,
    pub winner_id: Option<i64>,
    pub created_at: i64,
}

/// Result of an attempted duel acceptance, decided inside one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DuelAcceptance {
    Accepted {
        duel: Duel,
        winner_id: i64,
        loser_id: i64,
        winner_balance: i64,
    },
    NotFound,
    NotAuthorized,
    AlreadyResolved(DuelStatus),
}

pub(crate) fn from_unix(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

impl From<ParticipantRow> for Participant {
    fn from(row: ParticipantRow) -> Self {
        Participant {
            user: UserRef::new(row.user_id, row.username, row.display_name),
            chat_id: row.chat_id,
            last_active: from_unix(row.last_active),
        }
    }
}

impl From<LeaderboardRow> for LeaderboardEntry {
    fn from(row: LeaderboardRow) -> Self {
        LeaderboardEntry {
            user: UserRef::new(row.user_id, row.username, row.display_name),
            balance: row.balance,
        }
    }
}

impl TryFrom<DuelRow> for Duel {
    type Error = anyhow::Error;

    fn try_from(row: DuelRow) -> anyhow::Result<Self> {
        let status = row.status.parse::<DuelStatus>().map_err(|e| {
            warn!("Corrupt status on duel '{}': {}", row.id, e);
            anyhow::anyhow!(e)
        })?;

        Ok(Duel {
            id: row.id.parse()?,
            chat_id: row.chat_id,
            challenger_id: row.challenger_id,
            opponent_id: row.opponent_id,
            message_ref: row.message_ref,
            status,
            winner_id: row.winner_id,
            created_at: from_unix(row.created_at),
        })
    }
}
