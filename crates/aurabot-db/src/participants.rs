use anyhow::Result;
use aurabot_types::models::UserRef;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, TransactionBehavior};

use crate::Database;
use crate::models::ParticipantRow;

impl Database {
    /// Upsert a participant and make sure its ledger account exists.
    pub fn record_participant(&self, user: &UserRef, chat_id: i64, at: DateTime<Utc>) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            tx.execute(
                "INSERT INTO participants (user_id, chat_id, username, display_name, last_active)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(user_id, chat_id) DO UPDATE SET
                    username = excluded.username,
                    display_name = excluded.display_name,
                    last_active = MAX(participants.last_active, excluded.last_active)",
                rusqlite::params![user.id, chat_id, user.username, user.display_name, at.timestamp()],
            )?;
            open_account(&tx, user.id, chat_id)?;
            tx.commit()?;
            Ok(())
        })
    }

    /// All participants of a chat in registration order.
    pub fn get_participants(&self, chat_id: i64) -> Result<Vec<ParticipantRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id, chat_id, username, display_name, last_active
                 FROM participants
                 WHERE chat_id = ?1
                 ORDER BY rowid",
            )?;

            let rows = stmt
                .query_map([chat_id], |row| {
                    Ok(ParticipantRow {
                        user_id: row.get(0)?,
                        chat_id: row.get(1)?,
                        username: row.get(2)?,
                        display_name: row.get(3)?,
                        last_active: row.get(4)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

pub(crate) fn open_account(conn: &Connection, user_id: i64, chat_id: i64) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO aura_accounts (user_id, chat_id, balance) VALUES (?1, ?2, 0)",
        (user_id, chat_id),
    )?;
    Ok(())
}

/// Insert a stand-in participant for a user who was never observed, so a
/// ledger entry never exists without its participant.
pub(crate) fn ensure_participant(conn: &Connection, user_id: i64, chat_id: i64, at: i64) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO participants (user_id, chat_id, username, display_name, last_active)
         VALUES (?1, ?2, NULL, '', ?3)",
        (user_id, chat_id, at),
    )?;
    Ok(())
}
