use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, TransactionBehavior};

use crate::models::LeaderboardRow;
use crate::participants::ensure_participant;
use crate::{Database, OptionalExt};

impl Database {
    /// Add `delta` to the balance and return the new balance.
    ///
    /// The increment happens inside the upsert, so concurrent calls on the
    /// same key never lose an update.
    pub fn apply_delta(&self, user_id: i64, chat_id: i64, delta: i64, now: DateTime<Utc>) -> Result<i64> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let balance = add_to_balance(&tx, user_id, chat_id, delta, now.timestamp())?;
            tx.commit()?;
            Ok(balance)
        })
    }

    pub fn get_balance(&self, user_id: i64, chat_id: i64) -> Result<Option<i64>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT balance FROM aura_accounts WHERE user_id = ?1 AND chat_id = ?2",
                (user_id, chat_id),
                |row| row.get(0),
            )
            .optional()
        })
    }

    /// Highest balances first; equal balances keep account creation order.
    pub fn get_leaderboard(&self, chat_id: i64, limit: u32) -> Result<Vec<LeaderboardRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT a.user_id, p.username, p.display_name, a.balance
                 FROM aura_accounts a
                 JOIN participants p ON p.user_id = a.user_id AND p.chat_id = a.chat_id
                 WHERE a.chat_id = ?1
                 ORDER BY a.balance DESC, a.id ASC
                 LIMIT ?2",
            )?;

            let rows = stmt
                .query_map((chat_id, limit), |row| {
                    Ok(LeaderboardRow {
                        user_id: row.get(0)?,
                        username: row.get(1)?,
                        display_name: row.get(2)?,
                        balance: row.get(3)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

/// Upsert-and-increment. Callers own the surrounding transaction.
pub(crate) fn add_to_balance(conn: &Connection, user_id: i64, chat_id: i64, delta: i64, now: i64) -> Result<i64> {
    ensure_participant(conn, user_id, chat_id, now)?;
    let balance = conn.query_row(
        "INSERT INTO aura_accounts (user_id, chat_id, balance) VALUES (?1, ?2, ?3)
         ON CONFLICT(user_id, chat_id) DO UPDATE SET balance = balance + excluded.balance
         RETURNING balance",
        (user_id, chat_id, delta),
        |row| row.get(0),
    )?;
    Ok(balance)
}
