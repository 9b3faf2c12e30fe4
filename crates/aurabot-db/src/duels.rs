use anyhow::Result;
use aurabot_types::models::{Duel, DuelStatus};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, TransactionBehavior};
use uuid::Uuid;

use crate::ledger::add_to_balance;
use crate::models::{DuelAcceptance, DuelRow};
use crate::{Database, OptionalExt};

impl Database {
    /// Insert a pending duel. Returns `None` when the message already carries one.
    pub fn create_duel(
        &self,
        chat_id: i64,
        challenger_id: i64,
        opponent_id: i64,
        message_ref: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<Duel>> {
        let id = Uuid::new_v4();
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO duels (id, chat_id, challenger_id, opponent_id, message_ref, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, 'pending', ?6)",
                rusqlite::params![
                    id.to_string(),
                    chat_id,
                    challenger_id,
                    opponent_id,
                    message_ref,
                    now.timestamp()
                ],
            )?;
            if inserted == 0 {
                return Ok(None);
            }
            query_duel(conn, &id.to_string())?
                .map(Duel::try_from)
                .transpose()
        })
    }

    pub fn get_duel(&self, id: Uuid) -> Result<Option<Duel>> {
        self.with_conn(|conn| query_duel(conn, &id.to_string())?.map(Duel::try_from).transpose())
    }

    /// Resolve a pending duel and pay the winner in one transaction.
    ///
    /// A duel from another chat is reported as `NotFound`. Authorization is
    /// checked before status, so a non-opponent is always told
    /// `NotAuthorized`. Nothing is written unless the duel is accepted.
    pub fn accept_duel(
        &self,
        chat_id: i64,
        id: Uuid,
        acting_user_id: i64,
        challenger_wins: bool,
        reward: i64,
        now: DateTime<Utc>,
    ) -> Result<DuelAcceptance> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let Some(row) = query_duel(&tx, &id.to_string())? else {
                return Ok(DuelAcceptance::NotFound);
            };
            let mut duel = Duel::try_from(row)?;
            if duel.chat_id != chat_id {
                return Ok(DuelAcceptance::NotFound);
            }

            if duel.opponent_id != acting_user_id {
                return Ok(DuelAcceptance::NotAuthorized);
            }
            if duel.status != DuelStatus::Pending {
                return Ok(DuelAcceptance::AlreadyResolved(duel.status));
            }

            let (winner_id, loser_id) = if challenger_wins {
                (duel.challenger_id, duel.opponent_id)
            } else {
                (duel.opponent_id, duel.challenger_id)
            };

            let updated = tx.execute(
                "UPDATE duels SET status = 'accepted', winner_id = ?2, resolved_at = ?3
                 WHERE id = ?1 AND status = 'pending'",
                rusqlite::params![id.to_string(), winner_id, now.timestamp()],
            )?;
            if updated != 1 {
                return Ok(DuelAcceptance::AlreadyResolved(duel.status));
            }

            let winner_balance = add_to_balance(&tx, winner_id, duel.chat_id, reward, now.timestamp())?;
            tx.commit()?;

            duel.status = DuelStatus::Accepted;
            duel.winner_id = Some(winner_id);
            Ok(DuelAcceptance::Accepted {
                duel,
                winner_id,
                loser_id,
                winner_balance,
            })
        })
    }

    /// Move one pending duel to `expired`. Returns false if it was not pending.
    pub fn expire_duel(&self, id: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE duels SET status = 'expired' WHERE id = ?1 AND status = 'pending'",
                [id.to_string()],
            )?;
            Ok(updated == 1)
        })
    }

    /// Expire every pending duel created before `cutoff`.
    pub fn expire_duels_before(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE duels SET status = 'expired' WHERE status = 'pending' AND created_at < ?1",
                [cutoff.timestamp()],
            )?;
            Ok(updated)
        })
    }
}

fn query_duel(conn: &Connection, id: &str) -> Result<Option<DuelRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, chat_id, challenger_id, opponent_id, message_ref, status, winner_id, created_at
         FROM duels WHERE id = ?1",
    )?;

    let row = stmt
        .query_row([id], |row| {
            Ok(DuelRow {
                id: row.get(0)?,
                chat_id: row.get(1)?,
                challenger_id: row.get(2)?,
                opponent_id: row.get(3)?,
                message_ref: row.get(4)?,
                status: row.get(5)?,
                winner_id: row.get(6)?,
                created_at: row.get(7)?,
            })
        })
        .optional()?;

    Ok(row)
}
