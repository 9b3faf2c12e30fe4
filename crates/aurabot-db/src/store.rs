use anyhow::Result;
use aurabot_types::models::{Duel, LeaderboardEntry, Participant, UserRef};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use uuid::Uuid;

use crate::Database;
use crate::models::DuelAcceptance;

/// Storage seam the engine is written against.
///
/// Every mutating method is a single atomic unit against the store; callers
/// never compose a read with a later write to enforce a rule.
pub trait AuraStore: Send + Sync {
    fn record_participant(&self, user: &UserRef, chat_id: i64, at: DateTime<Utc>) -> Result<()>;

    fn participants(&self, chat_id: i64) -> Result<Vec<Participant>>;

    fn apply_delta(&self, user_id: i64, chat_id: i64, delta: i64, now: DateTime<Utc>) -> Result<i64>;

    fn leaderboard(&self, chat_id: i64, limit: u32) -> Result<Vec<LeaderboardEntry>>;

    fn try_claim_cooldown(&self, command: &str, chat_id: i64, day: NaiveDate) -> Result<bool>;

    fn try_announce(
        &self,
        user_id: i64,
        chat_id: i64,
        command: &str,
        now: DateTime<Utc>,
        window: Duration,
    ) -> Result<bool>;

    fn create_duel(
        &self,
        chat_id: i64,
        challenger_id: i64,
        opponent_id: i64,
        message_ref: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<Duel>>;

    fn accept_duel(
        &self,
        chat_id: i64,
        id: Uuid,
        acting_user_id: i64,
        challenger_wins: bool,
        reward: i64,
        now: DateTime<Utc>,
    ) -> Result<DuelAcceptance>;

    fn expire_duel(&self, id: Uuid) -> Result<bool>;

    fn expire_duels_before(&self, cutoff: DateTime<Utc>) -> Result<usize>;
}

impl AuraStore for Database {
    fn record_participant(&self, user: &UserRef, chat_id: i64, at: DateTime<Utc>) -> Result<()> {
        Database::record_participant(self, user, chat_id, at)
    }

    fn participants(&self, chat_id: i64) -> Result<Vec<Participant>> {
        Ok(self
            .get_participants(chat_id)?
            .into_iter()
            .map(Participant::from)
            .collect())
    }

    fn apply_delta(&self, user_id: i64, chat_id: i64, delta: i64, now: DateTime<Utc>) -> Result<i64> {
        Database::apply_delta(self, user_id, chat_id, delta, now)
    }

    fn leaderboard(&self, chat_id: i64, limit: u32) -> Result<Vec<LeaderboardEntry>> {
        Ok(self
            .get_leaderboard(chat_id, limit)?
            .into_iter()
            .map(LeaderboardEntry::from)
            .collect())
    }

    fn try_claim_cooldown(&self, command: &str, chat_id: i64, day: NaiveDate) -> Result<bool> {
        Database::try_claim_cooldown(self, command, chat_id, day)
    }

    fn try_announce(
        &self,
        user_id: i64,
        chat_id: i64,
        command: &str,
        now: DateTime<Utc>,
        window: Duration,
    ) -> Result<bool> {
        Database::try_announce(self, user_id, chat_id, command, now, window)
    }

    fn create_duel(
        &self,
        chat_id: i64,
        challenger_id: i64,
        opponent_id: i64,
        message_ref: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<Duel>> {
        Database::create_duel(self, chat_id, challenger_id, opponent_id, message_ref, now)
    }

    fn accept_duel(
        &self,
        chat_id: i64,
        id: Uuid,
        acting_user_id: i64,
        challenger_wins: bool,
        reward: i64,
        now: DateTime<Utc>,
    ) -> Result<DuelAcceptance> {
        Database::accept_duel(self, chat_id, id, acting_user_id, challenger_wins, reward, now)
    }

    fn expire_duel(&self, id: Uuid) -> Result<bool> {
        Database::expire_duel(self, id)
    }

    fn expire_duels_before(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        Database::expire_duels_before(self, cutoff)
    }
}
