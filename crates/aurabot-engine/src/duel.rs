use aurabot_db::{AuraStore, DuelAcceptance};
use aurabot_types::models::{ChatId, Duel, UserId};
use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{AuraError, Engine};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuelResolution {
    pub duel: Duel,
    pub winner_id: UserId,
    pub loser_id: UserId,
    pub reward: i64,
    pub winner_balance: i64,
}

impl<S: AuraStore> Engine<S> {
    /// Open a pending duel. The caller guarantees the opponent is someone else.
    pub fn challenge(
        &self,
        chat_id: ChatId,
        challenger_id: UserId,
        opponent_id: UserId,
        message_ref: i64,
        now: DateTime<Utc>,
    ) -> Result<Duel, AuraError> {
        let duel = self
            .store
            .create_duel(chat_id, challenger_id, opponent_id, message_ref, now)?
            .ok_or(AuraError::DuelAlreadyPending)?;
        debug!(duel_id = %duel.id, chat_id, challenger_id, opponent_id, "Duel issued");
        Ok(duel)
    }

    /// Accept a pending duel of `chat_id` as `acting_user_id`.
    ///
    /// The coin is flipped up front; the store applies the status change and
    /// the reward together, so a replayed accept can never pay twice.
    pub fn accept(
        &self,
        chat_id: ChatId,
        duel_id: Uuid,
        acting_user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<DuelResolution, AuraError> {
        let challenger_wins = self.draw(|rng| rng.random_bool(0.5));
        let reward = self.config.duel_reward;

        match self
            .store
            .accept_duel(chat_id, duel_id, acting_user_id, challenger_wins, reward, now)?
        {
            DuelAcceptance::Accepted {
                duel,
                winner_id,
                loser_id,
                winner_balance,
            } => {
                debug!(%duel_id, winner_id, winner_balance, "Duel resolved");
                Ok(DuelResolution {
                    duel,
                    winner_id,
                    loser_id,
                    reward,
                    winner_balance,
                })
            }
            DuelAcceptance::NotFound => Err(AuraError::DuelNotFound),
            DuelAcceptance::NotAuthorized => {
                debug!(%duel_id, acting_user_id, "Accept by someone other than the opponent");
                Err(AuraError::NotAuthorized)
            }
            DuelAcceptance::AlreadyResolved(status) => {
                debug!(%duel_id, %status, "Accept on a settled duel");
                Err(AuraError::AlreadyResolved)
            }
        }
    }

    /// Explicitly expire one pending duel.
    pub fn expire(&self, duel_id: Uuid) -> Result<bool, AuraError> {
        Ok(self.store.expire_duel(duel_id)?)
    }

    /// Expire every pending duel older than the configured TTL. A TTL
    /// reaching past the representable time range expires nothing.
    pub fn expire_stale(&self, now: DateTime<Utc>) -> Result<usize, AuraError> {
        let Some(ttl) = self.config.duel_ttl else {
            return Ok(0);
        };
        let Some(cutoff) = now.checked_sub_signed(ttl) else {
            debug!(?ttl, "Duel TTL reaches before the earliest timestamp, nothing to expire");
            return Ok(0);
        };
        let expired = self.store.expire_duels_before(cutoff)?;
        if expired > 0 {
            info!("Expired {} stale duels", expired);
        }
        Ok(expired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EngineConfig;
    use aurabot_db::Database;
    use aurabot_types::models::DuelStatus;
    use chrono::Duration;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const CHAT: i64 = -77;
    const ANN: i64 = 1;
    const BOB: i64 = 2;

    fn engine(config: EngineConfig) -> Engine<Database> {
        Engine::with_rng(Database::open_in_memory().unwrap(), config, StdRng::seed_from_u64(5))
    }

    #[test]
    fn accept_by_opponent_pays_one_side_once() {
        let engine = engine(EngineConfig::default());
        let now = Utc::now();
        let duel = engine.challenge(CHAT, ANN, BOB, 10, now).unwrap();

        let resolution = engine.accept(CHAT, duel.id, BOB, now).unwrap();
        assert!([ANN, BOB].contains(&resolution.winner_id));
        assert_ne!(resolution.winner_id, resolution.loser_id);
        assert_eq!(resolution.winner_balance, 100);
        assert_eq!(resolution.duel.status, DuelStatus::Accepted);

        assert!(matches!(engine.accept(CHAT, duel.id, BOB, now), Err(AuraError::AlreadyResolved)));
        let store = engine.store();
        assert_eq!(store.get_balance(resolution.winner_id, CHAT).unwrap(), Some(100));
    }

    #[test]
    fn challenger_cannot_accept_own_duel() {
        let engine = engine(EngineConfig::default());
        let now = Utc::now();
        let duel = engine.challenge(CHAT, ANN, BOB, 10, now).unwrap();

        for _ in 0..3 {
            assert!(matches!(engine.accept(CHAT, duel.id, ANN, now), Err(AuraError::NotAuthorized)));
        }
        let stored = engine.store().get_duel(duel.id).unwrap().unwrap();
        assert_eq!(stored.status, DuelStatus::Pending);
    }

    #[test]
    fn duplicate_challenge_on_same_message() {
        let engine = engine(EngineConfig::default());
        let now = Utc::now();
        engine.challenge(CHAT, ANN, BOB, 10, now).unwrap();
        assert!(matches!(
            engine.challenge(CHAT, ANN, BOB, 10, now),
            Err(AuraError::DuelAlreadyPending)
        ));
    }

    #[test]
    fn unknown_duel_is_reported() {
        let engine = engine(EngineConfig::default());
        assert!(matches!(
            engine.accept(CHAT, Uuid::new_v4(), BOB, Utc::now()),
            Err(AuraError::DuelNotFound)
        ));
    }

    #[test]
    fn stale_duels_expire_after_ttl() {
        let engine = engine(EngineConfig {
            duel_ttl: Some(Duration::hours(1)),
            ..EngineConfig::default()
        });
        let now = Utc::now();
        let old = engine.challenge(CHAT, ANN, BOB, 1, now - Duration::hours(2)).unwrap();
        let fresh = engine.challenge(CHAT, ANN, BOB, 2, now).unwrap();

        assert_eq!(engine.expire_stale(now).unwrap(), 1);
        assert!(matches!(engine.accept(CHAT, old.id, BOB, now), Err(AuraError::AlreadyResolved)));
        assert!(engine.accept(CHAT, fresh.id, BOB, now).is_ok());
    }

    #[test]
    fn no_ttl_keeps_duels_pending() {
        let engine = engine(EngineConfig {
            duel_ttl: None,
            ..EngineConfig::default()
        });
        let now = Utc::now();
        engine.challenge(CHAT, ANN, BOB, 1, now - Duration::days(30)).unwrap();
        assert_eq!(engine.expire_stale(now).unwrap(), 0);
    }

    #[test]
    fn ttl_beyond_the_calendar_expires_nothing() {
        let engine = engine(EngineConfig {
            duel_ttl: Some(Duration::hours(10_000_000_000)),
            ..EngineConfig::default()
        });
        let now = Utc::now();
        let duel = engine.challenge(CHAT, ANN, BOB, 1, now - Duration::days(365)).unwrap();

        assert_eq!(engine.expire_stale(now).unwrap(), 0);
        assert!(engine.accept(CHAT, duel.id, BOB, now).is_ok());
    }

    #[test]
    fn accept_from_another_chat_is_not_found() {
        let engine = engine(EngineConfig::default());
        let now = Utc::now();
        let duel = engine.challenge(CHAT, ANN, BOB, 1, now).unwrap();

        assert!(matches!(
            engine.accept(CHAT - 1, duel.id, BOB, now),
            Err(AuraError::DuelNotFound)
        ));
        assert!(engine.accept(CHAT, duel.id, BOB, now).is_ok());
    }

    #[test]
    fn explicit_expiry() {
        let engine = engine(EngineConfig::default());
        let duel = engine.challenge(CHAT, ANN, BOB, 1, Utc::now()).unwrap();
        assert!(engine.expire(duel.id).unwrap());
        assert!(!engine.expire(duel.id).unwrap());
    }
}
