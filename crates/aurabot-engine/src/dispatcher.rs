use aurabot_db::AuraStore;
use aurabot_types::models::{ChatId, Participant, UserId};
use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::{debug, warn};

use crate::clock::calendar_day;
use crate::commands::{AwardSpec, Special};
use crate::{AuraError, Engine};

/// Result of one award command.
#[derive(Debug, Clone)]
pub struct AwardOutcome {
    pub spec: &'static AwardSpec,
    /// Drawn participants in template order. For a random brawl the winner comes first.
    pub participants: Vec<Participant>,
    /// One entry per participant that received the command's delta.
    pub awards: Vec<Award>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Award {
    pub user_id: UserId,
    pub delta: i64,
    /// Balance after the delta; `None` when the command moves no points.
    pub balance: Option<i64>,
    /// False when the de-duplicator softened the public call-out.
    pub announced: bool,
}

impl AwardOutcome {
    pub fn announced(&self) -> bool {
        self.awards.iter().all(|award| award.announced)
    }

    pub fn award_for(&self, user_id: UserId) -> Option<&Award> {
        self.awards.iter().find(|award| award.user_id == user_id)
    }
}

impl<S: AuraStore> Engine<S> {
    /// Run one award command for a chat.
    ///
    /// Order matters: nothing is written until enough participants exist and
    /// the daily gate is claimed. Once claimed, the gate stays consumed even
    /// if a later step fails.
    pub fn invoke_award(
        &self,
        spec: &'static AwardSpec,
        chat_id: ChatId,
        now: DateTime<Utc>,
    ) -> Result<AwardOutcome, AuraError> {
        if spec.special == Special::NightOnly && !self.config.night.contains(now) {
            return Err(AuraError::OutsideNightWindow {
                hours_until_open: self.config.night.hours_until_open(now),
                label: self.config.night.label.clone(),
            });
        }

        let mut participants = self.pick(chat_id, spec.picks)?;

        let today = calendar_day(now, self.config.day_offset);
        if !self.store.try_claim_cooldown(spec.name, chat_id, today)? {
            debug!(command = spec.name, chat_id, %today, "Command on cooldown");
            return Err(AuraError::CommandOnCooldown {
                command: spec.name.to_string(),
            });
        }

        if spec.special == Special::RandomWinner && self.draw(|rng| rng.random_bool(0.5)) {
            participants.swap(0, 1);
        }

        let mut awards = Vec::with_capacity(spec.affected());
        for participant in participants.iter().take(spec.affected()) {
            let user_id = participant.user.id;
            let balance = if spec.delta != 0 {
                let balance = self
                    .store
                    .apply_delta(user_id, chat_id, spec.delta, now)
                    .inspect_err(|e| {
                        warn!(command = spec.name, chat_id, "Ledger write failed, cooldown stays consumed: {}", e)
                    })?;
                Some(balance)
            } else {
                None
            };

            let announced =
                self.store
                    .try_announce(user_id, chat_id, spec.name, now, self.config.announce_window)?;
            if !announced {
                debug!(command = spec.name, chat_id, user_id, "Announcement softened");
            }

            awards.push(Award {
                user_id,
                delta: spec.delta,
                balance,
                announced,
            });
        }

        debug!(command = spec.name, chat_id, awards = awards.len(), "Award applied");
        Ok(AwardOutcome {
            spec,
            participants,
            awards,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EngineConfig;
    use crate::commands::award;
    use aurabot_db::Database;
    use aurabot_types::models::UserRef;
    use chrono::{Duration, TimeZone};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const CHAT: i64 = -500;

    fn engine(members: i64) -> Engine<Database> {
        let db = Database::open_in_memory().unwrap();
        for id in 1..=members {
            db.record_participant(&UserRef::new(id, None, format!("u{}", id)), CHAT, noon())
                .unwrap();
        }
        Engine::with_rng(db, EngineConfig::default(), StdRng::seed_from_u64(9))
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn single_award_moves_one_balance() {
        let engine = engine(3);
        let outcome = engine.invoke_award(award("gay").unwrap(), CHAT, noon()).unwrap();

        assert_eq!(outcome.participants.len(), 1);
        assert_eq!(outcome.awards.len(), 1);
        let target = outcome.awards[0].user_id;
        assert_eq!(engine.store().get_balance(target, CHAT).unwrap(), Some(-100));
        assert!(outcome.announced());
    }

    #[test]
    fn couple_pays_two_distinct_members() {
        let engine = engine(4);
        let outcome = engine.invoke_award(award("couple").unwrap(), CHAT, noon()).unwrap();

        assert_eq!(outcome.awards.len(), 2);
        assert_ne!(outcome.awards[0].user_id, outcome.awards[1].user_id);
        for a in &outcome.awards {
            assert_eq!(a.balance, Some(50));
        }
    }

    #[test]
    fn random_brawl_pays_only_the_winner() {
        let engine = engine(2);
        let outcome = engine.invoke_award(award("fight").unwrap(), CHAT, noon()).unwrap();

        assert_eq!(outcome.participants.len(), 2);
        assert_eq!(outcome.awards.len(), 1);
        let winner = outcome.participants[0].user.id;
        let loser = outcome.participants[1].user.id;
        assert_eq!(outcome.awards[0].user_id, winner);
        assert_eq!(engine.store().get_balance(winner, CHAT).unwrap(), Some(100));
        assert_eq!(engine.store().get_balance(loser, CHAT).unwrap(), Some(0));
    }

    #[test]
    fn insufficient_members_touch_nothing() {
        let engine = engine(1);
        let err = engine.invoke_award(award("couple").unwrap(), CHAT, noon()).unwrap_err();
        assert!(matches!(
            err,
            AuraError::InsufficientParticipants { required: 2, found: 1 }
        ));
        // The gate was never claimed
        assert!(engine.store().try_claim_cooldown("couple", CHAT, noon().date_naive()).unwrap());
        assert_eq!(engine.store().get_balance(1, CHAT).unwrap(), Some(0));
    }

    #[test]
    fn second_use_same_day_is_on_cooldown() {
        let engine = engine(3);
        engine.invoke_award(award("sus").unwrap(), CHAT, noon()).unwrap();
        let err = engine
            .invoke_award(award("sus").unwrap(), CHAT, noon() + Duration::hours(3))
            .unwrap_err();
        assert!(matches!(err, AuraError::CommandOnCooldown { ref command } if command == "sus"));

        let next_day = noon() + Duration::days(1);
        assert!(engine.invoke_award(award("sus").unwrap(), CHAT, next_day).is_ok());
    }

    #[test]
    fn repeated_winner_within_the_hour_is_softened() {
        let engine = engine(1);
        let spec = award("simp").unwrap();
        // Different days bypass the gate; 23:30 and 00:10 are 40 minutes apart
        let late = Utc.with_ymd_and_hms(2024, 4, 1, 23, 30, 0).unwrap();
        let first = engine.invoke_award(spec, CHAT, late).unwrap();
        let second = engine.invoke_award(spec, CHAT, late + Duration::minutes(40)).unwrap();

        assert!(first.announced());
        assert!(!second.announced());
        // Ledger is updated regardless
        assert_eq!(second.awards[0].balance, Some(200));
    }

    #[test]
    fn ghost_is_closed_during_the_day() {
        let engine = engine(3);
        // 06:00 UTC is 12:00 at UTC+6
        let err = engine
            .invoke_award(award("ghost").unwrap(), CHAT, Utc.with_ymd_and_hms(2024, 4, 1, 6, 0, 0).unwrap())
            .unwrap_err();
        assert!(matches!(err, AuraError::OutsideNightWindow { hours_until_open: 8, .. }));
    }

    #[test]
    fn ghost_moves_no_points() {
        let engine = engine(2);
        // 16:00 UTC is 22:00 at UTC+6
        let night = Utc.with_ymd_and_hms(2024, 4, 1, 16, 0, 0).unwrap();
        let outcome = engine.invoke_award(award("ghost").unwrap(), CHAT, night).unwrap();

        assert_eq!(outcome.awards[0].balance, None);
        let board = engine.store().get_leaderboard(CHAT, 10).unwrap();
        assert!(board.iter().all(|row| row.balance == 0));
    }
}
