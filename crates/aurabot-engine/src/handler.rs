use aurabot_db::AuraStore;
use aurabot_types::events::{AcceptEvent, ActivityEvent, CommandEvent, InboundEvent, Reply};
use aurabot_types::models::{ChatId, UserId, UserRef};
use tracing::{debug, error};

use crate::commands::{self, Command};
use crate::{AuraError, Engine, render};

impl<S: AuraStore> Engine<S> {
    /// Entry point for the transport. Failures are turned into replies; only
    /// events that need no answer yield `None`.
    pub fn handle(&self, event: &InboundEvent) -> Option<Reply> {
        match event {
            InboundEvent::Activity(activity) => {
                if let Err(e) = self.observe(activity) {
                    error!(chat_id = activity.chat_id, "Failed to record participant: {}", e);
                }
                None
            }
            InboundEvent::Command(command) => self.handle_command(command),
            InboundEvent::Accept(accept) => Some(self.handle_accept(accept)),
        }
    }

    /// Track a user seen in a group chat. Private chats are ignored.
    pub fn observe(&self, event: &ActivityEvent) -> Result<(), AuraError> {
        if event.private {
            return Ok(());
        }
        self.store.record_participant(&event.user, event.chat_id, event.at)?;
        Ok(())
    }

    pub fn handle_command(&self, event: &CommandEvent) -> Option<Reply> {
        let command = commands::parse(&event.command)?;
        debug!(command = %event.command, chat_id = event.chat_id, invoker = event.invoker.id, "Command");

        let result = match command {
            Command::Start => Ok(render::welcome(&self.config.links)),
            Command::Leaderboard => self
                .store
                .leaderboard(event.chat_id, self.leaderboard_size(&event.args))
                .map(|entries| Reply::plain(render::leaderboard(&entries)))
                .map_err(AuraError::from),
            Command::Fight => match &event.reply_target {
                Some(opponent) => self.issue_challenge(event, opponent),
                None => self.award_reply(commands::award("fight"), event),
            },
            Command::Award(spec) => self.award_reply(Some(spec), event),
        };

        let reply = result.unwrap_or_else(|e| {
            if e.is_storage() {
                error!(command = %event.command, chat_id = event.chat_id, "Command failed: {}", e);
            }
            Reply::plain(e.user_message())
        });
        Some(reply.replying_to(event.message_id))
    }

    pub fn handle_accept(&self, event: &AcceptEvent) -> Reply {
        let notice = |text: String, alert: bool| Reply::Notice {
            token: event.token.clone(),
            text,
            alert,
        };

        let resolution = match self.accept(event.chat_id, event.duel_id, event.acting.id, event.at) {
            Ok(resolution) => resolution,
            Err(e) => {
                if e.is_storage() {
                    error!(duel_id = %event.duel_id, "Duel accept failed: {}", e);
                }
                return notice(e.user_message(), true);
            }
        };

        let identify = |user_id: UserId| {
            if user_id == event.acting.id {
                Ok(event.acting.clone())
            } else {
                self.identity(event.chat_id, user_id)
            }
        };
        match (identify(resolution.winner_id), identify(resolution.loser_id)) {
            (Ok(winner), Ok(loser)) => Reply::html(render::duel_result(&resolution, &winner, &loser)),
            (Err(e), _) | (_, Err(e)) => {
                // The reward is already committed; only the wording is lost
                error!(duel_id = %event.duel_id, "Failed to load duel participants: {}", e);
                Reply::html(render::duel_result(
                    &resolution,
                    &UserRef::new(resolution.winner_id, None, ""),
                    &UserRef::new(resolution.loser_id, None, ""),
                ))
            }
        }
    }

    fn issue_challenge(&self, event: &CommandEvent, opponent: &UserRef) -> Result<Reply, AuraError> {
        if opponent.id == event.invoker.id {
            return Err(AuraError::SelfChallenge);
        }
        let duel = self.challenge(
            event.chat_id,
            event.invoker.id,
            opponent.id,
            event.message_id,
            event.at,
        )?;
        Ok(render::challenge(&duel, &event.invoker, opponent))
    }

    fn award_reply(
        &self,
        spec: Option<&'static commands::AwardSpec>,
        event: &CommandEvent,
    ) -> Result<Reply, AuraError> {
        let Some(spec) = spec else {
            return Ok(Reply::plain("Unknown command."));
        };
        let outcome = self.invoke_award(spec, event.chat_id, event.at)?;
        Ok(Reply::html(render::award(&outcome)))
    }

    /// `/aura N` shows the top N, capped at the configured limit.
    fn leaderboard_size(&self, args: &[String]) -> u32 {
        let limit = self.config.leaderboard_limit;
        args.first()
            .and_then(|arg| arg.parse::<u32>().ok())
            .filter(|n| *n > 0)
            .map_or(limit, |n| n.min(limit))
    }

    /// Stored identity of a chat member, or an anonymous stand-in.
    fn identity(&self, chat_id: ChatId, user_id: UserId) -> Result<UserRef, AuraError> {
        Ok(self
            .store
            .participants(chat_id)?
            .into_iter()
            .find(|p| p.user.id == user_id)
            .map(|p| p.user)
            .unwrap_or_else(|| UserRef::new(user_id, None, "")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EngineConfig;
    use aurabot_db::Database;
    use aurabot_types::events::{ButtonAction, parse_accept_payload};
    use chrono::{DateTime, TimeZone, Utc};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const GROUP: i64 = -1001;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 10, 0, 0).unwrap()
    }

    fn ann() -> UserRef {
        UserRef::new(1, Some("ann".into()), "Ann")
    }

    fn bob() -> UserRef {
        UserRef::new(2, Some("bob".into()), "Bob")
    }

    fn engine() -> Engine<Database> {
        Engine::with_rng(
            Database::open_in_memory().unwrap(),
            EngineConfig::default(),
            StdRng::seed_from_u64(11),
        )
    }

    fn seen(engine: &Engine<Database>, user: UserRef, private: bool) {
        let event = InboundEvent::Activity(ActivityEvent {
            chat_id: GROUP,
            private,
            user,
            at: at(),
        });
        assert!(engine.handle(&event).is_none());
    }

    fn command(name: &str, invoker: UserRef, reply_target: Option<UserRef>) -> CommandEvent {
        CommandEvent {
            chat_id: GROUP,
            private: false,
            message_id: 300,
            invoker,
            reply_target,
            command: name.to_string(),
            args: Vec::new(),
            at: at(),
        }
    }

    #[test]
    fn private_activity_is_not_tracked() {
        let engine = engine();
        seen(&engine, ann(), true);
        assert!(engine.store().get_participants(GROUP).unwrap().is_empty());
    }

    #[test]
    fn unknown_commands_are_ignored() {
        let engine = engine();
        assert!(engine.handle_command(&command("weather", ann(), None)).is_none());
    }

    #[test]
    fn start_replies_with_links() {
        let engine = engine();
        let reply = engine.handle_command(&command("start", ann(), None)).unwrap();
        assert!(reply.text().starts_with("Welcome to the Aura Bot!"));
    }

    #[test]
    fn errors_become_replies_to_the_command() {
        let engine = engine();
        seen(&engine, ann(), false);
        let reply = engine.handle_command(&command("couple", ann(), None)).unwrap();
        assert_eq!(reply.text(), "Not enough members!");
        assert!(matches!(reply, Reply::Message { reply_to: Some(300), .. }));
    }

    #[test]
    fn leaderboard_command() {
        let engine = engine();
        let reply = engine.handle_command(&command("aura", ann(), None)).unwrap();
        assert_eq!(reply.text(), "No aura data yet.");

        seen(&engine, ann(), false);
        engine.handle_command(&command("respect", ann(), None)).unwrap();
        let reply = engine.handle_command(&command("aura", ann(), None)).unwrap();
        assert!(reply.text().contains("1. @ann — 500 aura"));
    }

    #[test]
    fn leaderboard_size_argument() {
        let engine = engine();
        seen(&engine, ann(), false);
        seen(&engine, bob(), false);

        let sized = |args: &[&str]| {
            let mut event = command("aura", ann(), None);
            event.args = args.iter().map(|a| a.to_string()).collect();
            engine.handle_command(&event).unwrap().text().lines().filter(|l| l.contains(" aura")).count()
        };
        assert_eq!(sized(&[]), 2);
        assert_eq!(sized(&["1"]), 1);
        assert_eq!(sized(&["500"]), 2);
        assert_eq!(sized(&["0"]), 2);
        assert_eq!(sized(&["lots"]), 2);
    }

    #[test]
    fn self_challenge_is_refused() {
        let engine = engine();
        let reply = engine.handle_command(&command("fight", ann(), Some(ann()))).unwrap();
        assert_eq!(reply.text(), AuraError::SelfChallenge.user_message());
    }

    #[test]
    fn challenge_then_accept_through_the_button() {
        let engine = engine();
        seen(&engine, ann(), false);
        seen(&engine, bob(), false);

        let reply = engine.handle_command(&command("fight", ann(), Some(bob()))).unwrap();
        let Reply::Message { keyboard, .. } = &reply else {
            panic!("expected a message, got {:?}", reply);
        };
        let ButtonAction::Callback(data) = &keyboard[0][0].action else {
            panic!("expected a callback button");
        };
        let duel_id = parse_accept_payload(data).unwrap();

        let accept = |user: UserRef| AcceptEvent {
            chat_id: GROUP,
            duel_id,
            acting: user,
            token: "cb-1".into(),
            at: at(),
        };

        let refused = engine.handle_accept(&accept(ann()));
        assert!(matches!(refused, Reply::Notice { alert: true, .. }));

        let result = engine.handle_accept(&accept(bob()));
        assert!(result.text().contains("won the duel against"));
        assert!(result.text().ends_with("+100 aura"));

        let replay = engine.handle_accept(&accept(bob()));
        assert_eq!(replay.text(), "This duel is already over.");

        let total: i64 = engine
            .store()
            .get_leaderboard(GROUP, 10)
            .unwrap()
            .iter()
            .map(|row| row.balance)
            .sum();
        assert_eq!(total, 100);
    }
}
