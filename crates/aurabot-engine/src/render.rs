use aurabot_types::events::{Button, Reply, accept_payload};
use aurabot_types::models::{Duel, LeaderboardEntry, UserRef};

use crate::config::WelcomeLinks;
use crate::dispatcher::AwardOutcome;
use crate::duel::DuelResolution;

pub fn signed(delta: i64) -> String {
    if delta > 0 {
        format!("+{}", delta)
    } else {
        delta.to_string()
    }
}

/// Fill the command template. Announced winners are mentioned; softened ones
/// and bystanders are named without a link.
pub fn award(outcome: &AwardOutcome) -> String {
    let name = |idx: usize| {
        outcome
            .participants
            .get(idx)
            .map(|p| match outcome.award_for(p.user.id) {
                Some(award) if award.announced => p.user.mention_html(),
                _ => p.user.plain_name(),
            })
            .unwrap_or_default()
    };

    outcome
        .spec
        .template
        .replace("{first}", &name(0))
        .replace("{second}", &name(1))
        .replace("{delta}", &signed(outcome.spec.delta))
}

pub fn leaderboard(entries: &[LeaderboardEntry]) -> String {
    if entries.is_empty() {
        return "No aura data yet.".to_string();
    }
    let mut msg = String::from("🌟 Aura Leaderboard 🌟\n\n");
    for (i, entry) in entries.iter().enumerate() {
        msg.push_str(&format!("{}. {} — {} aura\n", i + 1, entry.user.label(), entry.balance));
    }
    msg
}

pub fn challenge(duel: &Duel, challenger: &UserRef, opponent: &UserRef) -> Reply {
    Reply::html(format!(
        "⚔️ {} challenged {} to a duel! {}, do you accept?",
        challenger.mention_html(),
        opponent.mention_html(),
        opponent.plain_name()
    ))
    .with_keyboard(vec![vec![Button::callback("Accept ⚔️", accept_payload(duel.id))]])
}

pub fn duel_result(resolution: &DuelResolution, winner: &UserRef, loser: &UserRef) -> String {
    format!(
        "🏆 {} won the duel against {}! {} aura",
        winner.mention_html(),
        loser.plain_name(),
        signed(resolution.reward)
    )
}

pub fn welcome(links: &WelcomeLinks) -> Reply {
    Reply::plain("Welcome to the Aura Bot! Use fun commands like /gay, /couple, /aura etc.").with_keyboard(vec![
        vec![
            Button::url("Updates", &links.updates),
            Button::url("Support", &links.support),
        ],
        vec![Button::url("Add Me To Your Group", &links.add_to_group)],
    ])
}
