//! Command table. Every award command is a row here and runs through the
//! single dispatcher path in [`crate::dispatcher`].

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Special {
    None,
    /// Only available inside the configured night window.
    NightOnly,
    /// Two participants are drawn and only a random winner receives the delta.
    RandomWinner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AwardSpec {
    pub name: &'static str,
    /// 1 or 2.
    pub picks: usize,
    pub delta: i64,
    /// Placeholders: `{first}`, `{second}`, `{delta}`.
    pub template: &'static str,
    pub special: Special,
}

impl AwardSpec {
    /// Positions in the draw that receive `delta`.
    pub fn affected(&self) -> usize {
        match self.special {
            Special::RandomWinner => 1,
            _ => self.picks,
        }
    }
}

pub const AWARDS: &[AwardSpec] = &[
    AwardSpec {
        name: "gay",
        picks: 1,
        delta: -100,
        template: "{first} is the Gay of the Day! {delta} aura",
        special: Special::None,
    },
    AwardSpec {
        name: "simp",
        picks: 1,
        delta: 100,
        template: "{first} is the Simp of the Day! {delta} aura",
        special: Special::None,
    },
    AwardSpec {
        name: "toxic",
        picks: 1,
        delta: -50,
        template: "{first} is the most toxic one today! {delta} aura",
        special: Special::None,
    },
    AwardSpec {
        name: "cringe",
        picks: 1,
        delta: -50,
        template: "{first} is ultra cringe today! {delta} aura",
        special: Special::None,
    },
    AwardSpec {
        name: "respect",
        picks: 1,
        delta: 500,
        template: "{first} is respected like a legend! {delta} aura",
        special: Special::None,
    },
    AwardSpec {
        name: "sus",
        picks: 1,
        delta: 100,
        template: "{first} is acting kinda sus! {delta} aura",
        special: Special::None,
    },
    AwardSpec {
        name: "couple",
        picks: 2,
        delta: 50,
        template: "Today's cutest couple is {first} ❤️ {second}! {delta} aura each",
        special: Special::None,
    },
    AwardSpec {
        name: "fight",
        picks: 2,
        delta: 100,
        template: "{first} knocked out {second} in a random brawl! {delta} aura",
        special: Special::RandomWinner,
    },
    AwardSpec {
        name: "ghost",
        picks: 1,
        delta: 0,
        template: "{first} is tonight's ghost! No trace of life all night!",
        special: Special::NightOnly,
    },
];

/// Parsed command name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Leaderboard,
    /// `/fight`; a challenge when it replies to someone, otherwise a random brawl.
    Fight,
    Award(&'static AwardSpec),
}

pub fn award(name: &str) -> Option<&'static AwardSpec> {
    AWARDS.iter().find(|spec| spec.name == name)
}

pub fn parse(name: &str) -> Option<Command> {
    match name {
        "start" => Some(Command::Start),
        "aura" => Some(Command::Leaderboard),
        "fight" => Some(Command::Fight),
        other => award(other).map(Command::Award),
    }
}
