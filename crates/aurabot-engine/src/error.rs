use thiserror::Error;

/// Everything a single command can fail with. None of these are fatal to the
/// process; the transport reports them and moves on.
#[derive(Error, Debug)]
pub enum AuraError {
    #[error("storage failure: {0}")]
    Storage(#[from] anyhow::Error),

    #[error("need {required} participants, found {found}")]
    InsufficientParticipants { required: usize, found: usize },

    #[error("/{command} already used today")]
    CommandOnCooldown { command: String },

    #[error("only the challenged user may accept")]
    NotAuthorized,

    #[error("duel already resolved")]
    AlreadyResolved,

    #[error("duel not found")]
    DuelNotFound,

    #[error("a duel is already pending on this message")]
    DuelAlreadyPending,

    #[error("cannot challenge yourself")]
    SelfChallenge,

    #[error("outside the night window, opens in {hours_until_open}h")]
    OutsideNightWindow { hours_until_open: u32, label: String },
}

impl AuraError {
    /// Text shown to the chat. Storage details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::Storage(_) => "Something went wrong. Please try again later.".to_string(),
            Self::InsufficientParticipants { .. } => "Not enough members!".to_string(),
            Self::CommandOnCooldown { command } => {
                format!("/{} was already used in this chat today. Try again tomorrow.", command)
            }
            Self::NotAuthorized => "Only the challenged user can accept this duel.".to_string(),
            Self::AlreadyResolved => "This duel is already over.".to_string(),
            Self::DuelNotFound => "This duel no longer exists.".to_string(),
            Self::DuelAlreadyPending => "A duel is already pending on this message.".to_string(),
            Self::SelfChallenge => {
                "You can't fight yourself. Reply to someone else's message.".to_string()
            }
            Self::OutsideNightWindow {
                hours_until_open,
                label,
            } => format!(
                "This command only works at night ({}). Try again in {}h.",
                label, hours_until_open
            ),
        }
    }

    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}
