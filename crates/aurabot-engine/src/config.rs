use chrono::{Duration, FixedOffset, Offset, Utc};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Offset of the calendar day used by the daily command gates.
    pub day_offset: FixedOffset,
    pub night: NightWindow,
    pub duel_reward: i64,
    /// Pending duels older than this are expired by the sweeper. `None` keeps them forever.
    pub duel_ttl: Option<Duration>,
    pub announce_window: Duration,
    pub leaderboard_limit: u32,
    pub links: WelcomeLinks,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            day_offset: Utc.fix(),
            night: NightWindow::default(),
            duel_reward: 100,
            duel_ttl: Some(Duration::hours(24)),
            announce_window: Duration::hours(1),
            leaderboard_limit: 20,
            links: WelcomeLinks::default(),
        }
    }
}

/// Hours of the day, in a fixed timezone, during which `/ghost` is open.
/// `start_hour > end_hour` wraps past midnight.
#[derive(Debug, Clone)]
pub struct NightWindow {
    pub offset: FixedOffset,
    pub start_hour: u32,
    pub end_hour: u32,
    /// Human name of the timezone, shown when the window is closed.
    pub label: String,
}

impl Default for NightWindow {
    fn default() -> Self {
        Self {
            offset: FixedOffset::east_opt(6 * 3600).unwrap_or_else(|| Utc.fix()),
            start_hour: 20,
            end_hour: 6,
            label: "UTC+6".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WelcomeLinks {
    pub updates: String,
    pub support: String,
    pub add_to_group: String,
}

impl Default for WelcomeLinks {
    fn default() -> Self {
        Self {
            updates: "https://t.me/yourchannel".to_string(),
            support: "https://t.me/yourgroup".to_string(),
            add_to_group: "https://t.me/yourbot?startgroup=true".to_string(),
        }
    }
}
