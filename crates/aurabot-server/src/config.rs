use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use aurabot_engine::EngineConfig;
use aurabot_engine::clock::offset_from_minutes;
use aurabot_engine::config::{NightWindow, WelcomeLinks};
use chrono::Duration;

/// Placeholder webhook secrets that MUST NOT be used.
pub const PLACEHOLDER_SECRETS: &[&str] = &["change-me", "dev-secret-change-me"];

/// Longest accepted pending-duel TTL: one year.
pub const MAX_DUEL_TTL_HOURS: i64 = 24 * 365;

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub webhook_secret: String,
    pub bot_username: Option<String>,
    pub sweep_interval_secs: u64,
    pub engine: EngineConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());
        let number = |key: &str, default: i64| -> Result<i64> {
            match get(key) {
                Some(raw) => raw.trim().parse().with_context(|| format!("{} must be an integer, got '{}'", key, raw)),
                None => Ok(default),
            }
        };

        let webhook_secret = get("AURABOT_WEBHOOK_SECRET").unwrap_or_default();
        if webhook_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&webhook_secret.as_str()) {
            return Err(anyhow!("AURABOT_WEBHOOK_SECRET is unset or still a placeholder"));
        }

        let day_minutes = number("AURABOT_DAY_OFFSET_MINUTES", 0)?;
        let night_minutes = number("AURABOT_NIGHT_OFFSET_MINUTES", 360)?;
        let night_offset = minutes_to_offset("AURABOT_NIGHT_OFFSET_MINUTES", night_minutes)?;
        let start_hour = hour("AURABOT_NIGHT_START_HOUR", number("AURABOT_NIGHT_START_HOUR", 20)?)?;
        let end_hour = hour("AURABOT_NIGHT_END_HOUR", number("AURABOT_NIGHT_END_HOUR", 6)?)?;
        if start_hour == end_hour {
            return Err(anyhow!(
                "AURABOT_NIGHT_START_HOUR and AURABOT_NIGHT_END_HOUR must differ, both are {}",
                start_hour
            ));
        }

        let duel_ttl = duel_ttl(number("AURABOT_DUEL_TTL_HOURS", 24)?)?;
        let defaults = EngineConfig::default();

        let engine = EngineConfig {
            day_offset: minutes_to_offset("AURABOT_DAY_OFFSET_MINUTES", day_minutes)?,
            night: NightWindow {
                offset: night_offset,
                start_hour,
                end_hour,
                label: night_offset.to_string(),
            },
            duel_reward: number("AURABOT_DUEL_REWARD", defaults.duel_reward)?,
            duel_ttl,
            links: WelcomeLinks {
                updates: var("AURABOT_UPDATES_URL", &defaults.links.updates),
                support: var("AURABOT_SUPPORT_URL", &defaults.links.support),
                add_to_group: var("AURABOT_ADD_URL", &defaults.links.add_to_group),
            },
            ..defaults
        };

        Ok(Self {
            db_path: var("AURABOT_DB_PATH", "aurabot.db").into(),
            host: var("AURABOT_HOST", "0.0.0.0"),
            port: var("AURABOT_PORT", "8443")
                .parse()
                .context("AURABOT_PORT must be a port number")?,
            webhook_secret,
            bot_username: get("AURABOT_USERNAME")
                .map(|name| name.trim_start_matches('@').to_string())
                .filter(|name| !name.is_empty()),
            sweep_interval_secs: number("AURABOT_SWEEP_INTERVAL_SECS", 300)?.max(1) as u64,
            engine,
        })
    }
}

fn minutes_to_offset(key: &str, minutes: i64) -> Result<chrono::FixedOffset> {
    i32::try_from(minutes)
        .ok()
        .and_then(offset_from_minutes)
        .ok_or_else(|| anyhow!("{} is not a valid UTC offset: {}", key, minutes))
}

/// Zero disables expiry.
fn duel_ttl(hours: i64) -> Result<Option<Duration>> {
    if hours == 0 {
        return Ok(None);
    }
    if !(1..=MAX_DUEL_TTL_HOURS).contains(&hours) {
        return Err(anyhow!(
            "AURABOT_DUEL_TTL_HOURS must be between 0 and {}, got {}",
            MAX_DUEL_TTL_HOURS,
            hours
        ));
    }
    Duration::try_hours(hours)
        .map(Some)
        .ok_or_else(|| anyhow!("AURABOT_DUEL_TTL_HOURS out of range: {}", hours))
}

fn hour(key: &str, value: i64) -> Result<u32> {
    u32::try_from(value)
        .ok()
        .filter(|h| *h < 24)
        .ok_or_else(|| anyhow!("{} must be an hour between 0 and 23, got {}", key, value))
}
