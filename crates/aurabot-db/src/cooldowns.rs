use anyhow::Result;
use chrono::NaiveDate;

use crate::Database;

impl Database {
    /// Claim the daily gate for `(command, chat_id, day)`.
    ///
    /// Check and insert are one statement: returns true only for the caller
    /// whose insert created the row.
    pub fn try_claim_cooldown(&self, command: &str, chat_id: i64, day: NaiveDate) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO cooldowns (command, chat_id, day) VALUES (?1, ?2, ?3)",
                rusqlite::params![command, chat_id, day.format("%Y-%m-%d").to_string()],
            )?;
            Ok(inserted == 1)
        })
    }
}
