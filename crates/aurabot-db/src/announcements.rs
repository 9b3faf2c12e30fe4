use anyhow::Result;
use chrono::{DateTime, Duration, Utc};

use crate::Database;

impl Database {
    /// Permit a public announcement for `(user, chat, command)` at most once per `window`.
    ///
    /// The upsert only touches the row when it is absent or at least `window`
    /// old, so the stored timestamp never moves backwards and a refused call
    /// leaves it unchanged.
    pub fn try_announce(
        &self,
        user_id: i64,
        chat_id: i64,
        command: &str,
        now: DateTime<Utc>,
        window: Duration,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "INSERT INTO announcements (user_id, chat_id, command, last_announced_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(user_id, chat_id, command) DO UPDATE
                    SET last_announced_at = excluded.last_announced_at
                    WHERE excluded.last_announced_at - announcements.last_announced_at >= ?5",
                rusqlite::params![user_id, chat_id, command, now.timestamp(), window.num_seconds()],
            )?;
            Ok(changed == 1)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn repeat_within_the_hour_is_refused() {
        let db = Database::open_in_memory().unwrap();
        let hour = Duration::hours(1);
        assert!(db.try_announce(1, -1, "sus", t0(), hour).unwrap());
        assert!(!db.try_announce(1, -1, "sus", t0() + Duration::minutes(30), hour).unwrap());
        assert!(db.try_announce(1, -1, "sus", t0() + Duration::minutes(61), hour).unwrap());
    }

    #[test]
    fn refusal_does_not_extend_the_window() {
        let db = Database::open_in_memory().unwrap();
        let hour = Duration::hours(1);
        assert!(db.try_announce(1, -1, "sus", t0(), hour).unwrap());
        assert!(!db.try_announce(1, -1, "sus", t0() + Duration::minutes(59), hour).unwrap());
        assert!(db.try_announce(1, -1, "sus", t0() + Duration::minutes(60), hour).unwrap());
    }

    #[test]
    fn out_of_order_timestamp_is_refused() {
        let db = Database::open_in_memory().unwrap();
        let hour = Duration::hours(1);
        assert!(db.try_announce(1, -1, "sus", t0(), hour).unwrap());
        assert!(!db.try_announce(1, -1, "sus", t0() - Duration::hours(3), hour).unwrap());
    }

    #[test]
    fn keys_are_independent() {
        let db = Database::open_in_memory().unwrap();
        let hour = Duration::hours(1);
        assert!(db.try_announce(1, -1, "sus", t0(), hour).unwrap());
        assert!(db.try_announce(1, -1, "simp", t0(), hour).unwrap());
        assert!(db.try_announce(2, -1, "sus", t0(), hour).unwrap());
        assert!(db.try_announce(1, -2, "sus", t0(), hour).unwrap());
    }
}
