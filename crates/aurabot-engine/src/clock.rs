use chrono::{DateTime, FixedOffset, NaiveDate, Timelike, Utc};

use crate::config::NightWindow;

/// Calendar day of `now` as seen from `offset`.
pub fn calendar_day(now: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    now.with_timezone(&offset).date_naive()
}

/// `None` if the offset is beyond ±24h.
pub fn offset_from_minutes(minutes: i32) -> Option<FixedOffset> {
    FixedOffset::east_opt(minutes.checked_mul(60)?)
}

impl NightWindow {
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        let hour = now.with_timezone(&self.offset).hour();
        if self.start_hour <= self.end_hour {
            self.start_hour <= hour && hour < self.end_hour
        } else {
            hour >= self.start_hour || hour < self.end_hour
        }
    }

    /// Whole hours until the window opens; 0 while it is open.
    pub fn hours_until_open(&self, now: DateTime<Utc>) -> u32 {
        if self.contains(now) {
            return 0;
        }
        let hour = now.with_timezone(&self.offset).hour();
        (self.start_hour + 24 - hour) % 24
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, h, m, 0).unwrap()
    }

    #[test]
    fn day_boundary_follows_offset() {
        let late = utc(23, 30);
        assert_eq!(calendar_day(late, offset_from_minutes(0).unwrap()).to_string(), "2024-06-01");
        assert_eq!(calendar_day(late, offset_from_minutes(60).unwrap()).to_string(), "2024-06-02");
        assert_eq!(calendar_day(utc(0, 30), offset_from_minutes(-60).unwrap()).to_string(), "2024-05-31");
    }

    #[test]
    fn absurd_offsets_are_rejected() {
        assert!(offset_from_minutes(25 * 60).is_none());
        assert!(offset_from_minutes(i32::MAX).is_none());
    }

    #[test]
    fn wrapping_window() {
        let night = NightWindow::default(); // 20:00-06:00 at UTC+6
        // 14:00 UTC = 20:00 local
        assert!(night.contains(utc(14, 0)));
        // 23:59 UTC = 05:59 local
        assert!(night.contains(utc(23, 59)));
        // 00:00 UTC = 06:00 local
        assert!(!night.contains(utc(0, 0)));
        // 06:30 UTC = 12:30 local
        assert_eq!(night.hours_until_open(utc(6, 30)), 8);
        assert_eq!(night.hours_until_open(utc(15, 0)), 0);
    }

    #[test]
    fn daytime_window() {
        let window = NightWindow {
            offset: offset_from_minutes(0).unwrap(),
            start_hour: 9,
            end_hour: 17,
            label: "UTC".into(),
        };
        assert!(window.contains(utc(9, 0)));
        assert!(!window.contains(utc(17, 0)));
        assert_eq!(window.hours_until_open(utc(18, 0)), 15);
    }
}
