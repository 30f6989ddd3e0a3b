//! Time-bucket keys derived from event timestamps.
//!
//! All extraction happens on the UTC timestamp the loader normalized, so
//! an event lands in the same bucket no matter where or when the tool
//! runs.

use crate::history::ListenEvent;
use chrono::Datelike;
use std::fmt;

/// Meteorological season, mapped from the calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    /// Dec/Jan/Feb are Winter, then three months per season in order.
    pub fn of_month(month: u32) -> Season {
        match month {
            12 | 1 | 2 => Season::Winter,
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Fall,
            _ => unreachable!("calendar months are 1-12, got {month}"),
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Season::Winter => "Winter",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
        };
        f.write_str(name)
    }
}

/// A calendar year-month pair. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

pub fn year_of(event: &ListenEvent) -> i32 {
    event.ts.year()
}

pub fn season_of(event: &ListenEvent) -> Season {
    Season::of_month(event.ts.month())
}

pub fn year_month_of(event: &ListenEvent) -> YearMonth {
    YearMonth {
        year: event.ts.year(),
        month: event.ts.month(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::EndReason;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_season_of_month_exhaustive() {
        let expected = [
            (1, Season::Winter),
            (2, Season::Winter),
            (3, Season::Spring),
            (4, Season::Spring),
            (5, Season::Spring),
            (6, Season::Summer),
            (7, Season::Summer),
            (8, Season::Summer),
            (9, Season::Fall),
            (10, Season::Fall),
            (11, Season::Fall),
            (12, Season::Winter),
        ];
        for (month, season) in expected {
            assert_eq!(Season::of_month(month), season, "month {month}");
        }
    }

    #[test]
    fn test_year_month_display_pads() {
        let ym = YearMonth { year: 2024, month: 1 };
        assert_eq!(ym.to_string(), "2024-01");
    }

    #[test]
    fn test_year_month_orders_chronologically() {
        let dec = YearMonth { year: 2023, month: 12 };
        let jan = YearMonth { year: 2024, month: 1 };
        assert!(dec < jan);
    }

    #[test]
    fn test_extractors_use_event_timestamp() {
        let event = ListenEvent {
            track_uri: "spotify:track:a".into(),
            track_name: "a".into(),
            artist_name: "b".into(),
            ms_played: 0,
            ts: Utc.with_ymd_and_hms(2022, 8, 15, 12, 0, 0).unwrap(),
            end_reason: EndReason::Finished,
        };
        assert_eq!(year_of(&event), 2022);
        assert_eq!(season_of(&event), Season::Summer);
        assert_eq!(year_month_of(&event), YearMonth { year: 2022, month: 8 });
    }
}
