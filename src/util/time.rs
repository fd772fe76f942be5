//! Time zone handling for display and date filters.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Time zone used to show timestamps and to interpret calendar dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    /// The system's local time zone.
    #[default]
    Local,
    /// Coordinated universal time.
    Utc,
}

impl Zone {
    /// Format a timestamp in this zone.
    #[must_use]
    pub fn format(self, dt: &DateTime<Utc>, fmt: &str) -> String {
        match self {
            Self::Local => dt.with_timezone(&Local).format(fmt).to_string(),
            Self::Utc => dt.format(fmt).to_string(),
        }
    }

    /// Current calendar date in this zone.
    #[must_use]
    pub fn today(self) -> NaiveDate {
        match self {
            Self::Local => Local::now().date_naive(),
            Self::Utc => Utc::now().date_naive(),
        }
    }

    /// First instant of `date`.
    #[must_use]
    pub fn start_of_day(self, date: NaiveDate) -> Option<DateTime<Utc>> {
        self.resolve(date.and_hms_opt(0, 0, 0)?, true)
    }

    /// Last millisecond of `date` (23:59:59.999).
    #[must_use]
    pub fn end_of_day(self, date: NaiveDate) -> Option<DateTime<Utc>> {
        self.resolve(date.and_hms_milli_opt(23, 59, 59, 999)?, false)
    }

    fn resolve(self, naive: NaiveDateTime, earliest: bool) -> Option<DateTime<Utc>> {
        match self {
            Self::Utc => Some(naive.and_utc()),
            Self::Local => {
                let mapped = Local.from_local_datetime(&naive);
                let local = if earliest { mapped.earliest() } else { mapped.latest() };
                local.map(|dt| dt.with_timezone(&Utc))
            }
        }
    }
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utc_day_bounds() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let start = Zone::Utc.start_of_day(date).unwrap();
        let end = Zone::Utc.end_of_day(date).unwrap();

        assert_eq!(start.to_rfc3339(), "2025-03-01T00:00:00+00:00");
        assert_eq!(end.timestamp_millis() - start.timestamp_millis(), 86_400_000 - 1);
    }

    #[test]
    fn test_format_utc() {
        let dt = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(Zone::Utc.format(&dt, "%Y-%m-%d %H:%M"), "2025-01-02 03:04");
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date(" 2025-02-28 "), NaiveDate::from_ymd_opt(2025, 2, 28));
        assert!(parse_date("2025-02-30").is_none());
        assert!(parse_date("28/02/2025").is_none());
    }
}
