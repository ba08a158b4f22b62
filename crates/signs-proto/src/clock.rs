//! Reference time for the display.
//!
//! Everything that asks "what is happening now?" goes through a [`Clock`]
//! so the kiosk can be pointed at any moment of the conference for a
//! rehearsal. An override is stored as an offset from the wall clock, so
//! overridden time keeps ticking forward at the normal rate.
//!
//! Override syntax is a URL query string:
//!
//! ```text
//! year=2025&month=3&day=8&hour=10&minute=30
//! ```
//!
//! All five fields are required and `month` is 1-based. Seconds come from
//! the wall clock at the moment the override is installed.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, TimeZone, Timelike};
use thiserror::Error;
use url::form_urlencoded;

/// Environment variable consulted for a reference-time override.
pub const TIME_OVERRIDE_ENV_VAR: &str = "SIGNS_TIME";

const FIELDS: [&str; 5] = ["year", "month", "day", "hour", "minute"];

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;

    /// Whether `now` differs from the wall clock on purpose.
    fn is_overridden(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Wall clock shifted by a constant offset.
#[derive(Debug, Clone, Copy)]
pub struct OffsetClock {
    offset: Duration,
}

impl OffsetClock {
    pub fn new(offset: Duration) -> Self {
        Self { offset }
    }

    /// Shift the wall clock so that it reads `target` right now.
    pub fn starting_at(target: DateTime<Local>) -> Self {
        let offset = target.signed_duration_since(Local::now());
        tracing::info!(
            target = %target.format("%Y-%m-%d %H:%M:%S"),
            offset_secs = offset.num_seconds(),
            "reference time override enabled"
        );
        Self { offset }
    }

    pub fn offset(&self) -> Duration {
        self.offset
    }
}

impl Clock for OffsetClock {
    fn now(&self) -> DateTime<Local> {
        Local::now() + self.offset
    }

    fn is_overridden(&self) -> bool {
        true
    }
}

/// A clock that never moves. Used by tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Local>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }

    fn is_overridden(&self) -> bool {
        true
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeOverrideError {
    #[error("time override is missing `{0}`")]
    Missing(&'static str),
    #[error("time override field `{field}` is not a number: {value:?}")]
    NotANumber { field: &'static str, value: String },
    #[error("time override {0} is not a valid calendar date/time")]
    InvalidDateTime(String),
    #[error("time override {0} does not exist in the local time zone")]
    NonexistentLocalTime(String),
}

/// Calendar fields of a reference-time override, local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeOverride {
    pub year: i32,
    /// 1-based.
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
}

impl TimeOverride {
    /// Parse `year=…&month=…&day=…&hour=…&minute=…`. A leading `?` is
    /// ignored, values are percent-decoded, unknown keys are skipped and
    /// later duplicates win.
    pub fn parse(query: &str) -> Result<Self, TimeOverrideError> {
        let mut fields: [Option<String>; 5] = Default::default();

        let query = query.trim().trim_start_matches('?');
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            if let Some(idx) = FIELDS.iter().position(|n| *n == key.trim()) {
                fields[idx] = Some(value.trim().to_string());
            }
        }

        fn field<T: std::str::FromStr>(
            fields: &[Option<String>; 5],
            idx: usize,
        ) -> Result<T, TimeOverrideError> {
            let raw = fields[idx]
                .as_deref()
                .ok_or(TimeOverrideError::Missing(FIELDS[idx]))?;
            raw.parse::<T>().map_err(|_| TimeOverrideError::NotANumber {
                field: FIELDS[idx],
                value: raw.to_string(),
            })
        }

        let parsed = Self {
            year: field(&fields, 0)?,
            month: field(&fields, 1)?,
            day: field(&fields, 2)?,
            hour: field(&fields, 3)?,
            minute: field(&fields, 4)?,
        };
        // validate the calendar fields up front
        parsed.to_naive(0)?;
        Ok(parsed)
    }

    /// The override as a naive local date-time with the given seconds.
    pub fn to_naive(&self, second: u32) -> Result<NaiveDateTime, TimeOverrideError> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
            .and_then(|d| d.and_hms_opt(self.hour, self.minute, second))
            .ok_or_else(|| TimeOverrideError::InvalidDateTime(self.to_string()))
    }

    /// Resolve in the local zone, borrowing seconds from `wall`.
    pub fn resolve(&self, wall: DateTime<Local>) -> Result<DateTime<Local>, TimeOverrideError> {
        let naive = self.to_naive(wall.second())?;
        Local
            .from_local_datetime(&naive)
            .earliest()
            .ok_or_else(|| TimeOverrideError::NonexistentLocalTime(self.to_string()))
    }
}

impl std::fmt::Display for TimeOverride {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute
        )
    }
}

/// Build the display clock. `SIGNS_TIME` wins over the config value; a
/// malformed override is logged and ignored.
pub fn from_override(configured: Option<&str>) -> Box<dyn Clock> {
    let env = std::env::var(TIME_OVERRIDE_ENV_VAR).ok();
    let source = env.as_deref().or(configured).filter(|s| !s.trim().is_empty());

    let Some(query) = source else {
        return Box::new(SystemClock);
    };

    match TimeOverride::parse(query).and_then(|o| o.resolve(Local::now())) {
        Ok(target) => Box::new(OffsetClock::starting_at(target)),
        Err(e) => {
            tracing::warn!(value = %query, error = %e, "ignoring reference time override");
            Box::new(SystemClock)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn parses_full_query() {
        let o = TimeOverride::parse("?year=2025&month=3&day=8&hour=10&minute=30").unwrap();
        assert_eq!(
            o,
            TimeOverride {
                year: 2025,
                month: 3,
                day: 8,
                hour: 10,
                minute: 30
            }
        );
        let naive = o.to_naive(17).unwrap();
        assert_eq!(naive.month(), 3);
        assert_eq!(naive.day(), 8);
        assert_eq!(naive.second(), 17);
    }

    #[test]
    fn values_are_percent_decoded() {
        let o = TimeOverride::parse("year=2025&month=%33&day=0%38&hour=+10&minute=30").unwrap();
        assert_eq!((o.month, o.day, o.hour), (3, 8, 10));
    }

    #[test]
    fn every_field_is_required() {
        assert_eq!(
            TimeOverride::parse("year=2025&month=3&day=8&hour=10"),
            Err(TimeOverrideError::Missing("minute"))
        );
        assert_eq!(
            TimeOverride::parse(""),
            Err(TimeOverrideError::Missing("year"))
        );
    }

    #[test]
    fn rejects_garbage_and_impossible_dates() {
        assert!(matches!(
            TimeOverride::parse("year=2025&month=march&day=8&hour=10&minute=0"),
            Err(TimeOverrideError::NotANumber { field: "month", .. })
        ));
        assert!(matches!(
            TimeOverride::parse("year=2025&month=2&day=30&hour=10&minute=0"),
            Err(TimeOverrideError::InvalidDateTime(_))
        ));
        assert!(matches!(
            TimeOverride::parse("year=2025&month=3&day=8&hour=-1&minute=0"),
            Err(TimeOverrideError::NotANumber { field: "hour", .. })
        ));
    }

    #[test]
    fn offset_clock_keeps_advancing() {
        let clock = OffsetClock::new(Duration::days(3));
        let first = clock.now();
        let delta = first - Local::now();
        assert!((delta - Duration::days(3)).num_seconds().abs() <= 1);
        assert!(clock.now() >= first);
        assert!(clock.is_overridden());
        assert!(!SystemClock.is_overridden());
    }

    #[test]
    fn fixed_clock_is_fixed() {
        let t = Local.with_ymd_and_hms(2025, 3, 8, 10, 30, 0).earliest().unwrap();
        let clock = FixedClock(t);
        assert_eq!(clock.now(), t);
        assert_eq!(clock.now(), t);
    }
}
