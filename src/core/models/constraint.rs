//! Temporal constraint model

use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Day-of-week mask; bit 0 is Sunday, bit 6 is Saturday
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DayMask(u8);

impl DayMask {
    const ALL_BITS: u8 = 0b0111_1111;

    /// Every day of the week
    pub fn all() -> Self {
        Self(Self::ALL_BITS)
    }

    /// Mask containing exactly the given days
    pub fn from_days(days: &[Weekday]) -> Self {
        Self(
            days.iter()
                .fold(0, |bits, day| bits | (1 << day.num_days_from_sunday())),
        )
    }

    /// Whether the mask allows `day`
    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_sunday()) != 0
    }

    /// Whether no day is allowed
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

/// Parses the directory form `"1234567"` where 1 is Sunday and 7 is Saturday,
/// or the literal `"all"`.
impl FromStr for DayMask {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::all());
        }
        if s.is_empty() {
            return Err("day mask must not be empty".to_string());
        }

        let mut bits = 0u8;
        for c in s.chars() {
            match c.to_digit(10) {
                Some(d @ 1..=7) => bits |= 1 << (d - 1),
                _ => return Err(format!("invalid day '{}' in day mask '{}'", c, s)),
            }
        }
        Ok(Self(bits))
    }
}

impl fmt::Display for DayMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for d in 0..7u8 {
            if self.0 & (1 << d) != 0 {
                write!(f, "{}", d + 1)?;
            }
        }
        Ok(())
    }
}

impl TryFrom<String> for DayMask {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DayMask> for String {
    fn from(mask: DayMask) -> Self {
        mask.to_string()
    }
}

/// Temporal constraint attached to a role or to a user's role assignment.
///
/// Every present dimension must hold; an absent dimension always holds.
/// Dates and times are interpreted in UTC. A time window whose begin is
/// after its end wraps past midnight.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    /// First valid day (inclusive)
    #[serde(default)]
    pub begin_date: Option<NaiveDate>,
    /// Last valid day (inclusive)
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// First day of a suspension period (inclusive)
    #[serde(default)]
    pub begin_lock_date: Option<NaiveDate>,
    /// Last day of a suspension period (inclusive)
    #[serde(default)]
    pub end_lock_date: Option<NaiveDate>,
    /// Allowed days of the week
    #[serde(default)]
    pub day_mask: Option<DayMask>,
    /// Start of the daily window
    #[serde(default)]
    pub begin_time: Option<NaiveTime>,
    /// End of the daily window (inclusive)
    #[serde(default)]
    pub end_time: Option<NaiveTime>,
    /// Idle timeout in seconds; 0 disables
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Absolute session duration limit in seconds; 0 disables
    #[serde(default)]
    pub max_duration_secs: Option<u64>,
}

impl Constraint {
    /// Constraint with no dimensions
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dates(mut self, begin: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.begin_date = begin;
        self.end_date = end;
        self
    }

    pub fn with_lock_dates(mut self, begin: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.begin_lock_date = begin;
        self.end_lock_date = end;
        self
    }

    pub fn with_days(mut self, mask: DayMask) -> Self {
        self.day_mask = Some(mask);
        self
    }

    pub fn with_times(mut self, begin: Option<NaiveTime>, end: Option<NaiveTime>) -> Self {
        self.begin_time = begin;
        self.end_time = end;
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn with_max_duration(mut self, secs: u64) -> Self {
        self.max_duration_secs = Some(secs);
        self
    }

    /// Whether no dimension is set
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Idle timeout, if enabled
    pub fn idle_timeout(&self) -> Option<u64> {
        self.timeout_secs.filter(|secs| *secs > 0)
    }

    /// Absolute duration limit, if enabled
    pub fn max_duration(&self) -> Option<u64> {
        self.max_duration_secs.filter(|secs| *secs > 0)
    }
}

/// Session timing used by the idle and absolute duration dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionClock {
    pub started_at: DateTime<Utc>,
    pub last_access: DateTime<Utc>,
}

/// The constraint dimension that did not hold
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintFailure {
    #[error("before begin date {0}")]
    BeforeBeginDate(NaiveDate),

    #[error("after end date {0}")]
    AfterEndDate(NaiveDate),

    #[error("inside lock period")]
    Locked,

    #[error("day {0} not allowed")]
    DayNotAllowed(Weekday),

    #[error("outside time window")]
    OutsideTimeWindow,

    #[error("idle timeout exceeded")]
    IdleTimeout,

    #[error("maximum session duration exceeded")]
    MaxDurationExceeded,
}
