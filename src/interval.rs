//! Cache time-to-live
//!
//! An `Interval` is a non-negative duration composed from weeks, days, hours,
//! minutes, seconds, milliseconds and microseconds. It can also be parsed from
//! compact strings such as `90s`, `60m`, `1h30m`, `2d` or `1w`.

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use thiserror::Error;

/// Errors raised while building or parsing an interval
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntervalError {
    /// The components add up to a negative duration
    #[error("Interval must not be negative")]
    Negative,

    /// The components do not fit in a duration
    #[error("Interval is out of range")]
    OutOfRange,

    /// The string is not a valid interval
    #[error("Invalid interval '{0}': expected e.g. 90s, 60m, 1h30m, 2d, 1w")]
    Parse(String),
}

/// Components of an interval; any mix of units may be given
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntervalParts {
    pub weeks: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub milliseconds: i64,
    pub microseconds: i64,
}

/// Maximum age of a cached snapshot that is still served
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Interval(Duration);

impl Default for Interval {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Interval {
    /// Zero interval; every lookup refetches unless the snapshot is exactly now
    pub const ZERO: Interval = Interval(Duration::zero());

    /// Sums the given components
    ///
    /// Individual components may be negative as long as the total is not.
    pub fn new(parts: IntervalParts) -> Result<Self, IntervalError> {
        let components = [
            Duration::try_weeks(parts.weeks),
            Duration::try_days(parts.days),
            Duration::try_hours(parts.hours),
            Duration::try_minutes(parts.minutes),
            Duration::try_seconds(parts.seconds),
            Duration::try_milliseconds(parts.milliseconds),
            Some(Duration::microseconds(parts.microseconds)),
        ];

        let mut total = Duration::zero();
        for component in components {
            total = component
                .and_then(|c| total.checked_add(&c))
                .ok_or(IntervalError::OutOfRange)?;
        }

        Self::from_duration(total)
    }

    /// Whole-second interval
    pub fn from_secs(secs: u32) -> Self {
        Interval(Duration::seconds(i64::from(secs)))
    }

    /// Wraps a chrono duration, rejecting negative values
    pub fn from_duration(duration: Duration) -> Result<Self, IntervalError> {
        if duration < Duration::zero() {
            return Err(IntervalError::Negative);
        }
        Ok(Interval(duration))
    }

    /// The interval as a chrono duration
    pub fn as_duration(&self) -> Duration {
        self.0
    }

    /// Whole seconds in the interval, rounded toward zero
    pub fn num_seconds(&self) -> i64 {
        self.0.num_seconds()
    }

    /// True for the zero interval
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl FromStr for Interval {
    type Err = IntervalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let parse_err = || IntervalError::Parse(s.to_string());
        if input.is_empty() {
            return Err(parse_err());
        }

        let mut parts = IntervalParts::default();
        let mut rest = input;
        while !rest.is_empty() {
            let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
            if digits == 0 {
                return Err(parse_err());
            }
            let value: i64 = rest[..digits].parse().map_err(|_| parse_err())?;
            rest = &rest[digits..];

            let unit_len = rest
                .find(|c: char| c.is_ascii_digit())
                .unwrap_or(rest.len());
            let slot = match &rest[..unit_len] {
                "w" => &mut parts.weeks,
                "d" => &mut parts.days,
                "h" => &mut parts.hours,
                "m" => &mut parts.minutes,
                "s" => &mut parts.seconds,
                "ms" => &mut parts.milliseconds,
                "us" => &mut parts.microseconds,
                _ => return Err(parse_err()),
            };
            *slot = slot.checked_add(value).ok_or(IntervalError::OutOfRange)?;
            rest = &rest[unit_len..];
        }

        Interval::new(parts)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_zero() {
            return write!(f, "0s");
        }

        let mut micros = self.0.num_microseconds().unwrap_or(i64::MAX);
        let units: [(i64, &str); 7] = [
            (7 * 86_400_000_000, "w"),
            (86_400_000_000, "d"),
            (3_600_000_000, "h"),
            (60_000_000, "m"),
            (1_000_000, "s"),
            (1_000, "ms"),
            (1, "us"),
        ];
        for (size, suffix) in units {
            let count = micros / size;
            if count > 0 {
                write!(f, "{}{}", count, suffix)?;
                micros -= count * size;
            }
        }
        Ok(())
    }
}
