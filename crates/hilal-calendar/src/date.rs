use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::backend::{CalendarBackend, check_date};
use crate::error::{CalendarError, CalendarResult};

/// A lunar calendar date with an opaque time of day.
///
/// Equality, ordering and hashing consider only `(year, month, day)`; two values on the same
/// day at different times compare equal.
///
/// Values are validated against a [`CalendarBackend`] when constructed. Deserialized values
/// are only structurally typed; call [`LunarDate::validate`] before trusting them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LunarDate {
    year: i32,
    month: u8,
    day: u8,
    #[serde(default)]
    hour: u8,
    #[serde(default)]
    minute: u8,
    #[serde(default)]
    second: u8,
}

impl LunarDate {
    /// ## Summary
    /// Creates a date at midnight after validating it against `backend`.
    ///
    /// ## Errors
    /// Returns `InvalidInput` for a month outside 1..=12 and `InvalidDate` for a day that does
    /// not exist in that month.
    pub fn new<B>(year: i32, month: u8, day: u8, backend: &B) -> CalendarResult<Self>
    where
        B: CalendarBackend + ?Sized,
    {
        check_date(backend, year, month, day)?;
        Ok(Self::from_parts(year, month, day, 0, 0, 0))
    }

    /// Unchecked constructor for triples the caller has already validated.
    pub(crate) const fn from_parts(
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    /// Same time of day on another (already validated) day.
    pub(crate) const fn with_ymd(self, year: i32, month: u8, day: u8) -> Self {
        Self::from_parts(year, month, day, self.hour, self.minute, self.second)
    }

    /// ## Summary
    /// The same time of day on another day, validated against `backend`.
    ///
    /// ## Errors
    /// Returns the [`LunarDate::new`] errors.
    pub fn on_day<B>(self, year: i32, month: u8, day: u8, backend: &B) -> CalendarResult<Self>
    where
        B: CalendarBackend + ?Sized,
    {
        check_date(backend, year, month, day)?;
        Ok(self.with_ymd(year, month, day))
    }

    /// ## Summary
    /// Returns a copy with the given time of day.
    ///
    /// ## Errors
    /// Returns `InvalidInput` if `hour > 23`, `minute > 59` or `second > 59`.
    pub fn with_time(self, hour: u8, minute: u8, second: u8) -> CalendarResult<Self> {
        if hour > 23 || minute > 59 || second > 59 {
            return Err(CalendarError::InvalidInput(format!(
                "time {hour:02}:{minute:02}:{second:02} is out of range"
            )));
        }
        Ok(Self {
            hour,
            minute,
            second,
            ..self
        })
    }

    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    #[must_use]
    pub const fn month(&self) -> u8 {
        self.month
    }

    #[must_use]
    pub const fn day(&self) -> u8 {
        self.day
    }

    #[must_use]
    pub const fn hour(&self) -> u8 {
        self.hour
    }

    #[must_use]
    pub const fn minute(&self) -> u8 {
        self.minute
    }

    #[must_use]
    pub const fn second(&self) -> u8 {
        self.second
    }

    /// `(year, month, day)`.
    #[must_use]
    pub const fn ymd(&self) -> (i32, u8, u8) {
        (self.year, self.month, self.day)
    }

    /// ## Summary
    /// Re-checks a value that did not come from a validating constructor.
    ///
    /// ## Errors
    /// Returns the same errors as [`LunarDate::new`] and [`LunarDate::with_time`].
    pub fn validate<B>(&self, backend: &B) -> CalendarResult<()>
    where
        B: CalendarBackend + ?Sized,
    {
        Self::new(self.year, self.month, self.day, backend)?
            .with_time(self.hour, self.minute, self.second)
            .map(|_| ())
    }

    /// ## Summary
    /// Lunar date of a Julian Day Number, at midnight.
    ///
    /// ## Errors
    /// Returns `OutOfRange` for indices before the calendar epoch.
    pub fn from_day_index<B>(index: i64, backend: &B) -> CalendarResult<Self>
    where
        B: CalendarBackend + ?Sized,
    {
        let (year, month, day) = backend.from_day_index(index)?;
        Ok(Self::from_parts(year, month, day, 0, 0, 0))
    }

    /// ## Summary
    /// Julian Day Number of this date.
    ///
    /// ## Errors
    /// Propagates backend failures.
    pub fn to_day_index<B>(&self, backend: &B) -> CalendarResult<i64>
    where
        B: CalendarBackend + ?Sized,
    {
        backend.to_day_index(self.year, self.month, self.day)
    }

    /// ## Summary
    /// Converts a Gregorian date-time, carrying the time of day across.
    ///
    /// ## Errors
    /// Returns `OutOfRange` for dates before the calendar epoch.
    pub fn from_gregorian<B>(datetime: NaiveDateTime, backend: &B) -> CalendarResult<Self>
    where
        B: CalendarBackend + ?Sized,
    {
        let (year, month, day) = backend.gregorian_to_lunar(datetime.date())?;
        let time = datetime.time();
        // chrono keeps these within 0..=23 and 0..=59
        let part = |value: u32| u8::try_from(value).unwrap_or_default();
        Ok(Self::from_parts(
            year,
            month,
            day,
            part(time.hour()),
            part(time.minute()),
            part(time.second()),
        ))
    }

    /// ## Summary
    /// Converts a Gregorian date, at midnight.
    ///
    /// ## Errors
    /// Returns `OutOfRange` for dates before the calendar epoch.
    pub fn from_gregorian_date<B>(date: NaiveDate, backend: &B) -> CalendarResult<Self>
    where
        B: CalendarBackend + ?Sized,
    {
        let (year, month, day) = backend.gregorian_to_lunar(date)?;
        Ok(Self::from_parts(year, month, day, 0, 0, 0))
    }

    /// ## Summary
    /// Gregorian date-time of this date, keeping the time of day.
    ///
    /// ## Errors
    /// Propagates backend failures.
    pub fn to_gregorian<B>(&self, backend: &B) -> CalendarResult<NaiveDateTime>
    where
        B: CalendarBackend + ?Sized,
    {
        let date = backend.lunar_to_gregorian(self.year, self.month, self.day)?;
        let time = NaiveTime::from_hms_opt(
            u32::from(self.hour),
            u32::from(self.minute),
            u32::from(self.second),
        )
        .unwrap_or(NaiveTime::MIN);
        Ok(date.and_time(time))
    }

    /// ## Summary
    /// Parses `YYYY-MM-DD`, optionally followed by `THH:MM` or `THH:MM:SS`.
    ///
    /// ## Errors
    /// Returns `InvalidInput` for malformed text and the [`LunarDate::new`] errors otherwise.
    pub fn parse<B>(s: &str, backend: &B) -> CalendarResult<Self>
    where
        B: CalendarBackend + ?Sized,
    {
        let malformed = || CalendarError::InvalidInput(format!("malformed lunar date `{s}`"));

        let (date_part, time_part) = match s.trim().split_once(['T', ' ']) {
            Some((date, time)) => (date, Some(time)),
            None => (s.trim(), None),
        };

        // Leading '-' is not accepted; years start at 1
        let mut fields = date_part.splitn(3, '-');
        let year = fields.next().and_then(|v| v.parse::<i32>().ok());
        let month = fields.next().and_then(|v| v.parse::<u8>().ok());
        let day = fields.next().and_then(|v| v.parse::<u8>().ok());
        let (Some(year), Some(month), Some(day)) = (year, month, day) else {
            return Err(malformed());
        };

        let date = Self::new(year, month, day, backend)?;
        let Some(time_part) = time_part else {
            return Ok(date);
        };

        let parts = time_part
            .split(':')
            .map(|v| v.parse::<u8>().ok())
            .collect::<Option<Vec<_>>>()
            .ok_or_else(malformed)?;
        match parts.as_slice() {
            [hour, minute] => date.with_time(*hour, *minute, 0),
            [hour, minute, second] => date.with_time(*hour, *minute, *second),
            _ => Err(malformed()),
        }
    }

    /// Canonical `YYYY-MM-DD` key used to deduplicate dates across rules.
    #[must_use]
    pub fn key(&self) -> String {
        self.to_string()
    }

    /// `YYYY-MM-DDTHH:MM:SS`.
    #[must_use]
    pub fn to_datetime_string(&self) -> String {
        format!(
            "{self}T{:02}:{:02}:{:02}",
            self.hour, self.minute, self.second
        )
    }

    /// True when any time field is set.
    #[must_use]
    pub const fn has_time(&self) -> bool {
        self.hour != 0 || self.minute != 0 || self.second != 0
    }
}

impl PartialEq for LunarDate {
    fn eq(&self, other: &Self) -> bool {
        self.ymd() == other.ymd()
    }
}

impl Eq for LunarDate {}

impl PartialOrd for LunarDate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LunarDate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ymd().cmp(&other.ymd())
    }
}

impl Hash for LunarDate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ymd().hash(state);
    }
}

impl fmt::Display for LunarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}
