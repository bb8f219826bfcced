//! Canonical, validated recurrence options.

use hilal_calendar::LunarDate;
use hilal_core::{CalendarVariant, SkipPolicy, Weekday};
use serde::{Deserialize, Serialize};

use super::options::RuleOptions;
use super::values::{DateInput, Frequency, OneOrMany, WeekdayNum};

/// Recurrence options after validation and expansion.
///
/// List fields are either `None` or non-empty, sorted and free of duplicates. BYMONTHDAY is
/// split by sign and BYDAY by whether an ordinal is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRule {
    pub freq: Frequency,
    pub interval: u32,
    pub start: LunarDate,
    pub count: Option<u32>,
    pub until: Option<LunarDate>,
    pub week_start: Weekday,
    pub skip: SkipPolicy,
    pub calendar: CalendarVariant,
    pub tzid: Option<String>,

    pub by_month: Option<Vec<u8>>,
    /// Days 1..=30.
    pub by_month_day: Option<Vec<u8>>,
    /// Days -30..=-1, counted from the end of the month.
    pub by_month_day_negative: Option<Vec<i8>>,
    pub by_year_day: Option<Vec<i16>>,
    pub by_week_no: Option<Vec<i8>>,
    /// Weekdays without an ordinal.
    pub by_weekday: Option<Vec<Weekday>>,
    /// Weekdays with an ordinal.
    pub by_weekday_nth: Option<Vec<WeekdayNum>>,
    pub by_set_pos: Option<Vec<i16>>,
    pub by_hour: Option<Vec<u8>>,
    pub by_minute: Option<Vec<u8>>,
    pub by_second: Option<Vec<u8>>,
}

impl NormalizedRule {
    /// A rule with default interval, week start and skip policy and no BY-parts.
    #[must_use]
    pub const fn new(freq: Frequency, start: LunarDate, calendar: CalendarVariant) -> Self {
        Self {
            freq,
            interval: 1,
            start,
            count: None,
            until: None,
            week_start: Weekday::Sunday,
            skip: SkipPolicy::Omit,
            calendar,
            tzid: None,
            by_month: None,
            by_month_day: None,
            by_month_day_negative: None,
            by_year_day: None,
            by_week_no: None,
            by_weekday: None,
            by_weekday_nth: None,
            by_set_pos: None,
            by_hour: None,
            by_minute: None,
            by_second: None,
        }
    }

    /// True when any filter narrows days within a month.
    #[must_use]
    pub const fn has_day_filters(&self) -> bool {
        self.by_month_day.is_some()
            || self.by_month_day_negative.is_some()
            || self.by_weekday.is_some()
            || self.by_weekday_nth.is_some()
    }

    /// All BYMONTHDAY values, positive first.
    #[must_use]
    pub fn month_days(&self) -> Vec<i64> {
        let positive = self.by_month_day.iter().flatten().map(|&d| i64::from(d));
        let negative = self
            .by_month_day_negative
            .iter()
            .flatten()
            .map(|&d| i64::from(d));
        positive.chain(negative).collect()
    }

    /// All BYDAY values, plain weekdays first.
    #[must_use]
    pub fn weekdays(&self) -> Vec<WeekdayNum> {
        let plain = self
            .by_weekday
            .iter()
            .flatten()
            .map(|&w| WeekdayNum::every(w));
        let nth = self.by_weekday_nth.iter().flatten().copied();
        plain.chain(nth).collect()
    }
}

fn many<T, U: Copy>(values: Option<&Vec<U>>, f: impl Fn(U) -> T) -> Option<OneOrMany<T>> {
    values.map(|v| OneOrMany::Many(v.iter().copied().map(f).collect()))
}

fn non_empty<T>(values: Vec<T>) -> Option<OneOrMany<T>> {
    (!values.is_empty()).then_some(OneOrMany::Many(values))
}

impl From<&NormalizedRule> for RuleOptions {
    fn from(rule: &NormalizedRule) -> Self {
        Self {
            freq: Some(rule.freq),
            dtstart: Some(DateInput::from(rule.start)),
            interval: Some(i64::from(rule.interval)),
            count: rule.count.map(i64::from),
            until: rule.until.map(DateInput::from),
            wkst: Some(rule.week_start),
            tzid: rule.tzid.clone(),
            skip: Some(rule.skip),
            calendar: Some(rule.calendar),
            bymonth: many(rule.by_month.as_ref(), i64::from),
            bymonthday: non_empty(rule.month_days()),
            byyearday: many(rule.by_year_day.as_ref(), i64::from),
            byweekno: many(rule.by_week_no.as_ref(), i64::from),
            byday: non_empty(rule.weekdays()),
            bysetpos: many(rule.by_set_pos.as_ref(), i64::from),
            byhour: many(rule.by_hour.as_ref(), i64::from),
            byminute: many(rule.by_minute.as_ref(), i64::from),
            bysecond: many(rule.by_second.as_ref(), i64::from),
        }
    }
}
