//! Sparse rule options, as produced by the text parser or supplied as JSON.

use hilal_core::{CalendarVariant, SkipPolicy, Weekday};
use serde::{Deserialize, Serialize};

use super::values::{DateInput, Frequency, OneOrMany, WeekdayNum};

/// Recurrence options before validation.
///
/// Every field is optional and list fields accept either a scalar or an array. Numeric
/// fields are signed and wide so that out-of-range input can be reported by name instead of
/// failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleOptions {
    /// Recurrence frequency (required by the normalizer).
    pub freq: Option<Frequency>,

    /// First occurrence; defaults to today.
    pub dtstart: Option<DateInput>,

    /// Recurrence interval (default: 1).
    pub interval: Option<i64>,

    /// Number of occurrences (mutually exclusive with until in rule text).
    pub count: Option<i64>,

    /// Last admissible date, inclusive.
    pub until: Option<DateInput>,

    /// Week start day (default: Sunday).
    pub wkst: Option<Weekday>,

    /// Time zone identifier, carried through untouched.
    pub tzid: Option<String>,

    /// Handling of days missing from a month (default: omit).
    pub skip: Option<SkipPolicy>,

    /// Calendar variant; defaults to the process-wide default.
    pub calendar: Option<CalendarVariant>,

    pub bymonth: Option<OneOrMany<i64>>,
    pub bymonthday: Option<OneOrMany<i64>>,
    pub byyearday: Option<OneOrMany<i64>>,
    pub byweekno: Option<OneOrMany<i64>>,
    pub byday: Option<OneOrMany<WeekdayNum>>,
    pub bysetpos: Option<OneOrMany<i64>>,
    pub byhour: Option<OneOrMany<i64>>,
    pub byminute: Option<OneOrMany<i64>>,
    pub bysecond: Option<OneOrMany<i64>>,
}

impl RuleOptions {
    /// Creates empty options with a frequency.
    #[must_use]
    pub fn new(freq: Frequency) -> Self {
        Self {
            freq: Some(freq),
            ..Self::default()
        }
    }

    /// Creates a yearly rule.
    #[must_use]
    pub fn yearly() -> Self {
        Self::new(Frequency::Yearly)
    }

    /// Creates a monthly rule.
    #[must_use]
    pub fn monthly() -> Self {
        Self::new(Frequency::Monthly)
    }

    /// Creates a weekly rule.
    #[must_use]
    pub fn weekly() -> Self {
        Self::new(Frequency::Weekly)
    }

    /// Creates a daily rule.
    #[must_use]
    pub fn daily() -> Self {
        Self::new(Frequency::Daily)
    }

    /// Sets the start date.
    #[must_use]
    pub fn with_start(mut self, start: impl Into<DateInput>) -> Self {
        self.dtstart = Some(start.into());
        self
    }

    /// Sets the interval.
    #[must_use]
    pub fn with_interval(mut self, interval: i64) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Sets the count.
    #[must_use]
    pub fn with_count(mut self, count: i64) -> Self {
        self.count = Some(count);
        self.until = None; // Mutually exclusive
        self
    }

    /// Sets the until date.
    #[must_use]
    pub fn with_until(mut self, until: impl Into<DateInput>) -> Self {
        self.until = Some(until.into());
        self.count = None; // Mutually exclusive
        self
    }

    /// Sets the week start day.
    #[must_use]
    pub fn with_wkst(mut self, wkst: Weekday) -> Self {
        self.wkst = Some(wkst);
        self
    }

    /// Sets the skip policy.
    #[must_use]
    pub fn with_skip(mut self, skip: SkipPolicy) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Sets the calendar variant.
    #[must_use]
    pub fn with_calendar(mut self, calendar: CalendarVariant) -> Self {
        self.calendar = Some(calendar);
        self
    }

    /// Sets the by-month list.
    #[must_use]
    pub fn with_by_month(mut self, months: Vec<i64>) -> Self {
        self.bymonth = Some(OneOrMany::Many(months));
        self
    }

    /// Sets the by-monthday list.
    #[must_use]
    pub fn with_by_month_day(mut self, days: Vec<i64>) -> Self {
        self.bymonthday = Some(OneOrMany::Many(days));
        self
    }

    /// Sets the by-yearday list.
    #[must_use]
    pub fn with_by_year_day(mut self, days: Vec<i64>) -> Self {
        self.byyearday = Some(OneOrMany::Many(days));
        self
    }

    /// Sets the by-weekno list.
    #[must_use]
    pub fn with_by_week_no(mut self, weeks: Vec<i64>) -> Self {
        self.byweekno = Some(OneOrMany::Many(weeks));
        self
    }

    /// Sets the by-day list.
    #[must_use]
    pub fn with_by_day(mut self, days: Vec<WeekdayNum>) -> Self {
        self.byday = Some(OneOrMany::Many(days));
        self
    }

    /// Sets the by-setpos list.
    #[must_use]
    pub fn with_by_set_pos(mut self, positions: Vec<i64>) -> Self {
        self.bysetpos = Some(OneOrMany::Many(positions));
        self
    }

    /// Sets the by-hour list.
    #[must_use]
    pub fn with_by_hour(mut self, hours: Vec<i64>) -> Self {
        self.byhour = Some(OneOrMany::Many(hours));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_keep_count_and_until_exclusive() {
        let options = RuleOptions::monthly()
            .with_until(super::super::values::LunarFields::date(1447, 1, 1))
            .with_count(3);
        assert_eq!(options.count, Some(3));
        assert_eq!(options.until, None);
    }

    #[test]
    fn sparse_json() {
        let options: RuleOptions = serde_json::from_str(
            r#"{"freq":"yearly","bymonth":9,"bymonthday":[1,-1],"byday":"FR","skip":"backward","calendar":"tabular"}"#,
        )
        .unwrap();
        assert_eq!(options.freq, Some(Frequency::Yearly));
        assert_eq!(options.bymonth, Some(OneOrMany::One(9)));
        assert_eq!(options.bymonthday, Some(OneOrMany::Many(vec![1, -1])));
        assert_eq!(
            options.byday,
            Some(OneOrMany::One(WeekdayNum::every(Weekday::Friday)))
        );
        assert_eq!(options.skip, Some(SkipPolicy::Backward));
        assert_eq!(options.calendar, Some(CalendarVariant::Tabular));
        assert_eq!(options.interval, None);
    }
}
