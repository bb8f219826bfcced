//! Validation and canonicalization of sparse rule options.

use chrono::NaiveDateTime;
use hilal_calendar::{Calendar, CalendarBackend, LunarDate};
use hilal_core::{CalendarVariant, SkipPolicy, Weekday};
use hilal_rfc::rfc::rrule::{DateInput, NormalizedRule, OneOrMany, RuleOptions, WeekdayNum};

use crate::error::{ServiceError, ServiceResult};

/// Turns [`RuleOptions`] into a [`NormalizedRule`].
///
/// The default calendar variant and the current moment are captured when the normalizer is
/// built, so a rule never reads process-wide state after construction.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    default_variant: CalendarVariant,
    now: Option<NaiveDateTime>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    /// A normalizer using the process-wide default calendar variant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            default_variant: CalendarVariant::process_default(),
            now: None,
        }
    }

    /// Overrides the calendar variant used when the options name none.
    #[must_use]
    pub const fn with_default_variant(mut self, variant: CalendarVariant) -> Self {
        self.default_variant = variant;
        self
    }

    /// Fixes the moment used as the start date when the options have none.
    #[must_use]
    pub const fn with_now(mut self, now: NaiveDateTime) -> Self {
        self.now = Some(now);
        self
    }

    /// ## Summary
    /// Validates `options` and expands them into canonical form.
    ///
    /// Normalizing the options derived from a normalized rule yields the same rule.
    ///
    /// ## Errors
    /// Returns `InvalidRule` naming the first offending part.
    pub fn normalize(&self, options: &RuleOptions) -> ServiceResult<NormalizedRule> {
        let freq = options
            .freq
            .ok_or_else(|| ServiceError::invalid("FREQ", "is required"))?;
        let calendar = options.calendar.unwrap_or(self.default_variant);
        let backend = Calendar::for_variant(calendar);

        let interval = match options.interval {
            None => 1,
            Some(value) => u32::try_from(value)
                .ok()
                .filter(|&v| v >= 1)
                .ok_or_else(|| ServiceError::invalid("INTERVAL", format!("{value} is not a positive integer")))?,
        };
        let count = options
            .count
            .map(|value| {
                u32::try_from(value).ok().ok_or_else(|| {
                    ServiceError::invalid("COUNT", format!("{value} is not a non-negative integer"))
                })
            })
            .transpose()?;

        let start = match options.dtstart {
            Some(ref input) => to_lunar("DTSTART", input, &backend)?,
            None => {
                let now = self
                    .now
                    .unwrap_or_else(|| chrono::Local::now().naive_local());
                LunarDate::from_gregorian(now, &backend)?
            }
        };
        let until = options
            .until
            .as_ref()
            .map(|input| to_lunar("UNTIL", input, &backend))
            .transpose()?;

        let (by_month_day, by_month_day_negative) = split_month_days(options.bymonthday.as_ref())?;
        let (by_weekday, by_weekday_nth) = split_weekdays(options.byday.as_ref())?;

        let rule = NormalizedRule {
            freq,
            interval,
            start,
            count,
            until,
            week_start: options.wkst.unwrap_or(Weekday::Sunday),
            skip: options.skip.unwrap_or(SkipPolicy::Omit),
            calendar,
            tzid: options.tzid.clone(),
            by_month: list("BYMONTH", options.bymonth.as_ref(), 1..=12, false)?,
            by_month_day,
            by_month_day_negative,
            by_year_day: list("BYYEARDAY", options.byyearday.as_ref(), 1..=355, true)?,
            by_week_no: list("BYWEEKNO", options.byweekno.as_ref(), 1..=52, true)?,
            by_weekday,
            by_weekday_nth,
            by_set_pos: list("BYSETPOS", options.bysetpos.as_ref(), 1..=355, true)?,
            by_hour: list("BYHOUR", options.byhour.as_ref(), 0..=23, false)?,
            by_minute: list("BYMINUTE", options.byminute.as_ref(), 0..=59, false)?,
            by_second: list("BYSECOND", options.bysecond.as_ref(), 0..=59, false)?,
        };

        tracing::debug!(
            freq = %rule.freq,
            interval = rule.interval,
            start = %rule.start,
            calendar = %rule.calendar,
            "Normalized rule"
        );
        Ok(rule)
    }
}

/// ## Summary
/// Normalizes with a fresh [`Normalizer`].
///
/// ## Errors
/// Returns `InvalidRule` naming the first offending part.
pub fn normalize(options: &RuleOptions) -> ServiceResult<NormalizedRule> {
    Normalizer::new().normalize(options)
}

fn to_lunar<B>(field: &'static str, input: &DateInput, backend: &B) -> ServiceResult<LunarDate>
where
    B: CalendarBackend + ?Sized,
{
    let date = match *input {
        DateInput::Lunar(fields) => LunarDate::new(fields.year, fields.month, fields.day, backend)
            .and_then(|d| d.with_time(fields.hour, fields.minute, fields.second)),
        DateInput::Gregorian(datetime) => LunarDate::from_gregorian(datetime, backend),
        DateInput::GregorianDate(date) => LunarDate::from_gregorian_date(date, backend),
    };
    date.map_err(|err| ServiceError::invalid(field, err.to_string()))
}

/// Validates, sorts and dedupes an integer list. `signed` also admits the negated range.
fn list<T>(
    field: &'static str,
    values: Option<&OneOrMany<i64>>,
    range: std::ops::RangeInclusive<i64>,
    signed: bool,
) -> ServiceResult<Option<Vec<T>>>
where
    T: TryFrom<i64> + Ord,
{
    let Some(values) = values else {
        return Ok(None);
    };
    let mut out = Vec::new();
    for value in values.to_vec() {
        let in_range = range.contains(&value) || (signed && range.contains(&-value));
        let converted = in_range.then(|| T::try_from(value).ok()).flatten();
        let Some(converted) = converted else {
            let allowed = if signed {
                format!("-{}..=-{} or {range:?}", range.end(), range.start())
            } else {
                format!("{range:?}")
            };
            return Err(ServiceError::invalid(
                field,
                format!("{value} is outside {allowed}"),
            ));
        };
        out.push(converted);
    }
    out.sort_unstable();
    out.dedup();
    Ok((!out.is_empty()).then_some(out))
}

type MonthDays = (Option<Vec<u8>>, Option<Vec<i8>>);

fn split_month_days(values: Option<&OneOrMany<i64>>) -> ServiceResult<MonthDays> {
    let Some(days) = list::<i8>("BYMONTHDAY", values, 1..=30, true)? else {
        return Ok((None, None));
    };
    let (negative, positive): (Vec<i8>, Vec<i8>) = days.into_iter().partition(|&d| d < 0);
    let positive: Vec<u8> = positive.into_iter().filter_map(|d| u8::try_from(d).ok()).collect();
    Ok((
        (!positive.is_empty()).then_some(positive),
        (!negative.is_empty()).then_some(negative),
    ))
}

type Weekdays = (Option<Vec<Weekday>>, Option<Vec<WeekdayNum>>);

fn split_weekdays(values: Option<&OneOrMany<WeekdayNum>>) -> ServiceResult<Weekdays> {
    let Some(values) = values else {
        return Ok((None, None));
    };
    let mut plain = Vec::new();
    let mut nth = Vec::new();
    for value in values.to_vec() {
        match value.ordinal {
            None => plain.push(value.weekday),
            Some(n) if (1..=5).contains(&n.unsigned_abs()) => nth.push(value),
            Some(n) => {
                return Err(ServiceError::invalid(
                    "BYDAY",
                    format!("ordinal {n} in {value} is outside -5..=-1 or 1..=5"),
                ));
            }
        }
    }
    plain.sort_unstable();
    plain.dedup();
    nth.sort_unstable();
    nth.dedup();
    Ok((
        (!plain.is_empty()).then_some(plain),
        (!nth.is_empty()).then_some(nth),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use hilal_rfc::rfc::rrule::{Frequency, LunarFields};

    fn normalizer() -> Normalizer {
        Normalizer::new().with_default_variant(CalendarVariant::Tabular)
    }

    fn start(y: i32, m: u8, d: u8) -> LunarFields {
        LunarFields::date(y, m, d)
    }

    #[test]
    fn defaults() {
        let rule = normalizer()
            .normalize(&RuleOptions::monthly().with_start(start(1446, 1, 30)))
            .unwrap();
        assert_eq!(rule.interval, 1);
        assert_eq!(rule.week_start, Weekday::Sunday);
        assert_eq!(rule.skip, SkipPolicy::Omit);
        assert_eq!(rule.calendar, CalendarVariant::Tabular);
        assert_eq!(rule.start.ymd(), (1446, 1, 30));
        assert_eq!(rule.count, None);
        assert!(!rule.has_day_filters());
    }

    #[test]
    fn frequency_is_required() {
        let err = normalizer().normalize(&RuleOptions::default()).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidRule { field: "FREQ", .. }));
    }

    #[test]
    fn range_violations_name_the_field() {
        let cases = [
            (RuleOptions::monthly().with_interval(0), "INTERVAL"),
            (RuleOptions::monthly().with_count(-1), "COUNT"),
            (RuleOptions::yearly().with_by_month(vec![13]), "BYMONTH"),
            (RuleOptions::monthly().with_by_month_day(vec![31]), "BYMONTHDAY"),
            (RuleOptions::monthly().with_by_month_day(vec![0]), "BYMONTHDAY"),
            (RuleOptions::yearly().with_by_year_day(vec![-356]), "BYYEARDAY"),
            (RuleOptions::yearly().with_by_week_no(vec![53]), "BYWEEKNO"),
            (RuleOptions::monthly().with_by_set_pos(vec![0]), "BYSETPOS"),
            (RuleOptions::daily().with_by_hour(vec![24]), "BYHOUR"),
            (
                RuleOptions::monthly().with_by_day(vec![WeekdayNum::nth(6, Weekday::Friday)]),
                "BYDAY",
            ),
            (
                RuleOptions::monthly().with_start(start(1446, 2, 30)),
                "DTSTART",
            ),
        ];
        for (options, expected) in cases {
            let options = if options.dtstart.is_none() {
                options.with_start(start(1446, 1, 1))
            } else {
                options
            };
            match normalizer().normalize(&options) {
                Err(ServiceError::InvalidRule { field, .. }) => assert_eq!(field, expected),
                other => panic!("expected {expected} error, got {other:?}"),
            }
        }
    }

    #[test]
    fn splits_month_days_and_weekdays() {
        let options = RuleOptions::monthly()
            .with_start(start(1446, 1, 1))
            .with_by_month_day(vec![15, -1, 1, 15, -3])
            .with_by_day(vec![
                WeekdayNum::nth(-1, Weekday::Friday),
                WeekdayNum::every(Weekday::Monday),
                WeekdayNum::nth(1, Weekday::Friday),
            ]);
        let rule = normalizer().normalize(&options).unwrap();
        assert_eq!(rule.by_month_day, Some(vec![1, 15]));
        assert_eq!(rule.by_month_day_negative, Some(vec![-3, -1]));
        assert_eq!(rule.by_weekday, Some(vec![Weekday::Monday]));
        assert_eq!(
            rule.by_weekday_nth,
            Some(vec![
                WeekdayNum::nth(-1, Weekday::Friday),
                WeekdayNum::nth(1, Weekday::Friday)
            ])
        );
    }

    #[test]
    fn empty_lists_become_absent() {
        let options = RuleOptions::monthly()
            .with_start(start(1446, 1, 1))
            .with_by_month(vec![]);
        assert_eq!(normalizer().normalize(&options).unwrap().by_month, None);
    }

    #[test]
    fn gregorian_start_is_converted() {
        let options = RuleOptions::daily()
            .with_start(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        let rule = normalizer().normalize(&options).unwrap();
        assert_eq!(rule.start.ymd(), (1446, 9, 1));
    }

    #[test]
    fn missing_start_uses_now() {
        let now = NaiveDate::from_ymd_opt(2024, 7, 8)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        let rule = normalizer()
            .with_now(now)
            .normalize(&RuleOptions::new(Frequency::Daily))
            .unwrap();
        assert_eq!(rule.start.ymd(), (1446, 1, 1));
        assert_eq!((rule.start.hour(), rule.start.minute()), (9, 30));
    }

    #[test]
    fn normalization_is_a_fixed_point() {
        let options = RuleOptions::yearly()
            .with_start(start(1446, 9, 1).with_time(18, 0, 0))
            .with_by_month(vec![10, 9])
            .with_by_month_day(vec![-1, 1])
            .with_by_day(vec![WeekdayNum::nth(1, Weekday::Friday), WeekdayNum::every(Weekday::Monday)])
            .with_skip(SkipPolicy::Forward)
            .with_until(start(1450, 1, 1));
        let first = normalizer().normalize(&options).unwrap();
        let second = normalizer().normalize(&RuleOptions::from(&first)).unwrap();
        assert_eq!(first, second);
        assert_eq!(second.start.hour(), 18);
    }
}
