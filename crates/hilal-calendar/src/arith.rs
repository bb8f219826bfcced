//! Date arithmetic over any [`CalendarBackend`].
//!
//! Day offsets go through the Julian Day Number; month and year offsets work on
//! `(year, month)` directly and consult the backend only for month lengths.

use hilal_core::{SkipPolicy, Weekday};

use crate::backend::{CalendarBackend, check_month};
use crate::date::LunarDate;
use crate::error::{CalendarError, CalendarResult};

/// ## Summary
/// Adds `days` (possibly negative) to `date`, keeping its time of day.
///
/// ## Errors
/// Returns `OutOfRange` if the result precedes the calendar epoch.
pub fn add_days<B>(date: &LunarDate, days: i64, backend: &B) -> CalendarResult<LunarDate>
where
    B: CalendarBackend + ?Sized,
{
    let index = date.to_day_index(backend)?;
    let (year, month, day) = backend.from_day_index(index + days)?;
    Ok(date.with_ymd(year, month, day))
}

/// `(year, month)` shifted by `months`, or `None` before year 1.
#[must_use]
pub fn shift_month(year: i32, month: u8, months: i32) -> Option<(i32, u8)> {
    let total = i64::from(year - 1) * 12 + i64::from(month) - 1 + i64::from(months);
    let new_year = i32::try_from(total.div_euclid(12) + 1).ok()?;
    let new_month = u8::try_from(total.rem_euclid(12) + 1).ok()?;
    (new_year >= 1).then_some((new_year, new_month))
}

fn before_epoch(year: i32, month: u8, months: i32) -> CalendarError {
    CalendarError::InvalidInput(format!(
        "shifting {year:04}-{month:02} by {months} months precedes year 1"
    ))
}

/// ## Summary
/// Adds `months` to `date`.
///
/// When the day does not exist in the target month, `clamp = true` truncates it to the last
/// day of that month and `clamp = false` returns `None`.
///
/// ## Errors
/// Returns `InvalidInput` if the target year is before 1.
pub fn add_months<B>(
    date: &LunarDate,
    months: i32,
    clamp: bool,
    backend: &B,
) -> CalendarResult<Option<LunarDate>>
where
    B: CalendarBackend + ?Sized,
{
    let (year, month) = shift_month(date.year(), date.month(), months)
        .ok_or_else(|| before_epoch(date.year(), date.month(), months))?;
    fit_day(date, year, month, clamp, backend)
}

/// ## Summary
/// Adds `years` to `date`, keeping its month.
///
/// 30 Dhu al-Hijjah only exists in leap years; moving it into a common year clamps to the
/// 29th or yields `None` depending on `clamp`.
///
/// ## Errors
/// Returns `InvalidInput` if the target year is before 1.
pub fn add_years<B>(
    date: &LunarDate,
    years: i32,
    clamp: bool,
    backend: &B,
) -> CalendarResult<Option<LunarDate>>
where
    B: CalendarBackend + ?Sized,
{
    let year = date
        .year()
        .checked_add(years)
        .filter(|&y| y >= 1)
        .ok_or_else(|| {
            CalendarError::InvalidInput(format!(
                "shifting year {} by {years} precedes year 1",
                date.year()
            ))
        })?;
    fit_day(date, year, date.month(), clamp, backend)
}

fn fit_day<B>(
    date: &LunarDate,
    year: i32,
    month: u8,
    clamp: bool,
    backend: &B,
) -> CalendarResult<Option<LunarDate>>
where
    B: CalendarBackend + ?Sized,
{
    let length = backend.month_length(year, month)?;
    if date.day() <= length {
        Ok(Some(date.with_ymd(year, month, date.day())))
    } else if clamp {
        Ok(Some(date.with_ymd(year, month, length)))
    } else {
        Ok(None)
    }
}

/// ## Summary
/// Weekday of a lunar date.
///
/// ## Errors
/// Propagates backend failures.
pub fn day_of_week<B>(date: &LunarDate, backend: &B) -> CalendarResult<Weekday>
where
    B: CalendarBackend + ?Sized,
{
    weekday_of(date.year(), date.month(), date.day(), backend)
}

/// ## Summary
/// Weekday of a lunar `(year, month, day)`.
///
/// ## Errors
/// Returns `InvalidDate` if the triple does not exist.
pub fn weekday_of<B>(year: i32, month: u8, day: u8, backend: &B) -> CalendarResult<Weekday>
where
    B: CalendarBackend + ?Sized,
{
    Ok(Weekday::from_day_index(
        backend.to_day_index(year, month, day)?,
    ))
}

/// ## Summary
/// Days in `year` before day 1 of `month`.
///
/// ## Errors
/// Returns `InvalidInput` if `month` is outside 1..=12.
pub fn days_before_month<B>(year: i32, month: u8, backend: &B) -> CalendarResult<u16>
where
    B: CalendarBackend + ?Sized,
{
    check_month(month)?;
    (1..month).try_fold(0_u16, |total, m| {
        Ok(total + u16::from(backend.month_length(year, m)?))
    })
}

/// ## Summary
/// 1-based ordinal day within the year.
///
/// ## Errors
/// Returns `InvalidDate` if the triple does not exist.
pub fn day_of_year<B>(year: i32, month: u8, day: u8, backend: &B) -> CalendarResult<u16>
where
    B: CalendarBackend + ?Sized,
{
    crate::backend::check_date(backend, year, month, day)?;
    Ok(days_before_month(year, month, backend)? + u16::from(day))
}

/// ## Summary
/// Resolves a year day to `(month, day)`. Negative values count from the end of the year
/// (`-1` is the last day).
///
/// Returns `None` for `0` or values beyond the year's length.
///
/// ## Errors
/// Propagates backend failures.
pub fn year_day_to_month_day<B>(
    year: i32,
    year_day: i16,
    backend: &B,
) -> CalendarResult<Option<(u8, u8)>>
where
    B: CalendarBackend + ?Sized,
{
    let length = i32::from(backend.year_length(year)?);
    let ordinal = match i32::from(year_day) {
        0 => return Ok(None),
        n if n > 0 => n,
        n => length + n + 1,
    };
    if ordinal < 1 || ordinal > length {
        return Ok(None);
    }

    let mut remaining = ordinal;
    for month in 1..=12 {
        let month_length = i32::from(backend.month_length(year, month)?);
        if remaining <= month_length {
            return Ok(u8::try_from(remaining).ok().map(|day| (month, day)));
        }
        remaining -= month_length;
    }
    Ok(None)
}

/// ## Summary
/// Day of the month holding the `n`th `weekday` of the month. Negative `n` counts from the
/// end of the month. Returns `None` when the month has fewer than `|n|` such weekdays.
///
/// ## Errors
/// Returns `InvalidInput` if `month` is outside 1..=12.
pub fn nth_weekday_of_month<B>(
    year: i32,
    month: u8,
    weekday: Weekday,
    n: i8,
    backend: &B,
) -> CalendarResult<Option<u8>>
where
    B: CalendarBackend + ?Sized,
{
    let length = backend.month_length(year, month)?;
    if n == 0 {
        return Ok(None);
    }

    let count = n.unsigned_abs();
    let day = if n > 0 {
        let first = weekday_of(year, month, 1, backend)?;
        let first_match = 1 + weekday.days_since(first);
        count
            .checked_sub(1)
            .and_then(|k| k.checked_mul(7))
            .and_then(|offset| first_match.checked_add(offset))
    } else {
        let last = weekday_of(year, month, length, backend)?;
        let last_match = length - last.days_since(weekday);
        count
            .checked_sub(1)
            .and_then(|k| k.checked_mul(7))
            .and_then(|offset| last_match.checked_sub(offset))
    };
    Ok(day.filter(|&d| (1..=length).contains(&d)))
}

/// Every day of the month falling on `weekday`.
///
/// ## Errors
/// Returns `InvalidInput` if `month` is outside 1..=12.
pub fn weekdays_in_month<B>(
    year: i32,
    month: u8,
    weekday: Weekday,
    backend: &B,
) -> CalendarResult<Vec<u8>>
where
    B: CalendarBackend + ?Sized,
{
    let length = backend.month_length(year, month)?;
    let first = weekday_of(year, month, 1, backend)?;
    let first_match = 1 + weekday.days_since(first);
    Ok((first_match..=length).step_by(7).collect())
}

/// ## Summary
/// First day of the date's month.
#[must_use]
pub const fn start_of_month(date: &LunarDate) -> LunarDate {
    date.with_ymd(date.year(), date.month(), 1)
}

/// ## Summary
/// Last day of the date's month.
///
/// ## Errors
/// Propagates backend failures.
pub fn end_of_month<B>(date: &LunarDate, backend: &B) -> CalendarResult<LunarDate>
where
    B: CalendarBackend + ?Sized,
{
    let length = backend.month_length(date.year(), date.month())?;
    Ok(date.with_ymd(date.year(), date.month(), length))
}

/// 1 Muharram of the date's year.
#[must_use]
pub const fn start_of_year(date: &LunarDate) -> LunarDate {
    date.with_ymd(date.year(), 1, 1)
}

/// ## Summary
/// Last day of Dhu al-Hijjah in the date's year.
///
/// ## Errors
/// Propagates backend failures.
pub fn end_of_year<B>(date: &LunarDate, backend: &B) -> CalendarResult<LunarDate>
where
    B: CalendarBackend + ?Sized,
{
    let length = backend.month_length(date.year(), 12)?;
    Ok(date.with_ymd(date.year(), 12, length))
}

/// ## Summary
/// Most recent `week_start` on or before `date`.
///
/// ## Errors
/// Returns `OutOfRange` if that day precedes the calendar epoch.
pub fn start_of_week<B>(
    date: &LunarDate,
    week_start: Weekday,
    backend: &B,
) -> CalendarResult<LunarDate>
where
    B: CalendarBackend + ?Sized,
{
    let back = day_of_week(date, backend)?.days_since(week_start);
    add_days(date, -i64::from(back), backend)
}

/// ## Summary
/// Last day of the week containing `date`.
///
/// ## Errors
/// Propagates backend failures.
pub fn end_of_week<B>(date: &LunarDate, week_start: Weekday, backend: &B) -> CalendarResult<LunarDate>
where
    B: CalendarBackend + ?Sized,
{
    let start = start_of_week(date, week_start, backend)?;
    add_days(&start, 6, backend)
}

/// ## Summary
/// Week number of `date` within its year.
///
/// Week 1 begins on 1 Muharram and every later `week_start` day opens a new week, so the
/// first week may be shorter than seven days.
///
/// ## Errors
/// Propagates backend failures.
pub fn week_of_year<B>(date: &LunarDate, week_start: Weekday, backend: &B) -> CalendarResult<u8>
where
    B: CalendarBackend + ?Sized,
{
    let ordinal = day_of_year(date.year(), date.month(), date.day(), backend)?;
    let first = weekday_of(date.year(), 1, 1, backend)?;
    let offset = u16::from(first.days_since(week_start));
    // at most (355 - 1 + 6) / 7 + 1 = 52
    Ok(u8::try_from((ordinal - 1 + offset) / 7 + 1).unwrap_or(u8::MAX))
}

/// ## Summary
/// Number of (possibly partial) weeks in `year`.
///
/// ## Errors
/// Propagates backend failures.
pub fn weeks_in_year<B>(year: i32, week_start: Weekday, backend: &B) -> CalendarResult<u8>
where
    B: CalendarBackend + ?Sized,
{
    let last = backend.month_length(year, 12)?;
    week_of_year(&LunarDate::new(year, 12, last, backend)?, week_start, backend)
}

/// ## Summary
/// Applies a skip policy to a requested day of the month.
///
/// Days that exist are returned unchanged. For a day past the end of the month, `Omit`
/// yields `None`, `Backward` the month's last day and `Forward` day 1 of the next month.
///
/// ## Errors
/// Returns `InvalidInput` if `month` is outside 1..=12.
pub fn resolve_day<B>(
    year: i32,
    month: u8,
    day: u8,
    policy: SkipPolicy,
    backend: &B,
) -> CalendarResult<Option<(i32, u8, u8)>>
where
    B: CalendarBackend + ?Sized,
{
    let length = backend.month_length(year, month)?;
    if (1..=length).contains(&day) {
        return Ok(Some((year, month, day)));
    }
    if day == 0 {
        return Ok(None);
    }
    Ok(match policy {
        SkipPolicy::Omit => None,
        SkipPolicy::Backward => Some((year, month, length)),
        SkipPolicy::Forward if month == 12 => year.checked_add(1).map(|y| (y, 1, 1)),
        SkipPolicy::Forward => Some((year, month + 1, 1)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tabular::TabularCalendar;

    const CAL: TabularCalendar = TabularCalendar::new();

    fn date(y: i32, m: u8, d: u8) -> LunarDate {
        LunarDate::new(y, m, d, &CAL).unwrap()
    }

    #[test]
    fn add_days_crosses_year() {
        let d = add_days(&date(1446, 12, 29), 1, &CAL).unwrap();
        assert_eq!(d, date(1447, 1, 1));
        let d = add_days(&date(1447, 1, 1), -1, &CAL).unwrap();
        assert_eq!(d, date(1446, 12, 29));
    }

    #[test]
    fn add_days_keeps_time() {
        let start = date(1446, 9, 1).with_time(4, 30, 0).unwrap();
        let next = add_days(&start, 10, &CAL).unwrap();
        assert_eq!((next.hour(), next.minute()), (4, 30));
    }

    #[test]
    fn add_months_clamps_or_skips() {
        let d = date(1446, 1, 30);
        assert_eq!(add_months(&d, 1, true, &CAL).unwrap(), Some(date(1446, 2, 29)));
        assert_eq!(add_months(&d, 1, false, &CAL).unwrap(), None);
        assert_eq!(add_months(&d, 2, false, &CAL).unwrap(), Some(date(1446, 3, 30)));
        assert_eq!(add_months(&d, -1, true, &CAL).unwrap(), Some(date(1445, 12, 30)));
        assert_eq!(add_months(&d, 12, true, &CAL).unwrap(), Some(date(1447, 1, 30)));
    }

    #[test]
    fn add_months_before_year_one_fails() {
        assert!(add_months(&date(1, 1, 1), -1, true, &CAL).is_err());
    }

    #[test]
    fn add_years_leap_day() {
        let leap_day = date(1445, 12, 30);
        assert_eq!(add_years(&leap_day, 1, true, &CAL).unwrap(), Some(date(1446, 12, 29)));
        assert_eq!(add_years(&leap_day, 1, false, &CAL).unwrap(), None);
        assert_eq!(add_years(&leap_day, 2, false, &CAL).unwrap(), Some(date(1447, 12, 30)));
    }

    #[test]
    fn weekdays() {
        assert_eq!(day_of_week(&date(1446, 9, 1), &CAL).unwrap(), Weekday::Saturday);
        assert_eq!(day_of_week(&date(1446, 1, 1), &CAL).unwrap(), Weekday::Monday);
        assert_eq!(day_of_week(&date(1, 1, 1), &CAL).unwrap(), Weekday::Friday);
    }

    #[test]
    fn day_of_year_values() {
        assert_eq!(days_before_month(1446, 9, &CAL).unwrap(), 236);
        assert_eq!(day_of_year(1446, 9, 1, &CAL).unwrap(), 237);
        assert_eq!(day_of_year(1446, 12, 29, &CAL).unwrap(), 354);
        assert_eq!(days_before_month(1446, 1, &CAL).unwrap(), 0);
    }

    #[test]
    fn year_day_resolution() {
        assert_eq!(year_day_to_month_day(1446, 237, &CAL).unwrap(), Some((9, 1)));
        assert_eq!(year_day_to_month_day(1446, -1, &CAL).unwrap(), Some((12, 29)));
        assert_eq!(year_day_to_month_day(1445, -1, &CAL).unwrap(), Some((12, 30)));
        assert_eq!(year_day_to_month_day(1446, 355, &CAL).unwrap(), None);
        assert_eq!(year_day_to_month_day(1445, 355, &CAL).unwrap(), Some((12, 30)));
        assert_eq!(year_day_to_month_day(1446, 0, &CAL).unwrap(), None);
    }

    #[test]
    fn nth_weekday() {
        // 1446-09-01 is a Saturday; Fridays fall on 7, 14, 21, 28.
        assert_eq!(nth_weekday_of_month(1446, 9, Weekday::Friday, 1, &CAL).unwrap(), Some(7));
        assert_eq!(nth_weekday_of_month(1446, 9, Weekday::Friday, 4, &CAL).unwrap(), Some(28));
        assert_eq!(nth_weekday_of_month(1446, 9, Weekday::Friday, 5, &CAL).unwrap(), None);
        assert_eq!(nth_weekday_of_month(1446, 9, Weekday::Friday, -1, &CAL).unwrap(), Some(28));
        // Saturdays: 1, 8, 15, 22, 29.
        assert_eq!(nth_weekday_of_month(1446, 9, Weekday::Saturday, 5, &CAL).unwrap(), Some(29));
        assert_eq!(nth_weekday_of_month(1446, 9, Weekday::Saturday, -5, &CAL).unwrap(), Some(1));
        assert_eq!(
            weekdays_in_month(1446, 9, Weekday::Saturday, &CAL).unwrap(),
            vec![1, 8, 15, 22, 29]
        );
    }

    #[test]
    fn period_boundaries() {
        let d = date(1446, 9, 17);
        assert_eq!(start_of_month(&d), date(1446, 9, 1));
        assert_eq!(end_of_month(&d, &CAL).unwrap(), date(1446, 9, 30));
        assert_eq!(start_of_year(&d), date(1446, 1, 1));
        assert_eq!(end_of_year(&d, &CAL).unwrap(), date(1446, 12, 29));
        // 1446-09-17 is a Monday.
        assert_eq!(start_of_week(&d, Weekday::Sunday, &CAL).unwrap(), date(1446, 9, 16));
        assert_eq!(end_of_week(&d, Weekday::Sunday, &CAL).unwrap(), date(1446, 9, 22));
        assert_eq!(start_of_week(&d, Weekday::Monday, &CAL).unwrap(), d);
    }

    #[test]
    fn week_numbers() {
        // 1446-01-01 is a Monday; with weeks starting Sunday, week 2 opens on 1446-01-07.
        assert_eq!(week_of_year(&date(1446, 1, 1), Weekday::Sunday, &CAL).unwrap(), 1);
        assert_eq!(week_of_year(&date(1446, 1, 6), Weekday::Sunday, &CAL).unwrap(), 1);
        assert_eq!(week_of_year(&date(1446, 1, 7), Weekday::Sunday, &CAL).unwrap(), 2);
        // With weeks starting Monday, 1 Muharram opens a full first week.
        assert_eq!(week_of_year(&date(1446, 1, 7), Weekday::Monday, &CAL).unwrap(), 1);
        assert_eq!(week_of_year(&date(1446, 1, 8), Weekday::Monday, &CAL).unwrap(), 2);
        assert_eq!(weeks_in_year(1446, Weekday::Monday, &CAL).unwrap(), 51);
    }

    #[test]
    fn skip_policy_resolution() {
        assert_eq!(resolve_day(1446, 2, 30, SkipPolicy::Omit, &CAL).unwrap(), None);
        assert_eq!(
            resolve_day(1446, 2, 30, SkipPolicy::Backward, &CAL).unwrap(),
            Some((1446, 2, 29))
        );
        assert_eq!(
            resolve_day(1446, 2, 30, SkipPolicy::Forward, &CAL).unwrap(),
            Some((1446, 3, 1))
        );
        assert_eq!(
            resolve_day(1446, 12, 30, SkipPolicy::Forward, &CAL).unwrap(),
            Some((1447, 1, 1))
        );
        assert_eq!(
            resolve_day(1446, 3, 30, SkipPolicy::Omit, &CAL).unwrap(),
            Some((1446, 3, 30))
        );
    }
}
