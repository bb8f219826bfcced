//! Arithmetic (tabular) lunar calendar on a fixed 30-year cycle.

use hilal_core::CalendarVariant;

use crate::backend::{CalendarBackend, check_date, check_month};
use crate::error::{CalendarError, CalendarResult};

/// JDN of 1 Muharram, year 1 (Friday 19 July 622, proleptic Gregorian).
pub const EPOCH_JDN: i64 = 1_948_440;

/// Julian Date at the start of the epoch day.
pub const EPOCH_JULIAN_DATE: f64 = 1_948_439.5;

const CYCLE_YEARS: i32 = 30;
const CYCLE_DAYS: i64 = 10_631;

/// 1-based positions within the cycle whose twelfth month has 30 days.
const LEAP_POSITIONS: [i32; 11] = [2, 5, 7, 10, 13, 16, 18, 21, 24, 26, 29];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TabularCalendar;

impl TabularCalendar {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Leap status straight from the cycle position.
    #[must_use]
    pub fn is_leap(year: i32) -> bool {
        LEAP_POSITIONS.contains(&((year - 1).rem_euclid(CYCLE_YEARS) + 1))
    }

    fn days_in_year(year: i32) -> u16 {
        if Self::is_leap(year) { 355 } else { 354 }
    }

    fn days_in_month(year: i32, month: u8) -> u8 {
        if month % 2 == 1 || (month == 12 && Self::is_leap(year)) {
            30
        } else {
            29
        }
    }

    fn out_of_range(index: i64) -> CalendarError {
        CalendarError::OutOfRange {
            index,
            variant: CalendarVariant::Tabular,
        }
    }
}

impl CalendarBackend for TabularCalendar {
    fn variant(&self) -> CalendarVariant {
        CalendarVariant::Tabular
    }

    fn month_length(&self, year: i32, month: u8) -> CalendarResult<u8> {
        check_month(month)?;
        Ok(Self::days_in_month(year, month))
    }

    fn is_leap_year(&self, year: i32) -> bool {
        Self::is_leap(year)
    }

    fn year_length(&self, year: i32) -> CalendarResult<u16> {
        Ok(Self::days_in_year(year))
    }

    fn to_day_index(&self, year: i32, month: u8, day: u8) -> CalendarResult<i64> {
        check_date(self, year, month, day)?;

        let cycles = (year - 1) / CYCLE_YEARS;
        let mut days = i64::from(cycles) * CYCLE_DAYS;
        for y in (cycles * CYCLE_YEARS + 1)..year {
            days += i64::from(Self::days_in_year(y));
        }
        for m in 1..month {
            days += i64::from(Self::days_in_month(year, m));
        }
        Ok(EPOCH_JDN + days + i64::from(day) - 1)
    }

    fn from_day_index(&self, index: i64) -> CalendarResult<(i32, u8, u8)> {
        let mut days = index - EPOCH_JDN;
        if days < 0 {
            return Err(Self::out_of_range(index));
        }

        let cycles = days / CYCLE_DAYS;
        days -= cycles * CYCLE_DAYS;
        let mut year = i32::try_from(cycles)
            .ok()
            .and_then(|c| c.checked_mul(CYCLE_YEARS))
            .and_then(|y| y.checked_add(1))
            .ok_or_else(|| Self::out_of_range(index))?;

        while days >= i64::from(Self::days_in_year(year)) {
            days -= i64::from(Self::days_in_year(year));
            year += 1;
        }

        let mut month = 1;
        while days >= i64::from(Self::days_in_month(year, month)) {
            days -= i64::from(Self::days_in_month(year, month));
            month += 1;
        }

        // days < 30 after the month walk
        let day = u8::try_from(days + 1)
            .ok()
            .ok_or_else(|| Self::out_of_range(index))?;
        Ok((year, month, day))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    const CAL: TabularCalendar = TabularCalendar::new();

    #[test]
    fn epoch_is_day_one() {
        assert_eq!(CAL.to_day_index(1, 1, 1).unwrap(), EPOCH_JDN);
        assert_eq!(CAL.from_day_index(EPOCH_JDN).unwrap(), (1, 1, 1));
    }

    #[test]
    fn before_epoch_is_out_of_range() {
        let err = CAL.from_day_index(EPOCH_JDN - 1).unwrap_err();
        assert!(matches!(err, CalendarError::OutOfRange { index, .. } if index == EPOCH_JDN - 1));
    }

    #[test]
    fn known_gregorian_correspondences() {
        let cases = [
            ((1446, 1, 1), NaiveDate::from_ymd_opt(2024, 7, 8).unwrap()),
            ((1446, 9, 1), NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()),
            ((1447, 1, 1), NaiveDate::from_ymd_opt(2025, 6, 27).unwrap()),
            ((1445, 9, 1), NaiveDate::from_ymd_opt(2024, 3, 11).unwrap()),
        ];
        for ((y, m, d), greg) in cases {
            assert_eq!(CAL.lunar_to_gregorian(y, m, d).unwrap(), greg, "{y}-{m}-{d}");
            assert_eq!(CAL.gregorian_to_lunar(greg).unwrap(), (y, m, d), "{greg}");
        }
    }

    #[test]
    fn month_lengths_1446() {
        let lengths: Vec<u8> = (1..=12).map(|m| CAL.month_length(1446, m).unwrap()).collect();
        assert_eq!(lengths, [30, 29, 30, 29, 30, 29, 30, 29, 30, 29, 30, 29]);
        assert_eq!(CAL.month_length(1445, 12).unwrap(), 30);
    }

    #[test]
    fn rejects_bad_month() {
        assert!(matches!(
            CAL.month_length(1446, 13),
            Err(CalendarError::InvalidInput(_))
        ));
        assert!(matches!(
            CAL.month_length(1446, 0),
            Err(CalendarError::InvalidInput(_))
        ));
    }

    #[test]
    fn rejects_day_thirty_in_short_month() {
        let err = CAL.to_day_index(1446, 2, 30).unwrap_err();
        assert_eq!(
            err,
            CalendarError::InvalidDate {
                year: 1446,
                month: 2,
                day: 30,
                variant: CalendarVariant::Tabular
            }
        );
    }

    #[test]
    fn year_length_matches_consecutive_new_years() {
        for year in 1440..1472 {
            let span =
                CAL.to_day_index(year + 1, 1, 1).unwrap() - CAL.to_day_index(year, 1, 1).unwrap();
            assert_eq!(i64::from(CAL.year_length(year).unwrap()), span, "year {year}");
        }
        assert_eq!(CAL.year_length(1445).unwrap(), 355);
        assert_eq!(CAL.year_length(1446).unwrap(), 354);
    }

    #[test]
    fn cycle_spans_10631_days() {
        let start = CAL.to_day_index(1441, 1, 1).unwrap();
        let next = CAL.to_day_index(1471, 1, 1).unwrap();
        assert_eq!(next - start, CYCLE_DAYS);
    }
}
