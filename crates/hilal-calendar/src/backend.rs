//! The calendar interface and its closed set of implementations.

use std::num::NonZeroUsize;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::NaiveDate;
use hilal_core::CalendarVariant;

use crate::day_index::{date_to_jdn, jdn_to_date};
use crate::error::{CalendarError, CalendarResult};
use crate::host;
use crate::observational::ObservationalCalendar;
use crate::tabular::TabularCalendar;

/// Default capacity of the observational month cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 512;

/// Month lengths, validity and day-index conversion for one lunar calendar variant.
///
/// Everything above this layer (arithmetic, normalization, generation) is written against
/// this trait and never inspects the concrete calendar.
pub trait CalendarBackend {
    /// The variant this backend answers for.
    fn variant(&self) -> CalendarVariant;

    /// ## Summary
    /// Number of days (29 or 30) in `month` of `year`.
    ///
    /// ## Errors
    /// Returns `InvalidInput` if `month` is outside 1..=12.
    fn month_length(&self, year: i32, month: u8) -> CalendarResult<u8>;

    /// ## Summary
    /// Converts a lunar date to its Julian Day Number.
    ///
    /// ## Errors
    /// Returns `InvalidDate` if the triple does not exist in this calendar.
    fn to_day_index(&self, year: i32, month: u8, day: u8) -> CalendarResult<i64>;

    /// ## Summary
    /// Converts a Julian Day Number to a lunar `(year, month, day)`.
    ///
    /// ## Errors
    /// Returns `OutOfRange` for indices before the calendar epoch.
    fn from_day_index(&self, index: i64) -> CalendarResult<(i32, u8, u8)>;

    /// True iff the twelfth month has 30 days.
    fn is_leap_year(&self, year: i32) -> bool {
        self.month_length(year, 12).is_ok_and(|len| len == 30)
    }

    /// ## Summary
    /// Number of days (354 or 355) in `year`.
    ///
    /// ## Errors
    /// Propagates month-length failures.
    fn year_length(&self, year: i32) -> CalendarResult<u16> {
        (1..=12).try_fold(0_u16, |total, month| {
            Ok(total + u16::from(self.month_length(year, month)?))
        })
    }

    fn is_valid_date(&self, year: i32, month: u8, day: u8) -> bool {
        year >= 1
            && (1..=12).contains(&month)
            && day >= 1
            && self.month_length(year, month).is_ok_and(|len| day <= len)
    }

    /// ## Summary
    /// Lunar `(year, month, day)` of a Gregorian date.
    ///
    /// ## Errors
    /// Returns `OutOfRange` for dates before the calendar epoch.
    fn gregorian_to_lunar(&self, date: NaiveDate) -> CalendarResult<(i32, u8, u8)> {
        self.from_day_index(date_to_jdn(date))
    }

    /// ## Summary
    /// Gregorian date of a lunar `(year, month, day)`.
    ///
    /// ## Errors
    /// Returns `InvalidDate` for nonexistent triples and `OutOfRange` if the result cannot
    /// be represented.
    fn lunar_to_gregorian(&self, year: i32, month: u8, day: u8) -> CalendarResult<NaiveDate> {
        let index = self.to_day_index(year, month, day)?;
        jdn_to_date(index).ok_or_else(|| CalendarError::OutOfRange {
            index,
            variant: self.variant(),
        })
    }
}

/// Rejects months outside 1..=12.
pub(crate) fn check_month(month: u8) -> CalendarResult<()> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(CalendarError::InvalidInput(format!(
            "month {month} is outside 1..=12"
        )))
    }
}

/// Validates a triple against `backend`, returning the month length.
pub(crate) fn check_date<B>(backend: &B, year: i32, month: u8, day: u8) -> CalendarResult<u8>
where
    B: CalendarBackend + ?Sized,
{
    check_month(month)?;
    let invalid = || CalendarError::InvalidDate {
        year,
        month,
        day,
        variant: backend.variant(),
    };
    if year < 1 || day == 0 {
        return Err(invalid());
    }
    let length = backend.month_length(year, month)?;
    if day > length {
        return Err(invalid());
    }
    Ok(length)
}

static CACHE_CAPACITY: AtomicUsize = AtomicUsize::new(DEFAULT_CACHE_CAPACITY);
static OFFICIAL: OnceLock<Calendar> = OnceLock::new();

/// A lunar calendar: one of the two supported variants.
#[derive(Debug, Clone)]
pub enum Calendar {
    Tabular(TabularCalendar),
    Observational(ObservationalCalendar),
}

impl Calendar {
    #[must_use]
    pub const fn tabular() -> Self {
        Self::Tabular(TabularCalendar::new())
    }

    /// ## Summary
    /// Returns the shared calendar for `variant`.
    ///
    /// The official calendar is built once per process on first use. When no host lunar
    /// service is compiled in, it falls back to the tabular calendar and logs a warning.
    #[must_use]
    pub fn for_variant(variant: CalendarVariant) -> Self {
        match variant {
            CalendarVariant::Tabular => Self::tabular(),
            CalendarVariant::Official => OFFICIAL.get_or_init(Self::build_official).clone(),
        }
    }

    fn build_official() -> Self {
        let capacity = NonZeroUsize::new(CACHE_CAPACITY.load(Ordering::Relaxed))
            .unwrap_or(NonZeroUsize::MIN);
        if let Some(service) = host::default_service() {
            Self::Observational(ObservationalCalendar::new(service, capacity))
        } else {
            tracing::warn!(
                "No host lunar service available, official calendar falls back to tabular"
            );
            Self::tabular()
        }
    }

    /// ## Summary
    /// Sets the month cache capacity used when the shared official calendar is built.
    ///
    /// Returns `false` (and changes nothing) if the shared calendar already exists.
    #[must_use]
    pub fn configure_cache_capacity(capacity: NonZeroUsize) -> bool {
        if OFFICIAL.get().is_some() {
            tracing::warn!(
                capacity = capacity.get(),
                "Official calendar already built, cache capacity unchanged"
            );
            return false;
        }
        CACHE_CAPACITY.store(capacity.get(), Ordering::Relaxed);
        true
    }
}

impl From<TabularCalendar> for Calendar {
    fn from(calendar: TabularCalendar) -> Self {
        Self::Tabular(calendar)
    }
}

impl From<ObservationalCalendar> for Calendar {
    fn from(calendar: ObservationalCalendar) -> Self {
        Self::Observational(calendar)
    }
}

impl CalendarBackend for Calendar {
    fn variant(&self) -> CalendarVariant {
        match self {
            Self::Tabular(cal) => cal.variant(),
            Self::Observational(cal) => cal.variant(),
        }
    }

    fn month_length(&self, year: i32, month: u8) -> CalendarResult<u8> {
        match self {
            Self::Tabular(cal) => cal.month_length(year, month),
            Self::Observational(cal) => cal.month_length(year, month),
        }
    }

    fn to_day_index(&self, year: i32, month: u8, day: u8) -> CalendarResult<i64> {
        match self {
            Self::Tabular(cal) => cal.to_day_index(year, month, day),
            Self::Observational(cal) => cal.to_day_index(year, month, day),
        }
    }

    fn from_day_index(&self, index: i64) -> CalendarResult<(i32, u8, u8)> {
        match self {
            Self::Tabular(cal) => cal.from_day_index(index),
            Self::Observational(cal) => cal.from_day_index(index),
        }
    }

    fn is_leap_year(&self, year: i32) -> bool {
        match self {
            Self::Tabular(cal) => cal.is_leap_year(year),
            Self::Observational(cal) => cal.is_leap_year(year),
        }
    }

    fn year_length(&self, year: i32) -> CalendarResult<u16> {
        match self {
            Self::Tabular(cal) => cal.year_length(year),
            Self::Observational(cal) => cal.year_length(year),
        }
    }
}
