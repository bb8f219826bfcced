//! Host-provided official lunar calendar.
//!
//! The observational backend only needs one question answered: which lunar date does a
//! given Gregorian day fall on. Everything else (month starts, month lengths) is derived
//! by searching and probing through this narrow interface.

use std::sync::Arc;

use chrono::NaiveDate;

/// Gregorian to lunar lookup offered by the host environment.
pub trait LunarService: Send + Sync {
    /// Short name used in log output.
    fn name(&self) -> &str;

    /// Returns `(year, month, day)` for `date`, or `None` when the host cannot answer.
    fn to_lunar(&self, date: NaiveDate) -> Option<(i32, u8, u8)>;
}

/// Umm al-Qura calendar backed by ICU4X compiled data.
#[cfg(feature = "icu")]
#[derive(Debug, Clone, Copy, Default)]
pub struct IcuLunarService;

#[cfg(feature = "icu")]
impl LunarService for IcuLunarService {
    fn name(&self) -> &str {
        "icu-umalqura"
    }

    fn to_lunar(&self, date: NaiveDate) -> Option<(i32, u8, u8)> {
        use chrono::Datelike;
        use icu::calendar::{AnyCalendar, AnyCalendarKind, Date};

        let month = u8::try_from(date.month()).ok()?;
        let day = u8::try_from(date.day()).ok()?;
        let iso = Date::try_new_iso(date.year(), month, day).ok()?;
        let hijri = iso.to_calendar(AnyCalendar::new(AnyCalendarKind::HijriUmmAlQura));

        Some((
            hijri.extended_year(),
            hijri.month().ordinal,
            hijri.day_of_month().0,
        ))
    }
}

/// ## Summary
/// Returns the host lunar service compiled into this build, if any.
#[must_use]
pub fn default_service() -> Option<Arc<dyn LunarService>> {
    #[cfg(feature = "icu")]
    {
        Some(Arc::new(IcuLunarService))
    }
    #[cfg(not(feature = "icu"))]
    {
        None
    }
}
