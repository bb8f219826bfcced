//! Official (observational) lunar calendar built on a host [`LunarService`].
//!
//! The host only maps Gregorian days to lunar dates. Month starts are located with a
//! two-phase search around a mean-month estimate, and month lengths are probed by asking
//! whether day 30 exists. Both answers are memoized per `(year, month)`.

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use hilal_core::CalendarVariant;
use lru::LruCache;

use crate::backend::{CalendarBackend, check_date, check_month};
use crate::day_index::{julian_date_to_jdn, jdn_to_date};
use crate::error::{CalendarError, CalendarResult};
use crate::host::LunarService;
use crate::tabular::EPOCH_JULIAN_DATE;

/// Mean synodic month in days.
pub const MEAN_MONTH_DAYS: f64 = 29.530_589;

/// Half-width of the search window around the estimate, in days.
const SEARCH_WINDOW: i64 = 60;

/// Where a month starts and how long it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthInfo {
    /// JDN of day 1.
    pub start: i64,
    pub length: u8,
}

/// LRU cache of probed months.
struct MonthCache {
    entries: Mutex<LruCache<(i32, u8), MonthInfo>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MonthCache {
    fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    fn get(&self, key: (i32, u8)) -> Option<MonthInfo> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(info) = entries.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            Some(*info)
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            None
        }
    }

    fn put(&self, key: (i32, u8), info: MonthInfo) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.put(key, info);
    }

    fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Cache counters, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

#[derive(Clone)]
pub struct ObservationalCalendar {
    service: Arc<dyn LunarService>,
    cache: Arc<MonthCache>,
}

impl fmt::Debug for ObservationalCalendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservationalCalendar")
            .field("service", &self.service.name())
            .field("cached_months", &self.cache.len())
            .finish()
    }
}

impl ObservationalCalendar {
    /// ## Summary
    /// Creates a backend over `service` with a month cache holding at most `capacity` entries.
    #[must_use]
    pub fn new(service: Arc<dyn LunarService>, capacity: NonZeroUsize) -> Self {
        tracing::debug!(
            service = service.name(),
            capacity = capacity.get(),
            "Creating observational calendar"
        );
        Self {
            service,
            cache: Arc::new(MonthCache::new(capacity)),
        }
    }

    #[must_use]
    pub fn service_name(&self) -> &str {
        self.service.name()
    }

    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            entries: self.cache.len(),
            hits: self.cache.hits.load(Ordering::Relaxed),
            misses: self.cache.misses.load(Ordering::Relaxed),
        }
    }

    /// ## Summary
    /// Returns the start and length of a month, probing the host on a cache miss.
    ///
    /// ## Errors
    /// Returns `InvalidInput` for a month outside 1..=12 or a year before 1, and
    /// `ConversionFailure` if the host never reports day 1 of the month.
    pub fn month_info(&self, year: i32, month: u8) -> CalendarResult<MonthInfo> {
        check_month(month)?;
        if year < 1 {
            return Err(CalendarError::InvalidInput(format!(
                "year {year} precedes year 1"
            )));
        }

        if let Some(info) = self.cache.get((year, month)) {
            tracing::trace!(year, month, "Month cache hit");
            return Ok(info);
        }

        tracing::debug!(year, month, "Month cache miss, probing host calendar");
        let start = self.search(year, month, 1)?;
        let length = if self.lookup(start + 29) == Some((year, month, 30)) {
            30
        } else {
            29
        };

        let info = MonthInfo { start, length };
        self.cache.put((year, month), info);
        Ok(info)
    }

    /// Host answer for a JDN.
    fn lookup(&self, jdn: i64) -> Option<(i32, u8, u8)> {
        jdn_to_date(jdn).and_then(|date| self.service.to_lunar(date))
    }

    /// Locates the JDN of a lunar date: estimate, binary search, then linear scan.
    fn search(&self, year: i32, month: u8, day: u8) -> CalendarResult<i64> {
        let target = (year, month, day);
        let failure = CalendarError::ConversionFailure { year, month, day };

        let elapsed_months = f64::from(year - 1) * 12.0 + f64::from(month - 1);
        let estimate = EPOCH_JULIAN_DATE + elapsed_months * MEAN_MONTH_DAYS + f64::from(day - 1);
        let center = julian_date_to_jdn(estimate).ok_or_else(|| failure.clone())?;

        let (mut low, mut high) = (center - SEARCH_WINDOW, center + SEARCH_WINDOW);
        while low <= high {
            let mid = low + (high - low) / 2;
            let Some(found) = self.lookup(mid) else {
                break;
            };
            match found.cmp(&target) {
                std::cmp::Ordering::Equal => return Ok(mid),
                std::cmp::Ordering::Less => low = mid + 1,
                std::cmp::Ordering::Greater => high = mid - 1,
            }
        }

        tracing::debug!(year, month, day, "Binary search missed, scanning window");
        ((center - SEARCH_WINDOW)..=(center + SEARCH_WINDOW))
            .find(|&jdn| self.lookup(jdn) == Some(target))
            .ok_or(failure)
    }
}

impl CalendarBackend for ObservationalCalendar {
    fn variant(&self) -> CalendarVariant {
        CalendarVariant::Official
    }

    fn month_length(&self, year: i32, month: u8) -> CalendarResult<u8> {
        Ok(self.month_info(year, month)?.length)
    }

    fn to_day_index(&self, year: i32, month: u8, day: u8) -> CalendarResult<i64> {
        check_date(self, year, month, day)?;
        Ok(self.month_info(year, month)?.start + i64::from(day) - 1)
    }

    fn from_day_index(&self, index: i64) -> CalendarResult<(i32, u8, u8)> {
        self.lookup(index)
            .filter(|&(year, _, _)| year >= 1)
            .ok_or(CalendarError::OutOfRange {
                index,
                variant: CalendarVariant::Official,
            })
    }
}
