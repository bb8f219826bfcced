//! Lazy occurrence generation.
//!
//! The generator walks periods (years, months, weeks or days, `interval` apart) from the
//! rule's start date. Each period expands into sorted, deduplicated candidate days, BYSETPOS
//! picks among them, and the survivors are yielded until COUNT or UNTIL is reached.

use std::collections::VecDeque;
use std::iter::FusedIterator;

use hilal_calendar::{CalendarBackend, LunarDate, arith};
use hilal_core::Weekday;
use hilal_rfc::rfc::rrule::{Frequency, NormalizedRule};

use crate::error::ServiceResult;

/// Default ceiling on the number of periods one enumeration may advance.
pub const DEFAULT_MAX_PERIODS: u64 = 200_000;

/// Periods allowed per requested occurrence when COUNT is set.
const PERIODS_PER_OCCURRENCE: u64 = 4000;

type Ymd = (i32, u8, u8);

/// Bounds on a single enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorLimits {
    pub max_periods: u64,
}

impl Default for GeneratorLimits {
    fn default() -> Self {
        Self {
            max_periods: DEFAULT_MAX_PERIODS,
        }
    }
}

impl GeneratorLimits {
    /// Number of periods an enumeration may advance before it stops silently.
    #[must_use]
    pub fn period_budget(&self, count: Option<u32>) -> u64 {
        match count {
            Some(count) => (u64::from(count) * PERIODS_PER_OCCURRENCE)
                .max(PERIODS_PER_OCCURRENCE)
                .min(self.max_periods),
            None => self.max_periods,
        }
    }
}

/// Candidate days of one period.
struct Period {
    /// Earliest day the period could produce; used to stop early once past UNTIL.
    first: Ymd,
    candidates: Vec<Ymd>,
}

/// Iterator over the occurrences of a normalized rule.
///
/// Every new iterator starts again from the rule's start date. Dates are strictly increasing.
pub struct Occurrences<'r, B: CalendarBackend + ?Sized> {
    rule: &'r NormalizedRule,
    backend: &'r B,
    start_index: Option<i64>,
    period: u64,
    budget: u64,
    buffer: VecDeque<LunarDate>,
    last: Option<LunarDate>,
    remaining: Option<u32>,
    finished: bool,
}

impl<'r, B: CalendarBackend + ?Sized> Occurrences<'r, B> {
    #[must_use]
    pub fn new(rule: &'r NormalizedRule, backend: &'r B, limits: GeneratorLimits) -> Self {
        if rule.freq.is_sub_daily() {
            tracing::debug!(freq = %rule.freq, "Sub-daily frequency expands at daily granularity");
        }
        if !matches!(rule.freq, Frequency::Yearly | Frequency::Monthly)
            && (rule.by_weekday_nth.is_some()
                || rule.by_year_day.is_some()
                || rule.by_week_no.is_some())
        {
            tracing::debug!(
                freq = %rule.freq,
                "Ordinal BYDAY, BYYEARDAY and BYWEEKNO are unused at this frequency"
            );
        }
        tracing::debug!(start = %rule.start, freq = %rule.freq, "Starting enumeration");
        Self {
            rule,
            backend,
            start_index: None,
            period: 0,
            budget: limits.period_budget(rule.count),
            buffer: VecDeque::new(),
            last: None,
            remaining: rule.count,
            finished: rule.count == Some(0),
        }
    }

    /// Number of periods advanced so far.
    #[must_use]
    pub const fn periods(&self) -> u64 {
        self.period
    }

    fn start_index(&mut self) -> ServiceResult<i64> {
        if let Some(index) = self.start_index {
            return Ok(index);
        }
        let index = self.rule.start.to_day_index(self.backend)?;
        self.start_index = Some(index);
        Ok(index)
    }

    /// Advances periods until at least one date is buffered or the walk ends.
    fn generate(&mut self) -> ServiceResult<()> {
        let start_index = self.start_index()?;

        while self.buffer.is_empty() && !self.finished {
            if self.period >= self.budget {
                tracing::warn!(
                    periods = self.period,
                    freq = %self.rule.freq,
                    "Period limit reached, stopping enumeration"
                );
                self.finished = true;
                break;
            }

            let step = i64::try_from(self.period)
                .ok()
                .and_then(|p| p.checked_mul(i64::from(self.rule.interval)));
            self.period += 1;
            let Some(period) = step.map(|s| self.expand(s, start_index)).transpose()?.flatten()
            else {
                self.finished = true;
                break;
            };

            if let Some(until) = self.rule.until
                && period.first > until.ymd()
            {
                tracing::trace!(until = %until, "Period starts after UNTIL");
                self.finished = true;
                break;
            }

            let mut candidates = period.candidates;
            candidates.sort_unstable();
            candidates.dedup();
            if let Some(ref positions) = self.rule.by_set_pos {
                candidates = select_positions(&candidates, positions);
            }
            tracing::trace!(
                period = self.period,
                candidates = candidates.len(),
                "Expanded period"
            );

            for (year, month, day) in candidates {
                let date = self.rule.start.on_day(year, month, day, self.backend)?;
                if date < self.rule.start || self.last.is_some_and(|last| date <= last) {
                    continue;
                }
                if let Some(until) = self.rule.until
                    && date > until
                {
                    self.finished = true;
                    break;
                }

                self.buffer.push_back(date);
                self.last = Some(date);
                if let Some(remaining) = self.remaining.as_mut() {
                    *remaining = remaining.saturating_sub(1);
                    if *remaining == 0 {
                        self.finished = true;
                        break;
                    }
                }
            }
        }

        if self.finished {
            tracing::debug!(periods = self.period, "Enumeration finished");
        }
        Ok(())
    }

    /// Candidates of the period `step` frequency units after the start. `None` past the
    /// representable range.
    fn expand(&self, step: i64, start_index: i64) -> ServiceResult<Option<Period>> {
        let rule = self.rule;
        let start = &rule.start;

        let period = match rule.freq {
            Frequency::Yearly => {
                let Some(year) = i32::try_from(step)
                    .ok()
                    .and_then(|s| start.year().checked_add(s))
                else {
                    return Ok(None);
                };
                Period {
                    first: (year, 1, 1),
                    candidates: self.yearly(year)?,
                }
            }
            Frequency::Monthly => {
                let Some((year, month)) = i32::try_from(step)
                    .ok()
                    .and_then(|s| arith::shift_month(start.year(), start.month(), s))
                else {
                    return Ok(None);
                };
                let candidates = if self.month_allowed(month) {
                    self.month_candidates(year, month)?
                } else {
                    Vec::new()
                };
                Period {
                    first: (year, month, 1),
                    candidates,
                }
            }
            Frequency::Weekly => {
                let Some(index) = step
                    .checked_mul(7)
                    .and_then(|offset| start_index.checked_add(offset))
                else {
                    return Ok(None);
                };
                Period {
                    first: self.backend.from_day_index(index)?,
                    candidates: self.weekly(index)?,
                }
            }
            Frequency::Daily | Frequency::Hourly | Frequency::Minutely | Frequency::Secondly => {
                let Some(index) = start_index.checked_add(step) else {
                    return Ok(None);
                };
                let ymd = self.backend.from_day_index(index)?;
                let candidates = if self.matches_day(ymd, index)? {
                    vec![ymd]
                } else {
                    Vec::new()
                };
                Period {
                    first: ymd,
                    candidates,
                }
            }
        };
        Ok(Some(period))
    }

    fn month_allowed(&self, month: u8) -> bool {
        self.rule
            .by_month
            .as_ref()
            .is_none_or(|months| months.contains(&month))
    }

    fn has_month_days(&self) -> bool {
        self.rule.by_month_day.is_some() || self.rule.by_month_day_negative.is_some()
    }

    /// Without BYMONTH, candidates come from the start month, BYYEARDAY or BYWEEKNO and are
    /// then narrowed by plain BYDAY entries.
    fn yearly(&self, year: i32) -> ServiceResult<Vec<Ymd>> {
        let rule = self.rule;

        if let Some(ref months) = rule.by_month {
            let mut out = Vec::new();
            for &month in months {
                out.extend(self.month_candidates(year, month)?);
            }
            return Ok(out);
        }

        let candidates = if self.has_month_days() {
            self.month_candidates(year, rule.start.month())?
        } else if let Some(ref year_days) = rule.by_year_day {
            let mut out = Vec::new();
            for &year_day in year_days {
                if let Some((month, day)) =
                    arith::year_day_to_month_day(year, year_day, self.backend)?
                {
                    out.push((year, month, day));
                }
            }
            out
        } else if let Some(ref weeks) = rule.by_week_no {
            self.week_numbers(year, weeks)?
        } else {
            self.month_candidates(year, rule.start.month())?
        };
        self.retain_plain_weekdays(candidates)
    }

    /// Day candidates for one month, from the first source present: BYMONTHDAY (both signs),
    /// ordinal BYDAY, plain BYDAY, then the start day clamped to the month length.
    fn month_candidates(&self, year: i32, month: u8) -> ServiceResult<Vec<Ymd>> {
        let rule = self.rule;
        let backend = self.backend;
        let length = backend.month_length(year, month)?;
        let mut out = Vec::new();

        if self.has_month_days() {
            for &day in rule.by_month_day.iter().flatten() {
                if let Some(ymd) = arith::resolve_day(year, month, day, rule.skip, backend)? {
                    out.push(ymd);
                }
            }
            for &day in rule.by_month_day_negative.iter().flatten() {
                let resolved = i16::from(length) + i16::from(day) + 1;
                if let Ok(day) = u8::try_from(resolved)
                    && day >= 1
                {
                    out.push((year, month, day));
                }
            }
        } else if rule.by_weekday_nth.is_some() {
            out.extend(
                self.nth_weekdays(year, month)?
                    .into_iter()
                    .map(|day| (year, month, day)),
            );
        } else if let Some(ref weekdays) = rule.by_weekday {
            for &weekday in weekdays {
                out.extend(
                    arith::weekdays_in_month(year, month, weekday, backend)?
                        .into_iter()
                        .map(|day| (year, month, day)),
                );
            }
        } else {
            out.push((year, month, rule.start.day().min(length)));
        }
        Ok(out)
    }

    /// Days of the month selected by ordinal BYDAY entries.
    fn nth_weekdays(&self, year: i32, month: u8) -> ServiceResult<Vec<u8>> {
        let mut days = Vec::new();
        for value in self.rule.by_weekday_nth.iter().flatten() {
            let Some(n) = value.ordinal else { continue };
            if let Some(day) =
                arith::nth_weekday_of_month(year, month, value.weekday, n, self.backend)?
            {
                days.push(day);
            }
        }
        Ok(days)
    }

    fn is_plain_weekday(&self, (year, month, day): Ymd) -> ServiceResult<bool> {
        let Some(ref weekdays) = self.rule.by_weekday else {
            return Ok(false);
        };
        let weekday = arith::weekday_of(year, month, day, self.backend)?;
        Ok(weekdays.contains(&weekday))
    }

    fn retain_plain_weekdays(&self, candidates: Vec<Ymd>) -> ServiceResult<Vec<Ymd>> {
        if self.rule.by_weekday.is_none() {
            return Ok(candidates);
        }
        let mut kept = Vec::with_capacity(candidates.len());
        for ymd in candidates {
            if self.is_plain_weekday(ymd)? {
                kept.push(ymd);
            }
        }
        Ok(kept)
    }

    /// Every day of the listed weeks. Week 1 starts on 1 Muharram.
    fn week_numbers(&self, year: i32, weeks: &[i8]) -> ServiceResult<Vec<Ymd>> {
        let backend = self.backend;
        let week_start = self.rule.week_start;
        let year_length = i16::try_from(backend.year_length(year)?).unwrap_or(i16::MAX);
        let total = i16::from(arith::weeks_in_year(year, week_start, backend)?);
        let offset = i16::from(arith::weekday_of(year, 1, 1, backend)?.days_since(week_start));

        let mut out = Vec::new();
        for &week in weeks {
            let week = if week > 0 {
                i16::from(week)
            } else {
                total + i16::from(week) + 1
            };
            if !(1..=total).contains(&week) {
                continue;
            }
            let first = (7 * (week - 1) - offset + 1).max(1);
            let last = (7 * week - offset).min(year_length);
            for year_day in first..=last {
                if let Some((month, day)) = arith::year_day_to_month_day(year, year_day, backend)? {
                    out.push((year, month, day));
                }
            }
        }
        Ok(out)
    }

    /// The days of the 7-day window starting at `index` that match a plain BYDAY entry, or
    /// the window's first day.
    fn weekly(&self, index: i64) -> ServiceResult<Vec<Ymd>> {
        let mut out = Vec::new();
        match self.rule.by_weekday {
            Some(ref weekdays) => {
                for offset in 0..7 {
                    let day_index = index + offset;
                    if weekdays.contains(&Weekday::from_day_index(day_index)) {
                        out.push(self.backend.from_day_index(day_index)?);
                    }
                }
            }
            None => out.push(self.backend.from_day_index(index)?),
        }
        Ok(out)
    }

    /// Whether a single day passes BYMONTH, BYMONTHDAY and plain BYDAY.
    fn matches_day(&self, ymd: Ymd, index: i64) -> ServiceResult<bool> {
        let rule = self.rule;
        let (year, month, day) = ymd;

        if !self.month_allowed(month) {
            return Ok(false);
        }

        if self.has_month_days() {
            let length = i16::from(self.backend.month_length(year, month)?);
            let positive = rule.by_month_day.iter().flatten().any(|&d| d == day);
            let negative = rule
                .by_month_day_negative
                .iter()
                .flatten()
                .any(|&d| length + i16::from(d) + 1 == i16::from(day));
            if !positive && !negative {
                return Ok(false);
            }
        }

        Ok(rule
            .by_weekday
            .as_ref()
            .is_none_or(|weekdays| weekdays.contains(&Weekday::from_day_index(index))))
    }
}

/// Picks 1-based positions (negative from the end) out of sorted candidates.
fn select_positions(candidates: &[Ymd], positions: &[i16]) -> Vec<Ymd> {
    let mut out: Vec<_> = positions
        .iter()
        .filter_map(|&position| {
            let index = if position > 0 {
                usize::try_from(position - 1).ok()
            } else {
                candidates
                    .len()
                    .checked_sub(usize::from(position.unsigned_abs()))
            };
            index.and_then(|i| candidates.get(i)).copied()
        })
        .collect();
    out.sort_unstable();
    out.dedup();
    out
}

impl<B: CalendarBackend + ?Sized> Iterator for Occurrences<'_, B> {
    type Item = ServiceResult<LunarDate>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(date) = self.buffer.pop_front() {
            return Some(Ok(date));
        }
        if self.finished {
            return None;
        }
        if let Err(err) = self.generate() {
            self.finished = true;
            self.buffer.clear();
            return Some(Err(err));
        }
        self.buffer.pop_front().map(Ok)
    }
}

impl<B: CalendarBackend + ?Sized> FusedIterator for Occurrences<'_, B> {}
