//! Composition of several rules and explicit dates into one sequence.

use std::collections::{BTreeMap, HashSet};

use hilal_calendar::LunarDate;

use super::query::Recurrence;
use crate::error::ServiceResult;

/// Inclusion rules and dates (RRULE, RDATE) minus exclusion rules and dates (EXRULE, EXDATE).
///
/// Dates are merged on their `YYYY-MM-DD` key, so two occurrences on the same day with
/// different times count once.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rrules: Vec<Recurrence>,
    exrules: Vec<Recurrence>,
    rdates: Vec<LunarDate>,
    exdates: Vec<LunarDate>,
}

impl RuleSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn rrule(mut self, rule: Recurrence) -> Self {
        self.rrules.push(rule);
        self
    }

    #[must_use]
    pub fn exrule(mut self, rule: Recurrence) -> Self {
        self.exrules.push(rule);
        self
    }

    #[must_use]
    pub fn rdate(mut self, date: LunarDate) -> Self {
        self.rdates.push(date);
        self
    }

    #[must_use]
    pub fn exdate(mut self, date: LunarDate) -> Self {
        self.exdates.push(date);
        self
    }

    #[must_use]
    pub fn rrules(&self) -> &[Recurrence] {
        &self.rrules
    }

    #[must_use]
    pub fn exrules(&self) -> &[Recurrence] {
        &self.exrules
    }

    #[must_use]
    pub fn rdates(&self) -> &[LunarDate] {
        &self.rdates
    }

    #[must_use]
    pub fn exdates(&self) -> &[LunarDate] {
        &self.exdates
    }

    /// ## Summary
    /// Every date of the set in ascending order.
    ///
    /// With a `limit`, the rules are walked together and excluded dates are skipped until
    /// `limit` dates remain, so the result is always a prefix of the full set. Without one,
    /// unbounded rules stop at their own instance cap.
    ///
    /// ## Errors
    /// Propagates generation failures from any rule.
    pub fn all(&self, limit: Option<usize>) -> ServiceResult<Vec<LunarDate>> {
        let Some(limit) = limit else {
            let mut included = Vec::new();
            for rule in &self.rrules {
                included.extend(rule.all(None)?);
            }
            included.extend(self.rdates.iter().copied());
            return self.merge(included);
        };

        let mut rdates = self.rdates.clone();
        rdates.sort_unstable();
        let mut included = Vec::with_capacity(self.rrules.len() + 1);
        for rule in &self.rrules {
            included.push(Cursor::new(Box::new(rule.iter()))?);
        }
        included.push(Cursor::new(Box::new(rdates.into_iter().map(Ok)))?);
        let mut excluded = Vec::with_capacity(self.exrules.len());
        for rule in &self.exrules {
            excluded.push(Cursor::new(Box::new(rule.iter()))?);
        }
        let exdates = self.exdate_keys();

        let mut dates = Vec::new();
        while dates.len() < limit {
            let Some(next) = included.iter().filter_map(|cursor| cursor.head).min() else {
                break;
            };
            for cursor in &mut included {
                while cursor.head.is_some_and(|head| head == next) {
                    cursor.advance()?;
                }
            }
            if exdates.contains(&next.key()) {
                continue;
            }
            let mut hit = false;
            for cursor in &mut excluded {
                if cursor.reaches(&next)? {
                    hit = true;
                    break;
                }
            }
            if !hit {
                dates.push(next);
            }
        }

        tracing::trace!(count = dates.len(), limit, "Walked rule set");
        Ok(dates)
    }

    /// ## Summary
    /// Dates of the set between `after` and `before`, both ends included when `inclusive`.
    ///
    /// ## Errors
    /// Propagates generation failures from any rule.
    pub fn between(
        &self,
        after: &LunarDate,
        before: &LunarDate,
        inclusive: bool,
    ) -> ServiceResult<Vec<LunarDate>> {
        let mut included = Vec::new();
        for rule in &self.rrules {
            included.extend(rule.between(after, before, inclusive)?);
        }
        included.extend(self.rdates.iter().copied().filter(|date| {
            if inclusive {
                date >= after && date <= before
            } else {
                date > after && date < before
            }
        }));
        self.merge(included)
    }

    /// ## Summary
    /// First date of the set after `date` (or on it when `inclusive`).
    ///
    /// ## Errors
    /// Propagates generation failures from any rule.
    pub fn after(&self, date: &LunarDate, inclusive: bool) -> ServiceResult<Option<LunarDate>> {
        let mut best: Option<LunarDate> = None;
        for rdate in &self.rdates {
            let reached = if inclusive { rdate >= date } else { rdate > date };
            if reached && best.is_none_or(|b| *rdate < b) && !self.is_excluded(rdate)? {
                best = Some(*rdate);
            }
        }

        for rule in &self.rrules {
            for candidate in rule {
                let candidate = candidate?;
                if best.is_some_and(|b| candidate >= b) {
                    break;
                }
                let reached = if inclusive {
                    candidate >= *date
                } else {
                    candidate > *date
                };
                if reached && !self.is_excluded(&candidate)? {
                    best = Some(candidate);
                    break;
                }
            }
        }

        Ok(best)
    }

    /// ## Summary
    /// Last date of the set before `date` (or on it when `inclusive`).
    ///
    /// ## Errors
    /// Propagates generation failures from any rule.
    pub fn before(&self, date: &LunarDate, inclusive: bool) -> ServiceResult<Option<LunarDate>> {
        let mut best = None;
        let mut consider = |candidate: LunarDate| {
            if best.is_none_or(|b| candidate > b) {
                best = Some(candidate);
            }
        };

        for rdate in &self.rdates {
            let reached = if inclusive { rdate <= date } else { rdate < date };
            if reached && !self.is_excluded(rdate)? {
                consider(*rdate);
            }
        }
        for rule in &self.rrules {
            for candidate in rule {
                let candidate = candidate?;
                let past = if inclusive {
                    candidate > *date
                } else {
                    candidate >= *date
                };
                if past {
                    break;
                }
                if !self.is_excluded(&candidate)? {
                    consider(candidate);
                }
            }
        }
        Ok(best)
    }

    /// ## Summary
    /// Whether an EXDATE or an EXRULE removes `date` from the set.
    ///
    /// ## Errors
    /// Propagates generation failures from the exclusion rules.
    pub fn is_excluded(&self, date: &LunarDate) -> ServiceResult<bool> {
        if self.exdates.iter().any(|ex| ex == date) {
            return Ok(true);
        }
        for rule in &self.exrules {
            if rule.after(date, true)?.is_some_and(|d| d == *date) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn exdate_keys(&self) -> HashSet<String> {
        self.exdates.iter().map(LunarDate::key).collect()
    }

    /// Dedupes by key, drops excluded dates and sorts.
    fn merge(&self, included: Vec<LunarDate>) -> ServiceResult<Vec<LunarDate>> {
        let mut merged: BTreeMap<String, LunarDate> = BTreeMap::new();
        for date in included {
            merged.entry(date.key()).or_insert(date);
        }
        for key in self.exdate_keys() {
            merged.remove(&key);
        }

        let mut dates: Vec<_> = merged.into_values().collect();
        dates.sort_unstable();

        if let (Some(first), Some(last)) = (dates.first().copied(), dates.last().copied()) {
            let mut excluded = HashSet::new();
            for rule in &self.exrules {
                excluded.extend(rule.between(&first, &last, true)?.iter().map(LunarDate::key));
            }
            if !excluded.is_empty() {
                dates.retain(|date| !excluded.contains(&date.key()));
            }
        }

        tracing::trace!(
            count = dates.len(),
            rules = self.rrules.len(),
            "Merged rule set"
        );
        Ok(dates)
    }
}

type DateSource<'a> = Box<dyn Iterator<Item = ServiceResult<LunarDate>> + 'a>;

/// An ascending date source with its next date pulled ahead.
struct Cursor<'a> {
    source: DateSource<'a>,
    head: Option<LunarDate>,
}

impl<'a> Cursor<'a> {
    fn new(mut source: DateSource<'a>) -> ServiceResult<Self> {
        let head = source.next().transpose()?;
        Ok(Self { source, head })
    }

    fn advance(&mut self) -> ServiceResult<()> {
        self.head = self.source.next().transpose()?;
        Ok(())
    }

    /// Skips dates before `date` and reports whether the source produces `date` itself.
    fn reaches(&mut self, date: &LunarDate) -> ServiceResult<bool> {
        while self.head.is_some_and(|head| head < *date) {
            self.advance()?;
        }
        Ok(self.head.is_some_and(|head| head == *date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hilal_calendar::{Calendar, TabularCalendar};
    use hilal_core::CalendarVariant;
    use hilal_rfc::rfc::rrule::{Frequency, NormalizedRule};

    const CAL: TabularCalendar = TabularCalendar::new();

    fn date(y: i32, m: u8, d: u8) -> LunarDate {
        LunarDate::new(y, m, d, &CAL).unwrap()
    }

    fn rule(freq: Frequency, start: LunarDate, count: Option<u32>) -> Recurrence {
        let mut rule = NormalizedRule::new(freq, start, CalendarVariant::Tabular);
        rule.count = count;
        Recurrence::with_calendar(rule, Calendar::tabular())
    }

    fn ymds(dates: &[LunarDate]) -> Vec<(i32, u8, u8)> {
        dates.iter().map(LunarDate::ymd).collect()
    }

    fn monthly_set() -> RuleSet {
        RuleSet::new()
            .rrule(rule(Frequency::Monthly, date(1446, 1, 1), Some(4)))
            .rdate(date(1446, 1, 15))
            .rdate(date(1446, 3, 1))
            .exdate(date(1446, 2, 1))
    }

    #[test]
    fn all_merges_and_excludes() {
        assert_eq!(
            ymds(&monthly_set().all(None).unwrap()),
            vec![(1446, 1, 1), (1446, 1, 15), (1446, 3, 1), (1446, 4, 1)]
        );
    }

    #[test]
    fn same_day_with_different_time_counts_once() {
        let set = monthly_set().rdate(date(1446, 4, 1).with_time(12, 0, 0).unwrap());
        assert_eq!(set.all(None).unwrap().len(), 4);
    }

    #[test]
    fn exrule_removes_its_dates() {
        let set = RuleSet::new()
            .rrule(rule(Frequency::Daily, date(1446, 9, 1), Some(10)))
            .exrule(rule(Frequency::Weekly, date(1446, 9, 3), None));
        assert_eq!(
            ymds(&set.all(None).unwrap()),
            vec![
                (1446, 9, 1),
                (1446, 9, 2),
                (1446, 9, 4),
                (1446, 9, 5),
                (1446, 9, 6),
                (1446, 9, 7),
                (1446, 9, 8),
                (1446, 9, 9)
            ]
        );
        assert!(set.is_excluded(&date(1446, 9, 10)).unwrap());
        assert!(!set.is_excluded(&date(1446, 9, 11)).unwrap());
    }

    #[test]
    fn between_includes_rdates_in_range() {
        let set = monthly_set();
        assert_eq!(
            ymds(&set.between(&date(1446, 1, 1), &date(1446, 3, 1), false).unwrap()),
            vec![(1446, 1, 15)]
        );
        assert_eq!(
            ymds(&set.between(&date(1446, 1, 1), &date(1446, 3, 1), true).unwrap()),
            vec![(1446, 1, 1), (1446, 1, 15), (1446, 3, 1)]
        );
    }

    #[test]
    fn after_skips_exdates() {
        let set = monthly_set();
        assert_eq!(set.after(&date(1446, 1, 15), false).unwrap(), Some(date(1446, 3, 1)));
        assert_eq!(set.after(&date(1446, 1, 2), true).unwrap(), Some(date(1446, 1, 15)));
        assert_eq!(set.after(&date(1446, 4, 1), false).unwrap(), None);
    }

    #[test]
    fn before_skips_exdates() {
        let set = monthly_set();
        assert_eq!(set.before(&date(1446, 3, 1), false).unwrap(), Some(date(1446, 1, 15)));
        assert_eq!(set.before(&date(1446, 3, 1), true).unwrap(), Some(date(1446, 3, 1)));
        assert_eq!(set.before(&date(1446, 1, 1), false).unwrap(), None);
    }

    #[test_log::test]
    fn limit_counts_dates_left_after_exclusions() {
        let set = RuleSet::new()
            .rrule(rule(Frequency::Daily, date(1446, 1, 1), None))
            .exdate(date(1446, 1, 2));
        assert_eq!(
            ymds(&set.all(Some(3)).unwrap()),
            vec![(1446, 1, 1), (1446, 1, 3), (1446, 1, 4)]
        );

        let set = set.exrule(rule(Frequency::Weekly, date(1446, 1, 3), None));
        assert_eq!(
            ymds(&set.all(Some(3)).unwrap()),
            vec![(1446, 1, 1), (1446, 1, 4), (1446, 1, 5)]
        );
    }

    #[test]
    fn limited_results_are_prefixes() {
        let mut odd =
            NormalizedRule::new(Frequency::Daily, date(1446, 1, 1), CalendarVariant::Tabular);
        odd.interval = 2;
        let mut even = odd.clone();
        even.start = date(1446, 1, 2);
        let set = RuleSet::new()
            .rrule(Recurrence::with_calendar(odd, Calendar::tabular()))
            .rrule(Recurrence::with_calendar(even, Calendar::tabular()))
            .rdate(date(1446, 1, 3))
            .exdate(date(1446, 1, 4));

        let long = set.all(Some(6)).unwrap();
        assert_eq!(
            ymds(&long),
            vec![
                (1446, 1, 1),
                (1446, 1, 2),
                (1446, 1, 3),
                (1446, 1, 5),
                (1446, 1, 6),
                (1446, 1, 7)
            ]
        );
        for n in 0..6 {
            assert_eq!(set.all(Some(n)).unwrap(), long[..n]);
        }
    }

    #[test]
    fn empty_set_is_empty() {
        let set = RuleSet::new();
        assert!(set.all(None).unwrap().is_empty());
        assert_eq!(set.after(&date(1446, 1, 1), true).unwrap(), None);
    }
}
