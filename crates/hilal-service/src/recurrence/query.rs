//! Enumeration API over a single normalized rule.

use std::fmt;

use chrono::NaiveDateTime;
use hilal_calendar::{Calendar, CalendarBackend, LunarDate};
use hilal_core::config::EngineConfig;
use hilal_rfc::error::RfcError;
use hilal_rfc::rfc::rrule::{
    Locale, NormalizedRule, RuleOptions, parse_rule, serialize_normalized, to_text,
};

use super::generator::{DEFAULT_MAX_PERIODS, GeneratorLimits, Occurrences};
use super::normalize::Normalizer;
use crate::error::ServiceResult;

/// Default number of dates returned by [`Recurrence::all`] for a rule with neither COUNT
/// nor UNTIL.
pub const DEFAULT_MAX_INSTANCES: usize = 1000;

/// Safety caps applied when enumerating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpansionOptions {
    pub max_instances: usize,
    pub limits: GeneratorLimits,
}

impl Default for ExpansionOptions {
    fn default() -> Self {
        Self {
            max_instances: DEFAULT_MAX_INSTANCES,
            limits: GeneratorLimits {
                max_periods: DEFAULT_MAX_PERIODS,
            },
        }
    }
}

impl From<&EngineConfig> for ExpansionOptions {
    fn from(config: &EngineConfig) -> Self {
        Self {
            max_instances: config.max_instances,
            limits: GeneratorLimits {
                max_periods: config.max_periods,
            },
        }
    }
}

/// A normalized rule bound to the calendar it is evaluated in.
#[derive(Debug, Clone)]
pub struct Recurrence {
    rule: NormalizedRule,
    calendar: Calendar,
    expansion: ExpansionOptions,
}

impl Recurrence {
    /// Binds `rule` to the shared calendar of its variant.
    #[must_use]
    pub fn new(rule: NormalizedRule) -> Self {
        Self {
            calendar: Calendar::for_variant(rule.calendar),
            rule,
            expansion: ExpansionOptions::default(),
        }
    }

    /// Binds `rule` to an explicit calendar, e.g. one backed by a custom lunar service.
    ///
    /// The rule is evaluated in `calendar` even when its own variant differs.
    #[must_use]
    pub fn with_calendar(rule: NormalizedRule, calendar: Calendar) -> Self {
        if calendar.variant() != rule.calendar {
            tracing::warn!(
                rule = %rule.calendar,
                calendar = %calendar.variant(),
                "Rule calendar differs from the supplied calendar"
            );
        }
        Self {
            rule,
            calendar,
            expansion: ExpansionOptions::default(),
        }
    }

    #[must_use]
    pub const fn with_expansion(mut self, expansion: ExpansionOptions) -> Self {
        self.expansion = expansion;
        self
    }

    /// ## Errors
    /// Returns `InvalidRule` when the options fail validation.
    pub fn from_options(options: &RuleOptions, normalizer: &Normalizer) -> ServiceResult<Self> {
        Ok(Self::new(normalizer.normalize(options)?))
    }

    /// ## Summary
    /// Parses rule text and normalizes it with the process-wide defaults.
    ///
    /// ## Errors
    /// Returns a parse error for malformed text or `InvalidRule` for out-of-range values.
    pub fn parse(text: &str) -> ServiceResult<Self> {
        let options = parse_rule(text).map_err(RfcError::from)?;
        Self::from_options(&options, &Normalizer::new())
    }

    #[must_use]
    pub const fn rule(&self) -> &NormalizedRule {
        &self.rule
    }

    #[must_use]
    pub const fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    /// A fresh lazy sequence starting at the rule's start date.
    #[must_use]
    pub fn iter(&self) -> Occurrences<'_, Calendar> {
        Occurrences::new(&self.rule, &self.calendar, self.expansion.limits)
    }

    /// True when COUNT or UNTIL ends the sequence.
    #[must_use]
    pub const fn is_bounded(&self) -> bool {
        self.rule.count.is_some() || self.rule.until.is_some()
    }

    /// ## Summary
    /// Materializes the sequence.
    ///
    /// `limit` caps the number of dates returned. Without it, a bounded rule yields every
    /// date and an unbounded rule stops at `max_instances`.
    ///
    /// ## Errors
    /// Propagates calendar failures raised during generation.
    pub fn all(&self, limit: Option<usize>) -> ServiceResult<Vec<LunarDate>> {
        let limit = match limit {
            Some(limit) => limit,
            None if self.is_bounded() => usize::MAX,
            None => self.expansion.max_instances,
        };
        self.iter().take(limit).collect()
    }

    /// ## Summary
    /// Collects dates while `keep(date, collected_so_far)` returns true.
    ///
    /// ## Errors
    /// Propagates calendar failures raised during generation.
    pub fn all_until<F>(&self, mut keep: F) -> ServiceResult<Vec<LunarDate>>
    where
        F: FnMut(&LunarDate, usize) -> bool,
    {
        let mut out = Vec::new();
        for date in self.iter() {
            let date = date?;
            if !keep(&date, out.len()) {
                break;
            }
            out.push(date);
        }
        Ok(out)
    }

    /// ## Summary
    /// Dates strictly between `after` and `before`, or including both ends when `inclusive`.
    ///
    /// Scanning stops at the first date past `before`.
    ///
    /// ## Errors
    /// Propagates calendar failures raised during generation.
    pub fn between(
        &self,
        after: &LunarDate,
        before: &LunarDate,
        inclusive: bool,
    ) -> ServiceResult<Vec<LunarDate>> {
        let mut out = Vec::new();
        for date in self.iter() {
            let date = date?;
            if past(&date, before, inclusive) {
                break;
            }
            if reached(&date, after, inclusive) {
                out.push(date);
            }
        }
        tracing::trace!(%after, %before, inclusive, found = out.len(), "Range query");
        Ok(out)
    }

    /// ## Summary
    /// First date after `date` (or on it when `inclusive`).
    ///
    /// ## Errors
    /// Propagates calendar failures raised during generation.
    pub fn after(&self, date: &LunarDate, inclusive: bool) -> ServiceResult<Option<LunarDate>> {
        for candidate in self.iter() {
            let candidate = candidate?;
            if reached(&candidate, date, inclusive) {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }

    /// ## Summary
    /// Last date before `date` (or on it when `inclusive`).
    ///
    /// ## Errors
    /// Propagates calendar failures raised during generation.
    pub fn before(&self, date: &LunarDate, inclusive: bool) -> ServiceResult<Option<LunarDate>> {
        let mut last = None;
        for candidate in self.iter() {
            let candidate = candidate?;
            if past(&candidate, date, inclusive) {
                break;
            }
            last = Some(candidate);
        }
        Ok(last)
    }

    /// ## Summary
    /// [`Recurrence::all`] projected onto the Gregorian calendar.
    ///
    /// ## Errors
    /// Propagates generation and conversion failures.
    pub fn all_gregorian(&self, limit: Option<usize>) -> ServiceResult<Vec<NaiveDateTime>> {
        to_gregorian(&self.all(limit)?, &self.calendar)
    }

    /// Human-readable description of the rule.
    #[must_use]
    pub fn to_text(&self, locale: Locale) -> String {
        to_text(&self.rule, locale)
    }
}

impl<'a> IntoIterator for &'a Recurrence {
    type Item = ServiceResult<LunarDate>;
    type IntoIter = Occurrences<'a, Calendar>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&serialize_normalized(&self.rule))
    }
}

/// `date` has passed the upper bound of a range.
fn past(date: &LunarDate, bound: &LunarDate, inclusive: bool) -> bool {
    if inclusive { date > bound } else { date >= bound }
}

/// `date` has reached the lower bound of a range.
fn reached(date: &LunarDate, bound: &LunarDate, inclusive: bool) -> bool {
    if inclusive { date >= bound } else { date > bound }
}

/// ## Summary
/// Converts lunar dates to Gregorian date-times, keeping each date's time of day.
///
/// ## Errors
/// Returns the first conversion failure.
pub fn to_gregorian<B>(dates: &[LunarDate], backend: &B) -> ServiceResult<Vec<NaiveDateTime>>
where
    B: CalendarBackend + ?Sized,
{
    dates
        .iter()
        .map(|date| Ok(date.to_gregorian(backend)?))
        .collect()
}
