//! Hilal integration test support.
//!
//! Shared, table-driven recurrence cases evaluated in the tabular calendar, plus helpers for
//! building dates and a stand-in host for the observational calendar.

use std::num::NonZeroUsize;
use std::sync::Arc;

use chrono::NaiveDate;
use hilal_calendar::day_index::date_to_jdn;
use hilal_calendar::host::LunarService;
use hilal_calendar::{CalendarBackend, LunarDate, ObservationalCalendar, TabularCalendar};
use hilal_service::recurrence::Recurrence;

pub struct RuleCase {
    pub name: &'static str,
    pub rule: &'static str,
    pub expected: Option<&'static [&'static str]>,
    pub expected_len: Option<usize>,
    pub limit: Option<usize>,
    pub after: Option<&'static str>,
    pub before: Option<&'static str>,
    pub inclusive: bool,
}

impl RuleCase {
    const fn new(name: &'static str, rule: &'static str) -> Self {
        Self {
            name,
            rule,
            expected: None,
            expected_len: None,
            limit: None,
            after: None,
            before: None,
            inclusive: false,
        }
    }

    const fn expect(mut self, expected: &'static [&'static str]) -> Self {
        self.expected = Some(expected);
        self
    }
}

/// ## Summary
/// A date in the tabular calendar.
///
/// ## Panics
/// Panics if the date does not exist.
#[must_use]
pub fn tabular(year: i32, month: u8, day: u8) -> LunarDate {
    LunarDate::new(year, month, day, &TabularCalendar)
        .unwrap_or_else(|err| panic!("{year}-{month}-{day} is not a tabular date: {err}"))
}

/// Host whose months begin one day after the tabular ones.
pub struct LateSighting;

impl LunarService for LateSighting {
    fn name(&self) -> &str {
        "late-sighting"
    }

    fn to_lunar(&self, date: NaiveDate) -> Option<(i32, u8, u8)> {
        TabularCalendar.from_day_index(date_to_jdn(date) - 1).ok()
    }
}

/// An observational calendar over [`LateSighting`].
#[must_use]
pub fn late_sighting_calendar() -> ObservationalCalendar {
    ObservationalCalendar::new(Arc::new(LateSighting), NonZeroUsize::MIN.saturating_add(63))
}

#[expect(clippy::too_many_lines)]
#[must_use]
pub fn rule_cases() -> Vec<RuleCase> {
    vec![
        RuleCase::new(
            "yearly_first_of_ramadan",
            "DTSTART:14460901\nRRULE:FREQ=YEARLY;COUNT=5;BYMONTH=9;BYMONTHDAY=1;RSCALE=ISLAMIC-CIVIL",
        )
        .expect(&[
            "1446-09-01",
            "1447-09-01",
            "1448-09-01",
            "1449-09-01",
            "1450-09-01",
        ]),
        RuleCase::new(
            "monthly_30th_omit",
            "DTSTART:14460130\nRRULE:FREQ=MONTHLY;COUNT=3;BYMONTHDAY=30;SKIP=OMIT;RSCALE=ISLAMIC-CIVIL",
        )
        .expect(&["1446-01-30", "1446-03-30", "1446-05-30"]),
        RuleCase::new(
            "monthly_30th_backward",
            "DTSTART:14460130\nRRULE:FREQ=MONTHLY;COUNT=3;BYMONTHDAY=30;SKIP=BACKWARD;RSCALE=ISLAMIC-CIVIL",
        )
        .expect(&["1446-01-30", "1446-02-29", "1446-03-30"]),
        RuleCase::new(
            "monthly_30th_forward",
            "DTSTART:14460130\nRRULE:FREQ=MONTHLY;COUNT=3;BYMONTHDAY=30;SKIP=FORWARD;RSCALE=ISLAMIC-CIVIL",
        )
        .expect(&["1446-01-30", "1446-03-01", "1446-03-30"]),
        RuleCase {
            after: Some("1446-03-01"),
            before: Some("1446-06-01"),
            ..RuleCase::new(
                "monthly_between_exclusive",
                "DTSTART:14460101\nRRULE:FREQ=MONTHLY;BYMONTHDAY=1;RSCALE=ISLAMIC-CIVIL",
            )
            .expect(&["1446-04-01", "1446-05-01"])
        },
        RuleCase {
            after: Some("1446-03-01"),
            before: Some("1446-06-01"),
            inclusive: true,
            ..RuleCase::new(
                "monthly_between_inclusive",
                "DTSTART:14460101\nRRULE:FREQ=MONTHLY;BYMONTHDAY=1;RSCALE=ISLAMIC-CIVIL",
            )
            .expect(&["1446-03-01", "1446-04-01", "1446-05-01", "1446-06-01"])
        },
        RuleCase {
            after: Some("1446-05-15"),
            ..RuleCase::new(
                "monthly_first_after",
                "DTSTART:14460101\nRRULE:FREQ=MONTHLY;RSCALE=ISLAMIC-CIVIL",
            )
            .expect(&["1446-06-01"])
        },
        RuleCase {
            before: Some("1446-05-15"),
            ..RuleCase::new(
                "monthly_last_before",
                "DTSTART:14460101\nRRULE:FREQ=MONTHLY;RSCALE=ISLAMIC-CIVIL",
            )
            .expect(&["1446-05-01"])
        },
        RuleCase::new(
            "weekly_fridays_of_ramadan",
            "DTSTART:14460901T121500\nRRULE:FREQ=WEEKLY;UNTIL=14460930;BYDAY=FR;RSCALE=ISLAMIC-CIVIL",
        )
        .expect(&[
            "1446-09-07T12:15:00",
            "1446-09-14T12:15:00",
            "1446-09-21T12:15:00",
            "1446-09-28T12:15:00",
        ]),
        RuleCase::new(
            "weekly_every_other",
            "DTSTART:14460901\nRRULE:FREQ=WEEKLY;INTERVAL=2;COUNT=3;RSCALE=ISLAMIC-CIVIL",
        )
        .expect(&["1446-09-01", "1446-09-15", "1446-09-29"]),
        RuleCase::new(
            "yearly_last_friday_of_ramadan",
            "DTSTART:14460901\nRRULE:FREQ=YEARLY;COUNT=2;BYMONTH=9;BYDAY=-1FR;RSCALE=ISLAMIC-CIVIL",
        )
        .expect(&["1446-09-28", "1447-09-24"]),
        RuleCase::new(
            "monthly_first_friday_by_position",
            "DTSTART:14460901\nRRULE:FREQ=MONTHLY;COUNT=3;BYDAY=FR;BYSETPOS=1;RSCALE=ISLAMIC-CIVIL",
        )
        .expect(&["1446-09-07", "1446-10-05", "1446-11-04"]),
        RuleCase::new(
            "yearly_month_days_before_weekdays",
            "DTSTART:14460901\nRRULE:FREQ=YEARLY;COUNT=3;BYMONTH=9;BYMONTHDAY=1,2;BYDAY=FR;RSCALE=ISLAMIC-CIVIL",
        )
        .expect(&["1446-09-01", "1446-09-02", "1447-09-01"]),
        RuleCase::new(
            "yearly_ordinal_before_plain_weekday",
            "DTSTART:14460901\nRRULE:FREQ=YEARLY;COUNT=2;BYMONTH=9;BYDAY=1FR,MO;RSCALE=ISLAMIC-CIVIL",
        )
        .expect(&["1446-09-07", "1447-09-03"]),
        RuleCase::new(
            "yearly_weekday_filter_without_bymonth",
            "DTSTART:14460901\nRRULE:FREQ=YEARLY;COUNT=2;BYMONTHDAY=1,2;BYDAY=FR;RSCALE=ISLAMIC-CIVIL",
        )
        .expect(&["1449-09-01", "1452-09-02"]),
        RuleCase::new(
            "monthly_month_days_before_weekdays",
            "DTSTART:14460901\nRRULE:FREQ=MONTHLY;COUNT=3;BYMONTHDAY=1,2;BYDAY=FR;RSCALE=ISLAMIC-CIVIL",
        )
        .expect(&["1446-09-01", "1446-09-02", "1446-10-01"]),
        RuleCase::new(
            "monthly_limited_by_bymonth",
            "DTSTART:14460101\nRRULE:FREQ=MONTHLY;COUNT=3;BYMONTH=3,9;RSCALE=ISLAMIC-CIVIL",
        )
        .expect(&["1446-03-01", "1446-09-01", "1447-03-01"]),
        RuleCase::new(
            "yearly_first_and_last_day",
            "DTSTART:14460101\nRRULE:FREQ=YEARLY;COUNT=3;BYYEARDAY=1,-1;RSCALE=ISLAMIC-CIVIL",
        )
        .expect(&["1446-01-01", "1446-12-29", "1447-01-01"]),
        RuleCase::new(
            "gregorian_start",
            "DTSTART;X-CALSCALE=GREGORIAN:20250301\nRRULE:FREQ=MONTHLY;COUNT=2;RSCALE=ISLAMIC-CIVIL",
        )
        .expect(&["1446-09-01", "1446-10-01"]),
        RuleCase::new(
            "monthly_until",
            "DTSTART:14460101\nRRULE:FREQ=MONTHLY;UNTIL=14460401;RSCALE=ISLAMIC-CIVIL",
        )
        .expect(&["1446-01-01", "1446-02-01", "1446-03-01", "1446-04-01"]),
        RuleCase {
            limit: Some(4),
            ..RuleCase::new(
                "daily_interval_limited",
                "DTSTART:14460101\nRRULE:FREQ=DAILY;INTERVAL=10;RSCALE=ISLAMIC-CIVIL",
            )
            .expect(&["1446-01-01", "1446-01-11", "1446-01-21", "1446-02-01"])
        },
        RuleCase {
            expected_len: Some(0),
            ..RuleCase::new(
                "never_existing_day",
                "DTSTART:14460101\nRRULE:FREQ=YEARLY;BYMONTH=2;BYMONTHDAY=30;RSCALE=ISLAMIC-CIVIL",
            )
        },
        RuleCase {
            expected_len: Some(0),
            ..RuleCase::new(
                "until_before_start",
                "DTSTART:14460901\nRRULE:FREQ=DAILY;UNTIL=14460801;RSCALE=ISLAMIC-CIVIL",
            )
        },
    ]
}

fn bound(text: Option<&str>, case: &RuleCase) -> Option<LunarDate> {
    text.map(|s| {
        LunarDate::parse(s, &TabularCalendar)
            .unwrap_or_else(|err| panic!("Case {}: bad bound {s}: {err}", case.name))
    })
}

/// ## Summary
/// Evaluates a case and compares the result with its expectations.
///
/// With both bounds the case is a range query; with one bound it asks for the first date
/// after (or the last date before) it.
///
/// ## Panics
/// Panics when the rule fails to parse or the result does not match.
pub fn assert_case(case: &RuleCase) {
    let recurrence = Recurrence::parse(case.rule)
        .unwrap_or_else(|err| panic!("Failed to parse {}: {}", case.name, err));

    let after = bound(case.after, case);
    let before = bound(case.before, case);
    let result = match (after, before) {
        (Some(after), Some(before)) => recurrence.between(&after, &before, case.inclusive),
        (Some(after), None) => recurrence
            .after(&after, case.inclusive)
            .map(|d| d.into_iter().collect()),
        (None, Some(before)) => recurrence
            .before(&before, case.inclusive)
            .map(|d| d.into_iter().collect()),
        (None, None) => recurrence.all(case.limit),
    };
    let dates = result.unwrap_or_else(|err| panic!("Case {} failed: {}", case.name, err));

    if let Some(expected) = case.expected {
        let actual: Vec<String> = dates
            .iter()
            .map(|d| {
                if d.has_time() {
                    d.to_datetime_string()
                } else {
                    d.to_string()
                }
            })
            .collect();
        assert_eq!(actual, expected, "Case {} did not match", case.name);
    }

    if let Some(expected_len) = case.expected_len {
        assert_eq!(
            dates.len(),
            expected_len,
            "Case {} expected {} occurrences",
            case.name,
            expected_len
        );
    }
}
