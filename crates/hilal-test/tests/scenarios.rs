//! Table-driven recurrence scenarios in the tabular calendar.

use hilal_calendar::TabularCalendar;
use hilal_calendar::arith::{day_of_year, days_before_month};
use hilal_test::{assert_case, rule_cases};

#[test_log::test]
fn rule_cases_tabular() {
    for case in rule_cases() {
        tracing::debug!(case = case.name, "Evaluating");
        assert_case(&case);
    }
}

#[test]
fn ramadan_position_in_year() {
    assert_eq!(days_before_month(1446, 9, &TabularCalendar).unwrap(), 236);
    assert_eq!(day_of_year(1446, 9, 1, &TabularCalendar).unwrap(), 237);
}

#[test]
fn case_names_are_unique() {
    let cases = rule_cases();
    let mut names: Vec<_> = cases.iter().map(|c| c.name).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), cases.len());
}
