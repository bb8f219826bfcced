//! Recurrence over an observational calendar driven by a stand-in host service.

use chrono::NaiveDate;
use hilal_calendar::{Calendar, CalendarBackend, LunarDate, ObservationalCalendar};
use hilal_core::CalendarVariant;
use hilal_rfc::rfc::rrule::{Frequency, NormalizedRule};
use hilal_service::recurrence::Recurrence;
use hilal_test::late_sighting_calendar as observational;

fn ramadan_rule(calendar: &ObservationalCalendar) -> NormalizedRule {
    let start = LunarDate::new(1446, 9, 1, calendar).unwrap();
    let mut rule = NormalizedRule::new(Frequency::Yearly, start, CalendarVariant::Official);
    rule.by_month = Some(vec![9]);
    rule.by_month_day = Some(vec![1]);
    rule.count = Some(2);
    rule
}

#[test_log::test]
fn first_of_ramadan_follows_the_host() {
    let calendar = observational();
    let recurrence = Recurrence::with_calendar(
        ramadan_rule(&calendar),
        Calendar::Observational(calendar.clone()),
    );

    let lunar: Vec<_> = recurrence
        .all(None)
        .unwrap()
        .iter()
        .map(LunarDate::ymd)
        .collect();
    assert_eq!(lunar, vec![(1446, 9, 1), (1447, 9, 1)]);

    let gregorian: Vec<_> = recurrence
        .all_gregorian(None)
        .unwrap()
        .iter()
        .map(|dt| dt.date())
        .collect();
    assert_eq!(
        gregorian,
        vec![
            NaiveDate::from_ymd_opt(2025, 3, 2).unwrap(),
            NaiveDate::from_ymd_opt(2026, 2, 19).unwrap(),
        ]
    );
}

#[test_log::test]
fn month_lookups_are_cached() {
    let calendar = observational();
    let recurrence = Recurrence::with_calendar(
        ramadan_rule(&calendar),
        Calendar::Observational(calendar.clone()),
    );
    recurrence.all(None).unwrap();
    recurrence.all(None).unwrap();

    let stats = calendar.cache_stats();
    assert!(stats.entries > 0);
    assert!(stats.hits > 0);
}

#[test]
fn conversions_agree_with_the_host() {
    let calendar = observational();
    let date = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
    let lunar = LunarDate::from_gregorian_date(date, &calendar).unwrap();
    assert_eq!(lunar.ymd(), (1446, 9, 1));
    assert_eq!(lunar.to_gregorian(&calendar).unwrap().date(), date);
    assert_eq!(calendar.month_length(1446, 9).unwrap(), 30);
    assert_eq!(calendar.month_length(1446, 10).unwrap(), 29);
}
