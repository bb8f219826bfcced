//! Calendar and recurrence properties checked over sample ranges.

use chrono::{Duration, NaiveDate};
use hilal_calendar::day_index::{
    day_index_to_gregorian, day_index_to_lunar, gregorian_to_day_index, lunar_to_day_index,
};
use hilal_calendar::{CalendarBackend, LunarDate, TabularCalendar};
use hilal_rfc::rfc::rrule::{RuleOptions, parse_rule, serialize_normalized};
use hilal_service::recurrence::{Normalizer, Recurrence};
use hilal_test::{late_sighting_calendar, rule_cases, tabular};

const CAL: TabularCalendar = TabularCalendar::new();

fn sample_years() -> impl Iterator<Item = i32> {
    (1..=60).chain(1430..=1470)
}

#[test]
fn lunar_day_index_round_trip() {
    for year in sample_years() {
        for month in 1..=12 {
            let length = CAL.month_length(year, month).unwrap();
            for day in 1..=length {
                let index = CAL.to_day_index(year, month, day).unwrap();
                assert_eq!(CAL.from_day_index(index).unwrap(), (year, month, day));
            }
        }
    }
}

#[test]
fn observational_day_index_round_trip() {
    let calendar = late_sighting_calendar();
    for year in 1440..=1450 {
        for month in 1..=12 {
            let length = calendar.month_length(year, month).unwrap();
            for day in 1..=length {
                let index = calendar.to_day_index(year, month, day).unwrap();
                assert_eq!(calendar.from_day_index(index).unwrap(), (year, month, day));
                // one day later than the tabular date
                assert_eq!(index, CAL.to_day_index(year, month, day).unwrap() + 1);
            }
        }
        let date = LunarDate::new(year, 9, 1, &calendar)
            .unwrap()
            .with_time(4, 30, 0)
            .unwrap();
        let back = day_index_to_lunar(lunar_to_day_index(&date, &calendar).unwrap(), &calendar)
            .unwrap();
        assert_eq!((back, back.hour(), back.minute()), (date, 4, 30));
    }
}

#[test]
fn real_day_index_round_trip_keeps_time() {
    let date = tabular(1446, 9, 27).with_time(21, 30, 15).unwrap();
    let index = lunar_to_day_index(&date, &CAL).unwrap();
    let back = day_index_to_lunar(index, &CAL).unwrap();
    assert_eq!(back, date);
    assert_eq!((back.hour(), back.minute(), back.second()), (21, 30, 15));
}

#[test]
fn gregorian_round_trip() {
    let start = NaiveDate::from_ymd_opt(622, 7, 19).unwrap();
    for step in (0..500_000).step_by(997) {
        let date = (start + Duration::days(step)).and_hms_opt(6, 0, 0).unwrap();
        let index = gregorian_to_day_index(date);
        assert_eq!(day_index_to_gregorian(index), Some(date));
    }
}

#[test]
fn leap_cycle() {
    const LEAP_POSITIONS: [i32; 11] = [2, 5, 7, 10, 13, 16, 18, 21, 24, 26, 29];
    for year in sample_years() {
        let position = (year - 1) % 30 + 1;
        assert_eq!(
            CAL.is_leap_year(year),
            LEAP_POSITIONS.contains(&position),
            "year {year}"
        );
    }
    assert!(!CAL.is_leap_year(1446));
}

#[test]
fn month_lengths_sum_to_year_length() {
    for year in sample_years() {
        let sum: u16 = (1..=12)
            .map(|m| u16::from(CAL.month_length(year, m).unwrap()))
            .sum();
        let length = CAL.year_length(year).unwrap();
        assert_eq!(sum, length, "year {year}");
        assert_eq!(length == 355, CAL.is_leap_year(year), "year {year}");
    }
}

#[test]
fn occurrences_strictly_increase() {
    for case in rule_cases() {
        let recurrence = Recurrence::parse(case.rule).unwrap();
        let dates: Vec<LunarDate> = recurrence.iter().take(60).map(Result::unwrap).collect();
        for pair in dates.windows(2) {
            assert!(pair[0] < pair[1], "{}: {} then {}", case.name, pair[0], pair[1]);
        }
    }
}

#[test]
fn normalization_is_a_fixed_point() {
    let normalizer = Normalizer::new();
    for case in rule_cases() {
        let options = parse_rule(case.rule).unwrap();
        let first = normalizer.normalize(&options).unwrap();
        let second = normalizer.normalize(&RuleOptions::from(&first)).unwrap();
        assert_eq!(first, second, "{}", case.name);
    }
}

#[test]
fn serialized_rules_reparse_to_the_same_rule() {
    let normalizer = Normalizer::new();
    for case in rule_cases() {
        let rule = normalizer.normalize(&parse_rule(case.rule).unwrap()).unwrap();
        let text = serialize_normalized(&rule);
        let reparsed = normalizer.normalize(&parse_rule(&text).unwrap()).unwrap();
        assert_eq!(rule, reparsed, "{} via {text}", case.name);
    }
}

#[test]
fn normalized_rules_survive_json() {
    let normalizer = Normalizer::new();
    for case in rule_cases() {
        let rule = normalizer.normalize(&parse_rule(case.rule).unwrap()).unwrap();
        let json = serde_json::to_string(&rule).unwrap();
        let back = serde_json::from_str(&json).unwrap();
        assert_eq!(rule, back, "{}", case.name);
    }
}
