use hilal_core::{SkipPolicy, Weekday};

use super::join_list;
use crate::rfc::rrule::core::{Frequency, NormalizedRule, WeekdayNum};

const MONTHS: [&str; 12] = [
    "Muharram",
    "Safar",
    "Rabi al-Awwal",
    "Rabi al-Thani",
    "Jumada al-Ula",
    "Jumada al-Akhirah",
    "Rajab",
    "Shaban",
    "Ramadan",
    "Shawwal",
    "Dhu al-Qadah",
    "Dhu al-Hijjah",
];

const fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Sunday => "Sunday",
        Weekday::Monday => "Monday",
        Weekday::Tuesday => "Tuesday",
        Weekday::Wednesday => "Wednesday",
        Weekday::Thursday => "Thursday",
        Weekday::Friday => "Friday",
        Weekday::Saturday => "Saturday",
    }
}

const fn unit(freq: Frequency) -> (&'static str, &'static str) {
    match freq {
        Frequency::Yearly => ("year", "years"),
        Frequency::Monthly => ("month", "months"),
        Frequency::Weekly => ("week", "weeks"),
        Frequency::Daily => ("day", "days"),
        Frequency::Hourly => ("hour", "hours"),
        Frequency::Minutely => ("minute", "minutes"),
        Frequency::Secondly => ("second", "seconds"),
    }
}

/// `1st`, `2nd`, `11th`, `22nd`.
fn suffixed(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

fn ordinal_word(n: u32) -> String {
    match n {
        1 => "first".to_string(),
        2 => "second".to_string(),
        3 => "third".to_string(),
        4 => "fourth".to_string(),
        5 => "fifth".to_string(),
        _ => suffixed(n),
    }
}

/// `last` for -1, `second to last` for -2.
fn from_end(n: u32) -> String {
    if n == 1 {
        "last".to_string()
    } else {
        format!("{} to last", ordinal_word(n))
    }
}

fn month_day(day: i64) -> String {
    let n = u32::try_from(day.unsigned_abs()).unwrap_or(u32::MAX);
    if day > 0 {
        format!("the {}", suffixed(n))
    } else {
        format!("the {} day", from_end(n))
    }
}

fn weekday(value: &WeekdayNum) -> String {
    let name = weekday_name(value.weekday);
    match value.ordinal {
        None => name.to_string(),
        Some(n) if n > 0 => format!("the {} {name}", ordinal_word(u32::from(n.unsigned_abs()))),
        Some(n) => format!("the {} {name}", from_end(u32::from(n.unsigned_abs()))),
    }
}

fn numbers<T: ToString>(values: &[T]) -> String {
    let items: Vec<_> = values.iter().map(ToString::to_string).collect();
    join_list(&items, ", ", " and ")
}

fn labelled<T: ToString>(singular: &str, plural: &str, values: &[T]) -> String {
    let label = if values.len() == 1 { singular } else { plural };
    format!("{label} {}", numbers(values))
}

pub(super) fn render(rule: &NormalizedRule) -> String {
    let (one, many) = unit(rule.freq);
    let mut out = if rule.interval == 1 {
        format!("every {one}")
    } else {
        format!("every {} {many}", rule.interval)
    };

    if let Some(ref months) = rule.by_month {
        let names: Vec<_> = months
            .iter()
            .filter_map(|&m| MONTHS.get(usize::from(m).wrapping_sub(1)))
            .map(ToString::to_string)
            .collect();
        out.push_str(" in ");
        out.push_str(&join_list(&names, ", ", " and "));
    }

    let mut days: Vec<_> = rule.month_days().into_iter().map(month_day).collect();
    days.extend(rule.weekdays().iter().map(weekday));
    if !days.is_empty() {
        out.push_str(" on ");
        out.push_str(&join_list(&days, ", ", " and "));
    }

    if let Some(ref year_days) = rule.by_year_day {
        let items: Vec<_> = year_days
            .iter()
            .map(|&d| {
                let n = u32::from(d.unsigned_abs());
                if d > 0 {
                    format!("the {}", suffixed(n))
                } else {
                    format!("the {}", from_end(n))
                }
            })
            .collect();
        out.push_str(" on ");
        out.push_str(&join_list(&items, ", ", " and "));
        out.push_str(" day of the year");
    }

    if let Some(ref weeks) = rule.by_week_no {
        out.push_str(" in ");
        out.push_str(&labelled("week", "weeks", weeks));
    }
    if let Some(ref hours) = rule.by_hour {
        out.push_str(" at ");
        out.push_str(&labelled("hour", "hours", hours));
    }
    if let Some(ref minutes) = rule.by_minute {
        out.push_str(" at ");
        out.push_str(&labelled("minute", "minutes", minutes));
    }
    if let Some(ref seconds) = rule.by_second {
        out.push_str(" at ");
        out.push_str(&labelled("second", "seconds", seconds));
    }

    if let Some(ref positions) = rule.by_set_pos {
        let items: Vec<_> = positions
            .iter()
            .map(|&p| {
                let n = u32::from(p.unsigned_abs());
                if p > 0 { suffixed(n) } else { from_end(n) }
            })
            .collect();
        out.push_str(&format!(
            ", keeping the {} of each {one}",
            join_list(&items, ", ", " and ")
        ));
    }

    match rule.skip {
        SkipPolicy::Omit => {}
        SkipPolicy::Forward => out.push_str(", moving missing days to the next month"),
        SkipPolicy::Backward => out.push_str(", moving missing days to the end of the month"),
    }

    match (rule.count, rule.until) {
        (Some(1), _) => out.push_str(", once"),
        (Some(count), _) => out.push_str(&format!(", {count} times")),
        (None, Some(until)) => out.push_str(&format!(", until {until}")),
        (None, None) => {}
    }

    out
}
