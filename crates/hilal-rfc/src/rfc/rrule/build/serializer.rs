//! Rule serializer.
//!
//! Writes the same grammar the parser reads, with rule parts in a fixed order.

use std::fmt::Display;

use hilal_core::{SkipPolicy, Weekday};

use crate::error::{RfcError, RfcResult};
use crate::rfc::rrule::core::{DateInput, LunarFields, NormalizedRule, OneOrMany, RuleOptions};

/// Serializes sparse options to rule text.
///
/// A DTSTART line is written when a start date is present; the RRULE line always follows.
///
/// ## Errors
/// Returns `ValidationError` if UNTIL is a Gregorian date, since UNTIL is always read as lunar.
pub fn serialize(options: &RuleOptions) -> RfcResult<String> {
    if matches!(
        options.until,
        Some(DateInput::Gregorian(_) | DateInput::GregorianDate(_))
    ) {
        return Err(RfcError::ValidationError(
            "UNTIL must be a lunar date".to_string(),
        ));
    }
    Ok(write_options(options))
}

/// Serializes a normalized rule. Default WKST, SKIP and INTERVAL values are left out.
#[must_use]
pub fn serialize_normalized(rule: &NormalizedRule) -> String {
    let mut options = RuleOptions::from(rule);
    if rule.interval == 1 {
        options.interval = None;
    }
    if rule.week_start == Weekday::Sunday {
        options.wkst = None;
    }
    if rule.skip == SkipPolicy::Omit {
        options.skip = None;
    }
    write_options(&options)
}

fn write_options(options: &RuleOptions) -> String {
    let rrule = format!("RRULE:{}", rrule_value(options));
    let Some(start) = options.dtstart else {
        return rrule;
    };

    let mut line = "DTSTART".to_string();
    if let Some(ref tzid) = options.tzid {
        line.push_str(";TZID=");
        line.push_str(tzid);
    }
    if !matches!(start, DateInput::Lunar(_)) {
        line.push_str(";X-CALSCALE=GREGORIAN");
    }
    line.push(':');
    line.push_str(&format_date(&start));
    format!("{line}\n{rrule}")
}

/// Formats the RECUR value (the text after `RRULE:`).
#[must_use]
pub fn rrule_value(options: &RuleOptions) -> String {
    let mut parts = Vec::new();

    if let Some(freq) = options.freq {
        parts.push(format!("FREQ={freq}"));
    }

    if let Some(interval) = options.interval {
        parts.push(format!("INTERVAL={interval}"));
    }

    if let Some(ref until) = options.until {
        parts.push(format!("UNTIL={}", format_date(until)));
    }

    if let Some(count) = options.count {
        parts.push(format!("COUNT={count}"));
    }

    if let Some(wkst) = options.wkst {
        parts.push(format!("WKST={wkst}"));
    }

    push_list(&mut parts, "BYSECOND", options.bysecond.as_ref());
    push_list(&mut parts, "BYMINUTE", options.byminute.as_ref());
    push_list(&mut parts, "BYHOUR", options.byhour.as_ref());
    push_list(&mut parts, "BYDAY", options.byday.as_ref());
    push_list(&mut parts, "BYMONTHDAY", options.bymonthday.as_ref());
    push_list(&mut parts, "BYYEARDAY", options.byyearday.as_ref());
    push_list(&mut parts, "BYWEEKNO", options.byweekno.as_ref());
    push_list(&mut parts, "BYMONTH", options.bymonth.as_ref());
    push_list(&mut parts, "BYSETPOS", options.bysetpos.as_ref());

    if let Some(calendar) = options.calendar {
        parts.push(format!("RSCALE={}", calendar.rscale()));
    }

    if let Some(skip) = options.skip {
        parts.push(format!("SKIP={skip}"));
    }

    parts.join(";")
}

fn push_list<T: Display + Clone>(parts: &mut Vec<String>, name: &str, values: Option<&OneOrMany<T>>) {
    let Some(values) = values.filter(|v| !v.is_empty()) else {
        return;
    };
    let s: Vec<_> = values.to_vec().iter().map(ToString::to_string).collect();
    parts.push(format!("{name}={}", s.join(",")));
}

fn format_lunar(fields: &LunarFields) -> String {
    let date = format!("{:04}{:02}{:02}", fields.year, fields.month, fields.day);
    if fields.has_time() {
        format!(
            "{date}T{:02}{:02}{:02}",
            fields.hour, fields.minute, fields.second
        )
    } else {
        date
    }
}

fn format_date(date: &DateInput) -> String {
    match date {
        DateInput::Lunar(fields) => format_lunar(fields),
        DateInput::Gregorian(datetime) => datetime.format("%Y%m%dT%H%M%S").to_string(),
        DateInput::GregorianDate(date) => date.format("%Y%m%d").to_string(),
    }
}
