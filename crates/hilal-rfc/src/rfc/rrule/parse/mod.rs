//! Rule text parsing.
//!
//! Accepted input is either a bare RRULE value (`FREQ=MONTHLY;BYMONTHDAY=30`) or content
//! lines:
//!
//! ```text
//! DTSTART;TZID=Asia/Riyadh:14460901T180000
//! RRULE:FREQ=YEARLY;BYMONTH=9;COUNT=5;SKIP=BACKWARD;RSCALE=ISLAMIC-CIVIL
//! ```
//!
//! Dates are lunar unless DTSTART carries `X-CALSCALE=GREGORIAN`.

mod error;
mod values;

pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use values::{
    parse_byday, parse_gregorian_datetime, parse_integer, parse_integer_list,
    parse_lunar_datetime,
};

use hilal_core::{CalendarVariant, SkipPolicy, Weekday};

use super::core::{DateInput, Frequency, OneOrMany, RuleOptions};

/// ## Summary
/// Parses rule text into sparse options.
///
/// ## Errors
/// Returns a positioned error for malformed lines, values, or conflicting parts.
pub fn parse_rule(input: &str) -> ParseResult<RuleOptions> {
    let mut options = RuleOptions::default();
    let mut saw_rrule = false;
    let mut saw_dtstart = false;

    for (idx, raw) in input.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let indent = raw.len() - raw.trim_start().len();

        let name_end = line.find([':', ';', '=']).unwrap_or(line.len());
        match line[..name_end].to_ascii_uppercase().as_str() {
            "DTSTART" => {
                if saw_dtstart {
                    return Err(ParseError::new(ParseErrorKind::Duplicate, line_no, indent + 1)
                        .with_context("DTSTART"));
                }
                saw_dtstart = true;
                parse_dtstart(&mut options, line, line_no, indent)?;
            }
            "RRULE" => {
                if saw_rrule {
                    return Err(ParseError::new(ParseErrorKind::Duplicate, line_no, indent + 1)
                        .with_context("RRULE"));
                }
                saw_rrule = true;
                let colon = line.find(':').ok_or_else(|| {
                    ParseError::new(ParseErrorKind::MissingColon, line_no, indent + 1)
                })?;
                parse_rrule_into(
                    &mut options,
                    &line[colon + 1..],
                    line_no,
                    indent + colon + 1,
                )?;
            }
            "FREQ" if !saw_rrule => {
                saw_rrule = true;
                parse_rrule_into(&mut options, line, line_no, indent)?;
            }
            _ => {
                return Err(
                    ParseError::new(ParseErrorKind::InvalidContentLine, line_no, indent + 1)
                        .with_context(line),
                );
            }
        }
    }

    if !saw_rrule {
        return Err(if saw_dtstart {
            ParseError::new(ParseErrorKind::InvalidRRule, 1, 1).with_context("missing RRULE")
        } else {
            ParseError::new(ParseErrorKind::Empty, 1, 1)
        });
    }

    tracing::trace!(?options, "Parsed rule text");
    Ok(options)
}

/// Parses a `DTSTART[;params]:value` line.
fn parse_dtstart(
    options: &mut RuleOptions,
    line: &str,
    line_no: usize,
    indent: usize,
) -> ParseResult<()> {
    let colon = line
        .find(':')
        .ok_or_else(|| ParseError::new(ParseErrorKind::MissingColon, line_no, indent + 1))?;
    let (head, value) = (&line[..colon], &line[colon + 1..]);
    let value_col = indent + colon + 2;

    let mut gregorian = false;
    let mut offset = indent;
    for (i, param) in head.split(';').enumerate() {
        let col = offset + 1;
        offset += param.len() + 1;
        if i == 0 {
            continue;
        }
        let (key, val) = param.split_once('=').ok_or_else(|| {
            ParseError::new(ParseErrorKind::InvalidParameter, line_no, col).with_context(param)
        })?;
        match key.to_ascii_uppercase().as_str() {
            "TZID" => options.tzid = Some(val.to_string()),
            "X-CALSCALE" => gregorian = val.eq_ignore_ascii_case("GREGORIAN"),
            _ => {} // VALUE and unknown parameters carry no meaning here
        }
    }

    options.dtstart = Some(if gregorian {
        parse_gregorian_datetime(value, line_no, value_col)?
    } else {
        DateInput::Lunar(parse_lunar_datetime(value, line_no, value_col)?)
    });
    Ok(())
}

/// ## Summary
/// Parses a RECUR value (`FREQ=...;...`) into fresh options.
///
/// ## Errors
/// Returns an error if the value is not a valid recurrence rule.
pub fn parse_rrule(s: &str, line: usize, col: usize) -> ParseResult<RuleOptions> {
    let mut options = RuleOptions::default();
    parse_rrule_into(&mut options, s, line, col.saturating_sub(1))?;
    Ok(options)
}

/// Parses rule parts into `options`. `offset` is the 0-based column of `s` in its line.
fn parse_rrule_into(
    options: &mut RuleOptions,
    s: &str,
    line: usize,
    offset: usize,
) -> ParseResult<()> {
    let mut col = offset + 1;
    for part in s.split(';') {
        let part_col = col;
        col += part.len() + 1;
        if part.trim().is_empty() {
            continue;
        }

        let (key, value) = part.split_once('=').ok_or_else(|| {
            ParseError::new(ParseErrorKind::InvalidRRule, line, part_col).with_context(part)
        })?;
        parse_rrule_part(options, key.trim(), value.trim(), line, part_col)?;
    }
    Ok(())
}

/// Parses a single RRULE key-value pair.
fn parse_rrule_part(
    options: &mut RuleOptions,
    key: &str,
    value: &str,
    line: usize,
    col: usize,
) -> ParseResult<()> {
    let list = |v: Vec<i64>| Some(OneOrMany::Many(v));

    match key.to_ascii_uppercase().as_str() {
        "FREQ" => {
            options.freq = Some(Frequency::parse(value).ok_or_else(|| {
                ParseError::new(ParseErrorKind::InvalidFrequency, line, col).with_context(value)
            })?);
        }
        "INTERVAL" => options.interval = Some(parse_integer(value, line, col)?),
        "COUNT" => {
            if options.until.is_some() {
                return Err(ParseError::new(
                    ParseErrorKind::UntilCountConflict,
                    line,
                    col,
                ));
            }
            options.count = Some(parse_integer(value, line, col)?);
        }
        "UNTIL" => {
            if options.count.is_some() {
                return Err(ParseError::new(
                    ParseErrorKind::UntilCountConflict,
                    line,
                    col,
                ));
            }
            options.until = Some(DateInput::Lunar(parse_lunar_datetime(value, line, col)?));
        }
        "WKST" => {
            options.wkst = Some(Weekday::parse(value).ok_or_else(|| {
                ParseError::new(ParseErrorKind::InvalidWeekday, line, col).with_context(value)
            })?);
        }
        "SKIP" => {
            options.skip = Some(SkipPolicy::parse(value).ok_or_else(|| {
                ParseError::new(ParseErrorKind::InvalidSkip, line, col).with_context(value)
            })?);
        }
        "RSCALE" => {
            options.calendar = Some(CalendarVariant::parse(value).ok_or_else(|| {
                ParseError::new(ParseErrorKind::InvalidRscale, line, col).with_context(value)
            })?);
        }
        "BYSECOND" => options.bysecond = list(parse_integer_list(value, line, col)?),
        "BYMINUTE" => options.byminute = list(parse_integer_list(value, line, col)?),
        "BYHOUR" => options.byhour = list(parse_integer_list(value, line, col)?),
        "BYDAY" => options.byday = Some(OneOrMany::Many(parse_byday(value, line, col)?)),
        "BYMONTHDAY" => options.bymonthday = list(parse_integer_list(value, line, col)?),
        "BYYEARDAY" => options.byyearday = list(parse_integer_list(value, line, col)?),
        "BYWEEKNO" => options.byweekno = list(parse_integer_list(value, line, col)?),
        "BYMONTH" => options.bymonth = list(parse_integer_list(value, line, col)?),
        "BYSETPOS" => options.bysetpos = list(parse_integer_list(value, line, col)?),
        _ => {
            tracing::debug!(part = key, "Ignoring unknown rule part");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::rrule::core::{LunarFields, WeekdayNum};

    #[test]
    fn bare_rrule() {
        let options = parse_rule("FREQ=MONTHLY;BYMONTHDAY=30;COUNT=3;SKIP=FORWARD").unwrap();
        assert_eq!(options.freq, Some(Frequency::Monthly));
        assert_eq!(options.bymonthday, Some(OneOrMany::Many(vec![30])));
        assert_eq!(options.count, Some(3));
        assert_eq!(options.skip, Some(SkipPolicy::Forward));
        assert_eq!(options.dtstart, None);
    }

    #[test]
    fn content_lines() {
        let options = parse_rule(
            "DTSTART;TZID=Asia/Riyadh:14460901T180000\n\
             RRULE:FREQ=YEARLY;BYMONTH=9;BYDAY=1FR,-1FR;RSCALE=ISLAMIC-UMALQURA",
        )
        .unwrap();
        assert_eq!(options.tzid.as_deref(), Some("Asia/Riyadh"));
        assert_eq!(
            options.dtstart,
            Some(DateInput::Lunar(
                LunarFields::date(1446, 9, 1).with_time(18, 0, 0)
            ))
        );
        assert_eq!(options.calendar, Some(CalendarVariant::Official));
        assert_eq!(
            options.byday,
            Some(OneOrMany::Many(vec![
                WeekdayNum::nth(1, Weekday::Friday),
                WeekdayNum::nth(-1, Weekday::Friday)
            ]))
        );
    }

    #[test]
    fn gregorian_dtstart() {
        let options =
            parse_rule("DTSTART;X-CALSCALE=GREGORIAN:20250301\nRRULE:FREQ=DAILY").unwrap();
        assert!(matches!(options.dtstart, Some(DateInput::GregorianDate(_))));
    }

    #[test_log::test]
    fn unknown_parts_are_ignored() {
        let options = parse_rule("FREQ=DAILY;X-FOO=BAR;").unwrap();
        assert_eq!(options.freq, Some(Frequency::Daily));
    }

    #[test]
    fn count_until_conflict_is_positioned() {
        let err = parse_rule("RRULE:FREQ=DAILY;COUNT=2;UNTIL=14470101").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UntilCountConflict);
        assert_eq!((err.line, err.column), (1, 26));
    }

    #[test]
    fn bad_frequency_names_value() {
        let err = parse_rule("DTSTART:14460101\nRRULE:FREQ=OFTEN").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidFrequency);
        assert_eq!((err.line, err.column), (2, 7));
        assert_eq!(err.context.as_deref(), Some("OFTEN"));
    }

    #[test]
    fn rejects_unknown_rscale_and_skip() {
        assert_eq!(
            parse_rule("FREQ=DAILY;RSCALE=GREGORIAN").unwrap_err().kind,
            ParseErrorKind::InvalidRscale
        );
        assert_eq!(
            parse_rule("FREQ=DAILY;SKIP=SIDEWAYS").unwrap_err().kind,
            ParseErrorKind::InvalidSkip
        );
    }

    #[test]
    fn empty_and_missing_rrule() {
        assert_eq!(parse_rule("  \n").unwrap_err().kind, ParseErrorKind::Empty);
        assert_eq!(
            parse_rule("DTSTART:14460101").unwrap_err().kind,
            ParseErrorKind::InvalidRRule
        );
        assert_eq!(
            parse_rule("SUMMARY:Eid").unwrap_err().kind,
            ParseErrorKind::InvalidContentLine
        );
    }

    #[test]
    fn standalone_recur_value() {
        let options = parse_rrule("FREQ=WEEKLY;BYDAY=FR", 1, 1).unwrap();
        assert_eq!(options.freq, Some(Frequency::Weekly));
    }
}
