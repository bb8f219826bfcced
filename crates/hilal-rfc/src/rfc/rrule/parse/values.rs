//! Value parsers for rule text.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::error::{ParseError, ParseErrorKind, ParseResult};
use crate::rfc::rrule::core::{DateInput, LunarFields, WeekdayNum};

/// Splits `YYYYMMDD[THHMMSS[Z]]` into its date and optional time digits.
fn split_datetime(s: &str, line: usize, col: usize) -> ParseResult<(&str, Option<&str>)> {
    let s = s.strip_suffix('Z').unwrap_or(s);
    let (date, time) = match s.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (s, None),
    };
    if date.len() != 8 || !date.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::new(ParseErrorKind::InvalidDate, line, col).with_context(s));
    }
    if let Some(time) = time
        && (time.len() != 6 || !time.bytes().all(|b| b.is_ascii_digit()))
    {
        return Err(ParseError::new(ParseErrorKind::InvalidTime, line, col).with_context(s));
    }
    Ok((date, time))
}

fn digits<T: std::str::FromStr>(s: &str, line: usize, col: usize) -> ParseResult<T> {
    s.parse()
        .ok()
        .ok_or_else(|| ParseError::new(ParseErrorKind::InvalidInteger, line, col).with_context(s))
}

/// Parses a lunar `YYYYMMDD[THHMMSS]`. Ranges are checked later against the calendar.
///
/// ## Errors
/// Returns an error if the text is not in the basic date or date-time format.
pub fn parse_lunar_datetime(s: &str, line: usize, col: usize) -> ParseResult<LunarFields> {
    let (date, time) = split_datetime(s, line, col)?;
    let fields = LunarFields::date(
        digits(&date[..4], line, col)?,
        digits(&date[4..6], line, col)?,
        digits(&date[6..], line, col)?,
    );
    match time {
        Some(time) => Ok(fields.with_time(
            digits(&time[..2], line, col)?,
            digits(&time[2..4], line, col)?,
            digits(&time[4..], line, col)?,
        )),
        None => Ok(fields),
    }
}

/// Parses a Gregorian `YYYYMMDD[THHMMSS]`.
///
/// ## Errors
/// Returns an error if the text is malformed or names a nonexistent Gregorian date.
pub fn parse_gregorian_datetime(s: &str, line: usize, col: usize) -> ParseResult<DateInput> {
    let (date, time) = split_datetime(s, line, col)?;
    let date = NaiveDate::parse_from_str(date, "%Y%m%d")
        .ok()
        .ok_or_else(|| ParseError::new(ParseErrorKind::InvalidDate, line, col).with_context(s))?;
    match time {
        Some(time) => {
            let time = NaiveTime::parse_from_str(time, "%H%M%S").ok().ok_or_else(|| {
                ParseError::new(ParseErrorKind::InvalidTime, line, col).with_context(s)
            })?;
            Ok(DateInput::Gregorian(NaiveDateTime::new(date, time)))
        }
        None => Ok(DateInput::GregorianDate(date)),
    }
}

/// Parses a single integer.
///
/// ## Errors
/// Returns `InvalidInteger` if the value is not an integer.
pub fn parse_integer(s: &str, line: usize, col: usize) -> ParseResult<i64> {
    digits(s.trim(), line, col)
}

/// Parses a comma-separated list of integers.
///
/// ## Errors
/// Returns `InvalidInteger` if any element is not an integer.
pub fn parse_integer_list(s: &str, line: usize, col: usize) -> ParseResult<Vec<i64>> {
    s.split(',').map(|v| parse_integer(v, line, col)).collect()
}

/// Parses a BYDAY value (weekdays with optional ordinals).
///
/// ## Errors
/// Returns `InvalidWeekday` if any element is malformed.
pub fn parse_byday(s: &str, line: usize, col: usize) -> ParseResult<Vec<WeekdayNum>> {
    s.split(',')
        .map(|v| {
            WeekdayNum::parse(v).ok_or_else(|| {
                ParseError::new(ParseErrorKind::InvalidWeekday, line, col).with_context(v.trim())
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hilal_core::Weekday;

    #[test]
    fn lunar_date_and_datetime() {
        assert_eq!(
            parse_lunar_datetime("14460901", 1, 1).unwrap(),
            LunarFields::date(1446, 9, 1)
        );
        assert_eq!(
            parse_lunar_datetime("14460901T183000", 1, 1).unwrap(),
            LunarFields::date(1446, 9, 1).with_time(18, 30, 0)
        );
        // Range checks are not the parser's job
        assert_eq!(
            parse_lunar_datetime("14461330", 1, 1).unwrap(),
            LunarFields::date(1446, 13, 30)
        );
    }

    #[test]
    fn lunar_date_rejects_bad_shapes() {
        let err = parse_lunar_datetime("1446-09-01", 3, 9).unwrap_err();
        assert_eq!((err.kind, err.line, err.column), (ParseErrorKind::InvalidDate, 3, 9));
        let err = parse_lunar_datetime("14460901T1830", 1, 1).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidTime);
    }

    #[test]
    fn gregorian_values() {
        assert_eq!(
            parse_gregorian_datetime("20250301", 1, 1).unwrap(),
            DateInput::GregorianDate(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap())
        );
        assert_eq!(
            parse_gregorian_datetime("20250230", 1, 1).unwrap_err().kind,
            ParseErrorKind::InvalidDate
        );
    }

    #[test]
    fn lists() {
        assert_eq!(parse_integer_list("1, -1,15", 1, 1).unwrap(), vec![1, -1, 15]);
        assert_eq!(
            parse_integer_list("1,x", 1, 1).unwrap_err().kind,
            ParseErrorKind::InvalidInteger
        );
        assert_eq!(
            parse_byday("FR,-1SA", 1, 1).unwrap(),
            vec![
                WeekdayNum::every(Weekday::Friday),
                WeekdayNum::nth(-1, Weekday::Saturday)
            ]
        );
        assert_eq!(
            parse_byday("FRI", 1, 1).unwrap_err().kind,
            ParseErrorKind::InvalidWeekday
        );
    }
}
