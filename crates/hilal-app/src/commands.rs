//! Subcommand handlers. Each returns the text to print on stdout.

use hilal_calendar::{Calendar, CalendarBackend, LunarDate};
use hilal_core::CalendarVariant;
use hilal_core::config::Settings;
use hilal_rfc::error::RfcError;
use hilal_rfc::rfc::rrule::{parse_rule, serialize_normalized};
use hilal_service::recurrence::{ExpansionOptions, Normalizer, Recurrence, to_gregorian};
use serde_json::json;

use crate::cli::{ConvertArgs, DescribeArgs, ExpandArgs};
use crate::error::AppResult;

const DATE_TIME: &str = "%Y-%m-%dT%H:%M:%S";
const DATE: &str = "%Y-%m-%d";

fn recurrence(
    rule: &str,
    calendar: Option<CalendarVariant>,
    settings: &Settings,
) -> AppResult<Recurrence> {
    let mut options = parse_rule(rule).map_err(RfcError::from)?;
    if calendar.is_some() {
        options.calendar = calendar;
    }
    let recurrence = Recurrence::from_options(&options, &Normalizer::new())?
        .with_expansion(ExpansionOptions::from(&settings.engine));
    tracing::debug!(rule = %recurrence, "Rule normalized");
    Ok(recurrence)
}

fn bound(text: Option<&str>, calendar: &Calendar) -> AppResult<Option<LunarDate>> {
    Ok(text.map(|s| LunarDate::parse(s, calendar)).transpose()?)
}

/// ## Summary
/// Lists occurrences, optionally restricted to a range.
///
/// ## Errors
/// Returns parse, validation and generation failures.
pub fn expand(args: &ExpandArgs, settings: &Settings) -> AppResult<String> {
    let recurrence = recurrence(&args.rule, args.calendar, settings)?;
    let calendar = recurrence.calendar();
    let after = bound(args.after.as_deref(), calendar)?;
    let before = bound(args.before.as_deref(), calendar)?;

    let mut dates = match (after, before) {
        (Some(after), Some(before)) => recurrence.between(&after, &before, args.inclusive)?,
        (Some(after), None) => recurrence.after(&after, args.inclusive)?.into_iter().collect(),
        (None, Some(before)) => recurrence.before(&before, args.inclusive)?.into_iter().collect(),
        (None, None) => recurrence.all(args.limit)?,
    };
    if let Some(limit) = args.limit {
        dates.truncate(limit);
    }

    let with_time = dates.iter().any(LunarDate::has_time);
    let lines: Vec<String> = if args.gregorian {
        let format = if with_time { DATE_TIME } else { DATE };
        to_gregorian(&dates, calendar)?
            .iter()
            .map(|dt| dt.format(format).to_string())
            .collect()
    } else if with_time {
        dates.iter().map(LunarDate::to_datetime_string).collect()
    } else {
        dates.iter().map(ToString::to_string).collect()
    };

    if args.json {
        Ok(serde_json::to_string_pretty(&lines)?)
    } else {
        Ok(lines.join("\n"))
    }
}

/// ## Summary
/// Converts one date between the lunar and Gregorian calendars.
///
/// ## Errors
/// Returns parse and conversion failures.
pub fn convert(args: &ConvertArgs) -> AppResult<String> {
    let variant = args
        .calendar
        .unwrap_or_else(CalendarVariant::process_default);
    let calendar = Calendar::for_variant(variant);

    let (lunar, gregorian) = match (&args.to_gregorian, args.to_lunar) {
        (Some(text), _) => {
            let lunar = LunarDate::parse(text, &calendar)?;
            let gregorian = lunar.to_gregorian(&calendar)?;
            let format = if lunar.has_time() { DATE_TIME } else { DATE };
            (lunar, gregorian.format(format).to_string())
        }
        (None, Some(date)) => {
            let lunar = LunarDate::from_gregorian_date(date, &calendar)?;
            (lunar, date.format(DATE).to_string())
        }
        // clap requires exactly one of the two
        (None, None) => return Ok(String::new()),
    };
    let lunar_text = if lunar.has_time() {
        lunar.to_datetime_string()
    } else {
        lunar.to_string()
    };

    if args.json {
        let value = json!({
            "calendar": calendar.variant().as_str(),
            "lunar": lunar_text,
            "gregorian": gregorian,
        });
        Ok(serde_json::to_string_pretty(&value)?)
    } else if args.to_gregorian.is_some() {
        Ok(gregorian)
    } else {
        Ok(lunar_text)
    }
}

/// ## Summary
/// Describes a rule in words.
///
/// ## Errors
/// Returns parse and validation failures.
pub fn describe(args: &DescribeArgs, settings: &Settings) -> AppResult<String> {
    let recurrence = recurrence(&args.rule, None, settings)?;
    let text = recurrence.to_text(args.locale);
    if args.json {
        let value = json!({
            "rule": serialize_normalized(recurrence.rule()),
            "locale": args.locale,
            "text": text,
        });
        Ok(serde_json::to_string_pretty(&value)?)
    } else {
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use hilal_core::config::{CalendarConfig, EngineConfig, LoggingConfig};
    use hilal_rfc::rfc::rrule::Locale;

    const RAMADAN: &str = "DTSTART:14460901\nRRULE:FREQ=YEARLY;COUNT=3;BYMONTH=9;BYMONTHDAY=1";

    fn settings() -> Settings {
        Settings {
            calendar: CalendarConfig {
                default: "tabular".to_string(),
                cache_capacity: 16,
            },
            engine: EngineConfig {
                max_instances: 5,
                max_periods: 10_000,
            },
            logging: LoggingConfig {
                level: "warn".to_string(),
            },
        }
    }

    fn expand_args(rule: &str) -> ExpandArgs {
        ExpandArgs {
            rule: rule.to_string(),
            calendar: Some(CalendarVariant::Tabular),
            limit: None,
            after: None,
            before: None,
            inclusive: false,
            gregorian: false,
            json: false,
        }
    }

    #[test_log::test]
    fn expand_lists_lunar_dates() {
        let out = expand(&expand_args(RAMADAN), &settings()).unwrap();
        assert_eq!(out, "1446-09-01\n1447-09-01\n1448-09-01");
    }

    #[test]
    fn expand_gregorian_json() {
        let args = ExpandArgs {
            gregorian: true,
            json: true,
            limit: Some(1),
            ..expand_args(RAMADAN)
        };
        let out = expand(&args, &settings()).unwrap();
        let parsed: Vec<String> = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed, vec!["2025-03-01".to_string()]);
    }

    #[test]
    fn expand_unbounded_uses_instance_cap() {
        let out = expand(&expand_args("DTSTART:14460101\nRRULE:FREQ=DAILY"), &settings()).unwrap();
        assert_eq!(out.lines().count(), 5);
    }

    #[test]
    fn expand_range() {
        let args = ExpandArgs {
            after: Some("1446-03-01".to_string()),
            before: Some("1446-06-01".to_string()),
            inclusive: true,
            ..expand_args("DTSTART:14460101\nRRULE:FREQ=MONTHLY")
        };
        let out = expand(&args, &settings()).unwrap();
        assert_eq!(out, "1446-03-01\n1446-04-01\n1446-05-01\n1446-06-01");

        let args = ExpandArgs {
            after: Some("1446-03-01".to_string()),
            ..expand_args("DTSTART:14460101\nRRULE:FREQ=MONTHLY")
        };
        assert_eq!(expand(&args, &settings()).unwrap(), "1446-04-01");
    }

    #[test]
    fn expand_rejects_malformed_bound() {
        let args = ExpandArgs {
            after: Some("1446/03/01".to_string()),
            ..expand_args(RAMADAN)
        };
        assert!(expand(&args, &settings()).is_err());
    }

    #[test]
    fn convert_both_directions() {
        let to_gregorian = ConvertArgs {
            to_gregorian: Some("1446-09-01".to_string()),
            to_lunar: None,
            calendar: Some(CalendarVariant::Tabular),
            json: false,
        };
        assert_eq!(convert(&to_gregorian).unwrap(), "2025-03-01");

        let to_lunar = ConvertArgs {
            to_gregorian: None,
            to_lunar: NaiveDate::from_ymd_opt(2024, 7, 8),
            calendar: Some(CalendarVariant::Tabular),
            json: true,
        };
        let value: serde_json::Value = serde_json::from_str(&convert(&to_lunar).unwrap()).unwrap();
        assert_eq!(value["lunar"], "1446-01-01");
        assert_eq!(value["gregorian"], "2024-07-08");
        assert_eq!(value["calendar"], "tabular");
    }

    #[test]
    fn describe_in_both_locales() {
        let rule = format!("{RAMADAN};RSCALE=ISLAMIC-CIVIL");
        let mut args = DescribeArgs {
            rule,
            locale: Locale::En,
            json: false,
        };
        assert_eq!(
            describe(&args, &settings()).unwrap(),
            "every year in Ramadan on the 1st, 3 times"
        );

        args.locale = Locale::Ar;
        args.json = true;
        let out = describe(&args, &settings()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["locale"], "ar");
        assert_eq!(
            value["rule"],
            "DTSTART:14460901\nRRULE:FREQ=YEARLY;COUNT=3;BYMONTHDAY=1;BYMONTH=9;RSCALE=ISLAMIC-CIVIL"
        );
    }
}
