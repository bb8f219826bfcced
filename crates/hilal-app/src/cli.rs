use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use hilal_core::CalendarVariant;
use hilal_rfc::rfc::rrule::Locale;

/// Hijri calendar recurrence rules.
#[derive(Parser, Debug)]
#[command(
    name = "hilal",
    version,
    about = "Expand, convert and describe Hijri calendar recurrence rules"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the occurrences of a rule.
    Expand(ExpandArgs),
    /// Convert a single date between the lunar and Gregorian calendars.
    Convert(ConvertArgs),
    /// Describe a rule in words.
    Describe(DescribeArgs),
}

#[derive(Args, Debug)]
pub struct ExpandArgs {
    /// Rule text: `DTSTART:...` and `RRULE:...` lines, or a bare `FREQ=...` value.
    pub rule: String,

    /// Calendar to evaluate in, overriding RSCALE and the configured default.
    #[arg(long)]
    pub calendar: Option<CalendarVariant>,

    /// Maximum number of dates to print.
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Lower bound (lunar YYYY-MM-DD). Alone, prints the first date after it.
    #[arg(long)]
    pub after: Option<String>,

    /// Upper bound (lunar YYYY-MM-DD). Alone, prints the last date before it.
    #[arg(long)]
    pub before: Option<String>,

    /// Include the --after and --before dates themselves.
    #[arg(long)]
    pub inclusive: bool,

    /// Print Gregorian date-times instead of lunar dates.
    #[arg(long)]
    pub gregorian: bool,

    /// Print a JSON array.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
#[group(id = "direction", required = true, multiple = false, args = ["to_gregorian", "to_lunar"])]
pub struct ConvertArgs {
    /// Lunar date (YYYY-MM-DD) to convert to Gregorian.
    #[arg(long)]
    pub to_gregorian: Option<String>,

    /// Gregorian date (YYYY-MM-DD) to convert to lunar.
    #[arg(long)]
    pub to_lunar: Option<NaiveDate>,

    /// Calendar variant; defaults to the configured one.
    #[arg(long)]
    pub calendar: Option<CalendarVariant>,

    /// Print a JSON object with both dates.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct DescribeArgs {
    /// Rule text, as for `expand`.
    pub rule: String,

    /// Output language: `en` or `ar`.
    #[arg(long, default_value = "en", value_parser = parse_locale)]
    pub locale: Locale,

    /// Print a JSON object with the canonical rule and its description.
    #[arg(long)]
    pub json: bool,
}

fn parse_locale(tag: &str) -> Result<Locale, String> {
    Locale::parse(tag).ok_or_else(|| format!("unsupported locale `{tag}` (expected en or ar)"))
}
