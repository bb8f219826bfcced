//! Calendar vocabulary shared across crates.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    #[serde(rename = "SU")]
    Sunday,
    #[serde(rename = "MO")]
    Monday,
    #[serde(rename = "TU")]
    Tuesday,
    #[serde(rename = "WE")]
    Wednesday,
    #[serde(rename = "TH")]
    Thursday,
    #[serde(rename = "FR")]
    Friday,
    #[serde(rename = "SA")]
    Saturday,
}

impl Weekday {
    /// Returns the two-letter abbreviation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sunday => "SU",
            Self::Monday => "MO",
            Self::Tuesday => "TU",
            Self::Wednesday => "WE",
            Self::Thursday => "TH",
            Self::Friday => "FR",
            Self::Saturday => "SA",
        }
    }

    /// Parses a weekday from a two-letter abbreviation (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s.to_ascii_uppercase().as_str() {
            "SU" => Self::Sunday,
            "MO" => Self::Monday,
            "TU" => Self::Tuesday,
            "WE" => Self::Wednesday,
            "TH" => Self::Thursday,
            "FR" => Self::Friday,
            "SA" => Self::Saturday,
            _ => return None,
        })
    }

    /// Returns all weekdays in order (Sunday through Saturday).
    #[must_use]
    pub const fn all() -> [Self; 7] {
        [
            Self::Sunday,
            Self::Monday,
            Self::Tuesday,
            Self::Wednesday,
            Self::Thursday,
            Self::Friday,
            Self::Saturday,
        ]
    }

    /// Zero-based position counting from Sunday (Sunday = 0, Saturday = 6).
    #[must_use]
    pub const fn number_from_sunday(self) -> u8 {
        match self {
            Self::Sunday => 0,
            Self::Monday => 1,
            Self::Tuesday => 2,
            Self::Wednesday => 3,
            Self::Thursday => 4,
            Self::Friday => 5,
            Self::Saturday => 6,
        }
    }

    /// Inverse of [`Weekday::number_from_sunday`], taken modulo 7.
    #[must_use]
    pub const fn from_number_from_sunday(n: u8) -> Self {
        Self::all()[(n % 7) as usize]
    }

    /// Weekday of a Julian Day Number.
    ///
    /// JDN 0 is a Monday, so `(jdn + 1) mod 7` is the Sunday-based position.
    #[must_use]
    pub fn from_day_index(jdn: i64) -> Self {
        let n = (jdn + 1).rem_euclid(7);
        Self::from_number_from_sunday(u8::try_from(n).unwrap_or_default())
    }

    /// Days to step back from `self` to reach `start` (0..=6).
    #[must_use]
    pub const fn days_since(self, start: Self) -> u8 {
        (self.number_from_sunday() + 7 - start.number_from_sunday()) % 7
    }

    /// The weekday `n` days after this one.
    #[must_use]
    pub const fn succ_by(self, n: u8) -> Self {
        Self::from_number_from_sunday((self.number_from_sunday() + n % 7) % 7)
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolution of a requested day-of-month that does not exist in a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkipPolicy {
    /// Drop the candidate.
    #[default]
    Omit,
    /// Use the first day of the following month.
    Forward,
    /// Use the last day of the month.
    Backward,
}

impl SkipPolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Omit => "OMIT",
            Self::Forward => "FORWARD",
            Self::Backward => "BACKWARD",
        }
    }

    /// Parses a policy token (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s.to_ascii_uppercase().as_str() {
            "OMIT" => Self::Omit,
            "FORWARD" => Self::Forward,
            "BACKWARD" => Self::Backward,
            _ => return None,
        })
    }
}

impl fmt::Display for SkipPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The lunar calendar flavour a rule is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarVariant {
    /// Fixed 30-year arithmetic cycle.
    Tabular,
    /// Official calendar supplied by the host lunar service.
    Official,
}

static PROCESS_DEFAULT: AtomicU8 = AtomicU8::new(CalendarVariant::Official as u8);

impl CalendarVariant {
    /// Configuration token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tabular => "tabular",
            Self::Official => "official",
        }
    }

    /// RFC 7529 `RSCALE` name.
    #[must_use]
    pub const fn rscale(self) -> &'static str {
        match self {
            Self::Tabular => "ISLAMIC-CIVIL",
            Self::Official => "ISLAMIC-UMALQURA",
        }
    }

    /// Parses either a configuration token or an `RSCALE` name (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s.to_ascii_lowercase().as_str() {
            "tabular" | "islamic-civil" => Self::Tabular,
            "official" | "islamic-umalqura" => Self::Official,
            _ => return None,
        })
    }

    /// The variant used when a rule does not name one.
    #[must_use]
    pub fn process_default() -> Self {
        match PROCESS_DEFAULT.load(Ordering::Relaxed) {
            0 => Self::Tabular,
            _ => Self::Official,
        }
    }

    /// Replaces the process-wide default (last write wins).
    pub fn set_process_default(variant: Self) {
        tracing::debug!(variant = %variant, "Setting default calendar variant");
        PROCESS_DEFAULT.store(variant as u8, Ordering::Relaxed);
    }
}

impl fmt::Display for CalendarVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CalendarVariant {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| CoreError::UnknownVariant(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekday_parse() {
        assert_eq!(Weekday::parse("MO"), Some(Weekday::Monday));
        assert_eq!(Weekday::parse("fr"), Some(Weekday::Friday));
        assert_eq!(Weekday::parse("XX"), None);
    }

    #[test]
    fn weekday_from_day_index() {
        // JDN 2460736 is Saturday 2025-03-01.
        assert_eq!(Weekday::from_day_index(2_460_736), Weekday::Saturday);
        assert_eq!(Weekday::from_day_index(0), Weekday::Monday);
        assert_eq!(Weekday::from_day_index(-1), Weekday::Sunday);
    }

    #[test]
    fn weekday_days_since() {
        assert_eq!(Weekday::Sunday.days_since(Weekday::Sunday), 0);
        assert_eq!(Weekday::Saturday.days_since(Weekday::Sunday), 6);
        assert_eq!(Weekday::Sunday.days_since(Weekday::Monday), 6);
        assert_eq!(Weekday::Friday.succ_by(3), Weekday::Monday);
    }

    #[test]
    fn skip_policy_tokens() {
        assert_eq!(SkipPolicy::parse("backward"), Some(SkipPolicy::Backward));
        assert_eq!(SkipPolicy::default(), SkipPolicy::Omit);
        assert_eq!(SkipPolicy::Forward.to_string(), "FORWARD");
    }

    #[test]
    fn calendar_variant_tokens() {
        assert_eq!(CalendarVariant::parse("ISLAMIC-CIVIL"), Some(CalendarVariant::Tabular));
        assert_eq!(CalendarVariant::parse("official"), Some(CalendarVariant::Official));
        assert!("gregorian".parse::<CalendarVariant>().is_err());
        assert_eq!(CalendarVariant::Official.rscale(), "ISLAMIC-UMALQURA");
    }

    #[test]
    fn calendar_variant_serde() {
        let json = serde_json::to_string(&CalendarVariant::Tabular).unwrap();
        assert_eq!(json, "\"tabular\"");
        let weekday: Weekday = serde_json::from_str("\"FR\"").unwrap();
        assert_eq!(weekday, Weekday::Friday);
    }
}
