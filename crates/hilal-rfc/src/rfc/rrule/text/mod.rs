//! Natural-language descriptions of normalized rules.
//!
//! English and Arabic only. Rendering reads the rule and never affects recurrence semantics.

mod ar;
mod en;

use std::fmt;

use serde::{Deserialize, Serialize};

use super::core::NormalizedRule;

/// Output language for [`to_text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ar,
}

impl Locale {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ar => "ar",
        }
    }

    /// Parses a language tag. Region and script subtags are ignored (`en-US`, `ar_SA`).
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        let language = tag.trim().split(['-', '_']).next()?;
        match language.to_ascii_lowercase().as_str() {
            "en" => Some(Self::En),
            "ar" => Some(Self::Ar),
            _ => None,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Describes a rule in the given language.
#[must_use]
pub fn to_text(rule: &NormalizedRule, locale: Locale) -> String {
    match locale {
        Locale::En => en::render(rule),
        Locale::Ar => ar::render(rule),
    }
}

/// Joins `items` as `a, b <and> c`.
fn join_list(items: &[String], separator: &str, last_separator: &str) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{}{last_separator}{last}", init.join(separator)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locale_tags() {
        assert_eq!(Locale::parse("en"), Some(Locale::En));
        assert_eq!(Locale::parse("en-US"), Some(Locale::En));
        assert_eq!(Locale::parse("AR_sa"), Some(Locale::Ar));
        assert_eq!(Locale::parse("fr"), None);
        assert_eq!(Locale::parse(""), None);
    }

    #[test]
    fn joins() {
        let items = |v: &[&str]| v.iter().map(ToString::to_string).collect::<Vec<_>>();
        assert_eq!(join_list(&items(&["a"]), ", ", " and "), "a");
        assert_eq!(join_list(&items(&["a", "b"]), ", ", " and "), "a and b");
        assert_eq!(join_list(&items(&["a", "b", "c"]), ", ", " and "), "a, b and c");
    }
}
