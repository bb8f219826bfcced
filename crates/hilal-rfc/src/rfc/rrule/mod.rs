//! Lunar recurrence rules.
//!
//! - `core`: rule options, normalized rules and their scalar values
//! - `parse`: rule text parser
//! - `build`: rule text serializer
//! - `text`: English and Arabic descriptions
//!
//! ## Example
//!
//! ```rust
//! use hilal_rfc::rfc::rrule::{parse_rule, serialize};
//!
//! let options = parse_rule("DTSTART:14460901\nRRULE:FREQ=YEARLY;BYMONTH=9;COUNT=5").unwrap();
//! assert_eq!(
//!     serialize(&options).unwrap(),
//!     "DTSTART:14460901\nRRULE:FREQ=YEARLY;COUNT=5;BYMONTH=9"
//! );
//! ```

pub mod build;
pub mod core;
pub mod parse;
pub mod text;


pub use build::{serialize, serialize_normalized};
pub use core::{DateInput, Frequency, LunarFields, NormalizedRule, OneOrMany, RuleOptions, WeekdayNum};
pub use parse::{ParseError, ParseErrorKind, ParseResult, parse_rule};
pub use text::{Locale, to_text};
