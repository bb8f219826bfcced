//! Recurrence evaluation over lunar calendars.
//!
//! Rules are normalized once ([`Normalizer`]), then enumerated lazily ([`Occurrences`]) through
//! the query API of [`Recurrence`] or combined in a [`RuleSet`].

pub mod generator;
pub mod normalize;
pub mod query;
pub mod set;

pub use generator::{GeneratorLimits, Occurrences};
pub use normalize::{Normalizer, normalize};
pub use query::{ExpansionOptions, Recurrence, to_gregorian};
pub use set::RuleSet;
