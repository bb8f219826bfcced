//! Rule data model: sparse options in, canonical rule out.

mod normalized;
mod options;
mod values;

pub use normalized::NormalizedRule;
pub use options::RuleOptions;
pub use values::{DateInput, Frequency, LunarFields, OneOrMany, WeekdayNum};
