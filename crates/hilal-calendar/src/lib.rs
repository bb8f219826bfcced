//! Lunar (Hijri) calendars, Julian Day Number conversions, and date arithmetic.
//!
//! Two calendar variants are provided behind the [`CalendarBackend`] trait: a deterministic
//! tabular calendar and an official calendar driven by a host [`host::LunarService`].

pub mod arith;
pub mod backend;
pub mod date;
pub mod day_index;
pub mod error;
pub mod host;
pub mod observational;
pub mod tabular;

pub use backend::{Calendar, CalendarBackend};
pub use date::LunarDate;
pub use error::{CalendarError, CalendarResult};
pub use observational::ObservationalCalendar;
pub use tabular::TabularCalendar;
