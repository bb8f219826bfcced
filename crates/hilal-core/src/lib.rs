//! Shared vocabulary for the hilal workspace.
//!
//! - `types`: weekdays, skip policies and calendar variants used by every layer
//! - `config`: layered settings loaded from defaults, `hilal.toml` and the environment
//! - `error`: the core error type

pub mod config;
pub mod error;
pub mod types;

pub use types::{CalendarVariant, SkipPolicy, Weekday};
