use hilal_core::CalendarVariant;
use thiserror::Error;

/// Calendar-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    /// A date component is structurally out of range (e.g. month 13)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A well-formed triple that does not exist in the calendar
    #[error("Invalid {variant} date: {year:04}-{month:02}-{day:02}")]
    InvalidDate {
        year: i32,
        month: u8,
        day: u8,
        variant: CalendarVariant,
    },

    /// A day index that precedes the calendar epoch or cannot be represented
    #[error("Day index {index} is out of range for the {variant} calendar")]
    OutOfRange {
        index: i64,
        variant: CalendarVariant,
    },

    /// The observational search found no Gregorian day for a lunar date
    #[error("No Gregorian date found for lunar date {year:04}-{month:02}-{day:02}")]
    ConversionFailure { year: i32, month: u8, day: u8 },
}

pub type CalendarResult<T> = std::result::Result<T, CalendarError>;
