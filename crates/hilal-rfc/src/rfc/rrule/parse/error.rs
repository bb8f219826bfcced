//! Positioned errors for rule text.

use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

/// A rule text failure, located by 1-based line and column.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at line {line}, column {column}{}", context_suffix(.context.as_deref()))]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line: usize,
    pub column: usize,
    /// Offending text, when it helps the reader.
    pub context: Option<String>,
}

fn context_suffix(context: Option<&str>) -> String {
    context.map(|c| format!(": {c}")).unwrap_or_default()
}

impl ParseError {
    #[must_use]
    pub const fn new(kind: ParseErrorKind, line: usize, column: usize) -> Self {
        Self {
            kind,
            line,
            column,
            context: None,
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("empty rule")]
    Empty,
    /// Neither a DTSTART nor an RRULE line.
    #[error("unrecognized line")]
    InvalidContentLine,
    #[error("expected `:` after the property name")]
    MissingColon,
    #[error("malformed property parameter")]
    InvalidParameter,
    #[error("malformed date")]
    InvalidDate,
    #[error("malformed time")]
    InvalidTime,
    /// A rule part that is not `NAME=VALUE`, or the rule is missing.
    #[error("malformed RRULE")]
    InvalidRRule,
    #[error("not an integer")]
    InvalidInteger,
    #[error("unknown FREQ")]
    InvalidFrequency,
    #[error("unknown weekday")]
    InvalidWeekday,
    #[error("unknown SKIP")]
    InvalidSkip,
    #[error("unsupported RSCALE")]
    InvalidRscale,
    #[error("UNTIL and COUNT are mutually exclusive")]
    UntilCountConflict,
    #[error("given more than once")]
    Duplicate,
}
