use thiserror::Error;

/// Errors raised while reading settings and shared vocabulary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Unknown calendar variant `{0}` (expected `tabular` or `official`)")]
    UnknownVariant(String),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
