use hilal_calendar::CalendarError;
use hilal_core::error::CoreError;
use hilal_rfc::error::RfcError;
use thiserror::Error;

/// Service layer errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    CalendarError(#[from] CalendarError),

    #[error(transparent)]
    RfcError(#[from] RfcError),

    #[error(transparent)]
    CoreError(#[from] CoreError),

    /// A rule option is missing or out of range. `field` is the RRULE part name.
    #[error("Invalid {field}: {reason}")]
    InvalidRule { field: &'static str, reason: String },
}

impl ServiceError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidRule {
            field,
            reason: reason.into(),
        }
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
