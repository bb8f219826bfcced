use thiserror::Error;

/// Command-line errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    ServiceError(#[from] hilal_service::error::ServiceError),

    #[error(transparent)]
    RfcError(#[from] hilal_rfc::error::RfcError),

    #[error(transparent)]
    CalendarError(#[from] hilal_calendar::CalendarError),

    #[error(transparent)]
    CoreError(#[from] hilal_core::error::CoreError),

    #[error(transparent)]
    JsonError(#[from] serde_json::Error),
}

pub type AppResult<T> = std::result::Result<T, AppError>;
