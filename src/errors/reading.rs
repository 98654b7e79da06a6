use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ReadingError {
    #[error("Device not found")]
    DeviceNotFound,

    #[error("No readings recorded for this device")]
    NoReadings,

    #[error("Reading value must be positive")]
    InvalidValue,
}

impl ReadingError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ReadingError::DeviceNotFound => StatusCode::NOT_FOUND,
            ReadingError::NoReadings => StatusCode::NOT_FOUND,
            ReadingError::InvalidValue => StatusCode::BAD_REQUEST,
        }
    }
}
