use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("Device not found")]
    DeviceNotFound,

    #[error("Device serial number already exists")]
    SerialNumberExists,

    #[error("Invalid device status")]
    InvalidDeviceStatus,

    #[error("Invalid request parameters")]
    InvalidRequest,
}

impl DeviceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DeviceError::DeviceNotFound => StatusCode::NOT_FOUND,
            // The upstream API contract reports duplicates as a bad request,
            // not a conflict.
            DeviceError::SerialNumberExists => StatusCode::BAD_REQUEST,
            DeviceError::InvalidDeviceStatus => StatusCode::BAD_REQUEST,
            DeviceError::InvalidRequest => StatusCode::BAD_REQUEST,
        }
    }
}
