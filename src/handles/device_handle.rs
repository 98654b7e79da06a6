use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::errors::{ApiError, DeviceError};
use crate::models::{Device, DeviceStatus};
use crate::services::DeviceService;

#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDeviceRequest {
    pub serial_number: String,
    pub device_type: String,
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDeviceRequest {
    pub device_type: String,
    pub serial_number: Option<String>,
}

#[derive(Clone, Deserialize)]
pub struct UpdateDeviceStatusRequest {
    pub status: String,
}

#[derive(Clone, Deserialize)]
pub struct ListDevicesQuery {
    pub status: Option<String>,
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceResponse {
    pub id: i64,
    pub serial_number: String,
    pub device_type: String,
    pub status: DeviceStatus,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_report_time: Option<OffsetDateTime>,
    pub last_energy_reading: Option<f64>,
}

impl From<Device> for DeviceResponse {
    fn from(device: Device) -> Self {
        Self {
            id: device.id,
            serial_number: device.serial_number,
            device_type: device.device_type,
            status: device.status,
            last_report_time: device.last_report_time,
            last_energy_reading: device.last_energy_reading,
        }
    }
}

#[derive(Clone)]
pub struct DeviceState {
    pub device_service: Arc<DeviceService>,
}

pub fn device_router(state: DeviceState) -> Router {
    Router::new()
        .route("/api/devices", get(get_devices).post(register_device))
        .route(
            "/api/devices/:device_id",
            get(get_device).put(update_device).delete(delete_device),
        )
        .route("/api/devices/:device_id/status", patch(update_device_status))
        .with_state(state)
}

fn parse_status(raw: &str) -> Result<DeviceStatus, ApiError> {
    raw.parse()
        .map_err(|_| DeviceError::InvalidDeviceStatus.into())
}

pub async fn register_device(
    State(state): State<DeviceState>,
    Json(body): Json<RegisterDeviceRequest>,
) -> Result<(StatusCode, Json<DeviceResponse>), ApiError> {
    if body.serial_number.trim().is_empty() || body.device_type.trim().is_empty() {
        return Err(DeviceError::InvalidRequest.into());
    }

    let device = state
        .device_service
        .register_device(&body.serial_number, &body.device_type)
        .await?;

    Ok((StatusCode::CREATED, Json(device.into())))
}

pub async fn get_devices(
    State(state): State<DeviceState>,
    Query(query): Query<ListDevicesQuery>,
) -> Result<Json<Vec<DeviceResponse>>, ApiError> {
    let devices = match query.status.as_deref() {
        Some(raw) => {
            let status = parse_status(raw)?;
            state.device_service.get_devices_by_status(status).await?
        }
        None => state.device_service.get_all_devices().await?,
    };

    Ok(Json(devices.into_iter().map(DeviceResponse::from).collect()))
}

pub async fn get_device(
    State(state): State<DeviceState>,
    Path(device_id): Path<i64>,
) -> Result<Json<DeviceResponse>, ApiError> {
    let device = state.device_service.get_device_by_id(device_id).await?;

    Ok(Json(device.into()))
}

pub async fn update_device(
    State(state): State<DeviceState>,
    Path(device_id): Path<i64>,
    Json(body): Json<UpdateDeviceRequest>,
) -> Result<Json<DeviceResponse>, ApiError> {
    if body.device_type.trim().is_empty() {
        return Err(DeviceError::InvalidRequest.into());
    }
    if matches!(&body.serial_number, Some(serial) if serial.trim().is_empty()) {
        return Err(DeviceError::InvalidRequest.into());
    }

    let device = state
        .device_service
        .update_device(device_id, &body.device_type, body.serial_number.as_deref())
        .await?;

    Ok(Json(device.into()))
}

pub async fn update_device_status(
    State(state): State<DeviceState>,
    Path(device_id): Path<i64>,
    Json(body): Json<UpdateDeviceStatusRequest>,
) -> Result<Json<DeviceResponse>, ApiError> {
    let status = parse_status(&body.status)?;

    let device = state
        .device_service
        .update_device_status(device_id, status)
        .await?;

    Ok(Json(device.into()))
}

pub async fn delete_device(
    State(state): State<DeviceState>,
    Path(device_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if state.device_service.delete_device(device_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(DeviceError::DeviceNotFound.into())
    }
}
