use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::errors::{ApiError, ReadingError};
use crate::models::{Device, EnergyReading};
use crate::services::EnergyDataService;

#[derive(Clone, Deserialize)]
pub struct RecordReadingRequest {
    pub value: f64,
}

#[derive(Clone, Deserialize)]
pub struct TimeRangeQuery {
    #[serde(rename = "startDate", with = "time::serde::rfc3339")]
    pub start_date: OffsetDateTime,
    #[serde(rename = "endDate", with = "time::serde::rfc3339")]
    pub end_date: OffsetDateTime,
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyReadingResponse {
    pub id: i64,
    pub device_id: i64,
    pub device_serial_number: String,
    pub value: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl EnergyReadingResponse {
    fn from_parts(device: &Device, reading: EnergyReading) -> Self {
        Self {
            id: reading.id,
            device_id: reading.device_id,
            device_serial_number: device.serial_number.clone(),
            value: reading.energy_consumed,
            timestamp: reading.timestamp,
        }
    }
}

#[derive(Clone)]
pub struct ReadingState {
    pub energy_data_service: Arc<EnergyDataService>,
}

pub fn reading_router(state: ReadingState) -> Router {
    Router::new()
        .route(
            "/api/devices/:device_id/readings",
            get(get_readings).post(record_reading),
        )
        .route(
            "/api/devices/:device_id/readings/latest",
            get(get_latest_reading),
        )
        .route(
            "/api/devices/:device_id/readings/average",
            get(get_average_consumption),
        )
        .with_state(state)
}

pub async fn record_reading(
    State(state): State<ReadingState>,
    Path(device_id): Path<i64>,
    Json(body): Json<RecordReadingRequest>,
) -> Result<Json<EnergyReadingResponse>, ApiError> {
    if body.value <= 0.0 {
        return Err(ReadingError::InvalidValue.into());
    }

    let (device, reading) = state
        .energy_data_service
        .record_reading(device_id, body.value)
        .await?;

    Ok(Json(EnergyReadingResponse::from_parts(&device, reading)))
}

pub async fn get_readings(
    State(state): State<ReadingState>,
    Path(device_id): Path<i64>,
    Query(range): Query<TimeRangeQuery>,
) -> Result<Json<Vec<EnergyReadingResponse>>, ApiError> {
    let readings = match state
        .energy_data_service
        .get_readings_in_range(device_id, range.start_date, range.end_date)
        .await?
    {
        Some((device, readings)) => readings
            .into_iter()
            .map(|reading| EnergyReadingResponse::from_parts(&device, reading))
            .collect(),
        // An unknown device reads as an empty history here, not a 404
        None => Vec::new(),
    };

    Ok(Json(readings))
}

pub async fn get_latest_reading(
    State(state): State<ReadingState>,
    Path(device_id): Path<i64>,
) -> Result<Json<EnergyReadingResponse>, ApiError> {
    let (device, reading) = state
        .energy_data_service
        .get_latest_reading(device_id)
        .await?
        .ok_or(ReadingError::NoReadings)?;

    Ok(Json(EnergyReadingResponse::from_parts(&device, reading)))
}

pub async fn get_average_consumption(
    State(state): State<ReadingState>,
    Path(device_id): Path<i64>,
) -> Result<Json<f64>, ApiError> {
    let average = state
        .energy_data_service
        .get_average_consumption(device_id)
        .await?
        .ok_or(ReadingError::NoReadings)?;

    Ok(Json(average))
}
