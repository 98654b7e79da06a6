use std::sync::Arc;

use anyhow::anyhow;
use time::OffsetDateTime;

use crate::errors::{ApiError, ReadingError};
use crate::models::{Device, EnergyReading};
use crate::repositories::{DeviceRepository, EnergyDataRepository};

/// Owns the append-only reading history and keeps the device's cached
/// last-reading fields in sync with it.
pub struct EnergyDataService {
    energy_data_repository: Arc<EnergyDataRepository>,
    device_repository: Arc<DeviceRepository>,
}

impl EnergyDataService {
    pub fn new(
        energy_data_repository: Arc<EnergyDataRepository>,
        device_repository: Arc<DeviceRepository>,
    ) -> Self {
        Self {
            energy_data_repository,
            device_repository,
        }
    }

    /// Appends a reading and refreshes the owning device's cache in one
    /// transaction. Neither effect is visible without the other.
    pub async fn record_reading(
        &self,
        device_id: i64,
        value: f64,
    ) -> Result<(Device, EnergyReading), ApiError> {
        tracing::info!("recording energy reading for device {}", device_id);

        self.device_repository
            .find_by_id(device_id)
            .await?
            .ok_or(ReadingError::DeviceNotFound)?;

        let now = OffsetDateTime::now_utc();
        let reading = EnergyReading {
            id: 0,
            device_id,
            energy_consumed: value,
            timestamp: now,
        };

        let mut tx = self.energy_data_repository.get_pool().begin().await?;
        let reading_id = self.energy_data_repository.create(&reading, &mut tx).await?;
        self.device_repository
            .update_last_reading(device_id, value, now, &mut tx)
            .await?;
        tx.commit().await?;

        let reading = self
            .energy_data_repository
            .find_by_id(reading_id)
            .await?
            .ok_or_else(|| anyhow!("reading {reading_id} missing after commit"))?;
        let device = self
            .device_repository
            .find_by_id(device_id)
            .await?
            .ok_or(ReadingError::DeviceNotFound)?;

        Ok((device, reading))
    }

    /// Readings with `start <= timestamp <= end`, oldest first. A missing
    /// device reads as an empty history rather than an error, matching the
    /// upstream API contract.
    pub async fn get_readings_in_range(
        &self,
        device_id: i64,
        start_time: OffsetDateTime,
        end_time: OffsetDateTime,
    ) -> Result<Option<(Device, Vec<EnergyReading>)>, ApiError> {
        let Some(device) = self.device_repository.find_by_id(device_id).await? else {
            tracing::warn!("device {} not found", device_id);
            return Ok(None);
        };

        let readings = self
            .energy_data_repository
            .find_by_device_id_and_time_range(device_id, start_time, end_time)
            .await?;

        Ok(Some((device, readings)))
    }

    /// Newest reading for the device, or none when the history is empty.
    pub async fn get_latest_reading(
        &self,
        device_id: i64,
    ) -> Result<Option<(Device, EnergyReading)>, ApiError> {
        let device = self
            .device_repository
            .find_by_id(device_id)
            .await?
            .ok_or(ReadingError::DeviceNotFound)?;

        let latest = self
            .energy_data_repository
            .find_latest_by_device_id(device_id)
            .await?;

        Ok(latest.map(|reading| (device, reading)))
    }

    /// Arithmetic mean over the whole history, or none when no readings
    /// exist. Never zero for an empty history.
    pub async fn get_average_consumption(&self, device_id: i64) -> Result<Option<f64>, ApiError> {
        self.device_repository
            .find_by_id(device_id)
            .await?
            .ok_or(ReadingError::DeviceNotFound)?;

        Ok(self
            .energy_data_repository
            .average_by_device_id(device_id)
            .await?)
    }
}
