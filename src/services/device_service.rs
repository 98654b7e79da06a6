use std::sync::Arc;

use time::OffsetDateTime;

use crate::errors::{ApiError, DeviceError};
use crate::models::{Device, DeviceStatus};
use crate::repositories::{DeviceRepository, EnergyDataRepository};

/// Owns device identity and status lifecycle.
pub struct DeviceService {
    device_repository: Arc<DeviceRepository>,
    energy_data_repository: Arc<EnergyDataRepository>,
}

impl DeviceService {
    pub fn new(
        device_repository: Arc<DeviceRepository>,
        energy_data_repository: Arc<EnergyDataRepository>,
    ) -> Self {
        Self {
            device_repository,
            energy_data_repository,
        }
    }

    pub async fn register_device(
        &self,
        serial_number: &str,
        device_type: &str,
    ) -> Result<Device, ApiError> {
        tracing::info!("registering device with serial number {}", serial_number);

        if self
            .device_repository
            .find_by_serial_number(serial_number)
            .await?
            .is_some()
        {
            tracing::warn!("device with serial number {} already exists", serial_number);
            return Err(DeviceError::SerialNumberExists.into());
        }

        let device = Device {
            id: 0,
            serial_number: serial_number.to_string(),
            device_type: device_type.to_string(),
            status: DeviceStatus::Active,
            last_report_time: Some(OffsetDateTime::now_utc()),
            last_energy_reading: None,
        };

        let mut tx = self.device_repository.get_pool().begin().await?;

        // The UNIQUE column is the authoritative guard; the pre-check above
        // can race with a concurrent registration.
        let id = match self.device_repository.create(&device, &mut tx).await {
            Ok(id) => id,
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                tracing::warn!("lost registration race for serial number {}", serial_number);
                return Err(DeviceError::SerialNumberExists.into());
            }
            Err(e) => return Err(e.into()),
        };

        tx.commit().await?;

        tracing::info!("device registered with id {}", id);

        self.device_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| DeviceError::DeviceNotFound.into())
    }

    pub async fn get_device_by_id(&self, id: i64) -> Result<Device, ApiError> {
        self.device_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| DeviceError::DeviceNotFound.into())
    }

    pub async fn get_all_devices(&self) -> Result<Vec<Device>, ApiError> {
        Ok(self.device_repository.find_all().await?)
    }

    pub async fn get_devices_by_status(
        &self,
        status: DeviceStatus,
    ) -> Result<Vec<Device>, ApiError> {
        Ok(self.device_repository.find_by_status(status).await?)
    }

    pub async fn update_device_status(
        &self,
        id: i64,
        status: DeviceStatus,
    ) -> Result<Device, ApiError> {
        tracing::info!("updating status for device {}", id);

        self.device_repository
            .find_by_id(id)
            .await?
            .ok_or(DeviceError::DeviceNotFound)?;

        let mut tx = self.device_repository.get_pool().begin().await?;
        self.device_repository
            .update_status(id, status, OffsetDateTime::now_utc(), &mut tx)
            .await?;
        tx.commit().await?;

        self.device_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| DeviceError::DeviceNotFound.into())
    }

    /// Overwrites the device type and optionally renames the serial number.
    /// A rename to the serial the device already owns is a no-op.
    pub async fn update_device(
        &self,
        id: i64,
        device_type: &str,
        serial_number: Option<&str>,
    ) -> Result<Device, ApiError> {
        tracing::info!("updating device {}", id);

        let device = self
            .device_repository
            .find_by_id(id)
            .await?
            .ok_or(DeviceError::DeviceNotFound)?;

        let serial = match serial_number {
            Some(requested) if requested != device.serial_number => {
                if self
                    .device_repository
                    .find_by_serial_number(requested)
                    .await?
                    .is_some()
                {
                    tracing::warn!("device with serial number {} already exists", requested);
                    return Err(DeviceError::SerialNumberExists.into());
                }
                requested
            }
            _ => device.serial_number.as_str(),
        };

        let mut tx = self.device_repository.get_pool().begin().await?;
        match self
            .device_repository
            .update_info(id, device_type, serial, &mut tx)
            .await
        {
            Ok(()) => {}
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(DeviceError::SerialNumberExists.into());
            }
            Err(e) => return Err(e.into()),
        }
        tx.commit().await?;

        self.device_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| DeviceError::DeviceNotFound.into())
    }

    /// Returns false when the device does not exist. Deleting a device also
    /// drops its reading history in the same transaction.
    pub async fn delete_device(&self, id: i64) -> Result<bool, ApiError> {
        tracing::info!("deleting device {}", id);

        if self.device_repository.find_by_id(id).await?.is_none() {
            tracing::warn!("device {} not found", id);
            return Ok(false);
        }

        let mut tx = self.device_repository.get_pool().begin().await?;
        let readings = self
            .energy_data_repository
            .delete_by_device_id(id, &mut tx)
            .await?;
        self.device_repository.delete(id, &mut tx).await?;
        tx.commit().await?;

        tracing::info!("deleted device {} and {} readings", id, readings);
        Ok(true)
    }
}
