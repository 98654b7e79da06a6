use std::sync::Arc;

use sqlx::{Error, Sqlite, SqlitePool, Transaction};
use time::OffsetDateTime;

use crate::configs::Storage;
use crate::models::EnergyReading;

pub struct EnergyDataRepository {
    storage: Arc<Storage>,
}

impl EnergyDataRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub fn get_pool(&self) -> &SqlitePool {
        self.storage.get_pool()
    }
}

impl EnergyDataRepository {
    // Append a reading to the history
    pub async fn create(
        &self,
        item: &EnergyReading,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<i64, Error> {
        let id = sqlx::query(
            r#"
            INSERT INTO energy_data (device_id, energy_consumed, timestamp)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(item.device_id)
        .bind(item.energy_consumed)
        .bind(item.timestamp)
        .execute(&mut **transaction)
        .await?
        .last_insert_rowid();

        Ok(id)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<EnergyReading>, Error> {
        let reading: Option<EnergyReading> =
            sqlx::query_as("SELECT * FROM energy_data WHERE id = $1")
                .bind(id)
                .fetch_optional(self.storage.get_pool())
                .await?;

        Ok(reading)
    }

    // Readings within an inclusive time range, oldest first
    pub async fn find_by_device_id_and_time_range(
        &self,
        device_id: i64,
        start_time: OffsetDateTime,
        end_time: OffsetDateTime,
    ) -> Result<Vec<EnergyReading>, Error> {
        let readings: Vec<EnergyReading> = sqlx::query_as(
            r#"
            SELECT * FROM energy_data
            WHERE device_id = $1 AND timestamp >= $2 AND timestamp <= $3
            ORDER BY timestamp ASC, id ASC
            "#,
        )
        .bind(device_id)
        .bind(start_time)
        .bind(end_time)
        .fetch_all(self.storage.get_pool())
        .await?;

        Ok(readings)
    }

    // Newest reading; id breaks ties between equal timestamps so the result
    // is deterministic.
    pub async fn find_latest_by_device_id(
        &self,
        device_id: i64,
    ) -> Result<Option<EnergyReading>, Error> {
        let reading: Option<EnergyReading> = sqlx::query_as(
            r#"
            SELECT * FROM energy_data
            WHERE device_id = $1
            ORDER BY timestamp DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(device_id)
        .fetch_optional(self.storage.get_pool())
        .await?;

        Ok(reading)
    }

    // NULL when the device has no readings, never zero
    pub async fn average_by_device_id(&self, device_id: i64) -> Result<Option<f64>, Error> {
        let average: Option<f64> =
            sqlx::query_scalar("SELECT AVG(energy_consumed) FROM energy_data WHERE device_id = $1")
                .bind(device_id)
                .fetch_one(self.storage.get_pool())
                .await?;

        Ok(average)
    }

    pub async fn delete_by_device_id(
        &self,
        device_id: i64,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<u64, Error> {
        let result = sqlx::query("DELETE FROM energy_data WHERE device_id = $1")
            .bind(device_id)
            .execute(&mut **transaction)
            .await?;

        Ok(result.rows_affected())
    }
}
