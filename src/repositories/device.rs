use std::sync::Arc;

use sqlx::{Error, Sqlite, SqlitePool, Transaction};
use time::OffsetDateTime;

use crate::configs::Storage;
use crate::models::{Device, DeviceStatus};

pub struct DeviceRepository {
    storage: Arc<Storage>,
}

impl DeviceRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub fn get_pool(&self) -> &SqlitePool {
        self.storage.get_pool()
    }
}

impl DeviceRepository {
    pub async fn create(
        &self,
        item: &Device,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<i64, Error> {
        let id = sqlx::query(
            r#"
            INSERT INTO devices (serial_number, device_type, status, last_report_time, last_energy_reading)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&item.serial_number)
        .bind(&item.device_type)
        .bind(item.status)
        .bind(item.last_report_time)
        .bind(item.last_energy_reading)
        .execute(&mut **transaction)
        .await?
        .last_insert_rowid();

        Ok(id)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Device>, Error> {
        let device: Option<Device> = sqlx::query_as("SELECT * FROM devices WHERE id = $1")
            .bind(id)
            .fetch_optional(self.storage.get_pool())
            .await?;

        Ok(device)
    }

    pub async fn find_by_serial_number(&self, serial_number: &str) -> Result<Option<Device>, Error> {
        let device: Option<Device> =
            sqlx::query_as("SELECT * FROM devices WHERE serial_number = $1")
                .bind(serial_number)
                .fetch_optional(self.storage.get_pool())
                .await?;

        Ok(device)
    }

    pub async fn find_all(&self) -> Result<Vec<Device>, Error> {
        let devices: Vec<Device> = sqlx::query_as("SELECT * FROM devices")
            .fetch_all(self.storage.get_pool())
            .await?;

        Ok(devices)
    }

    pub async fn find_by_status(&self, status: DeviceStatus) -> Result<Vec<Device>, Error> {
        let devices: Vec<Device> = sqlx::query_as("SELECT * FROM devices WHERE status = $1")
            .bind(status)
            .fetch_all(self.storage.get_pool())
            .await?;

        Ok(devices)
    }

    // Overwrites classification and serial only; status and the cached
    // reading fields are left untouched.
    pub async fn update_info(
        &self,
        id: i64,
        device_type: &str,
        serial_number: &str,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE devices
            SET device_type = $1, serial_number = $2
            WHERE id = $3
            "#,
        )
        .bind(device_type)
        .bind(serial_number)
        .bind(id)
        .execute(&mut **transaction)
        .await?;

        Ok(())
    }

    pub async fn update_status(
        &self,
        id: i64,
        status: DeviceStatus,
        report_time: OffsetDateTime,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE devices
            SET status = $1, last_report_time = $2
            WHERE id = $3
            "#,
        )
        .bind(status)
        .bind(report_time)
        .bind(id)
        .execute(&mut **transaction)
        .await?;

        Ok(())
    }

    pub async fn update_last_reading(
        &self,
        id: i64,
        value: f64,
        report_time: OffsetDateTime,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE devices
            SET last_energy_reading = $1, last_report_time = $2
            WHERE id = $3
            "#,
        )
        .bind(value)
        .bind(report_time)
        .bind(id)
        .execute(&mut **transaction)
        .await?;

        Ok(())
    }

    pub async fn delete(
        &self,
        id: i64,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<u64, Error> {
        let result = sqlx::query("DELETE FROM devices WHERE id = $1")
            .bind(id)
            .execute(&mut **transaction)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;

    use crate::configs::{Database, SchemaManager};

    use super::*;

    async fn setup_test_db() -> Arc<Storage> {
        Arc::new(
            Storage::new(
                Database {
                    clean_start: true,
                    url: String::from("sqlite::memory:"),
                },
                SchemaManager::default(),
            )
            .await
            .unwrap(),
        )
    }

    fn test_device(serial: &str) -> Device {
        Device {
            id: 0,
            serial_number: serial.to_string(),
            device_type: "SMART_METER".to_string(),
            status: DeviceStatus::Active,
            last_report_time: Some(OffsetDateTime::now_utc()),
            last_energy_reading: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_find_device() {
        let storage = setup_test_db().await;
        let repo = DeviceRepository::new(storage.clone());

        let mut tx = storage.get_pool().begin().await.unwrap();
        let id = repo.create(&test_device("DEV-1"), &mut tx).await.unwrap();
        tx.commit().await.unwrap();

        let found = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.serial_number, "DEV-1");
        assert_eq!(found.status, DeviceStatus::Active);
        assert_eq!(found.last_energy_reading, None);

        let by_serial = repo.find_by_serial_number("DEV-1").await.unwrap();
        assert!(by_serial.is_some());
        assert!(repo.find_by_serial_number("DEV-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_serial_rejected_by_constraint() {
        let storage = setup_test_db().await;
        let repo = DeviceRepository::new(storage.clone());

        let mut tx = storage.get_pool().begin().await.unwrap();
        repo.create(&test_device("DEV-1"), &mut tx).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = storage.get_pool().begin().await.unwrap();
        let err = repo.create(&test_device("DEV-1"), &mut tx).await.unwrap_err();

        match err {
            Error::Database(db) => assert!(db.is_unique_violation()),
            other => panic!("expected unique violation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_find_by_status() {
        let storage = setup_test_db().await;
        let repo = DeviceRepository::new(storage.clone());

        let mut tx = storage.get_pool().begin().await.unwrap();
        let first = repo.create(&test_device("DEV-1"), &mut tx).await.unwrap();
        repo.create(&test_device("DEV-2"), &mut tx).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = storage.get_pool().begin().await.unwrap();
        repo.update_status(
            first,
            DeviceStatus::Maintenance,
            OffsetDateTime::now_utc(),
            &mut tx,
        )
        .await
        .unwrap();
        tx.commit().await.unwrap();

        let maintenance = repo.find_by_status(DeviceStatus::Maintenance).await.unwrap();
        assert_eq!(maintenance.len(), 1);
        assert_eq!(maintenance[0].id, first);

        let active = repo.find_by_status(DeviceStatus::Active).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].serial_number, "DEV-2");
    }

    #[tokio::test]
    async fn test_update_last_reading() {
        let storage = setup_test_db().await;
        let repo = DeviceRepository::new(storage.clone());

        let mut tx = storage.get_pool().begin().await.unwrap();
        let id = repo.create(&test_device("DEV-1"), &mut tx).await.unwrap();
        tx.commit().await.unwrap();

        let report_time = OffsetDateTime::now_utc();
        let mut tx = storage.get_pool().begin().await.unwrap();
        repo.update_last_reading(id, 120.5, report_time, &mut tx)
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let found = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.last_energy_reading, Some(120.5));
        assert!(found.last_report_time.is_some());
        assert_eq!(found.status, DeviceStatus::Active);
    }

    #[tokio::test]
    async fn test_delete_reports_rows_affected() {
        let storage = setup_test_db().await;
        let repo = DeviceRepository::new(storage.clone());

        let mut tx = storage.get_pool().begin().await.unwrap();
        let id = repo.create(&test_device("DEV-1"), &mut tx).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = storage.get_pool().begin().await.unwrap();
        assert_eq!(repo.delete(id, &mut tx).await.unwrap(), 1);
        assert_eq!(repo.delete(id, &mut tx).await.unwrap(), 0);
        tx.commit().await.unwrap();

        assert!(repo.find_by_id(id).await.unwrap().is_none());
    }
}
