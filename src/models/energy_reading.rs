use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::Table;

/// One immutable energy-consumption observation. Rows are appended by the
/// ledger and never updated.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EnergyReading {
    pub id: i64,
    pub device_id: i64,
    /// Energy consumed in kWh
    pub energy_consumed: f64,
    /// Assigned by the ledger at write time
    pub timestamp: OffsetDateTime,
}

#[derive(Clone)]
pub struct EnergyDataTable;

impl Table for EnergyDataTable {
    fn name(&self) -> &'static str {
        "energy_data"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS energy_data (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                device_id INTEGER NOT NULL,
                energy_consumed REAL NOT NULL,
                timestamp TIMESTAMP NOT NULL,
                FOREIGN KEY (device_id) REFERENCES devices (id) ON DELETE CASCADE
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS energy_data;")
    }
}
