use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::Table;

/// Operational status of a registered device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum DeviceStatus {
    Active,
    Inactive,
    Maintenance,
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeviceStatus::Active => "ACTIVE",
            DeviceStatus::Inactive => "INACTIVE",
            DeviceStatus::Maintenance => "MAINTENANCE",
        };
        write!(f, "{s}")
    }
}

impl FromStr for DeviceStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(DeviceStatus::Active),
            "INACTIVE" => Ok(DeviceStatus::Inactive),
            "MAINTENANCE" => Ok(DeviceStatus::Maintenance),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Device {
    pub id: i64,
    pub serial_number: String,
    pub device_type: String,
    pub status: DeviceStatus,
    /// Time of the last reading or status change
    pub last_report_time: Option<OffsetDateTime>,
    /// Mirror of the most recently recorded reading value
    pub last_energy_reading: Option<f64>,
}

// Equality is the business key (id, serial_number), not the full row.
// The cached reading fields change on every report and must not affect
// identity in sets or maps.
impl PartialEq for Device {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.serial_number == other.serial_number
    }
}

impl Eq for Device {}

impl Hash for Device {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.serial_number.hash(state);
    }
}

#[derive(Clone)]
pub struct DeviceTable;

impl Table for DeviceTable {
    fn name(&self) -> &'static str {
        "devices"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS devices (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                serial_number VARCHAR(255) NOT NULL UNIQUE,
                device_type VARCHAR(255) NOT NULL,
                status VARCHAR(32) NOT NULL,
                last_report_time TIMESTAMP,
                last_energy_reading REAL
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS devices;")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(id: i64, serial: &str, reading: Option<f64>) -> Device {
        Device {
            id,
            serial_number: serial.to_string(),
            device_type: "SMART_METER".to_string(),
            status: DeviceStatus::Active,
            last_report_time: None,
            last_energy_reading: reading,
        }
    }

    #[test]
    fn test_equality_ignores_cached_fields() {
        let a = device(1, "DEV-1", None);
        let mut b = device(1, "DEV-1", Some(42.0));
        b.status = DeviceStatus::Maintenance;

        assert_eq!(a, b);
    }

    #[test]
    fn test_equality_requires_business_key() {
        assert_ne!(device(1, "DEV-1", None), device(2, "DEV-1", None));
        assert_ne!(device(1, "DEV-1", None), device(1, "DEV-2", None));
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            DeviceStatus::Active,
            DeviceStatus::Inactive,
            DeviceStatus::Maintenance,
        ] {
            assert_eq!(status.to_string().parse::<DeviceStatus>(), Ok(status));
        }
        assert!("active".parse::<DeviceStatus>().is_err());
        assert!("RETIRED".parse::<DeviceStatus>().is_err());
    }
}
