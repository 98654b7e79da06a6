mod device;
mod energy_reading;

pub use device::{Device, DeviceStatus, DeviceTable};
pub use energy_reading::{EnergyDataTable, EnergyReading};

pub trait Table {
    /// The name of the table
    fn name(&self) -> &'static str;

    /// The SQL statement to create the table
    fn create(&self) -> String;

    /// The SQL statement to dispose the table
    fn dispose(&self) -> String;
}
