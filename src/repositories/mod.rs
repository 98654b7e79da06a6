mod device;
mod energy_data;

pub use device::DeviceRepository;
pub use energy_data::EnergyDataRepository;
