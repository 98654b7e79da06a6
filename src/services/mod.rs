mod device_service;
mod energy_data_service;

pub use device_service::*;
pub use energy_data_service::*;
