mod device_handle;
mod reading_handle;

pub use device_handle::*;
pub use reading_handle::*;
