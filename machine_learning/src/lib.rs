pub mod arch;
pub mod dataset;
pub mod device;
pub mod error;
pub mod grad;
pub mod initialization;
pub mod optimization;
pub mod specs;
pub mod training;

pub use device::Device;
pub use error::{MlErr, Result};
