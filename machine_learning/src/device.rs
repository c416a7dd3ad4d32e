use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// Where tensor computation takes place.
///
/// Models and the batches fed to them must agree on the device before a forward pass. This
/// build only computes on the host, accelerator devices are accepted as tokens but report
/// themselves as unavailable.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Device {
    #[default]
    Cpu,
    Cuda(usize),
}

impl Device {
    /// Returns whether tensors can be placed on this device.
    pub fn is_available(&self) -> bool {
        matches!(self, Device::Cpu)
    }
}

impl Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => write!(f, "cpu"),
            Device::Cuda(ordinal) => write!(f, "cuda:{ordinal}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_host_is_available() {
        assert!(Device::Cpu.is_available());
        assert!(!Device::Cuda(0).is_available());
    }

    #[test]
    fn display_matches_the_usual_notation() {
        assert_eq!(Device::Cpu.to_string(), "cpu");
        assert_eq!(Device::Cuda(1).to_string(), "cuda:1");
    }
}
