use ndarray::{Array1, Array2};

use crate::{MlErr, Result, device::Device};

/// A group of examples processed together: one row of `x` per example and its class index in `y`.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub x: Array2<f32>,
    pub y: Array1<usize>,
    device: Device,
}

impl Batch {
    /// Creates a new `Batch` on the cpu.
    ///
    /// # Errors
    /// `MlErr::SizeMismatch` if `x` and `y` disagree on the amount of examples.
    pub fn new(x: Array2<f32>, y: Array1<usize>) -> Result<Self> {
        if x.nrows() != y.len() {
            return Err(MlErr::SizeMismatch {
                what: "batch labels",
                got: y.len(),
                expected: x.nrows(),
            });
        }

        Ok(Self::from_parts(x, y))
    }

    /// Creates a cpu `Batch` whose rows are already known to match its labels.
    pub(super) fn from_parts(x: Array2<f32>, y: Array1<usize>) -> Self {
        Self {
            x,
            y,
            device: Device::Cpu,
        }
    }

    /// Moves the batch to `device`.
    ///
    /// # Errors
    /// `MlErr::DeviceUnavailable` if the device can't hold tensors on this build.
    pub fn to(mut self, device: Device) -> Result<Self> {
        if !device.is_available() {
            return Err(MlErr::DeviceUnavailable(device));
        }

        self.device = device;
        Ok(self)
    }

    pub fn device(&self) -> Device {
        self.device
    }

    /// Returns the amount of examples in the batch.
    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }
}

/// Anything that can be traversed as a finite, ordered sequence of batches, once per pass.
pub trait BatchSource {
    /// Starts a new pass over the source.
    fn batches(&mut self) -> impl Iterator<Item = Batch> + '_;
}

impl BatchSource for Vec<Batch> {
    fn batches(&mut self) -> impl Iterator<Item = Batch> + '_ {
        self.iter().cloned()
    }
}
