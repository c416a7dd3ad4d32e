use std::{
    error::Error,
    fmt::{self, Display},
};

use ndarray::ShapeError;

use crate::{device::Device, training::Phase};

/// The result type used in the entire machine learning module.
pub type Result<T> = std::result::Result<T, MlErr>;

/// The machine learning module's error type.
#[derive(Debug)]
pub enum MlErr {
    SizeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    LabelOutOfRange {
        label: usize,
        classes: usize,
    },
    EmptyBatchSource {
        phase: Phase,
    },
    EmptyBatch,
    DeviceUnavailable(Device),
    DeviceMismatch {
        model: Device,
        data: Device,
    },
    GradDisabled,
    MissingForwardPass {
        layer: &'static str,
    },
    InvalidSpec(String),
    Shape(ShapeError),
    Distribution(String),
}

impl Display for MlErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MlErr::SizeMismatch {
                what,
                got,
                expected,
            } => write!(
                f,
                "There's a size mismatch for {what}, got {got} and expected {expected}"
            ),
            MlErr::LabelOutOfRange { label, classes } => write!(
                f,
                "Label {label} is out of range for an output of {classes} classes"
            ),
            MlErr::EmptyBatchSource { phase } => {
                write!(f, "The {phase} batch source yielded no batches")
            }
            MlErr::EmptyBatch => write!(f, "Received a batch without examples"),
            MlErr::DeviceUnavailable(device) => {
                write!(f, "The device {device} is not available on this build")
            }
            MlErr::DeviceMismatch { model, data } => write!(
                f,
                "The model lives on {model} but the data was placed on {data}"
            ),
            MlErr::GradDisabled => {
                write!(f, "Tried to run a backward pass while gradients are disabled")
            }
            MlErr::MissingForwardPass { layer } => write!(
                f,
                "Tried to run a backward pass through a {layer} layer without a recorded forward pass"
            ),
            MlErr::InvalidSpec(msg) => write!(f, "Invalid specification: {msg}"),
            MlErr::Shape(e) => write!(f, "Shape error: {e}"),
            MlErr::Distribution(msg) => write!(f, "Invalid distribution: {msg}"),
        }
    }
}

impl Error for MlErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MlErr::Shape(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ShapeError> for MlErr {
    fn from(value: ShapeError) -> Self {
        Self::Shape(value)
    }
}

impl From<rand_distr::NormalError> for MlErr {
    fn from(value: rand_distr::NormalError) -> Self {
        Self::Distribution(value.to_string())
    }
}

impl From<rand_distr::uniform::Error> for MlErr {
    fn from(value: rand_distr::uniform::Error) -> Self {
        Self::Distribution(value.to_string())
    }
}
