use ndarray::{Array1, Array2, Axis};
use serde::Deserialize;

use crate::{MlErr, Result};

/// A labeled dataset held in memory, one row of features per example.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawDataset")]
pub struct Dataset {
    x: Array2<f32>,
    y: Array1<usize>,
}

/// The on-disk form of a `Dataset`: a row-major feature buffer plus one label per row.
#[derive(Deserialize)]
struct RawDataset {
    x: Vec<f32>,
    labels: Vec<usize>,
    x_size: usize,
}

impl TryFrom<RawDataset> for Dataset {
    type Error = MlErr;

    fn try_from(raw: RawDataset) -> Result<Self> {
        Self::new(raw.x, raw.labels, raw.x_size)
    }
}

impl Dataset {
    /// Creates a new `Dataset`.
    ///
    /// # Arguments
    /// * `x` - The features of every example, laid out row after row.
    /// * `labels` - The class index of every example.
    /// * `x_size` - The amount of features per example.
    ///
    /// # Returns
    /// A new `Dataset` or an error if the buffers don't describe the same amount of rows.
    pub fn new(x: Vec<f32>, labels: Vec<usize>, x_size: usize) -> Result<Self> {
        if x_size == 0 {
            return Err(MlErr::InvalidSpec("x_size must be greater than 0".into()));
        }

        let expected = labels.len() * x_size;
        if x.len() != expected {
            return Err(MlErr::SizeMismatch {
                what: "dataset features",
                got: x.len(),
                expected,
            });
        }

        Ok(Self {
            x: Array2::from_shape_vec((labels.len(), x_size), x)?,
            y: Array1::from_vec(labels),
        })
    }

    /// Returns the amount of examples.
    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// Returns the amount of features per example.
    pub fn x_size(&self) -> usize {
        self.x.ncols()
    }

    /// Gathers the examples at `rows`, in that order.
    pub(super) fn select(&self, rows: &[usize]) -> (Array2<f32>, Array1<usize>) {
        (self.x.select(Axis(0), rows), self.y.select(Axis(0), rows))
    }
}
