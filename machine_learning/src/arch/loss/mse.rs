use ndarray::{Array2, ArrayView1, ArrayView2};

use super::{LossFn, check_labels, one_hot};
use crate::Result;

/// Mean squared error between the class scores and the one-hot encoded labels.
#[derive(Debug, Default, Clone, Copy)]
pub struct Mse;

impl Mse {
    /// Returns a new `Mse`.
    pub fn new() -> Self {
        Self
    }
}

impl LossFn for Mse {
    fn loss(&self, y_pred: ArrayView2<f32>, y: ArrayView1<usize>) -> Result<f32> {
        check_labels(y_pred, y)?;
        let t = one_hot(y, y_pred.ncols());

        Ok((&y_pred - &t)
            .mapv(|x| x.powi(2))
            .mean()
            .unwrap_or_default())
    }

    fn loss_prime(&self, y_pred: ArrayView2<f32>, y: ArrayView1<usize>) -> Result<Array2<f32>> {
        check_labels(y_pred, y)?;
        let t = one_hot(y, y_pred.ncols());

        Ok((&y_pred - &t) * (2.0 / y_pred.len() as f32))
    }
}
