use ndarray::{Array2, ArrayView1, ArrayView2};

use crate::Result;

/// Measures how far a model's per-class scores are from the true labels.
pub trait LossFn {
    /// Computes the scalar loss of a batch.
    ///
    /// # Arguments
    /// * `y_pred` - The model output, one row of class scores per example.
    /// * `y` - The true class of every example.
    ///
    /// # Returns
    /// The loss or an error if the labels don't fit the output.
    fn loss(&self, y_pred: ArrayView2<f32>, y: ArrayView1<usize>) -> Result<f32>;

    /// Computes the derivative of `loss` with respect to `y_pred`.
    fn loss_prime(&self, y_pred: ArrayView2<f32>, y: ArrayView1<usize>) -> Result<Array2<f32>>;
}
