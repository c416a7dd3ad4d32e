mod cross_entropy;
mod loss_fn;
mod mse;

pub use cross_entropy::{CrossEntropy, softmax};
pub use loss_fn::LossFn;
pub use mse::Mse;

use ndarray::{Array2, ArrayView1, ArrayView2};

use crate::{MlErr, Result};

/// Checks that there's one label per prediction row and every label names an output class.
fn check_labels(y_pred: ArrayView2<f32>, y: ArrayView1<usize>) -> Result<()> {
    if y_pred.nrows() == 0 {
        return Err(MlErr::EmptyBatch);
    }

    if y.len() != y_pred.nrows() {
        return Err(MlErr::SizeMismatch {
            what: "labels",
            got: y.len(),
            expected: y_pred.nrows(),
        });
    }

    let classes = y_pred.ncols();
    match y.iter().find(|&&label| label >= classes) {
        Some(&label) => Err(MlErr::LabelOutOfRange { label, classes }),
        None => Ok(()),
    }
}

/// Expands class indices into one-hot rows of `classes` columns.
fn one_hot(y: ArrayView1<usize>, classes: usize) -> Array2<f32> {
    let mut t = Array2::zeros((y.len(), classes));

    for (mut row, &label) in t.rows_mut().into_iter().zip(y) {
        row[label] = 1.0;
    }

    t
}
