use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

use super::{LossFn, check_labels, one_hot};
use crate::Result;

/// Normalizes every row of scores into a probability distribution.
pub fn softmax(scores: ArrayView2<f32>) -> Array2<f32> {
    let mut p = scores.to_owned();

    for mut row in p.rows_mut() {
        let max = row.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
        row.mapv_inplace(|v| (v - max).exp());
        let sum = row.sum();
        row.mapv_inplace(|v| v / sum);
    }

    p
}

/// Softmax followed by the negative log-likelihood of the true class, averaged over the batch.
///
/// Takes raw scores (logits), not probabilities.
#[derive(Debug, Default, Clone, Copy)]
pub struct CrossEntropy;

impl CrossEntropy {
    /// Returns a new `CrossEntropy`.
    pub fn new() -> Self {
        Self
    }
}

impl LossFn for CrossEntropy {
    fn loss(&self, y_pred: ArrayView2<f32>, y: ArrayView1<usize>) -> Result<f32> {
        check_labels(y_pred, y)?;

        let total: f32 = y_pred
            .axis_iter(Axis(0))
            .zip(y)
            .map(|(row, &label)| {
                let max = row.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
                let log_sum_exp = row.mapv(|v| (v - max).exp()).sum().ln() + max;
                log_sum_exp - row[label]
            })
            .sum();

        Ok(total / y.len() as f32)
    }

    fn loss_prime(&self, y_pred: ArrayView2<f32>, y: ArrayView1<usize>) -> Result<Array2<f32>> {
        check_labels(y_pred, y)?;

        let n = y.len() as f32;
        let t = one_hot(y, y_pred.ncols());
        Ok((softmax(y_pred) - t) / n)
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn softmax_rows_sum_to_one() {
        let p = softmax(array![[1., 2., 3.], [1000., 1000., 1000.]].view());

        for row in p.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-6);
        }
        assert!((p[[1, 0]] - 1. / 3.).abs() < 1e-6);
        assert!(p[[0, 2]] > p[[0, 1]] && p[[0, 1]] > p[[0, 0]]);
    }

    #[test]
    fn uniform_scores_give_log_of_the_class_count() {
        let y_pred = Array2::zeros((3, 4));
        let y = array![0, 1, 3];

        let loss = CrossEntropy.loss(y_pred.view(), y.view()).unwrap();
        assert!((loss - 4f32.ln()).abs() < 1e-6);
    }

    #[test]
    fn gradient_matches_finite_differences() {
        let y_pred = array![[0.3, -1.2, 2.0], [0.5, 0.1, -0.4]];
        let y = array![2, 0];
        let grad = CrossEntropy.loss_prime(y_pred.view(), y.view()).unwrap();
        let h = 1e-2;

        for ((i, j), &g) in grad.indexed_iter() {
            let mut plus = y_pred.clone();
            let mut minus = y_pred.clone();
            plus[[i, j]] += h;
            minus[[i, j]] -= h;

            let numeric = (CrossEntropy.loss(plus.view(), y.view()).unwrap()
                - CrossEntropy.loss(minus.view(), y.view()).unwrap())
                / (2. * h);

            assert!((numeric - g).abs() < 1e-3, "({i}, {j}): {numeric} vs {g}");
        }
    }

    #[test]
    fn empty_batches_are_rejected() {
        let y_pred = Array2::<f32>::zeros((0, 2));
        let y = ndarray::Array1::<usize>::zeros(0);

        assert!(CrossEntropy.loss(y_pred.view(), y.view()).is_err());
    }
}
