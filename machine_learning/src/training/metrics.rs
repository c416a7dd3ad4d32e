use ndarray::{ArrayView1, ArrayView2};
use serde::Serialize;

use super::Phase;
use crate::{MlErr, Result};

/// The mean loss and accuracy of one pass over a batch source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhaseMetrics {
    pub loss: f32,
    pub accuracy: f32,
}

/// What a single epoch produced, handed to a `Reporter` as soon as the epoch ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EpochMetrics {
    pub epoch: usize,
    pub train: PhaseMetrics,
    pub test: PhaseMetrics,
}

/// Running sums of per-batch loss and accuracy for one phase of one epoch.
///
/// The mean is taken over batches, not examples, so a smaller final batch weighs as much as a
/// full one. Sums are kept in `f64` and narrowed once when taking the mean.
#[derive(Debug, Default)]
pub struct MetricsAccumulator {
    loss: f64,
    accuracy: f64,
    batches: usize,
}

impl MetricsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the metrics of one batch.
    pub fn add(&mut self, loss: f32, accuracy: f32) {
        self.loss += f64::from(loss);
        self.accuracy += f64::from(accuracy);
        self.batches += 1;
    }

    /// Returns the amount of batches added so far.
    pub fn batches(&self) -> usize {
        self.batches
    }

    /// Consumes the accumulator and divides each sum by the amount of batches.
    ///
    /// # Arguments
    /// * `phase` - The phase the sums belong to, used for reporting an empty pass.
    ///
    /// # Errors
    /// `MlErr::EmptyBatchSource` if no batch was added.
    pub fn mean(self, phase: Phase) -> Result<PhaseMetrics> {
        if self.batches == 0 {
            return Err(MlErr::EmptyBatchSource { phase });
        }

        let n = self.batches as f64;
        Ok(PhaseMetrics {
            loss: (self.loss / n) as f32,
            accuracy: (self.accuracy / n) as f32,
        })
    }
}

/// The fraction of rows whose highest score sits at the row's label.
///
/// Ties go to the lowest class index. `scores` must have one row per label and must not be
/// empty, which the loss functions check before this is called.
pub fn batch_accuracy(scores: ArrayView2<f32>, y: ArrayView1<usize>) -> f32 {
    let hits = scores
        .rows()
        .into_iter()
        .zip(y)
        .filter(|(row, label)| argmax(*row) == **label)
        .count();

    hits as f32 / y.len() as f32
}

fn argmax(row: ArrayView1<f32>) -> usize {
    let mut best = 0;

    for (i, &v) in row.iter().enumerate().skip(1) {
        if v > row[best] {
            best = i;
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn mean_of_batch_means() {
        let mut acc = MetricsAccumulator::new();
        acc.add(1.0, 1.0);
        acc.add(3.0, 0.0);

        let metrics = acc.mean(Phase::Train).unwrap();
        assert_eq!(metrics, PhaseMetrics { loss: 2.0, accuracy: 0.5 });
    }

    #[test]
    fn long_passes_keep_their_precision() {
        let mut acc = MetricsAccumulator::new();
        for _ in 0..1_000_000 {
            acc.add(0.1, 0.3);
        }

        let metrics = acc.mean(Phase::Train).unwrap();
        assert_eq!(metrics.loss, 0.1);
        assert_eq!(metrics.accuracy, 0.3);
    }

    #[test]
    fn empty_pass_is_an_error() {
        assert!(matches!(
            MetricsAccumulator::new().mean(Phase::Test),
            Err(MlErr::EmptyBatchSource { phase: Phase::Test })
        ));
    }

    #[test]
    fn accuracy_counts_argmax_hits() {
        let scores = array![[0.1, 0.9], [0.8, 0.2], [0.3, 0.7], [0.6, 0.4]];
        let y = array![1, 0, 0, 1];

        assert_eq!(batch_accuracy(scores.view(), y.view()), 0.5);
    }

    #[test]
    fn ties_go_to_the_first_class() {
        let scores = array![[0.5, 0.5, 0.1], [0.2, 0.7, 0.7]];
        let y = array![0, 1];

        assert_eq!(batch_accuracy(scores.view(), y.view()), 1.0);
    }
}
