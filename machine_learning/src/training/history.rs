use serde::Serialize;

use super::EpochMetrics;

/// The per-epoch metrics of a whole run.
///
/// Every epoch is pushed at once, so the four sequences always have the same length.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct History {
    train_loss: Vec<f32>,
    train_acc: Vec<f32>,
    test_loss: Vec<f32>,
    test_acc: Vec<f32>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty `History` with room for `epochs` epochs.
    pub fn with_capacity(epochs: usize) -> Self {
        Self {
            train_loss: Vec::with_capacity(epochs),
            train_acc: Vec::with_capacity(epochs),
            test_loss: Vec::with_capacity(epochs),
            test_acc: Vec::with_capacity(epochs),
        }
    }

    /// Appends the metrics of one epoch.
    pub fn push(&mut self, metrics: &EpochMetrics) {
        self.train_loss.push(metrics.train.loss);
        self.train_acc.push(metrics.train.accuracy);
        self.test_loss.push(metrics.test.loss);
        self.test_acc.push(metrics.test.accuracy);
    }

    /// Returns the amount of epochs recorded.
    pub fn len(&self) -> usize {
        self.train_loss.len()
    }

    pub fn is_empty(&self) -> bool {
        self.train_loss.is_empty()
    }

    /// Looks a sequence up by its metric name.
    ///
    /// # Arguments
    /// * `key` - One of `train_loss`, `train_acc`, `test_loss` or `test_acc`.
    ///
    /// # Returns
    /// The per-epoch values, or `None` for an unknown key.
    pub fn get(&self, key: &str) -> Option<&[f32]> {
        let values = match key {
            "train_loss" => &self.train_loss,
            "train_acc" => &self.train_acc,
            "test_loss" => &self.test_loss,
            "test_acc" => &self.test_acc,
            _ => return None,
        };

        Some(values)
    }

    pub fn train_loss(&self) -> &[f32] {
        &self.train_loss
    }

    pub fn train_acc(&self) -> &[f32] {
        &self.train_acc
    }

    pub fn test_loss(&self) -> &[f32] {
        &self.test_loss
    }

    pub fn test_acc(&self) -> &[f32] {
        &self.test_acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::PhaseMetrics;

    fn epoch(epoch: usize, v: f32) -> EpochMetrics {
        let metrics = PhaseMetrics {
            loss: v,
            accuracy: v / 10.,
        };

        EpochMetrics {
            epoch,
            train: metrics,
            test: metrics,
        }
    }

    #[test]
    fn push_grows_every_sequence() {
        let mut history = History::new();
        history.push(&epoch(0, 2.));
        history.push(&epoch(1, 1.));

        assert_eq!(history.len(), 2);
        assert_eq!(history.get("train_loss"), Some(&[2., 1.][..]));
        assert_eq!(history.get("test_acc"), Some(&[0.2, 0.1][..]));
        assert_eq!(history.get("val_loss"), None);
    }

    #[test]
    fn serializes_to_the_four_keys() {
        let mut history = History::new();
        history.push(&epoch(0, 1.));

        let json = serde_json::to_value(&history).unwrap();
        let object = json.as_object().unwrap();

        let mut keys: Vec<_> = object.keys().map(String::as_str).collect();
        keys.sort();
        assert_eq!(keys, ["test_acc", "test_loss", "train_acc", "train_loss"]);
        assert_eq!(object["train_loss"], serde_json::json!([1.0]));
    }
}
