use super::{History, PhaseMetrics, Reporter};
use crate::Result;

/// A fully assembled training run, with its model and data hidden behind the trait.
pub trait Trainer {
    /// Runs every configured epoch, reporting each one as it ends.
    fn train(&mut self, reporter: &mut dyn Reporter) -> Result<History>;

    /// Evaluates the model on the held-out data without training it.
    fn evaluate(&mut self) -> Result<PhaseMetrics>;

    /// Returns the model's current parameters.
    fn params(&self) -> &[f32];
}
