use log::info;

use super::{EpochMetrics, History};

/// Receives the progress of a run as it happens.
pub trait Reporter {
    /// Called once before the first epoch.
    fn on_start(&mut self, _epochs: usize) {}

    /// Called right after each epoch's train and test phases finish.
    fn on_epoch(&mut self, metrics: &EpochMetrics);

    /// Called once after the last epoch with the complete history.
    fn on_finish(&mut self, _history: &History) {}
}

/// Writes one progress line per epoch through `log`.
#[derive(Debug, Default)]
pub struct LogReporter {
    epochs: usize,
}

impl LogReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Reporter for LogReporter {
    fn on_start(&mut self, epochs: usize) {
        self.epochs = epochs;
        info!(epochs = epochs; "starting training");
    }

    fn on_epoch(&mut self, metrics: &EpochMetrics) {
        info!(epoch = metrics.epoch; "{}", progress_line(metrics, self.epochs));
    }

    fn on_finish(&mut self, history: &History) {
        info!(epochs = history.len(); "training finished");
    }
}

/// Renders the progress line of an epoch out of `epochs`, with the metrics at full precision.
pub fn progress_line(metrics: &EpochMetrics, epochs: usize) -> String {
    let EpochMetrics { epoch, train, test } = metrics;

    format!(
        "[{}/{epochs}] Epoch: {epoch} | Train Loss: {} | Train acc: {} | Test Loss: {} | Test acc: {}",
        epoch + 1,
        train.loss,
        train.accuracy,
        test.loss,
        test.accuracy,
    )
}

/// Discards every report.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl Reporter for NoopReporter {
    fn on_epoch(&mut self, _metrics: &EpochMetrics) {}
}

impl<F> Reporter for F
where
    F: FnMut(&EpochMetrics),
{
    fn on_epoch(&mut self, metrics: &EpochMetrics) {
        self(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::PhaseMetrics;

    #[test]
    fn progress_line_keeps_full_precision() {
        let metrics = EpochMetrics {
            epoch: 1,
            train: PhaseMetrics {
                loss: 0.123456,
                accuracy: 0.75,
            },
            test: PhaseMetrics {
                loss: 0.5,
                accuracy: 0.3333,
            },
        };

        assert_eq!(
            progress_line(&metrics, 5),
            "[2/5] Epoch: 1 | Train Loss: 0.123456 | Train acc: 0.75 | Test Loss: 0.5 | Test acc: 0.3333"
        );
    }

    #[test]
    fn log_reporter_remembers_the_epoch_count() {
        let mut reporter = LogReporter::new();
        reporter.on_start(7);

        assert_eq!(reporter.epochs, 7);
    }

    #[test]
    fn closures_receive_every_epoch() {
        let metrics = PhaseMetrics {
            loss: 0.,
            accuracy: 1.,
        };

        let mut seen = Vec::new();
        let mut reporter = |m: &EpochMetrics| seen.push(m.epoch);

        for epoch in 0..3 {
            reporter.on_epoch(&EpochMetrics {
                epoch,
                train: metrics,
                test: metrics,
            });
        }

        assert_eq!(seen, vec![0, 1, 2]);
    }
}
