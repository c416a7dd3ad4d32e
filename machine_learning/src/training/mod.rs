//! The epoch loop: batch trainer, batch evaluator and the orchestrator tying them together.

mod builder;
mod engine;
mod history;
mod metrics;
mod model_trainer;
mod phase;
mod reporter;
mod trainer;

pub use builder::TrainerBuilder;
pub use engine::{eval_epoch, fit, train_epoch};
pub use history::History;
pub use metrics::{EpochMetrics, MetricsAccumulator, PhaseMetrics, batch_accuracy};
pub use model_trainer::ModelTrainer;
pub use phase::Phase;
pub use reporter::{LogReporter, NoopReporter, Reporter, progress_line};
pub use trainer::Trainer;
