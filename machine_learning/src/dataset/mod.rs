//! In-memory datasets and the batches the training loop consumes.

mod batch;
mod dataloader;
mod dataset;

pub use batch::{Batch, BatchSource};
pub use dataloader::DataLoader;
pub use dataset::Dataset;
