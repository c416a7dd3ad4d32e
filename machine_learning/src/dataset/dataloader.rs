use std::num::NonZeroUsize;

use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

use super::{Batch, BatchSource, Dataset};

/// Splits a `Dataset` into batches of `batch_size` examples, the last one possibly smaller.
///
/// When shuffling, every pass draws a new order from the loader's seeded rng.
#[derive(Debug, Clone)]
pub struct DataLoader {
    dataset: Dataset,
    batch_size: NonZeroUsize,
    shuffle: Option<StdRng>,
}

impl DataLoader {
    /// Creates a new `DataLoader` that yields the examples in order.
    ///
    /// # Arguments
    /// * `dataset` - The examples to batch.
    /// * `batch_size` - The maximum amount of examples per batch.
    pub fn new(dataset: Dataset, batch_size: NonZeroUsize) -> Self {
        Self {
            dataset,
            batch_size,
            shuffle: None,
        }
    }

    /// Makes the loader reshuffle the examples on every pass.
    pub fn shuffled(mut self, seed: u64) -> Self {
        self.shuffle = Some(StdRng::seed_from_u64(seed));
        self
    }

    /// Returns the amount of batches in one pass.
    pub fn len(&self) -> usize {
        self.dataset.len().div_ceil(self.batch_size.get())
    }

    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }
}

impl BatchSource for DataLoader {
    fn batches(&mut self) -> impl Iterator<Item = Batch> + '_ {
        let mut order: Vec<_> = (0..self.dataset.len()).collect();
        if let Some(rng) = &mut self.shuffle {
            order.shuffle(rng);
        }

        let batch_size = self.batch_size.get();
        let dataset = &self.dataset;

        (0..order.len()).step_by(batch_size).map(move |start| {
            let end = (start + batch_size).min(order.len());
            let (x, y) = dataset.select(&order[start..end]);
            Batch::from_parts(x, y)
        })
    }
}
