use super::{History, PhaseMetrics, Reporter, Trainer, engine};
use crate::{
    Result,
    arch::{Model, loss::LossFn},
    dataset::DataLoader,
    device::Device,
    optimization::Optimizer,
};

/// A model `Trainer`. Contains the relevant components needed for training a model,
/// including the model itself.
pub struct ModelTrainer<M, O, L>
where
    M: Model,
    O: Optimizer,
    L: LossFn,
{
    model: M,
    optimizer: O,
    loss_fn: L,
    train: DataLoader,
    test: DataLoader,
    epochs: usize,
    device: Device,
}

impl<M, O, L> ModelTrainer<M, O, L>
where
    M: Model,
    O: Optimizer,
    L: LossFn,
{
    /// Returns a new `ModelTrainer`.
    ///
    /// # Arguments
    /// * `model` - The model that will be trained, already placed on `device`.
    /// * `optimizer` - The update rule for the model's parameters.
    /// * `loss_fn` - The loss function used to measure the difference between a model's output and the expected one.
    /// * `train` - The loader for the training data.
    /// * `test` - The loader for the held-out data.
    /// * `epochs` - The amount of epochs per `train` call.
    /// * `device` - Where the batches are moved before each forward pass.
    pub fn new(
        model: M,
        optimizer: O,
        loss_fn: L,
        train: DataLoader,
        test: DataLoader,
        epochs: usize,
        device: Device,
    ) -> Self {
        Self {
            model,
            optimizer,
            loss_fn,
            train,
            test,
            epochs,
            device,
        }
    }
}

impl<M, O, L> Trainer for ModelTrainer<M, O, L>
where
    M: Model,
    O: Optimizer,
    L: LossFn,
{
    fn train(&mut self, reporter: &mut dyn Reporter) -> Result<History> {
        engine::fit(
            &mut self.model,
            &mut self.train,
            &mut self.test,
            &mut self.optimizer,
            &self.loss_fn,
            self.epochs,
            self.device,
            reporter,
        )
    }

    fn evaluate(&mut self) -> Result<PhaseMetrics> {
        engine::eval_epoch(&mut self.model, &mut self.test, &self.loss_fn, self.device)
    }

    fn params(&self) -> &[f32] {
        self.model.params()
    }
}
