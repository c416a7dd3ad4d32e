use log::debug;

use super::{
    EpochMetrics, History, MetricsAccumulator, Phase, PhaseMetrics, Reporter, metrics,
};
use crate::{
    MlErr, Result,
    arch::{
        Mode, ModeGuard, Model,
        loss::{LossFn, softmax},
    },
    dataset::BatchSource,
    device::Device,
    grad,
    optimization::Optimizer,
};

/// Runs one training pass over every batch of `batches`, updating the model's parameters once
/// per batch.
///
/// The model is in `Mode::Train` and gradient tracking is enabled for the whole pass, both are
/// restored to the caller's values on return.
///
/// # Arguments
/// * `model` - The model to train.
/// * `batches` - The training data.
/// * `loss_fn` - The loss to minimize.
/// * `optimizer` - The update rule applied after each batch.
/// * `device` - Where the batches are moved before the forward pass.
///
/// # Returns
/// The mean of the per-batch losses and accuracies.
pub fn train_epoch<M, B, L, O>(
    model: &mut M,
    batches: &mut B,
    loss_fn: &L,
    optimizer: &mut O,
    device: Device,
) -> Result<PhaseMetrics>
where
    M: Model,
    B: BatchSource,
    L: LossFn + ?Sized,
    O: Optimizer + ?Sized,
{
    let mut model = ModeGuard::new(model, Mode::Train);
    let _grad = grad::enable_grad();
    check_device(model.device(), device)?;

    let mut acc = MetricsAccumulator::new();

    for batch in batches.batches() {
        let batch = batch.to(device)?;
        let (x, y) = (batch.x.view(), batch.y.view());

        let y_pred = model.forward(x)?;
        let loss = loss_fn.loss(y_pred.view(), y)?;

        optimizer.zero_grad(&mut *model);
        let d = loss_fn.loss_prime(y_pred.view(), y)?;
        model.backward(d)?;
        optimizer.step(&mut *model)?;

        let scores = softmax(y_pred.view());
        acc.add(loss, metrics::batch_accuracy(scores.view(), y));
    }

    finish(acc, Phase::Train)
}

/// Runs one evaluation pass over every batch of `batches` without tracking gradients.
///
/// The model is in `Mode::Eval` for the whole pass and its parameters are left untouched.
/// Gradient tracking is disabled once for the pass and restored on every exit path.
///
/// # Arguments
/// * `model` - The model to evaluate.
/// * `batches` - The held-out data.
/// * `loss_fn` - The loss to measure.
/// * `device` - Where the batches are moved before the forward pass.
///
/// # Returns
/// The mean of the per-batch losses and accuracies.
pub fn eval_epoch<M, B, L>(
    model: &mut M,
    batches: &mut B,
    loss_fn: &L,
    device: Device,
) -> Result<PhaseMetrics>
where
    M: Model + ?Sized,
    B: BatchSource,
    L: LossFn + ?Sized,
{
    let mut model = ModeGuard::new(model, Mode::Eval);
    let _no_grad = grad::no_grad();
    check_device(model.device(), device)?;

    let mut acc = MetricsAccumulator::new();

    for batch in batches.batches() {
        let batch = batch.to(device)?;
        let (x, y) = (batch.x.view(), batch.y.view());

        let y_pred = model.forward(x)?;
        let loss = loss_fn.loss(y_pred.view(), y)?;
        acc.add(loss, metrics::batch_accuracy(y_pred.view(), y));
    }

    finish(acc, Phase::Test)
}

/// Trains and evaluates `model` for `epochs` epochs.
///
/// Each epoch runs `train_epoch` on `train` and then `eval_epoch` on `test`, records both in the
/// history and hands them to `reporter`. The first failing epoch aborts the run.
///
/// # Returns
/// The history of every epoch's metrics.
#[allow(clippy::too_many_arguments)]
pub fn fit<M, Tr, Te, O, L, R>(
    model: &mut M,
    train: &mut Tr,
    test: &mut Te,
    optimizer: &mut O,
    loss_fn: &L,
    epochs: usize,
    device: Device,
    reporter: &mut R,
) -> Result<History>
where
    M: Model,
    Tr: BatchSource,
    Te: BatchSource,
    O: Optimizer + ?Sized,
    L: LossFn + ?Sized,
    R: Reporter + ?Sized,
{
    let mut history = History::with_capacity(epochs);
    reporter.on_start(epochs);

    for epoch in 0..epochs {
        let train_metrics = train_epoch(model, train, loss_fn, optimizer, device)?;
        let test_metrics = eval_epoch(model, test, loss_fn, device)?;

        let metrics = EpochMetrics {
            epoch,
            train: train_metrics,
            test: test_metrics,
        };
        history.push(&metrics);
        reporter.on_epoch(&metrics);
    }

    reporter.on_finish(&history);
    Ok(history)
}

fn check_device(model: Device, data: Device) -> Result<()> {
    if model != data {
        return Err(MlErr::DeviceMismatch { model, data });
    }

    Ok(())
}

fn finish(acc: MetricsAccumulator, phase: Phase) -> Result<PhaseMetrics> {
    let batches = acc.batches();
    let metrics = acc.mean(phase)?;

    debug!(
        phase = phase.as_str(),
        batches = batches,
        loss = metrics.loss,
        accuracy = metrics.accuracy;
        "phase finished"
    );

    Ok(metrics)
}
