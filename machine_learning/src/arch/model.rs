use std::ops::{Deref, DerefMut};

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::{Result, device::Device};

/// Whether a model behaves as during training or as during inference.
///
/// Layers such as dropout only act while in `Train`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Train,
    Eval,
}

/// A trainable numeric function.
///
/// The model owns its parameters and their gradient as flat buffers of the same length, the
/// optimizer reaches them through `params_and_grad`.
pub trait Model {
    /// Returns the amount of parameters in the model.
    fn size(&self) -> usize;

    /// Returns the current mode of the model.
    fn mode(&self) -> Mode;

    /// Switches the model (and every one of its layers) to `mode`.
    fn set_mode(&mut self, mode: Mode);

    /// Returns the device the model's parameters live on.
    fn device(&self) -> Device;

    /// Makes a forward pass through the model.
    ///
    /// When gradient tracking is enabled, the layers keep what they need for a later `backward`.
    ///
    /// # Arguments
    /// * `x` - The input data, one example per row.
    ///
    /// # Returns
    /// The per-class scores for every example, or an error if occurred.
    fn forward(&mut self, x: ArrayView2<f32>) -> Result<Array2<f32>>;

    /// Backpropagates `d`, the derivative of the loss with respect to the last output, and
    /// **adds** the resulting parameter gradient to the gradient buffer.
    ///
    /// # Errors
    /// `MlErr::GradDisabled` if gradient tracking is disabled.
    fn backward(&mut self, d: Array2<f32>) -> Result<()>;

    /// Returns the model's parameters.
    fn params(&self) -> &[f32];

    /// Returns the model's parameters together with their gradient buffer.
    fn params_and_grad(&mut self) -> (&mut [f32], &mut [f32]);
}

/// Puts a model in some mode for as long as the guard lives and restores the previous mode
/// when dropped.
pub struct ModeGuard<'m, M: Model + ?Sized> {
    model: &'m mut M,
    prev: Mode,
}

impl<'m, M: Model + ?Sized> ModeGuard<'m, M> {
    /// Creates a new `ModeGuard`.
    ///
    /// # Arguments
    /// * `model` - The model whose mode is changed.
    /// * `mode` - The mode the model will be in while the guard lives.
    ///
    /// # Returns
    /// A new `ModeGuard` instance.
    pub fn new(model: &'m mut M, mode: Mode) -> Self {
        let prev = model.mode();
        model.set_mode(mode);
        Self { model, prev }
    }
}

impl<M: Model + ?Sized> Deref for ModeGuard<'_, M> {
    type Target = M;

    fn deref(&self) -> &Self::Target {
        self.model
    }
}

impl<M: Model + ?Sized> DerefMut for ModeGuard<'_, M> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.model
    }
}

impl<M: Model + ?Sized> Drop for ModeGuard<'_, M> {
    fn drop(&mut self) {
        self.model.set_mode(self.prev);
    }
}
