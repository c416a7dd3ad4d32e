use ndarray::{Array2, ArrayView2};

use super::{Dense, Dropout};
use crate::{
    Result,
    arch::{Mode, activations::ActFn},
};

/// A layer of a `Sequential` model.
#[derive(Clone)]
pub enum Layer {
    Dense(Dense),
    Dropout(Dropout),
}

impl Layer {
    pub fn dense(dim: (usize, usize), act_fn: Option<ActFn>) -> Self {
        Self::Dense(Dense::new(dim, act_fn))
    }

    pub fn dropout(p: f32, seed: u64) -> Result<Self> {
        Ok(Self::Dropout(Dropout::new(p, seed)?))
    }

    /// Returns the amount of parameters this layer has.
    pub fn size(&self) -> usize {
        match self {
            Layer::Dense(l) => l.size(),
            Layer::Dropout(_) => 0,
        }
    }

    pub fn forward(
        &mut self,
        mode: Mode,
        params: &[f32],
        x: ArrayView2<f32>,
    ) -> Result<Array2<f32>> {
        match self {
            Layer::Dense(l) => l.forward(params, x),
            Layer::Dropout(l) => Ok(l.forward(mode, x)),
        }
    }

    pub fn backward(
        &mut self,
        params: &[f32],
        grad: &mut [f32],
        d: Array2<f32>,
    ) -> Result<Array2<f32>> {
        match self {
            Layer::Dense(l) => l.backward(params, grad, d),
            Layer::Dropout(l) => l.backward(d),
        }
    }
}
