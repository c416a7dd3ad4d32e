use ndarray::{Array2, ArrayView2};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{MlErr, Result, arch::Mode, grad};

/// Randomly zeroes units while training, scaling the survivors by `1 / (1 - p)` so the expected
/// activation matches inference, where the layer is the identity.
#[derive(Clone)]
pub struct Dropout {
    p: f32,
    rng: StdRng,
    mask: Option<Array2<f32>>,
}

impl Dropout {
    /// Creates a new `Dropout` layer.
    ///
    /// # Arguments
    /// * `p` - The probability of zeroing a unit, in `[0, 1)`.
    /// * `seed` - The seed for the mask sampler.
    ///
    /// # Returns
    /// A new `Dropout` instance or an error if `p` is out of range.
    pub fn new(p: f32, seed: u64) -> Result<Self> {
        if !(0.0..1.0).contains(&p) {
            return Err(MlErr::InvalidSpec(format!(
                "dropout probability must be in [0, 1), got {p}"
            )));
        }

        Ok(Self {
            p,
            rng: StdRng::seed_from_u64(seed),
            mask: None,
        })
    }

    pub fn forward(&mut self, mode: Mode, x: ArrayView2<f32>) -> Array2<f32> {
        if mode == Mode::Eval || self.p == 0.0 {
            self.mask = grad::is_enabled().then(|| Array2::ones(x.dim()));
            return x.to_owned();
        }

        let keep = 1.0 - self.p;
        let mask = Array2::from_shape_simple_fn(x.dim(), || {
            if self.rng.random::<f32>() < keep {
                1.0 / keep
            } else {
                0.0
            }
        });

        let a = &x * &mask;
        self.mask = grad::is_enabled().then_some(mask);
        a
    }

    pub fn backward(&mut self, mut d: Array2<f32>) -> Result<Array2<f32>> {
        let mask = self
            .mask
            .take()
            .ok_or(MlErr::MissingForwardPass { layer: "dropout" })?;

        if d.dim() != mask.dim() {
            return Err(MlErr::SizeMismatch {
                what: "dropout delta",
                got: d.len(),
                expected: mask.len(),
            });
        }

        d *= &mask;
        Ok(d)
    }
}
