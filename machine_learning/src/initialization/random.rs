use std::{cell::RefCell, rc::Rc};

use rand::Rng;
use rand_distr::{Distribution, Normal, Uniform};

use super::ParamGen;
use crate::Result;

/// Samples parameters from a probability distribution.
///
/// Several generators usually share one rng so a whole model is reproducible from a single seed.
pub struct RandParamGen<R: Rng, D: Distribution<f32>> {
    rng: Rc<RefCell<R>>,
    distribution: D,
    remaining: usize,
}

impl<R: Rng, D: Distribution<f32>> RandParamGen<R, D> {
    /// Creates a new `RandParamGen`.
    ///
    /// # Arguments
    /// * `rng` - The shared random number generator.
    /// * `distribution` - The distribution to sample from.
    /// * `limit` - How many values to yield in total.
    pub fn new(rng: Rc<RefCell<R>>, distribution: D, limit: usize) -> Self {
        Self {
            rng,
            distribution,
            remaining: limit,
        }
    }
}

impl<R: Rng> RandParamGen<R, Uniform<f32>> {
    /// Samples uniformly from `[low, high)`.
    ///
    /// # Errors
    /// `MlErr::Distribution` if the range is empty or not finite.
    pub fn uniform(rng: Rc<RefCell<R>>, limit: usize, low: f32, high: f32) -> Result<Self> {
        Ok(Self::new(rng, Uniform::new(low, high)?, limit))
    }

    /// Glorot uniform: `U(-r, r)` with `r = sqrt(6 / (fan_in + fan_out))`.
    pub fn xavier_uniform(
        rng: Rc<RefCell<R>>,
        limit: usize,
        fan_in: usize,
        fan_out: usize,
    ) -> Result<Self> {
        let r = (6. / (fan_in + fan_out) as f32).sqrt();
        Self::uniform(rng, limit, -r, r)
    }

    /// LeCun uniform: `U(-r, r)` with `r = sqrt(3 / fan_in)`.
    pub fn lecun_uniform(rng: Rc<RefCell<R>>, limit: usize, fan_in: usize) -> Result<Self> {
        let r = (3. / fan_in as f32).sqrt();
        Self::uniform(rng, limit, -r, r)
    }
}

impl<R: Rng> RandParamGen<R, Normal<f32>> {
    /// Samples from `N(mean, std_dev²)`.
    ///
    /// # Errors
    /// `MlErr::Distribution` if `std_dev` is negative or not finite.
    pub fn normal(rng: Rc<RefCell<R>>, limit: usize, mean: f32, std_dev: f32) -> Result<Self> {
        Ok(Self::new(rng, Normal::new(mean, std_dev)?, limit))
    }

    /// He normal: `N(0, 2 / fan_in)`, suited to relu layers.
    pub fn kaiming(rng: Rc<RefCell<R>>, limit: usize, fan_in: usize) -> Result<Self> {
        Self::normal(rng, limit, 0., (2. / fan_in as f32).sqrt())
    }

    /// Glorot normal: `N(0, 2 / (fan_in + fan_out))`.
    pub fn xavier(
        rng: Rc<RefCell<R>>,
        limit: usize,
        fan_in: usize,
        fan_out: usize,
    ) -> Result<Self> {
        Self::kaiming(rng, limit, fan_in + fan_out)
    }

    /// LeCun normal: `N(0, 1 / fan_in)`, suited to sigmoid and tanh layers.
    pub fn lecun(rng: Rc<RefCell<R>>, limit: usize, fan_in: usize) -> Result<Self> {
        Self::normal(rng, limit, 0., (1. / fan_in as f32).sqrt())
    }
}

impl<R: Rng, D: Distribution<f32>> ParamGen for RandParamGen<R, D> {
    fn sample(&mut self, n: usize) -> Option<Vec<f32>> {
        if self.remaining == 0 {
            return None;
        }

        let n = n.min(self.remaining);
        self.remaining -= n;

        let mut rng = self.rng.borrow_mut();
        Some((0..n).map(|_| self.distribution.sample(&mut *rng)).collect())
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn shared_rng(seed: u64) -> Rc<RefCell<StdRng>> {
        Rc::new(RefCell::new(StdRng::seed_from_u64(seed)))
    }

    #[test]
    fn xavier_uniform_stays_in_range() {
        let mut param_gen = RandParamGen::xavier_uniform(shared_rng(0), 100, 4, 2).unwrap();
        let r = 1.0;

        let sample = param_gen.sample(200).unwrap();

        assert_eq!(sample.len(), 100);
        assert!(sample.iter().all(|v| (-r..r).contains(v)));
        assert!(param_gen.sample(1).is_none());
    }

    #[test]
    fn same_seed_same_values() {
        let mut a = RandParamGen::kaiming(shared_rng(42), 16, 8).unwrap();
        let mut b = RandParamGen::kaiming(shared_rng(42), 16, 8).unwrap();

        assert_eq!(a.sample(16), b.sample(16));
    }

    #[test]
    fn invalid_distributions_are_rejected() {
        assert!(RandParamGen::uniform(shared_rng(0), 1, 1., 0.).is_err());
        assert!(RandParamGen::normal(shared_rng(0), 1, 0., f32::NAN).is_err());
    }
}
