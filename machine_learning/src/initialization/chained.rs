use super::ParamGen;

/// Delegates to a sequence of generators, moving on to the next one when the current one is
/// exhausted.
///
/// A model gets one generator per layer, each limited to the size of its layer, so a single
/// `sample(model.size())` call lays out every layer's slice in order.
pub struct ChainedParamGen {
    param_gens: Vec<Box<dyn ParamGen>>,
    curr: usize,
}

impl ChainedParamGen {
    /// Creates a new `ChainedParamGen`.
    ///
    /// # Arguments
    /// * `param_gens` - The generators, in the order they should be drained.
    pub fn new(param_gens: Vec<Box<dyn ParamGen>>) -> Self {
        Self {
            param_gens,
            curr: 0,
        }
    }
}

impl ParamGen for ChainedParamGen {
    fn sample(&mut self, n: usize) -> Option<Vec<f32>> {
        let mut sample = Vec::with_capacity(n);

        while sample.len() < n {
            let param_gen = self.param_gens.get_mut(self.curr)?;

            match param_gen.sample(n - sample.len()) {
                Some(chunk) => sample.extend(chunk),
                None => self.curr += 1,
            }
        }

        Some(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::initialization::ConstParamGen;

    #[test]
    fn drains_each_generator_in_order() {
        let mut param_gen = ChainedParamGen::new(vec![
            Box::new(ConstParamGen::new(1., 2)),
            Box::new(ConstParamGen::new(2., 3)),
        ]);

        assert_eq!(param_gen.sample(4).unwrap(), vec![1., 1., 2., 2.]);
        assert_eq!(param_gen.sample(1).unwrap(), vec![2.]);
        assert!(param_gen.sample(1).is_none());
    }
}
