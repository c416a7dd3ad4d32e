use super::Optimizer;

/// Gradient descent that keeps a decaying sum of past gradients and steps along it.
#[derive(Debug, Clone)]
pub struct GradientDescentWithMomentum {
    learning_rate: f32,
    momentum: f32,
    velocity: Vec<f32>,
}

impl GradientDescentWithMomentum {
    /// Creates a new `GradientDescentWithMomentum` optimizer.
    ///
    /// # Arguments
    /// * `len` - The amount of parameters it will update.
    /// * `learning_rate` - The step size.
    /// * `momentum` - How much of the previous velocity survives each step, in `[0, 1)`.
    pub fn new(len: usize, learning_rate: f32, momentum: f32) -> Self {
        Self {
            learning_rate,
            momentum,
            velocity: vec![0.; len],
        }
    }
}

impl Optimizer for GradientDescentWithMomentum {
    fn state_len(&self) -> Option<usize> {
        Some(self.velocity.len())
    }

    fn update_params(&mut self, params: &mut [f32], grad: &[f32]) {
        for ((p, g), v) in params.iter_mut().zip(grad).zip(&mut self.velocity) {
            *v = self.momentum * *v + g;
            *p -= self.learning_rate * *v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        MlErr,
        arch::{Model, Sequential, layers::Layer},
    };

    fn identity() -> Sequential {
        Sequential::with_params([Layer::dense((2, 2), None)], vec![1., 0., 0., 1., 0., 0.])
            .unwrap()
    }

    #[test]
    fn velocity_builds_up() {
        let mut opt = GradientDescentWithMomentum::new(1, 1.0, 0.5);
        let mut params = [0.0];

        opt.update_params(&mut params, &[1.0]);
        assert_eq!(params, [-1.0]);

        opt.update_params(&mut params, &[1.0]);
        assert_eq!(params, [-2.5]);
    }

    #[test]
    fn step_rejects_a_model_of_another_size() {
        let mut model = identity();
        model.params_and_grad().1.fill(1.0);
        let mut momentum = GradientDescentWithMomentum::new(2, 0.1, 0.9);

        assert!(matches!(
            momentum.step(&mut model),
            Err(MlErr::SizeMismatch { got: 2, expected: 6, .. })
        ));
        assert_eq!(model.params(), &[1., 0., 0., 1., 0., 0.]);
    }

    #[test]
    fn step_updates_every_parameter() {
        let mut model = identity();
        model.params_and_grad().1.fill(1.0);
        let mut momentum = GradientDescentWithMomentum::new(6, 0.1, 0.9);

        momentum.step(&mut model).unwrap();

        assert!(model.params().iter().zip([1., 0., 0., 1., 0., 0.]).all(|(p, q)| *p < q));
    }
}
