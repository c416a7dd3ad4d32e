use super::Optimizer;

/// Adam: per-parameter step sizes from bias-corrected running averages of the gradient and of
/// its square.
#[derive(Debug, Clone)]
pub struct Adam {
    learning_rate: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    steps: i32,
    mean: Vec<f32>,
    var: Vec<f32>,
}

impl Adam {
    /// Creates a new `Adam` optimizer.
    ///
    /// # Arguments
    /// * `len` - The amount of parameters it will update.
    /// * `learning_rate` - The step size.
    /// * `beta1` - The decay of the gradient average.
    /// * `beta2` - The decay of the squared gradient average.
    /// * `epsilon` - Added to the denominator to keep it away from zero.
    pub fn new(len: usize, learning_rate: f32, beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Self {
            learning_rate,
            beta1,
            beta2,
            epsilon,
            steps: 0,
            mean: vec![0.; len],
            var: vec![0.; len],
        }
    }
}

impl Optimizer for Adam {
    fn state_len(&self) -> Option<usize> {
        Some(self.mean.len())
    }

    fn update_params(&mut self, params: &mut [f32], grad: &[f32]) {
        self.steps += 1;

        let (b1, b2, eps) = (self.beta1, self.beta2, self.epsilon);
        let mean_correction = 1. - b1.powi(self.steps);
        let var_correction = 1. - b2.powi(self.steps);
        let lr = self.learning_rate * var_correction.sqrt() / mean_correction;

        for (i, (p, &g)) in params.iter_mut().zip(grad).enumerate() {
            let m = &mut self.mean[i];
            let v = &mut self.var[i];

            *m = b1 * *m + (1. - b1) * g;
            *v = b2 * *v + (1. - b2) * g * g;
            *p -= lr * *m / (v.sqrt() + eps);
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
    fn first_step_has_the_length_of_the_learning_rate() {
        let mut adam = Adam::new(2, 0.1, 0.9, 0.999, 1e-8);
        let mut params = [1.0, 1.0];

        adam.update_params(&mut params, &[3.0, -0.5]);

        assert!((params[0] - 0.9).abs() < 1e-4);
        assert!((params[1] - 1.1).abs() < 1e-4);
    }

    #[test]
    fn zero_gradient_leaves_params_alone() {
        let mut adam = Adam::new(3, 0.1, 0.9, 0.999, 1e-8);
        let mut params = [0.5, -0.5, 2.0];

        adam.update_params(&mut params, &[0.0; 3]);

        assert_eq!(params, [0.5, -0.5, 2.0]);
    }

    #[test]
    fn step_rejects_a_model_of_another_size() {
        let mut model = identity();
        model.params_and_grad().1.fill(1.0);
        let mut adam = Adam::new(2, 0.1, 0.9, 0.999, 1e-8);

        assert!(matches!(
            adam.step(&mut model),
            Err(MlErr::SizeMismatch { got: 2, expected: 6, .. })
        ));
        assert_eq!(model.params(), &[1., 0., 0., 1., 0., 0.]);
    }

    #[test]
    fn step_updates_every_parameter() {
        let mut model = identity();
        model.params_and_grad().1.fill(1.0);
        let mut adam = Adam::new(6, 0.1, 0.9, 0.999, 1e-8);

        adam.step(&mut model).unwrap();

        assert!(model.params().iter().zip([1., 0., 0., 1., 0., 0.]).all(|(p, q)| *p < q));
    }
}
