use crate::{MlErr, Result, arch::Model};

/// Defines the strategy for updating model parameters based on calculated gradients.
///
/// Implementors only provide the update rule, clearing and applying gradients on a model goes
/// through `zero_grad` and `step`.
pub trait Optimizer {
    /// Updates the parameters according to the algorithm's learning rule.
    ///
    /// # Arguments
    /// * `params` - The parameters that are going to be modified.
    /// * `grad` - The gradient used for taking the step, of the same length as `params`.
    fn update_params(&mut self, params: &mut [f32], grad: &[f32]);

    /// Returns the amount of parameters the optimizer keeps per-parameter state for, if any.
    fn state_len(&self) -> Option<usize> {
        None
    }

    /// Clears the gradient accumulated in the model.
    fn zero_grad(&mut self, model: &mut dyn Model) {
        let (_, grad) = model.params_and_grad();
        grad.fill(0.0);
    }

    /// Applies one update to the model's parameters using its current gradient.
    ///
    /// # Errors
    /// `MlErr::SizeMismatch` if the model's buffers disagree in length, or if the optimizer's
    /// state was sized for a different model.
    fn step(&mut self, model: &mut dyn Model) -> Result<()> {
        let state_len = self.state_len();
        let (params, grad) = model.params_and_grad();

        if params.len() != grad.len() {
            return Err(MlErr::SizeMismatch {
                what: "gradient",
                got: grad.len(),
                expected: params.len(),
            });
        }

        match state_len {
            Some(got) if got != params.len() => {
                return Err(MlErr::SizeMismatch {
                    what: "optimizer state",
                    got,
                    expected: params.len(),
                });
            }
            _ => {}
        }

        self.update_params(params, grad);
        Ok(())
    }
}
