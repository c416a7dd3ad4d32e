use ndarray::{Array2, ArrayView2, CowArray};

use super::{Mode, Model, layers::Layer};
use crate::{MlErr, Result, device::Device, grad};

/// A sequential model: information flows forward when computing an output and backward when
/// computing the *deltas* of its layers.
///
/// The model owns one flat buffer of parameters and one of gradients, each layer reads and
/// writes its own contiguous slice of them in layer order.
#[derive(Clone)]
pub struct Sequential {
    layers: Vec<Layer>,
    params: Vec<f32>,
    grad: Vec<f32>,
    mode: Mode,
    device: Device,
}

impl Sequential {
    /// Creates a new `Sequential` with every parameter set to zero.
    ///
    /// # Arguments
    /// * `layers` - The layers the sequential is composed of.
    ///
    /// # Returns
    /// A new `Sequential` instance.
    pub fn new<I>(layers: I) -> Self
    where
        I: IntoIterator<Item = Layer>,
    {
        let layers: Vec<_> = layers.into_iter().collect();
        let size = layers.iter().map(Layer::size).sum();

        Self {
            layers,
            params: vec![0.0; size],
            grad: vec![0.0; size],
            mode: Mode::default(),
            device: Device::default(),
        }
    }

    /// Creates a new `Sequential` with the given initial parameters.
    ///
    /// # Arguments
    /// * `layers` - The layers the sequential is composed of.
    /// * `params` - The initial parameters, laid out in layer order.
    ///
    /// # Returns
    /// A new `Sequential` instance or an error if the amount of parameters doesn't match.
    pub fn with_params<I>(layers: I, params: Vec<f32>) -> Result<Self>
    where
        I: IntoIterator<Item = Layer>,
    {
        let mut model = Self::new(layers);

        if params.len() != model.params.len() {
            return Err(MlErr::SizeMismatch {
                what: "sequential parameters",
                got: params.len(),
                expected: model.params.len(),
            });
        }

        model.params = params;
        Ok(model)
    }

    /// Moves the model to `device`.
    ///
    /// # Errors
    /// `MlErr::DeviceUnavailable` if the device can't hold tensors on this build.
    pub fn to(&mut self, device: Device) -> Result<()> {
        if !device.is_available() {
            return Err(MlErr::DeviceUnavailable(device));
        }

        self.device = device;
        Ok(())
    }

    /// Returns the gradient accumulated since it was last cleared.
    pub fn grad(&self) -> &[f32] {
        &self.grad
    }
}

impl Model for Sequential {
    fn size(&self) -> usize {
        self.params.len()
    }

    fn mode(&self) -> Mode {
        self.mode
    }

    fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    fn device(&self) -> Device {
        self.device
    }

    fn forward(&mut self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        let mut a = CowArray::from(x);
        let mut offset = 0;

        for layer in self.layers.iter_mut() {
            let size = layer.size();
            let params = &self.params[offset..offset + size];
            a = CowArray::from(layer.forward(self.mode, params, a.view())?);
            offset += size;
        }

        Ok(a.into_owned())
    }

    fn backward(&mut self, mut d: Array2<f32>) -> Result<()> {
        if !grad::is_enabled() {
            return Err(MlErr::GradDisabled);
        }

        let mut end = self.params.len();

        for layer in self.layers.iter_mut().rev() {
            let start = end - layer.size();
            d = layer.backward(&self.params[start..end], &mut self.grad[start..end], d)?;
            end = start;
        }

        Ok(())
    }

    fn params(&self) -> &[f32] {
        &self.params
    }

    fn params_and_grad(&mut self) -> (&mut [f32], &mut [f32]) {
        (&mut self.params, &mut self.grad)
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;
    use crate::arch::activations::ActFn;

    fn two_layer() -> Sequential {
        Sequential::new([
            Layer::dense((2, 3), Some(ActFn::sigmoid(1.))),
            Layer::dense((3, 2), None),
        ])
    }

    #[test]
    fn size_is_the_sum_of_the_layers() {
        let model = two_layer();
        assert_eq!(model.size(), 3 * 3 + 4 * 2);
        assert_eq!(model.grad().len(), model.size());
    }

    #[test]
    fn with_params_checks_the_length() {
        let layers = [Layer::dense((2, 2), None)];
        assert!(Sequential::with_params(layers.clone(), vec![0.0; 6]).is_ok());
        assert!(matches!(
            Sequential::with_params(layers, vec![0.0; 5]),
            Err(MlErr::SizeMismatch { got: 5, expected: 6, .. })
        ));
    }

    #[test]
    fn forward_chains_the_layers() {
        let mut model = two_layer();
        let y = model.forward(array![[1., 2.], [3., 4.]].view()).unwrap();

        // Zero parameters: the hidden layer outputs sigmoid(0) = 0.5 and the last one outputs 0.
        assert_eq!(y, Array2::<f32>::zeros((2, 2)));
    }

    #[test]
    fn backward_is_refused_without_grad() {
        let mut model = two_layer();
        let _guard = grad::no_grad();

        model.forward(array![[1., 2.]].view()).unwrap();
        assert!(matches!(
            model.backward(Array2::ones((1, 2))),
            Err(MlErr::GradDisabled)
        ));
    }

    #[test]
    fn backward_fills_every_layer_gradient() {
        let mut model = two_layer();

        model.forward(array![[1., 2.]].view()).unwrap();
        model.backward(Array2::ones((1, 2))).unwrap();

        // The last layer's gradient: dw = hidden^T · d = 0.5 everywhere, db = 1.
        let last = &model.grad()[9..];
        assert_eq!(last, &[0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 1., 1.]);
    }

    #[test]
    fn unavailable_devices_are_rejected() {
        let mut model = two_layer();
        assert!(model.to(Device::Cpu).is_ok());
        assert!(matches!(
            model.to(Device::Cuda(0)),
            Err(MlErr::DeviceUnavailable(Device::Cuda(0)))
        ));
        assert_eq!(model.device(), Device::Cpu);
    }
}
