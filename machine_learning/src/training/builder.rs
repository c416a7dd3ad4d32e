use std::{cell::RefCell, rc::Rc};

use log::debug;
use rand::{Rng, SeedableRng, rngs::StdRng};

use super::{ModelTrainer, Trainer};
use crate::{
    MlErr, Result,
    arch::{
        Model, Sequential,
        activations::ActFn,
        layers::Layer,
        loss::{CrossEntropy, LossFn, Mse},
    },
    dataset::{DataLoader, Dataset},
    initialization::{ChainedParamGen, ConstParamGen, ParamGen, RandParamGen},
    optimization::{Adam, GradientDescent, GradientDescentWithMomentum, Optimizer},
    specs::{ActFnSpec, InitSpec, LayerSpec, LossFnSpec, ModelSpec, OptimizerSpec, TrainerSpec},
};

type SharedRng = Rc<RefCell<StdRng>>;

/// The train and test datasets, carried along the build until the loaders are made.
struct Datasets {
    train: Dataset,
    test: Dataset,
}

/// Builds `Trainer`s given a specification.
#[derive(Default)]
pub struct TrainerBuilder;

impl TrainerBuilder {
    /// Creates a new `TrainerBuilder`.
    pub fn new() -> Self {
        Self
    }

    /// Builds a new `Trainer` following a spec.
    ///
    /// # Arguments
    /// * `spec` - The specification for the trainer.
    /// * `train` - The dataset the model will be trained with.
    /// * `test` - The dataset the model will be evaluated on after every epoch.
    ///
    /// # Returns
    /// The assembled trainer or an error if the spec can't be realized.
    pub fn build(
        &self,
        spec: &TrainerSpec,
        train: Dataset,
        test: Dataset,
    ) -> Result<Box<dyn Trainer>> {
        let rng = Rc::new(RefCell::new(self.generate_rng(spec.seed)));
        self.resolve_model(spec, &rng, Datasets { train, test })
    }

    fn resolve_model(
        &self,
        spec: &TrainerSpec,
        rng: &SharedRng,
        datasets: Datasets,
    ) -> Result<Box<dyn Trainer>> {
        match &spec.model {
            ModelSpec::Sequential {
                layers: layer_specs,
            } => {
                self.validate_layers(layer_specs)?;

                let mut param_gens = Vec::with_capacity(layer_specs.len() * 2);
                let layers = layer_specs
                    .iter()
                    .map(|ls| self.resolve_layer(*ls, rng, &mut param_gens))
                    .collect::<Result<Vec<_>>>()?;

                let size = layers.iter().map(Layer::size).sum();
                let params = ChainedParamGen::new(param_gens)
                    .sample(size)
                    .unwrap_or_default();

                let mut model = Sequential::with_params(layers, params)?;
                model.to(spec.device)?;

                debug!(size = model.size(), layers = layer_specs.len(); "built sequential model");
                self.resolve_optimizer(spec, rng, datasets, model)
            }
        }
    }

    /// Checks there's at least one layer and that each dense layer takes what the previous one
    /// outputs.
    fn validate_layers(&self, layer_specs: &[LayerSpec]) -> Result<()> {
        if layer_specs.is_empty() {
            return Err(MlErr::InvalidSpec(
                "a sequential model needs at least one layer".into(),
            ));
        }

        let mut prev_out = None;
        for (i, spec) in layer_specs.iter().enumerate() {
            let LayerSpec::Dense { dim: (n, m), .. } = *spec else {
                continue;
            };

            match prev_out {
                Some(prev_m) if prev_m != n => {
                    return Err(MlErr::InvalidSpec(format!(
                        "layer {i}: input size ({n}) does not match previous layer output size ({prev_m})"
                    )));
                }
                _ => prev_out = Some(m),
            }
        }

        Ok(())
    }

    fn resolve_layer(
        &self,
        spec: LayerSpec,
        rng: &SharedRng,
        param_gens: &mut Vec<Box<dyn ParamGen>>,
    ) -> Result<Layer> {
        match spec {
            LayerSpec::Dense { dim, act_fn, init } => {
                param_gens.push(self.resolve_init(init, rng, dim)?);
                param_gens.push(Box::new(ConstParamGen::new(0., dim.1)));
                Ok(Layer::dense(dim, act_fn.map(|spec| self.resolve_act_fn(spec))))
            }
            LayerSpec::Dropout { p } => {
                let seed = rng.borrow_mut().random();
                Layer::dropout(p, seed)
            }
        }
    }

    fn resolve_act_fn(&self, spec: ActFnSpec) -> ActFn {
        match spec {
            ActFnSpec::Sigmoid { amp } => ActFn::sigmoid(amp),
            ActFnSpec::Relu => ActFn::relu(),
            ActFnSpec::Tanh => ActFn::tanh(),
        }
    }

    /// Resolves the generator for the `fan_in * fan_out` weights of a dense layer.
    fn resolve_init(
        &self,
        spec: InitSpec,
        rng: &SharedRng,
        (fan_in, fan_out): (usize, usize),
    ) -> Result<Box<dyn ParamGen>> {
        let rng = Rc::clone(rng);
        let limit = fan_in * fan_out;

        let param_gen: Box<dyn ParamGen> = match spec {
            InitSpec::Const { value } => Box::new(ConstParamGen::new(value, limit)),
            InitSpec::Uniform { low, high } => {
                Box::new(RandParamGen::uniform(rng, limit, low, high)?)
            }
            InitSpec::XavierUniform => {
                Box::new(RandParamGen::xavier_uniform(rng, limit, fan_in, fan_out)?)
            }
            InitSpec::LecunUniform => Box::new(RandParamGen::lecun_uniform(rng, limit, fan_in)?),
            InitSpec::Normal { mean, std_dev } => {
                Box::new(RandParamGen::normal(rng, limit, mean, std_dev)?)
            }
            InitSpec::Kaiming => Box::new(RandParamGen::kaiming(rng, limit, fan_in)?),
            InitSpec::Xavier => Box::new(RandParamGen::xavier(rng, limit, fan_in, fan_out)?),
            InitSpec::Lecun => Box::new(RandParamGen::lecun(rng, limit, fan_in)?),
        };

        Ok(param_gen)
    }

    fn resolve_optimizer<M>(
        &self,
        spec: &TrainerSpec,
        rng: &SharedRng,
        datasets: Datasets,
        model: M,
    ) -> Result<Box<dyn Trainer>>
    where
        M: Model + 'static,
    {
        match spec.optimizer {
            OptimizerSpec::GradientDescent { learning_rate } => {
                let optimizer = GradientDescent::new(learning_rate);
                self.resolve_loss(spec, rng, datasets, model, optimizer)
            }
            OptimizerSpec::GradientDescentWithMomentum {
                learning_rate,
                momentum,
            } => {
                let optimizer =
                    GradientDescentWithMomentum::new(model.size(), learning_rate, momentum);
                self.resolve_loss(spec, rng, datasets, model, optimizer)
            }
            OptimizerSpec::Adam {
                learning_rate,
                beta1,
                beta2,
                epsilon,
            } => {
                let optimizer = Adam::new(model.size(), learning_rate, beta1, beta2, epsilon);
                self.resolve_loss(spec, rng, datasets, model, optimizer)
            }
        }
    }

    fn resolve_loss<M, O>(
        &self,
        spec: &TrainerSpec,
        rng: &SharedRng,
        datasets: Datasets,
        model: M,
        optimizer: O,
    ) -> Result<Box<dyn Trainer>>
    where
        M: Model + 'static,
        O: Optimizer + 'static,
    {
        match spec.loss {
            LossFnSpec::Mse => {
                self.terminate_build(spec, rng, datasets, model, optimizer, Mse::new())
            }
            LossFnSpec::CrossEntropy => {
                self.terminate_build(spec, rng, datasets, model, optimizer, CrossEntropy::new())
            }
        }
    }

    fn terminate_build<M, O, L>(
        &self,
        spec: &TrainerSpec,
        rng: &SharedRng,
        Datasets { train, test }: Datasets,
        model: M,
        optimizer: O,
        loss: L,
    ) -> Result<Box<dyn Trainer>>
    where
        M: Model + 'static,
        O: Optimizer + 'static,
        L: LossFn + 'static,
    {
        let mut train = DataLoader::new(train, spec.batch_size);
        if spec.shuffle {
            train = train.shuffled(rng.borrow_mut().random());
        }
        let test = DataLoader::new(test, spec.batch_size);

        let trainer = ModelTrainer::new(
            model,
            optimizer,
            loss,
            train,
            test,
            spec.epochs,
            spec.device,
        );

        Ok(Box::new(trainer))
    }

    fn generate_rng(&self, seed: Option<u64>) -> StdRng {
        match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use super::*;
    use crate::{device::Device, training::NoopReporter};

    fn spec(layers: Vec<LayerSpec>) -> TrainerSpec {
        TrainerSpec {
            model: ModelSpec::Sequential { layers },
            optimizer: OptimizerSpec::GradientDescent { learning_rate: 0.5 },
            loss: LossFnSpec::CrossEntropy,
            epochs: 3,
            batch_size: NonZeroUsize::new(2).unwrap(),
            shuffle: true,
            seed: Some(11),
            device: Device::Cpu,
        }
    }

    fn xor_like() -> Dataset {
        Dataset::new(vec![0., 0., 0., 1., 1., 0., 1., 1.], vec![0, 1, 1, 0], 2).unwrap()
    }

    fn dense(dim: (usize, usize), init: InitSpec) -> LayerSpec {
        LayerSpec::Dense {
            dim,
            act_fn: Some(ActFnSpec::Tanh),
            init,
        }
    }

    #[test]
    fn builds_a_runnable_trainer() {
        let spec = spec(vec![
            dense((2, 4), InitSpec::XavierUniform),
            LayerSpec::Dropout { p: 0.1 },
            LayerSpec::Dense {
                dim: (4, 2),
                act_fn: None,
                init: InitSpec::Kaiming,
            },
        ]);

        let mut trainer = TrainerBuilder::new()
            .build(&spec, xor_like(), xor_like())
            .unwrap();

        assert_eq!(trainer.params().len(), 3 * 4 + 5 * 2);

        let history = trainer.train(&mut NoopReporter).unwrap();
        assert_eq!(history.len(), 3);

        let params = trainer.params().to_vec();
        let metrics = trainer.evaluate().unwrap();
        assert_eq!(metrics.loss, history.test_loss()[2]);
        assert_eq!(metrics.accuracy, history.test_acc()[2]);
        assert_eq!(trainer.params(), &params[..]);
    }

    #[test]
    fn biases_start_at_zero() {
        let spec = spec(vec![dense((2, 3), InitSpec::Const { value: 0.25 })]);
        let trainer = TrainerBuilder::new()
            .build(&spec, xor_like(), xor_like())
            .unwrap();

        assert_eq!(trainer.params(), &[0.25, 0.25, 0.25, 0.25, 0.25, 0.25, 0., 0., 0.]);
    }

    #[test]
    fn same_seed_same_initial_params() {
        let spec = spec(vec![dense((2, 8), InitSpec::Lecun)]);
        let builder = TrainerBuilder::new();

        let a = builder.build(&spec, xor_like(), xor_like()).unwrap();
        let b = builder.build(&spec, xor_like(), xor_like()).unwrap();

        assert_eq!(a.params(), b.params());
    }

    #[test]
    fn invalid_specs_are_rejected() {
        let builder = TrainerBuilder::new();

        assert!(matches!(
            builder.build(&spec(vec![]), xor_like(), xor_like()),
            Err(MlErr::InvalidSpec(_))
        ));
        assert!(matches!(
            builder.build(
                &spec(vec![LayerSpec::Dropout { p: 1.5 }]),
                xor_like(),
                xor_like()
            ),
            Err(MlErr::InvalidSpec(_))
        ));

        assert!(matches!(
            builder.build(
                &spec(vec![
                    dense((2, 3), InitSpec::Xavier),
                    LayerSpec::Dropout { p: 0.2 },
                    dense((4, 2), InitSpec::Xavier),
                ]),
                xor_like(),
                xor_like()
            ),
            Err(MlErr::InvalidSpec(_))
        ));

        let mut on_gpu = spec(vec![dense((2, 2), InitSpec::Xavier)]);
        on_gpu.device = Device::Cuda(0);
        assert!(matches!(
            builder.build(&on_gpu, xor_like(), xor_like()),
            Err(MlErr::DeviceUnavailable(Device::Cuda(0)))
        ));
    }
}
