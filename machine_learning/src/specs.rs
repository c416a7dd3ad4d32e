//! Serializable descriptions of everything a `TrainerBuilder` can assemble.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::device::Device;

/// The specification for the `ActFn` enum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActFnSpec {
    Sigmoid { amp: f32 },
    Relu,
    Tanh,
}

/// How the weights of a layer are initialized. Biases always start at zero.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitSpec {
    Const { value: f32 },
    Uniform { low: f32, high: f32 },
    #[default]
    XavierUniform,
    LecunUniform,
    Normal { mean: f32, std_dev: f32 },
    Kaiming,
    Xavier,
    Lecun,
}

/// The specification for the `Layer` enum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerSpec {
    Dense {
        dim: (usize, usize),
        act_fn: Option<ActFnSpec>,
        #[serde(default)]
        init: InitSpec,
    },
    Dropout {
        p: f32,
    },
}

/// The specification for the `Model` trait.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelSpec {
    Sequential { layers: Vec<LayerSpec> },
}

/// The specification for the `Optimizer` trait.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerSpec {
    Adam {
        learning_rate: f32,
        beta1: f32,
        beta2: f32,
        epsilon: f32,
    },
    GradientDescent {
        learning_rate: f32,
    },
    GradientDescentWithMomentum {
        learning_rate: f32,
        momentum: f32,
    },
}

/// The specification for the `LossFn` trait.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossFnSpec {
    Mse,
    CrossEntropy,
}

/// The specification for a `Trainer`, everything but the data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerSpec {
    pub model: ModelSpec,
    pub optimizer: OptimizerSpec,
    pub loss: LossFnSpec,
    pub epochs: usize,
    pub batch_size: NonZeroUsize,
    #[serde(default)]
    pub shuffle: bool,
    pub seed: Option<u64>,
    #[serde(default)]
    pub device: Device,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trainer_spec_from_json() {
        let json = r#"{
            "model": { "sequential": { "layers": [
                { "dense": { "dim": [4, 8], "act_fn": "relu", "init": "kaiming" } },
                { "dropout": { "p": 0.2 } },
                { "dense": { "dim": [8, 3], "act_fn": null } }
            ] } },
            "optimizer": { "adam": { "learning_rate": 0.001, "beta1": 0.9, "beta2": 0.999, "epsilon": 1e-8 } },
            "loss": "cross_entropy",
            "epochs": 5,
            "batch_size": 32,
            "seed": 7
        }"#;

        let spec: TrainerSpec = serde_json::from_str(json).unwrap();

        let ModelSpec::Sequential { layers } = &spec.model;
        assert_eq!(layers.len(), 3);
        assert!(matches!(
            layers[2],
            LayerSpec::Dense {
                init: InitSpec::XavierUniform,
                ..
            }
        ));
        assert!(!spec.shuffle);
        assert_eq!(spec.device, Device::Cpu);
        assert_eq!(spec.batch_size.get(), 32);
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let json = r#"{
            "model": { "sequential": { "layers": [] } },
            "optimizer": { "gradient_descent": { "learning_rate": 0.1 } },
            "loss": "mse",
            "epochs": 1,
            "batch_size": 0,
            "seed": null
        }"#;

        assert!(serde_json::from_str::<TrainerSpec>(json).is_err());
    }
}
