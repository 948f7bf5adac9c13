// External imports
use burn::tensor::{activation, backend::Backend, Tensor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

// Internal imports
use crate::constants::{
    DEFAULT_SIGMOID, DEFAULT_TANH, HARD_SIGMOID_OFFSET, HARD_SIGMOID_SLOPE, LECUN_INNER_SCALE,
    LECUN_OUTER_SCALE,
};
use crate::error::MguError;

/// # Gate Activation Strategy
///
/// An elementwise squashing function applied to gate pre-activations. The cell
/// holds two of these (one in the sigmoid slot for the forget gate, one in the
/// tanh slot for the candidate state) and never branches on which one it got.
///
/// Implementations must map a tensor to a same-shaped tensor with values in a
/// bounded range.
pub trait Activation<B: Backend>: Send + Sync + fmt::Debug {
    /// Apply the function elementwise
    fn apply(&self, x: Tensor<B, 2>) -> Tensor<B, 2>;

    /// Name used in logs and in saved configurations
    fn name(&self) -> &str;
}

/// Logistic sigmoid, range (0, 1)
#[derive(Debug, Clone, Copy, Default)]
pub struct Sigmoid;

/// Hyperbolic tangent, range (-1, 1)
#[derive(Debug, Clone, Copy, Default)]
pub struct Tanh;

/// Piecewise-linear sigmoid: `clamp(0.2 * x + 0.5, 0, 1)`
#[derive(Debug, Clone, Copy, Default)]
pub struct HardSigmoid;

/// LeCun's scaled tanh: `1.7159 * tanh(0.666 * x)`
#[derive(Debug, Clone, Copy, Default)]
pub struct LeCunTanh;

/// Softsign: `x / (1 + |x|)`, range (-1, 1)
#[derive(Debug, Clone, Copy, Default)]
pub struct Softsign;

impl<B: Backend> Activation<B> for Sigmoid {
    fn apply(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        activation::sigmoid(x)
    }

    fn name(&self) -> &str {
        ActivationKind::Sigmoid.as_str()
    }
}

impl<B: Backend> Activation<B> for Tanh {
    fn apply(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        activation::tanh(x)
    }

    fn name(&self) -> &str {
        ActivationKind::Tanh.as_str()
    }
}

impl<B: Backend> Activation<B> for HardSigmoid {
    fn apply(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        (x * HARD_SIGMOID_SLOPE + HARD_SIGMOID_OFFSET).clamp(0.0, 1.0)
    }

    fn name(&self) -> &str {
        ActivationKind::HardSigmoid.as_str()
    }
}

impl<B: Backend> Activation<B> for LeCunTanh {
    fn apply(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        activation::tanh(x * LECUN_INNER_SCALE) * LECUN_OUTER_SCALE
    }

    fn name(&self) -> &str {
        ActivationKind::LeCunTanh.as_str()
    }
}

impl<B: Backend> Activation<B> for Softsign {
    fn apply(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        let denominator = x.clone().abs() + 1.0;
        x / denominator
    }

    fn name(&self) -> &str {
        ActivationKind::Softsign.as_str()
    }
}

/// Serializable name of a built-in activation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationKind {
    Sigmoid,
    Tanh,
    HardSigmoid,
    LeCunTanh,
    Softsign,
}

impl ActivationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivationKind::Sigmoid => DEFAULT_SIGMOID,
            ActivationKind::Tanh => DEFAULT_TANH,
            ActivationKind::HardSigmoid => "hard_sigmoid",
            ActivationKind::LeCunTanh => "lecun_tanh",
            ActivationKind::Softsign => "softsign",
        }
    }
}

impl fmt::Display for ActivationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivationKind {
    type Err = MguError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "sigmoid" | "logistic" => Ok(ActivationKind::Sigmoid),
            "tanh" => Ok(ActivationKind::Tanh),
            "hard_sigmoid" | "hardsigmoid" => Ok(ActivationKind::HardSigmoid),
            "lecun_tanh" | "lecun" => Ok(ActivationKind::LeCunTanh),
            "softsign" => Ok(ActivationKind::Softsign),
            _ => Err(MguError::UnknownActivation(name.to_string())),
        }
    }
}

/// Turn a kind into a shareable strategy object
pub fn resolve_activation<B: Backend>(kind: ActivationKind) -> Arc<dyn Activation<B>> {
    match kind {
        ActivationKind::Sigmoid => Arc::new(Sigmoid),
        ActivationKind::Tanh => Arc::new(Tanh),
        ActivationKind::HardSigmoid => Arc::new(HardSigmoid),
        ActivationKind::LeCunTanh => Arc::new(LeCunTanh),
        ActivationKind::Softsign => Arc::new(Softsign),
    }
}

/// Look an activation up by name
///
/// # Errors
///
/// `MguError::UnknownActivation` when the name matches no built-in.
pub fn get_activation<B: Backend>(name: &str) -> Result<Arc<dyn Activation<B>>, MguError> {
    let kind = ActivationKind::from_str(name)?;
    Ok(resolve_activation(kind))
}
