//! # Recurrent Cell Base
//!
//! Shared plumbing every recurrent cell in this crate leans on:
//!
//! - shape validation of a single timestep and of the carried hidden state
//! - the affine projection `x · Wᵀ + b` with PyTorch-style `[out, in]` weights
//! - uniform parameter initialization in `[-1/√hidden_size, 1/√hidden_size]`
//! - detaching a parameter from its gradient history while keeping its id
//!
//! Validation happens before any projection is computed, so a failed check
//! never leaves a half-processed sequence behind.

// External imports
use burn::module::Param;
use burn::tensor::{backend::Backend, Distribution, Tensor};

// Internal imports
use crate::error::MguError;

/// Check that a single timestep of shape [batch_size, features] has `input_size` features
pub fn check_forward_input<B: Backend>(
    input: &Tensor<B, 2>,
    input_size: usize,
) -> Result<(), MguError> {
    let features = input.dims()[1];
    if features != input_size {
        return Err(MguError::InputShapeMismatch {
            expected: input_size,
            actual: features,
        });
    }
    Ok(())
}

/// Check that a hidden state matches the input batch and the configured width
pub fn check_forward_hidden<B: Backend>(
    input: &Tensor<B, 2>,
    hidden: &Tensor<B, 2>,
    hidden_size: usize,
) -> Result<(), MguError> {
    let [input_batch, _] = input.dims();
    let [hidden_batch, hidden_width] = hidden.dims();

    if input_batch != hidden_batch {
        return Err(MguError::HiddenBatchMismatch {
            input_batch,
            hidden_batch,
        });
    }

    if hidden_width != hidden_size {
        return Err(MguError::HiddenSizeMismatch {
            expected: hidden_size,
            actual: hidden_width,
        });
    }

    Ok(())
}

/// Affine projection of a batch
///
/// # Arguments
///
/// * `input` - Tensor of shape [batch_size, in_features]
/// * `weight` - Tensor of shape [out_features, in_features]
/// * `bias` - Optional tensor of shape [out_features]
///
/// # Returns
///
/// Tensor of shape [batch_size, out_features]
pub fn linear<B: Backend>(
    input: Tensor<B, 2>,
    weight: Tensor<B, 2>,
    bias: Option<Tensor<B, 1>>,
) -> Tensor<B, 2> {
    let output = input.matmul(weight.transpose());
    match bias {
        Some(bias) => output + bias.unsqueeze::<2>(),
        None => output,
    }
}

/// Bound of the uniform initialization range for a given hidden width
pub fn init_bound(hidden_size: usize) -> f64 {
    1.0 / (hidden_size as f64).sqrt()
}

/// Create a trainable parameter drawn from U(-stdv, stdv), stdv = 1/√hidden_size
pub fn uniform_param<B: Backend, const D: usize>(
    shape: [usize; D],
    hidden_size: usize,
    device: &B::Device,
) -> Param<Tensor<B, D>> {
    let stdv = init_bound(hidden_size);
    Param::from_tensor(Tensor::random(
        shape,
        Distribution::Uniform(-stdv, stdv),
        device,
    ))
}

/// Redraw the values of an existing parameter, keeping its id
pub fn reinit_param<B: Backend, const D: usize>(
    param: Param<Tensor<B, D>>,
    hidden_size: usize,
) -> Param<Tensor<B, D>> {
    let stdv = init_bound(hidden_size);
    param.map(|value| {
        Tensor::random(value.dims(), Distribution::Uniform(-stdv, stdv), &value.device())
            .require_grad()
    })
}

/// Cut a parameter loose from any recorded computation graph, keeping its id
pub fn detach_param<B: Backend, const D: usize>(param: Param<Tensor<B, D>>) -> Param<Tensor<B, D>> {
    param.map(|value| value.detach().require_grad())
}
