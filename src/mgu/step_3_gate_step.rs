// External imports
use burn::module::{Module, Param};
use burn::tensor::{backend::Backend, Tensor};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// Internal imports
use super::step_1_activation::{resolve_activation, Activation, ActivationKind};
use super::step_2_cell_base::{
    check_forward_hidden, check_forward_input, detach_param, linear, reinit_param, uniform_param,
};
use crate::constants::GATE_CHUNKS;
use crate::error::MguError;

/// Which projections feed the forget gate
///
/// `InputAndHidden` is the full Minimal Gated Unit (MGU); `HiddenOnly` is the
/// reduced variant (MGU2) whose input projection only feeds the candidate
/// state, halving the width of `weight_input`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ForgetGateInputs {
    #[default]
    InputAndHidden,
    HiddenOnly,
}

impl ForgetGateInputs {
    /// Number of `hidden_size` blocks produced by the input projection
    pub fn input_chunks(&self) -> usize {
        match self {
            ForgetGateInputs::InputAndHidden => GATE_CHUNKS,
            ForgetGateInputs::HiddenOnly => 1,
        }
    }
}

/// The pair of squashing functions used by one cell
#[derive(Debug, Clone)]
pub struct GateActivations<B: Backend> {
    pub sigmoid: Arc<dyn Activation<B>>,
    pub tanh: Arc<dyn Activation<B>>,
}

impl<B: Backend> GateActivations<B> {
    pub fn new(sigmoid: Arc<dyn Activation<B>>, tanh: Arc<dyn Activation<B>>) -> Self {
        Self { sigmoid, tanh }
    }

    pub fn from_kinds(sigmoid: ActivationKind, tanh: ActivationKind) -> Self {
        Self::new(resolve_activation(sigmoid), resolve_activation(tanh))
    }
}

impl<B: Backend> Default for GateActivations<B> {
    fn default() -> Self {
        Self::from_kinds(ActivationKind::Sigmoid, ActivationKind::Tanh)
    }
}

/// Recurrent memory carried between timesteps, shape [batch_size, hidden_size]
#[derive(Debug, Clone)]
pub struct MguState<B: Backend> {
    pub hidden: Tensor<B, 2>,
}

impl<B: Backend> MguState<B> {
    pub fn new(hidden: Tensor<B, 2>) -> Self {
        Self { hidden }
    }

    /// All-zero state with no gradient tracking
    pub fn zeros(batch_size: usize, hidden_size: usize, device: &B::Device) -> Self {
        Self::new(Tensor::zeros([batch_size, hidden_size], device))
    }

    /// Checkpoint: same values, no link to the operations that produced them
    pub fn detach(self) -> Self {
        Self::new(self.hidden.detach())
    }

    pub fn batch_size(&self) -> usize {
        self.hidden.dims()[0]
    }
}

/// Everything one timestep produces
#[derive(Debug, Clone)]
pub struct MguStep<B: Backend> {
    /// State after the update
    pub state: MguState<B>,
    /// Forget gate values in (0, 1)
    pub forget_gate: Tensor<B, 2>,
    /// Candidate state before interpolation
    pub candidate: Tensor<B, 2>,
}

/// # MGU Parameters
///
/// Learnable tensors of a Minimal Gated Unit, stored in `[out, in]` layout:
///
/// | Tensor | MGU | MGU2 |
/// |--------|-----|------|
/// | `weight_input` | `[2H, I]` | `[H, I]` |
/// | `weight_hidden` | `[2H, H]` | `[2H, H]` |
/// | `bias_input` | `[2H]` | `[H]` |
/// | `bias_hidden` | `[2H]` | `[2H]` |
///
/// ## Per-timestep update
///
/// For input x_t and previous hidden state h:
///
/// 1. Hidden projection: (h_f, h_n) = split(W_h · h + b_h)
/// 2. Forget gate: f = σ(i_f + h_f) for MGU, f = σ(h_f) for MGU2
/// 3. Candidate: n = tanh(i_n + f ∘ h_n)
/// 4. New hidden state: h' = n + (1 - f) ∘ (h - n)
///
/// where (i_f, i_n) = split(W_i · x_t + b_i) for MGU and i_n = W_i · x_t + b_i for MGU2.
///
/// `step` is pure: it consumes a state and returns the next one, so the math
/// can be exercised without a stateful cell around it.
#[derive(Module, Debug)]
pub struct MguParams<B: Backend> {
    input_size: usize,
    hidden_size: usize,
    input_feeds_forget_gate: bool,

    pub weight_input: Param<Tensor<B, 2>>,
    pub weight_hidden: Param<Tensor<B, 2>>,
    pub bias_input: Option<Param<Tensor<B, 1>>>,
    pub bias_hidden: Option<Param<Tensor<B, 1>>>,
}

impl<B: Backend> MguParams<B> {
    /// Allocate uniformly initialized parameters
    ///
    /// # Arguments
    ///
    /// * `input_size` - Number of features per timestep
    /// * `hidden_size` - Width of the recurrent state
    /// * `bias` - Whether the two bias vectors exist
    /// * `forget_gate_inputs` - MGU or MGU2 layout
    /// * `device` - Device to allocate tensors on
    pub fn new(
        input_size: usize,
        hidden_size: usize,
        bias: bool,
        forget_gate_inputs: ForgetGateInputs,
        device: &B::Device,
    ) -> Self {
        let input_rows = forget_gate_inputs.input_chunks() * hidden_size;
        let hidden_rows = GATE_CHUNKS * hidden_size;

        let weight_input = uniform_param([input_rows, input_size], hidden_size, device);
        let weight_hidden = uniform_param([hidden_rows, hidden_size], hidden_size, device);

        let (bias_input, bias_hidden) = if bias {
            (
                Some(uniform_param([input_rows], hidden_size, device)),
                Some(uniform_param([hidden_rows], hidden_size, device)),
            )
        } else {
            (None, None)
        };

        Self {
            input_size,
            hidden_size,
            input_feeds_forget_gate: forget_gate_inputs == ForgetGateInputs::InputAndHidden,
            weight_input,
            weight_hidden,
            bias_input,
            bias_hidden,
        }
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    pub fn has_bias(&self) -> bool {
        self.bias_input.is_some()
    }

    pub fn forget_gate_inputs(&self) -> ForgetGateInputs {
        if self.input_feeds_forget_gate {
            ForgetGateInputs::InputAndHidden
        } else {
            ForgetGateInputs::HiddenOnly
        }
    }

    /// Redraw every parameter from U(-1/√H, 1/√H), keeping parameter ids
    pub fn reinitialize(self) -> Self {
        let hidden_size = self.hidden_size;
        Self {
            weight_input: reinit_param(self.weight_input, hidden_size),
            weight_hidden: reinit_param(self.weight_hidden, hidden_size),
            bias_input: self.bias_input.map(|b| reinit_param(b, hidden_size)),
            bias_hidden: self.bias_hidden.map(|b| reinit_param(b, hidden_size)),
            ..self
        }
    }

    /// Release any computation graph attached to the parameters
    pub fn detach(self) -> Self {
        Self {
            weight_input: detach_param(self.weight_input),
            weight_hidden: detach_param(self.weight_hidden),
            bias_input: self.bias_input.map(detach_param),
            bias_hidden: self.bias_hidden.map(detach_param),
            ..self
        }
    }

    /// Split a [batch, 2H] projection into its forget and candidate halves
    fn split_gates(&self, projection: Tensor<B, 2>) -> (Tensor<B, 2>, Tensor<B, 2>) {
        let forget = projection.clone().narrow(1, 0, self.hidden_size);
        let new = projection.narrow(1, self.hidden_size, self.hidden_size);
        (forget, new)
    }

    /// Advance the recurrence by one timestep
    ///
    /// # Arguments
    ///
    /// * `input` - Tensor of shape [batch_size, input_size]
    /// * `state` - Previous state, hidden of shape [batch_size, hidden_size]
    /// * `activations` - Sigmoid and tanh strategies
    ///
    /// # Returns
    ///
    /// The next state together with the forget gate and candidate it was built from
    pub fn step(
        &self,
        input: Tensor<B, 2>,
        state: MguState<B>,
        activations: &GateActivations<B>,
    ) -> MguStep<B> {
        let hidden = state.hidden;

        let hidden_projection = linear(
            hidden.clone(),
            self.weight_hidden.val(),
            self.bias_hidden.as_ref().map(|b| b.val()),
        );
        let (h_forget, h_new) = self.split_gates(hidden_projection);

        let input_projection = linear(
            input,
            self.weight_input.val(),
            self.bias_input.as_ref().map(|b| b.val()),
        );

        // MGU2 routes the whole input projection to the candidate
        let (forget_preactivation, i_new) = if self.input_feeds_forget_gate {
            let (i_forget, i_new) = self.split_gates(input_projection);
            (i_forget + h_forget, i_new)
        } else {
            (h_forget, input_projection)
        };

        let forget_gate = activations.sigmoid.apply(forget_preactivation);
        let candidate = activations
            .tanh
            .apply(i_new + forget_gate.clone() * h_new);

        // h' = n + (1 - f) * (h - n)
        let retain = Tensor::ones_like(&forget_gate) - forget_gate.clone();
        let next_hidden = candidate.clone() + retain * (hidden - candidate.clone());

        MguStep {
            state: MguState::new(next_hidden),
            forget_gate,
            candidate,
        }
    }

    /// Run the recurrence over a whole sequence from an explicit state
    ///
    /// # Arguments
    ///
    /// * `input` - Tensor of shape [timesteps, batch_size, input_size]
    /// * `state` - Starting state with batch matching the input
    /// * `future` - Extra zero rows appended to the output
    /// * `activations` - Sigmoid and tanh strategies
    ///
    /// # Returns
    ///
    /// Output of shape [timesteps + future, batch_size, hidden_size] and the final state
    ///
    /// # Errors
    ///
    /// `EmptySequence` for zero timesteps, otherwise the shape errors raised by
    /// `check_forward_input` / `check_forward_hidden`. Nothing is computed when a
    /// check fails.
    pub fn forward_sequence(
        &self,
        input: Tensor<B, 3>,
        state: MguState<B>,
        future: usize,
        activations: &GateActivations<B>,
    ) -> Result<(Tensor<B, 3>, MguState<B>), MguError> {
        let [timesteps, batch_size, features] = input.dims();
        if timesteps == 0 {
            return Err(MguError::EmptySequence);
        }

        let first = input.clone().narrow(0, 0, 1).reshape([batch_size, features]);
        check_forward_input(&first, self.input_size)?;
        check_forward_hidden(&first, &state.hidden, self.hidden_size)?;

        let device = input.device();
        let mut outputs =
            Tensor::zeros([timesteps + future, batch_size, self.hidden_size], &device);

        let mut state = state;
        for t in 0..timesteps {
            let x_t = input
                .clone()
                .narrow(0, t, 1)
                .reshape([batch_size, features]);

            state = self.step(x_t, state, activations).state;

            outputs = outputs.slice_assign(
                [t..t + 1, 0..batch_size, 0..self.hidden_size],
                state
                    .hidden
                    .clone()
                    .reshape([1, batch_size, self.hidden_size]),
            );
        }

        Ok((outputs, state))
    }
}
