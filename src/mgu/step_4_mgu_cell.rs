// External imports
use burn::module::Module;
use burn::tensor::{backend::Backend, Tensor};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// Internal imports
use super::step_1_activation::{Activation, ActivationKind};
use super::step_3_gate_step::{ForgetGateInputs, GateActivations, MguParams, MguState, MguStep};
use crate::error::MguError;

fn default_bias() -> bool {
    true
}

fn default_sigmoid() -> ActivationKind {
    ActivationKind::Sigmoid
}

fn default_tanh() -> ActivationKind {
    ActivationKind::Tanh
}

/// Configuration for a GatedRecurrentCell
///
/// Sizes are validated by `init`; everything else has a default matching the
/// classic MGU (bias on, logistic sigmoid, tanh, input feeding the forget gate).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MguConfig {
    pub input_size: usize,
    pub hidden_size: usize,
    #[serde(default = "default_bias")]
    pub bias: bool,
    #[serde(default)]
    pub forget_gate_inputs: ForgetGateInputs,
    #[serde(default = "default_sigmoid")]
    pub sigmoid: ActivationKind,
    #[serde(default = "default_tanh")]
    pub tanh: ActivationKind,
}

impl MguConfig {
    /// Create a configuration for the full MGU
    ///
    /// # Arguments
    ///
    /// * `input_size` - Number of features per timestep
    /// * `hidden_size` - Width of the recurrent state
    pub fn new(input_size: usize, hidden_size: usize) -> Self {
        Self {
            input_size,
            hidden_size,
            bias: default_bias(),
            forget_gate_inputs: ForgetGateInputs::InputAndHidden,
            sigmoid: default_sigmoid(),
            tanh: default_tanh(),
        }
    }

    /// Create a configuration for the reduced MGU2
    pub fn reduced(input_size: usize, hidden_size: usize) -> Self {
        Self::new(input_size, hidden_size).with_forget_gate_inputs(ForgetGateInputs::HiddenOnly)
    }

    pub fn with_bias(mut self, bias: bool) -> Self {
        self.bias = bias;
        self
    }

    pub fn with_forget_gate_inputs(mut self, forget_gate_inputs: ForgetGateInputs) -> Self {
        self.forget_gate_inputs = forget_gate_inputs;
        self
    }

    pub fn with_sigmoid(mut self, sigmoid: ActivationKind) -> Self {
        self.sigmoid = sigmoid;
        self
    }

    pub fn with_tanh(mut self, tanh: ActivationKind) -> Self {
        self.tanh = tanh;
        self
    }

    /// Reject zero-sized dimensions
    pub fn validate(&self) -> Result<(), MguError> {
        if self.input_size == 0 {
            return Err(MguError::InvalidConfig(
                "input_size must be positive".to_string(),
            ));
        }
        if self.hidden_size == 0 {
            return Err(MguError::InvalidConfig(
                "hidden_size must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Build a cell with freshly initialized parameters and no hidden state
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<GatedRecurrentCell<B>, MguError> {
        self.validate()?;

        let params = MguParams::new(
            self.input_size,
            self.hidden_size,
            self.bias,
            self.forget_gate_inputs,
            device,
        );
        let activations = GateActivations::from_kinds(self.sigmoid, self.tanh);

        debug!(
            "Initialized {:?} cell: input_size={}, hidden_size={}, bias={}, params={}",
            self.forget_gate_inputs,
            self.input_size,
            self.hidden_size,
            self.bias,
            params.num_params()
        );

        Ok(GatedRecurrentCell {
            config: self.clone(),
            params,
            activations,
            hidden: None,
            timesteps: 0,
        })
    }
}

/// # Gated Recurrent Cell (MGU / MGU2)
///
/// A Minimal Gated Unit that owns its hidden state between calls. The forget
/// gate blends the previous hidden state with a tanh candidate; the candidate
/// itself sees the hidden projection only through the forget gate:
///
/// ```text
/// f  = σ(W_if · x + W_hf · h)        (MGU2: f = σ(W_hf · h))
/// n  = tanh(W_in · x + f ∘ (W_hn · h))
/// h' = n + (1 - f) ∘ (h - n)
/// ```
///
/// ## Hidden-state lifecycle
///
/// - unset after construction, `initialize_parameters` and `reset_hidden`
/// - zero-filled on the first `forward` after being unset
/// - carried (with its gradient history) from one `forward` to the next
/// - `detach_hidden` keeps the value but cuts the history (truncated BPTT)
///
/// Calls take `&mut self`; a cell instance serves one logical sequence at a
/// time. For several independent sequences use one cell each, cloning
/// `params()` into `with_params` to share weights.
#[derive(Debug, Clone)]
pub struct GatedRecurrentCell<B: Backend> {
    config: MguConfig,
    params: MguParams<B>,
    activations: GateActivations<B>,
    hidden: Option<MguState<B>>,
    timesteps: usize,
}

impl<B: Backend> GatedRecurrentCell<B> {
    /// Full MGU with bias and default activations
    pub fn new(input_size: usize, hidden_size: usize, device: &B::Device) -> Result<Self, MguError> {
        MguConfig::new(input_size, hidden_size).init(device)
    }

    /// Reduced MGU2 with bias and default activations
    pub fn reduced(
        input_size: usize,
        hidden_size: usize,
        device: &B::Device,
    ) -> Result<Self, MguError> {
        MguConfig::reduced(input_size, hidden_size).init(device)
    }

    /// Swap the forget-gate squashing function for a custom strategy
    ///
    /// Custom strategies are not part of `MguConfig`; a saved cell reloads with
    /// the configured built-in kind.
    pub fn with_sigmoid(mut self, sigmoid: Arc<dyn Activation<B>>) -> Self {
        self.activations.sigmoid = sigmoid;
        self
    }

    /// Swap the candidate squashing function for a custom strategy
    pub fn with_tanh(mut self, tanh: Arc<dyn Activation<B>>) -> Self {
        self.activations.tanh = tanh;
        self
    }

    /// Replace the parameters, e.g. with a loaded record or weights shared with another cell
    ///
    /// # Errors
    ///
    /// `InvalidConfig` when the parameter layout disagrees with this cell's configuration.
    pub fn with_params(mut self, params: MguParams<B>) -> Result<Self, MguError> {
        let expected = (
            self.config.input_size,
            self.config.hidden_size,
            self.config.bias,
            self.config.forget_gate_inputs,
        );
        let actual = (
            params.input_size(),
            params.hidden_size(),
            params.has_bias(),
            params.forget_gate_inputs(),
        );
        if expected != actual {
            return Err(MguError::InvalidConfig(format!(
                "parameter layout {:?} does not match configuration {:?}",
                actual, expected
            )));
        }
        self.params = params;
        Ok(self)
    }

    pub fn config(&self) -> &MguConfig {
        &self.config
    }

    pub fn params(&self) -> &MguParams<B> {
        &self.params
    }

    pub fn activations(&self) -> &GateActivations<B> {
        &self.activations
    }

    pub fn input_size(&self) -> usize {
        self.config.input_size
    }

    pub fn hidden_size(&self) -> usize {
        self.config.hidden_size
    }

    pub fn has_bias(&self) -> bool {
        self.config.bias
    }

    pub fn forget_gate_inputs(&self) -> ForgetGateInputs {
        self.config.forget_gate_inputs
    }

    /// Timesteps processed since the last `reset_hidden`
    pub fn timesteps(&self) -> usize {
        self.timesteps
    }

    /// Current hidden state, `None` while unset
    pub fn hidden(&self) -> Option<&MguState<B>> {
        self.hidden.as_ref()
    }

    /// Total number of learnable scalars
    pub fn num_params(&self) -> usize {
        self.params.num_params()
    }

    /// Redraw all parameters from U(-1/√H, 1/√H) and unset the hidden state
    pub fn initialize_parameters(&mut self) {
        self.params = self.params.clone().reinitialize();
        self.hidden = None;
        debug!("Parameters reinitialized, hidden state unset");
    }

    /// Forget the hidden state and start gradient tracking from scratch
    pub fn reset_hidden(&mut self) {
        self.hidden = None;
        self.timesteps = 0;
        self.params = self.params.clone().detach();
        debug!("Hidden state reset");
    }

    /// Keep the hidden values but sever their gradient history
    ///
    /// # Errors
    ///
    /// `HiddenUnset` if no forward pass happened since the last reset.
    pub fn detach_hidden(&mut self) -> Result<(), MguError> {
        let state = self.hidden.take().ok_or(MguError::HiddenUnset)?;
        self.hidden = Some(state.detach());
        self.params = self.params.clone().detach();
        debug!("Hidden state detached after {} timesteps", self.timesteps);
        Ok(())
    }

    /// One timestep from an explicit state, leaving the stored hidden state alone
    pub fn step(&self, input: Tensor<B, 2>, state: MguState<B>) -> MguStep<B> {
        self.params.step(input, state, &self.activations)
    }

    /// A whole sequence from an explicit state, leaving the stored hidden state alone
    pub fn forward_with_state(
        &self,
        input: Tensor<B, 3>,
        state: MguState<B>,
        future: usize,
    ) -> Result<(Tensor<B, 3>, MguState<B>), MguError> {
        self.params
            .forward_sequence(input, state, future, &self.activations)
    }

    /// Run the cell over a sequence, carrying the stored hidden state
    ///
    /// # Arguments
    ///
    /// * `input` - Tensor of shape [timesteps, batch_size, input_size]
    /// * `future` - Reserved trailing rows; they are returned as zeros
    ///
    /// # Returns
    ///
    /// Tensor of shape [timesteps + future, batch_size, hidden_size]
    ///
    /// # Errors
    ///
    /// Shape errors for a mismatched input width, hidden width or batch size,
    /// and `EmptySequence` for zero timesteps. The stored state is untouched on error.
    pub fn forward(&mut self, input: Tensor<B, 3>, future: usize) -> Result<Tensor<B, 3>, MguError> {
        let [timesteps, batch_size, _] = input.dims();

        let state = match &self.hidden {
            Some(state) => state.clone(),
            None => MguState::zeros(batch_size, self.config.hidden_size, &input.device()),
        };

        trace!(
            "forward: timesteps={}, batch_size={}, future={}",
            timesteps,
            batch_size,
            future
        );

        let (outputs, state) = self.forward_with_state(input, state, future)?;

        self.hidden = Some(state);
        self.timesteps += timesteps;

        Ok(outputs)
    }
}
