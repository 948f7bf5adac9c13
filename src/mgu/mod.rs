/// # MGU Implementation Module
///
/// This module implements the Minimal Gated Unit (MGU) recurrent cell and its
/// reduced variant (MGU2). An MGU keeps a single forget gate where a GRU keeps
/// an update and a reset gate, and uses it both to gate the recurrent
/// contribution to the candidate state and to interpolate between the old
/// hidden state and that candidate.
///
/// ## Module Structure:
///
/// 1. **step_1_activation**: Pluggable gate activations and lookup by name
/// 2. **step_2_cell_base**: Shape validation, affine projection and parameter initialization
/// 3. **step_3_gate_step**: Parameters, explicit state and the pure per-timestep update
/// 4. **step_4_mgu_cell**: Configuration and the stateful cell with its hidden-state lifecycle
/// 5. **step_5_model_serialization**: Saving and loading cell parameters and configuration
///
/// MGU2 shares every code path with MGU; `ForgetGateInputs::HiddenOnly` only
/// changes the width of the input projection and keeps the input out of the
/// forget gate.
///
pub mod step_1_activation;
pub mod step_2_cell_base;
pub mod step_3_gate_step;
pub mod step_4_mgu_cell;
pub mod step_5_model_serialization;

pub use step_1_activation::{get_activation, resolve_activation, Activation, ActivationKind};
pub use step_3_gate_step::{ForgetGateInputs, GateActivations, MguParams, MguState, MguStep};
pub use step_4_mgu_cell::{GatedRecurrentCell, MguConfig};
