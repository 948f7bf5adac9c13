use thiserror::Error;

/// Errors raised by the MGU cells.
///
/// Every variant is a caller mistake surfaced before any computation takes
/// place; none of them are transient, so nothing here is retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MguError {
    /// A size in the cell configuration is not usable
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The feature width of the input does not match `input_size`
    #[error("input has inconsistent input_size: got {actual}, expected {expected}")]
    InputShapeMismatch { expected: usize, actual: usize },

    /// The hidden state width does not match `hidden_size`
    #[error("hidden has inconsistent hidden_size: got {actual}, expected {expected}")]
    HiddenSizeMismatch { expected: usize, actual: usize },

    /// The batch of the carried hidden state differs from the input batch
    #[error("input batch size {input_batch} doesn't match hidden batch size {hidden_batch}")]
    HiddenBatchMismatch {
        input_batch: usize,
        hidden_batch: usize,
    },

    /// `detach_hidden` was called before any hidden state existed
    #[error("hidden state is unset; call forward before detach_hidden")]
    HiddenUnset,

    /// The input sequence has no timesteps
    #[error("input sequence has no timesteps")]
    EmptySequence,

    /// No activation is registered under this name
    #[error("unknown activation function '{0}'")]
    UnknownActivation(String),
}
