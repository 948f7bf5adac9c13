pub mod constants;
pub mod error;
pub mod mgu;

/// Build-time package information generated by `built`
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub use error::MguError;
pub use mgu::{
    ActivationKind, ForgetGateInputs, GatedRecurrentCell, MguConfig, MguParams, MguState,
};
