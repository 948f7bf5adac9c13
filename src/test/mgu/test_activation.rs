// External imports
use burn::tensor::backend::Backend;
use burn::tensor::{Distribution, Tensor};
use burn_ndarray::NdArray;
use std::str::FromStr;
use std::sync::Arc;

// Internal imports
use super::{assert_close, values};
use crate::error::MguError;
use crate::mgu::step_1_activation::{HardSigmoid, LeCunTanh, Softsign};
use crate::mgu::{get_activation, Activation, ActivationKind, GatedRecurrentCell, MguConfig, MguState};

type TestBackend = NdArray<f32>;

fn device() -> <TestBackend as Backend>::Device {
    <TestBackend as Backend>::Device::default()
}

/// Forget gate that always keeps the candidate
#[derive(Debug)]
struct AlwaysOpen;

impl<B: Backend> Activation<B> for AlwaysOpen {
    fn apply(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        Tensor::ones_like(&x)
    }

    fn name(&self) -> &str {
        "always_open"
    }
}

#[test]
fn test_lookup_by_name() {
    let sigmoid = get_activation::<TestBackend>("sigmoid").unwrap();
    let tanh = get_activation::<TestBackend>("TANH").unwrap();
    let lecun = get_activation::<TestBackend>("lecun").unwrap();

    assert_eq!(sigmoid.name(), "sigmoid");
    assert_eq!(tanh.name(), "tanh");
    assert_eq!(lecun.name(), "lecun_tanh");
}

#[test]
fn test_unknown_activation_name() {
    let err = get_activation::<TestBackend>("swish").unwrap_err();
    assert_eq!(err, MguError::UnknownActivation("swish".to_string()));

    assert!(ActivationKind::from_str("").is_err());
}

#[test]
fn test_kind_names_round_trip_through_display() {
    for kind in [
        ActivationKind::Sigmoid,
        ActivationKind::Tanh,
        ActivationKind::HardSigmoid,
        ActivationKind::LeCunTanh,
        ActivationKind::Softsign,
    ] {
        assert_eq!(ActivationKind::from_str(&kind.to_string()).unwrap(), kind);
    }
}

#[test]
fn test_builtin_sigmoid_and_tanh_match_formulas() {
    let device = device();
    let x = Tensor::<TestBackend, 2>::from_floats([[-2.0, -0.5, 0.0, 0.5, 2.0]], &device);

    let sigmoid = get_activation::<TestBackend>("sigmoid").unwrap();
    let tanh = get_activation::<TestBackend>("tanh").unwrap();

    let s = values(sigmoid.apply(x.clone()));
    let t = values(tanh.apply(x.clone()));
    for (i, v) in values(x).into_iter().enumerate() {
        assert!((s[i] - 1.0 / (1.0 + (-v).exp())).abs() < 1e-6);
        assert!((t[i] - v.tanh()).abs() < 1e-6);
    }
}

#[test]
fn test_hard_sigmoid_saturates() {
    let device = device();
    let x = Tensor::<TestBackend, 2>::from_floats([[-10.0, 0.0, 1.0, 10.0]], &device);

    let y = values(Activation::<TestBackend>::apply(&HardSigmoid, x));

    assert_eq!(y[0], 0.0);
    assert!((y[1] - 0.5).abs() < 1e-6);
    assert!((y[2] - 0.7).abs() < 1e-6);
    assert_eq!(y[3], 1.0);
}

#[test]
fn test_lecun_tanh_values() {
    let device = device();
    let test_values = [-10.0f32, -1.0, 0.0, 1.0, 10.0];
    let x = Tensor::<TestBackend, 2>::from_floats([test_values], &device);

    let y = values(Activation::<TestBackend>::apply(&LeCunTanh, x));

    for (val, result) in test_values.iter().zip(y) {
        let expected = 1.7159f32 * (0.666f32 * val).tanh();
        assert!(
            (result - expected).abs() < 1e-5,
            "LeCun activation incorrect at x={}",
            val
        );
    }
}

#[test]
fn test_softsign_range() {
    let device = device();
    let x = Tensor::<TestBackend, 2>::random([4, 8], Distribution::Uniform(-50.0, 50.0), &device);

    for val in values(Activation::<TestBackend>::apply(&Softsign, x)) {
        assert!(val > -1.0 && val < 1.0, "Softsign out of range: {}", val);
    }
}

#[test]
fn test_configured_activation_kinds_are_used() {
    let device = device();
    let cell = MguConfig::new(3, 4)
        .with_sigmoid(ActivationKind::HardSigmoid)
        .with_tanh(ActivationKind::Softsign)
        .init::<TestBackend>(&device)
        .unwrap();

    assert_eq!(cell.activations().sigmoid.name(), "hard_sigmoid");
    assert_eq!(cell.activations().tanh.name(), "softsign");
}

#[test]
fn test_custom_forget_gate_strategy() {
    let device = device();
    let cell = GatedRecurrentCell::<TestBackend>::new(3, 4, &device)
        .unwrap()
        .with_sigmoid(Arc::new(AlwaysOpen));

    let input = Tensor::<TestBackend, 2>::random([2, 3], Distribution::Uniform(-1.0, 1.0), &device);
    let hidden = Tensor::<TestBackend, 2>::random([2, 4], Distribution::Uniform(-1.0, 1.0), &device);
    let step = cell.step(input, MguState::new(hidden));

    // A fully open forget gate replaces the hidden state with the candidate
    assert_close(step.state.hidden, step.candidate, 1e-6);
}
