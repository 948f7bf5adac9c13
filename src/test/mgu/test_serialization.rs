// External imports
use burn::tensor::backend::Backend;
use burn_ndarray::NdArray;
use std::fs;
use tempfile::tempdir;

// Internal imports
use super::{assert_close, random_sequence};
use crate::mgu::step_5_model_serialization::{
    load_cell, load_model_config, save_cell, save_model_config,
};
use crate::mgu::{ActivationKind, ForgetGateInputs, GatedRecurrentCell, MguConfig};

type TestBackend = NdArray<f32>;

fn device() -> <TestBackend as Backend>::Device {
    <TestBackend as Backend>::Device::default()
}

#[test]
fn test_save_and_load_cell() {
    let device = device();
    let dir = tempdir().unwrap();

    let mut cell = MguConfig::reduced(3, 4)
        .with_tanh(ActivationKind::LeCunTanh)
        .init::<TestBackend>(&device)
        .unwrap();
    let input = random_sequence::<TestBackend>(3, 2, 3, &device);
    cell.forward(input.clone(), 0).unwrap();

    let saved_path = save_cell(&cell, &dir.path().join("mgu2_cell"), "unit test").unwrap();
    assert!(saved_path.exists(), "Parameter record should exist");
    assert!(dir.path().join("mgu2_cell_meta.json").exists(), "Metadata should exist");

    let (mut loaded, metadata) = load_cell::<TestBackend>(&saved_path, &device).unwrap();

    assert_eq!(metadata.config, *cell.config());
    assert_eq!(metadata.description, "unit test");
    assert_eq!(metadata.crate_version, env!("CARGO_PKG_VERSION"));
    assert!(metadata.saved_at().is_some());

    assert_eq!(loaded.forget_gate_inputs(), ForgetGateInputs::HiddenOnly);
    assert!(loaded.hidden().is_none(), "Hidden state is not persisted");
    assert_close(
        loaded.params().weight_input.val(),
        cell.params().weight_input.val(),
        1e-7,
    );

    // Same weights and a fresh state give the same trajectory as the reset source cell
    cell.reset_hidden();
    let expected = cell.forward(input.clone(), 0).unwrap();
    let actual = loaded.forward(input, 0).unwrap();
    assert_close(actual, expected, 1e-6);
}

#[test]
fn test_load_without_extension() {
    let device = device();
    let dir = tempdir().unwrap();

    let cell = GatedRecurrentCell::<TestBackend>::new(2, 3, &device).unwrap();
    save_cell(&cell, &dir.path().join("cell"), "").unwrap();

    let (loaded, _) = load_cell::<TestBackend>(&dir.path().join("cell"), &device).unwrap();
    assert_close(
        loaded.params().weight_hidden.val(),
        cell.params().weight_hidden.val(),
        1e-7,
    );
}

#[test]
fn test_load_missing_cell_fails() {
    let device = device();
    let dir = tempdir().unwrap();

    let result = load_cell::<TestBackend>(&dir.path().join("absent"), &device);
    assert!(result.is_err());
}

#[test]
fn test_config_json_persistence() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("configs").join("mgu.json");

    let config = MguConfig::new(8, 16)
        .with_bias(false)
        .with_sigmoid(ActivationKind::HardSigmoid);
    save_model_config(&config, &path).unwrap();

    let json = fs::read_to_string(&path).unwrap();
    assert!(json.contains("\"hard_sigmoid\""));
    assert!(json.contains("\"input_and_hidden\""));

    assert_eq!(load_model_config(&path).unwrap(), config);
}

#[test]
fn test_config_defaults_when_fields_missing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("minimal.json");
    fs::write(&path, r#"{ "input_size": 3, "hidden_size": 5 }"#).unwrap();

    assert_eq!(load_model_config(&path).unwrap(), MguConfig::new(3, 5));
}

#[test]
fn test_config_with_zero_size_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, r#"{ "input_size": 3, "hidden_size": 0 }"#).unwrap();

    assert!(load_model_config(&path).is_err());
}
