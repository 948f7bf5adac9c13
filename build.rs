fn main() {
    // Exposes PKG_VERSION and friends to src/mgu/step_5_model_serialization.rs
    built::write_built_file().expect("Failed to generate build info");
}
