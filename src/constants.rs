// Gate layout
pub const GATE_CHUNKS: usize = 2; // forget half, candidate half

// Default activations, resolved through ActivationKind
pub const DEFAULT_SIGMOID: &str = "sigmoid";
pub const DEFAULT_TANH: &str = "tanh";

// LeCun scaled tanh: 1.7159 * tanh(0.666 * x)
pub const LECUN_OUTER_SCALE: f32 = 1.7159;
pub const LECUN_INNER_SCALE: f32 = 0.666;

// Hard sigmoid: clamp(0.2 * x + 0.5, 0, 1)
pub const HARD_SIGMOID_SLOPE: f32 = 0.2;
pub const HARD_SIGMOID_OFFSET: f32 = 0.5;

// Persistence
pub const MODEL_FILE_EXTENSION: &str = "bin";
pub const METADATA_SUFFIX: &str = "_meta.json";
