use thiserror::Error;

pub type Result<T> = std::result::Result<T, DerivativeError>;

/// Everything that can stop a derivative computation.
///
/// None of these are recovered from inside the crate: an execution that hits
/// one of them produces no output, and the caller may fix the parameters or
/// the pipeline wiring and run again.
#[derive(Error, Debug)]
pub enum DerivativeError {
    #[error("order of accuracy must be at least 1, got {order_of_accuracy}")]
    InvalidAccuracy { order_of_accuracy: u32 },

    #[error("axis {axis} is out of range for a {dimension}-dimensional field")]
    AxisOutOfRange { axis: usize, dimension: usize },

    #[error("spacing along axis {axis} must be finite and positive, got {spacing}")]
    InvalidSpacing { axis: usize, spacing: f64 },

    #[error("sample buffer has shape {actual:?}, region requires {expected:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// The halo-padded input region is not fully covered by the upstream data.
    #[error("requested region {requested} is not available, largest possible region is {available}")]
    RegionUnavailable { requested: String, available: String },

    #[error(
        "input buffer {input} lacks a halo of {radius} along axis {axis} for output region {output}"
    )]
    InsufficientHalo {
        axis: usize,
        radius: usize,
        input: String,
        output: String,
    },

    #[error("no stencil for derivative order {order} with order of accuracy {order_of_accuracy}: {reason}")]
    StencilConstruction {
        order: u32,
        order_of_accuracy: u32,
        reason: String,
    },

    #[error("input requested region was not negotiated before generating data")]
    RegionNotNegotiated,

    #[error("value {value} cannot be represented in the pixel type")]
    PixelCast { value: f64 },

    #[error("malformed parameter table: {0}")]
    Table(#[from] csv::Error),
}
