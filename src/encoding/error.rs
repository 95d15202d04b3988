//! Errors raised by the parameter encoding layer.

use thiserror::Error;

/// Failure while registering, reading, writing, or transferring parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodingError {
    /// The identifier was never registered with `add_parameter`.
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),

    /// The identifier is already registered.
    #[error("parameter already registered: {0}")]
    DuplicateParameter(String),

    /// `export_bits` was called before any parameter was registered.
    #[error("no parameters registered")]
    NoParameters,

    /// `import_bits` received a sequence of the wrong length.
    #[error("bit sequence length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Bit width outside `1..=MAX_BIT_WIDTH`.
    #[error("invalid bit width {width} for parameter {id}")]
    InvalidBitWidth { id: String, width: usize },

    /// Empty, inverted, zero-span or non-finite value range.
    #[error("invalid value range [{min}, {max}] for parameter {id}")]
    InvalidRange { id: String, min: f64, max: f64 },

    /// NaN or infinite value passed to `set`.
    #[error("non-finite value {value} for parameter {id}")]
    NonFiniteValue { id: String, value: f64 },
}
