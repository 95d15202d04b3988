//! Bit-level parameter encoding.
//!
//! Bridges typed, real-valued parameters and the flat bit genomes that
//! generic genetic operators manipulate.
//!
//! # Key Types
//!
//! - [`RangeMap`]: Linear map between two [`Interval`]s
//! - [`BitBackedHash`]: Named parameters stored as fixed-width bit fields
//! - [`EncodingError`]: Lookup, registration, and transfer failures
//!
//! Quantization is lossy but bounded: a value written into a parameter
//! reads back within half of its [`resolution`](BitBackedHash::resolution).

mod bits;
mod error;
mod hash;
mod range_map;

pub use bits::{bits_to_integer, integer_to_bits, max_integer, MAX_BIT_WIDTH};
pub use error::EncodingError;
pub use hash::{BitBackedHash, Parameter};
pub use range_map::{Interval, RangeMap};
