//! Named parameters backed by fixed-width bit fields.
//!
//! A [`BitBackedHash`] stores each registered parameter as a short bit
//! sequence and maps it to and from a real value through a [`RangeMap`].
//! The whole collection can be flattened into one bit sequence, which lets
//! generic bit-level genetic operators act on a typed parameter vector.
//!
//! # Wire layout
//!
//! [`export_bits`](BitBackedHash::export_bits) concatenates every
//! parameter's bits in ascending key order, each parameter contributing
//! exactly `bit_width` bits, most significant bit first.
//! [`import_bits`](BitBackedHash::import_bits) consumes the same layout.

use super::bits::{bits_to_integer, integer_to_bits, max_integer, MAX_BIT_WIDTH};
use super::error::EncodingError;
use super::range_map::{Interval, RangeMap};
use rand::Rng;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;

/// One encoded scalar: its value range, bit width, and current bits.
///
/// With the `serde` feature only the range and bits are serialized; the
/// range map is rebuilt and both are validated on deserialization.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "ParameterRecord", into = "ParameterRecord")
)]
pub struct Parameter {
    value_range: Interval,
    bits: Vec<bool>,
    range_map: RangeMap,
}

impl Parameter {
    fn new(value_range: Interval, bit_width: usize) -> Self {
        let integer_range = Interval::new(0.0, max_integer(bit_width) as f64);
        Self {
            value_range,
            bits: vec![false; bit_width],
            range_map: RangeMap::new(value_range, integer_range),
        }
    }

    /// Rejects widths outside `1..=MAX_BIT_WIDTH` and ranges that are not
    /// finite with `min < max`. `id` is only rendered on failure.
    fn check(
        id: impl Fn() -> String,
        value_range: Interval,
        bit_width: usize,
    ) -> Result<(), EncodingError> {
        if bit_width == 0 || bit_width > MAX_BIT_WIDTH {
            return Err(EncodingError::InvalidBitWidth {
                id: id(),
                width: bit_width,
            });
        }
        let Interval { min, max } = value_range;
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(EncodingError::InvalidRange { id: id(), min, max });
        }
        Ok(())
    }

    /// Rebuilds a parameter from its value range and stored bits, with
    /// the same checks as [`BitBackedHash::add_parameter`].
    pub fn from_bits(
        value_range: Interval,
        bits: Vec<bool>,
    ) -> Result<Self, EncodingError> {
        Self::check(|| "<restored>".to_string(), value_range, bits.len())?;
        let mut param = Self::new(value_range, bits.len());
        param.bits = bits;
        Ok(param)
    }

    /// Number of bits backing this parameter.
    pub fn bit_width(&self) -> usize {
        self.bits.len()
    }

    /// The value range the bits are mapped onto.
    pub fn value_range(&self) -> Interval {
        self.value_range
    }

    /// Current bits, most significant first.
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Decoded value of the current bits.
    pub fn value(&self) -> f64 {
        self.range_map.map_to_a(bits_to_integer(&self.bits) as f64)
    }

    /// Largest step between two adjacent encodable values.
    pub fn resolution(&self) -> f64 {
        self.value_range.span() / max_integer(self.bit_width()) as f64
    }

    /// Quantizes `value` into the bits and returns the stored value.
    fn store(&mut self, value: f64) -> f64 {
        let top = max_integer(self.bit_width()) as f64;
        let index = self.range_map.map_to_b(value).round().clamp(0.0, top) as u64;
        self.bits = integer_to_bits(self.bit_width(), index);
        self.value()
    }
}

/// Serialized form of a [`Parameter`].
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct ParameterRecord {
    value_range: Interval,
    bits: Vec<bool>,
}

#[cfg(feature = "serde")]
impl TryFrom<ParameterRecord> for Parameter {
    type Error = EncodingError;

    fn try_from(record: ParameterRecord) -> Result<Self, Self::Error> {
        Parameter::from_bits(record.value_range, record.bits)
    }
}

#[cfg(feature = "serde")]
impl From<Parameter> for ParameterRecord {
    fn from(param: Parameter) -> Self {
        Self {
            value_range: param.value_range,
            bits: param.bits,
        }
    }
}

/// An ordered collection of bit-encoded parameters.
///
/// Keys can be any totally ordered type; their order defines the flat
/// bit layout.
///
/// # Examples
///
/// ```
/// use u_bitgene::encoding::BitBackedHash;
///
/// let mut params = BitBackedHash::new();
/// params.add_parameter("x", 0.0..=31.0, 8).unwrap();
///
/// // The stored value is the quantized approximation.
/// let stored = params.set(&"x", 25.0).unwrap();
/// assert!((stored - 25.0).abs() <= params.resolution(&"x").unwrap() / 2.0);
///
/// let bits = params.export_bits().unwrap();
/// assert_eq!(bits.len(), 8);
///
/// let mut copy = params.cleared();
/// copy.import_bits(&bits).unwrap();
/// assert_eq!(copy.get(&"x").unwrap(), stored);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(bound(
        serialize = "K: serde::Serialize",
        deserialize = "K: Ord + serde::Deserialize<'de>"
    ))
)]
pub struct BitBackedHash<K> {
    params: BTreeMap<K, Parameter>,
}

impl<K: Ord> Default for BitBackedHash<K> {
    fn default() -> Self {
        Self {
            params: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Clone + fmt::Debug> BitBackedHash<K> {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a parameter with all bits cleared.
    ///
    /// # Errors
    ///
    /// - [`EncodingError::DuplicateParameter`] if `id` is already registered
    /// - [`EncodingError::InvalidBitWidth`] unless `1 <= bit_width <= 52`
    /// - [`EncodingError::InvalidRange`] if the range is not finite with
    ///   `min < max`
    pub fn add_parameter(
        &mut self,
        id: K,
        value_range: RangeInclusive<f64>,
        bit_width: usize,
    ) -> Result<(), EncodingError> {
        if self.params.contains_key(&id) {
            return Err(EncodingError::DuplicateParameter(format!("{id:?}")));
        }
        let range = Interval::from(value_range);
        Parameter::check(|| format!("{id:?}"), range, bit_width)?;

        self.params.insert(id, Parameter::new(range, bit_width));
        Ok(())
    }

    /// Decoded value of a parameter.
    pub fn get(&self, id: &K) -> Result<f64, EncodingError> {
        Ok(self.parameter(id)?.value())
    }

    /// Quantizes `value` into the parameter's bits.
    ///
    /// Returns the value that now reads back from [`get`](Self::get), which
    /// is the nearest encodable approximation rather than `value` itself.
    /// Values outside the parameter range are stored as the nearest bound.
    pub fn set(&mut self, id: &K, value: f64) -> Result<f64, EncodingError> {
        if !value.is_finite() {
            return Err(EncodingError::NonFiniteValue {
                id: format!("{id:?}"),
                value,
            });
        }
        let param = self
            .params
            .get_mut(id)
            .ok_or_else(|| EncodingError::UnknownParameter(format!("{id:?}")))?;
        Ok(param.store(value))
    }

    /// Quantization step of a parameter. The worst-case error of
    /// [`set`](Self::set) is half of this.
    pub fn resolution(&self, id: &K) -> Result<f64, EncodingError> {
        Ok(self.parameter(id)?.resolution())
    }

    /// Bit width of a parameter.
    pub fn bit_width(&self, id: &K) -> Result<usize, EncodingError> {
        Ok(self.parameter(id)?.bit_width())
    }

    /// Value range of a parameter.
    pub fn value_range(&self, id: &K) -> Result<Interval, EncodingError> {
        Ok(self.parameter(id)?.value_range())
    }

    /// Current bits of a single parameter.
    pub fn parameter_bits(&self, id: &K) -> Result<&[bool], EncodingError> {
        Ok(self.parameter(id)?.bits())
    }

    /// Looks up the full parameter record.
    pub fn parameter(&self, id: &K) -> Result<&Parameter, EncodingError> {
        self.params
            .get(id)
            .ok_or_else(|| EncodingError::UnknownParameter(format!("{id:?}")))
    }

    /// Flattens every parameter's bits in ascending key order.
    ///
    /// # Errors
    ///
    /// [`EncodingError::NoParameters`] when nothing is registered.
    pub fn export_bits(&self) -> Result<Vec<bool>, EncodingError> {
        if self.params.is_empty() {
            return Err(EncodingError::NoParameters);
        }
        Ok(self.concat_bits())
    }

    pub(crate) fn concat_bits(&self) -> Vec<bool> {
        let mut out = Vec::with_capacity(self.total_bits());
        for param in self.params.values() {
            out.extend_from_slice(&param.bits);
        }
        out
    }

    /// Loads a flat bit sequence produced by [`export_bits`](Self::export_bits).
    ///
    /// The length is checked before any parameter is modified.
    pub fn import_bits(&mut self, bits: &[bool]) -> Result<(), EncodingError> {
        let expected = self.total_bits();
        if bits.len() != expected {
            return Err(EncodingError::LengthMismatch {
                expected,
                actual: bits.len(),
            });
        }

        let mut offset = 0;
        for param in self.params.values_mut() {
            let width = param.bit_width();
            param.bits.copy_from_slice(&bits[offset..offset + width]);
            offset += width;
        }
        Ok(())
    }

    /// Sum of all registered bit widths.
    pub fn total_bits(&self) -> usize {
        self.params.values().map(Parameter::bit_width).sum()
    }

    /// Number of registered parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether no parameter is registered.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: &K) -> bool {
        self.params.contains_key(id)
    }

    /// Registered keys in wire order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.params.keys()
    }

    /// Decoded `(key, value)` pairs in wire order.
    pub fn values(&self) -> impl Iterator<Item = (&K, f64)> {
        self.params.iter().map(|(k, p)| (k, p.value()))
    }

    /// Stores a uniformly random value from each parameter's range.
    pub fn randomize<R: Rng>(&mut self, rng: &mut R) {
        for param in self.params.values_mut() {
            let range = param.value_range;
            param.store(rng.random_range(range.min..=range.max));
        }
    }

    /// A copy with the same schema and every bit cleared.
    pub fn cleared(&self) -> Self {
        let params = self
            .params
            .iter()
            .map(|(k, p)| (k.clone(), Parameter::new(p.value_range, p.bit_width())))
            .collect();
        Self { params }
    }
}

impl<K: fmt::Display> fmt::Display for BitBackedHash<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, param) in &self.params {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{key}={}", param.value())?;
        }
        Ok(())
    }
}
