//! Fixed-width bit conversions.
//!
//! Bit sequences are stored as `bool` slices with index 0 holding the most
//! significant bit. [`integer_to_bits`] and [`bits_to_integer`] are inverses
//! and the export/import layout of [`BitBackedHash`](super::BitBackedHash)
//! depends on that ordering.

/// Largest bit width a single parameter may use.
///
/// Every integer in `[0, 2^52 - 1]` is exactly representable as `f64`, so
/// range mapping never loses integer precision.
pub const MAX_BIT_WIDTH: usize = 52;

/// Largest integer representable in `width` bits (`2^width - 1`).
pub fn max_integer(width: usize) -> u64 {
    debug_assert!(width <= 64);
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// Encodes `value` as `width` bits, most significant first.
///
/// Bits of `value` above `width` are discarded.
///
/// ```
/// use u_bitgene::encoding::integer_to_bits;
///
/// assert_eq!(integer_to_bits(4, 5), vec![false, true, false, true]);
/// ```
pub fn integer_to_bits(width: usize, value: u64) -> Vec<bool> {
    (0..width)
        .rev()
        .map(|n| n < 64 && (value >> n) & 1 == 1)
        .collect()
}

/// Decodes a most-significant-first bit slice into an integer.
///
/// ```
/// use u_bitgene::encoding::bits_to_integer;
///
/// assert_eq!(bits_to_integer(&[true, false, true]), 5);
/// ```
pub fn bits_to_integer(bits: &[bool]) -> u64 {
    bits.iter()
        .fold(0u64, |acc, &bit| (acc << 1) | u64::from(bit))
}
