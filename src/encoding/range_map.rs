//! Linear interpolation between two numeric intervals.
//!
//! [`RangeMap`] is the primitive that turns a real-valued parameter into an
//! integer index inside a bit budget and back again.

use std::ops::RangeInclusive;

/// A closed numeric interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interval {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

impl Interval {
    /// Creates an interval from its bounds.
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Width of the interval (`max - min`).
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Whether `value` lies within the closed interval.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl From<RangeInclusive<f64>> for Interval {
    fn from(range: RangeInclusive<f64>) -> Self {
        let (min, max) = range.into_inner();
        Self { min, max }
    }
}

/// Bidirectional affine map between interval `A` and interval `B`.
///
/// Both directions are pure functions of their argument. Values outside an
/// interval are extrapolated along the same line, not clamped.
///
/// # Examples
///
/// ```
/// use u_bitgene::encoding::{Interval, RangeMap};
///
/// let map = RangeMap::new(Interval::new(0.0, 10.0), Interval::new(0.0, 100.0));
/// assert_eq!(map.map_to_b(7.5), 75.0);
/// assert_eq!(map.map_to_a(50.0), 5.0);
/// ```
///
/// # Degenerate intervals
///
/// A zero-span interval makes the map undefined (division by zero). Callers
/// must supply non-degenerate intervals; debug builds assert it.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RangeMap {
    a: Interval,
    b: Interval,
}

impl RangeMap {
    /// Creates a map between `a` and `b`.
    pub fn new(a: Interval, b: Interval) -> Self {
        debug_assert!(a.span() != 0.0, "interval A has zero span");
        debug_assert!(b.span() != 0.0, "interval B has zero span");
        Self { a, b }
    }

    /// The `A` side of the map.
    pub fn a(&self) -> Interval {
        self.a
    }

    /// The `B` side of the map.
    pub fn b(&self) -> Interval {
        self.b
    }

    /// Maps a value expressed in `A` into `B`.
    pub fn map_to_b(&self, value_in_a: f64) -> f64 {
        interpolate(value_in_a, &self.a, &self.b)
    }

    /// Maps a value expressed in `B` into `A`.
    pub fn map_to_a(&self, value_in_b: f64) -> f64 {
        interpolate(value_in_b, &self.b, &self.a)
    }
}

fn interpolate(value: f64, from: &Interval, to: &Interval) -> f64 {
    let fraction = (value - from.min) / from.span();
    to.min + to.span() * fraction
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_int_like_ranges() {
        let map = RangeMap::new((0.0..=10.0).into(), (0.0..=100.0).into());

        for a in [0.0, 5.0, 7.5, 10.0] {
            assert_eq!(map.map_to_b(a) / 10.0, a);
        }
        for b in [0.0, 50.0, 75.0, 100.0] {
            assert_eq!(map.map_to_a(b) * 10.0, b);
        }
    }

    #[test]
    fn test_unit_to_decade() {
        let map = RangeMap::new(Interval::new(0.0, 1.0), Interval::new(0.0, 10.0));
        assert_eq!(map.map_to_b(0.5), 5.0);
        assert_eq!(map.map_to_a(10.0), 1.0);
    }

    #[test]
    fn test_offset_intervals() {
        let map = RangeMap::new(Interval::new(-1.0, 1.0), Interval::new(0.0, 255.0));
        assert_eq!(map.map_to_b(-1.0), 0.0);
        assert_eq!(map.map_to_b(1.0), 255.0);
        assert!((map.map_to_b(0.0) - 127.5).abs() < 1e-12);
    }

    #[test]
    fn test_extrapolates_outside_a() {
        let map = RangeMap::new(Interval::new(0.0, 1.0), Interval::new(0.0, 10.0));
        assert_eq!(map.map_to_b(2.0), 20.0);
        assert_eq!(map.map_to_b(-1.0), -10.0);
    }

    #[test]
    fn test_interval_helpers() {
        let i = Interval::new(2.0, 5.0);
        assert_eq!(i.span(), 3.0);
        assert!(i.contains(2.0));
        assert!(i.contains(5.0));
        assert!(!i.contains(5.1));
    }

    proptest! {
        #[test]
        fn prop_round_trip(
            a_min in -1.0e3f64..1.0e3,
            a_span in 1.0e-3f64..1.0e3,
            b_min in -1.0e3f64..1.0e3,
            b_span in 1.0e-3f64..1.0e3,
            t in 0.0f64..=1.0,
        ) {
            let map = RangeMap::new(
                Interval::new(a_min, a_min + a_span),
                Interval::new(b_min, b_min + b_span),
            );
            let x = a_min + a_span * t;
            let back = map.map_to_a(map.map_to_b(x));
            prop_assert!((back - x).abs() <= 1e-6 * (1.0 + x.abs()));
        }
    }
}
