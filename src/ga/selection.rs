//! Fitness-proportionate parent selection.
//!
//! Selection works on **normalized** fitness: within the population's
//! fitness range the best individual weighs `1.0` and the worst `0.0`, so
//! the worst individual is never drawn while the range has a non-zero span.
//!
//! # References
//!
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and
//!   Machine Learning*, ch. 1 (roulette wheel)
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"

use super::types::{Chromosome, FitnessRange};
use rand::Rng;

/// Draws `count` parent indices by roulette-wheel sampling.
///
/// Each draw picks a target uniformly in `[0, total)` where `total` is the
/// sum of normalized fitness, then walks `population` in order and returns
/// the first index whose running sum reaches the target. If rounding leaves
/// the target unreached, the last index is returned.
///
/// `population` is expected to be sorted best first; the order affects
/// which individual wins ties. A converged `range` contributes a total of
/// zero, which always selects the first individual.
///
/// # Complexity
/// O(n) per draw
pub fn roulette_wheel<G, R: Rng>(
    population: &[Chromosome<G>],
    range: &FitnessRange,
    count: usize,
    rng: &mut R,
) -> Vec<usize> {
    if population.is_empty() {
        return Vec::new();
    }

    let weights: Vec<f64> = population
        .iter()
        .map(|c| range.normalize(c.fitness()))
        .collect();
    let total: f64 = if range.is_converged() {
        0.0
    } else {
        weights.iter().sum()
    };

    (0..count).map(|_| spin(&weights, total, rng)).collect()
}

fn spin<R: Rng>(weights: &[f64], total: f64, rng: &mut R) -> usize {
    let target = total * rng.random::<f64>();
    let mut cumulative = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        cumulative += w;
        if cumulative >= target {
            return i;
        }
    }
    weights.len() - 1 // floating-point fallback
}
