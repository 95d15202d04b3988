//! Default genetic operators.
//!
//! # Crossover Operators
//!
//! - [`one_point_crossover`]: Splits both parents at one random point.
//!   Works on any payload, including flat bit genomes.
//! - [`edge_recombination`]: Builds a child by following successor edges
//!   of both parents. **Permutation payloads only** (`0..n` as `usize`).
//!
//! # Mutation Operators
//!
//! - [`adjacent_swap_mutation`]: Exchange two neighbouring positions, O(1)
//! - [`mutation_probability`]: Rank-scaled mutation chance
//!
//! # References
//!
//! - Whitley, Starkweather & Fuquay (1989), "Scheduling Problems and
//!   Traveling Salesmen: The Genetic Edge Recombination Operator"
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and
//!   Machine Learning*

use rand::Rng;

/// Probability that [`one_point_crossover`] takes its left side from the
/// second parent.
pub const DEFAULT_PARENT_SWAP_PROBABILITY: f64 = 0.5;

/// Probability that [`edge_recombination`] exchanges the preferred parent
/// after each placed token.
pub const EDGE_SWAP_PROBABILITY: f64 = 0.4;

/// Default scale of [`mutation_probability`]: the worst individual in a
/// range is mutated with this probability.
pub const DEFAULT_MUTATION_FACTOR: f64 = 0.3;

// ============================================================================
// Crossover operators
// ============================================================================

/// One-point crossover.
///
/// With probability `swap_probability` the parents trade sides. A split
/// index is drawn uniformly from `[0, len - 2]` and the child is
/// `left[..=split]` followed by `right[split + 1..]`, so it has the length
/// of the left parent when both parents have equal length.
///
/// Payloads shorter than two elements are copied from the left parent.
///
/// # Complexity
/// O(n) time, O(n) space
pub fn one_point_crossover<T: Clone, R: Rng>(
    parent_a: &[T],
    parent_b: &[T],
    swap_probability: f64,
    rng: &mut R,
) -> Vec<T> {
    let (left, right) = if rng.random::<f64>() < swap_probability {
        (parent_b, parent_a)
    } else {
        (parent_a, parent_b)
    };

    if left.len() < 2 {
        return left.to_vec();
    }

    let split = rng.random_range(0..left.len() - 1);
    let mut child = Vec::with_capacity(left.len());
    child.extend_from_slice(&left[..=split]);
    if let Some(tail) = right.get(split + 1..) {
        child.extend_from_slice(tail);
    }
    child
}

/// Edge recombination for permutations of `0..n`.
///
/// Starts from the first token of `parent_a`. At each step the successor of
/// the current token in the preferred parent's partner (initially
/// `parent_b`) is used if still unused, then the successor in the preferred
/// parent, otherwise a random unused token. After each step the parents
/// trade roles with probability `swap_probability`.
///
/// # Complexity
/// O(n²) time in the worst case, O(n) space
///
/// # Panics
/// Panics if the parents have different lengths or contain a token `>= n`.
pub fn edge_recombination<R: Rng>(
    parent_a: &[usize],
    parent_b: &[usize],
    swap_probability: f64,
    rng: &mut R,
) -> Vec<usize> {
    let n = parent_a.len();
    assert_eq!(n, parent_b.len(), "parents must have equal length");
    if n == 0 {
        return Vec::new();
    }

    let succ_a = successors(parent_a);
    let succ_b = successors(parent_b);
    let (mut first, mut second) = (&succ_a, &succ_b);

    let mut available: Vec<usize> = (0..n).collect();
    let mut used = vec![false; n];

    let mut token = parent_a[0];
    let mut child = Vec::with_capacity(n);
    take(&mut available, &mut used, token);
    child.push(token);

    while !available.is_empty() {
        let unused = |t: &usize| !used[*t];
        token = match second[token].filter(unused) {
            Some(next) => next,
            None => match first[token].filter(unused) {
                Some(next) => next,
                None => available[rng.random_range(0..available.len())],
            },
        };
        take(&mut available, &mut used, token);
        child.push(token);

        if rng.random::<f64>() < swap_probability {
            std::mem::swap(&mut first, &mut second);
        }
    }

    child
}

/// Successor of each token in a permutation (`None` for the last token).
fn successors(perm: &[usize]) -> Vec<Option<usize>> {
    let mut next = vec![None; perm.len()];
    for pair in perm.windows(2) {
        next[pair[0]] = Some(pair[1]);
    }
    next
}

fn take(available: &mut Vec<usize>, used: &mut [bool], token: usize) {
    used[token] = true;
    if let Some(pos) = available.iter().position(|&t| t == token) {
        available.remove(pos);
    }
}

// ============================================================================
// Mutation operators
// ============================================================================

/// Adjacent swap mutation: exchange a random position with its successor.
///
/// # Complexity
/// O(1)
pub fn adjacent_swap_mutation<T, R: Rng>(genome: &mut [T], rng: &mut R) {
    let n = genome.len();
    if n < 2 {
        return;
    }
    let i = rng.random_range(0..n - 1);
    genome.swap(i, i + 1);
}

/// Mutation probability for an individual with the given normalized fitness.
///
/// `(1 - normalized) * factor`: zero for the best individual, `factor` for
/// the worst.
pub fn mutation_probability(normalized: f64, factor: f64) -> f64 {
    (1.0 - normalized) * factor
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;
    use std::collections::HashSet;

    /// Check that a slice is a valid permutation of 0..n.
    fn is_valid_permutation(perm: &[usize], n: usize) -> bool {
        if perm.len() != n {
            return false;
        }
        let set: HashSet<usize> = perm.iter().copied().collect();
        set.len() == n && perm.iter().all(|&v| v < n)
    }

    // ---- One-point crossover ----

    #[test]
    fn test_one_point_prefix_and_suffix() {
        let mut rng = create_rng(42);
        let a = vec![0u8; 8];
        let b = vec![1u8; 8];

        for _ in 0..200 {
            let child = one_point_crossover(&a, &b, DEFAULT_PARENT_SWAP_PROBABILITY, &mut rng);
            assert_eq!(child.len(), 8);
            // A prefix of one parent followed by a non-empty suffix of the other.
            let head = child[0];
            let switch = child.iter().position(|&g| g != head).unwrap();
            assert!((1..=7).contains(&switch));
            assert!(child[switch..].iter().all(|&g| g != head));
        }
    }

    #[test]
    fn test_one_point_never_swaps_at_zero() {
        let mut rng = create_rng(7);
        let a = vec![0u8; 5];
        let b = vec![1u8; 5];
        for _ in 0..50 {
            let child = one_point_crossover(&a, &b, 0.0, &mut rng);
            assert_eq!(child[0], 0);
            assert_eq!(child[4], 1);
        }
    }

    #[test]
    fn test_one_point_always_swaps_at_one() {
        let mut rng = create_rng(8);
        let a = vec![0u8; 5];
        let b = vec![1u8; 5];
        for _ in 0..50 {
            let child = one_point_crossover(&a, &b, 1.0, &mut rng);
            assert_eq!(child[0], 1);
            assert_eq!(child[4], 0);
        }
    }

    #[test]
    fn test_one_point_split_covers_range() {
        let mut rng = create_rng(9);
        let a = vec![0u8; 4];
        let b = vec![1u8; 4];
        let mut splits = HashSet::new();
        for _ in 0..500 {
            let child = one_point_crossover(&a, &b, 0.0, &mut rng);
            splits.insert(child.iter().filter(|&&g| g == 0).count());
        }
        // Split index in [0, 2] keeps 1..=3 genes from the left parent.
        assert_eq!(splits, HashSet::from([1, 2, 3]));
    }

    #[test]
    fn test_one_point_short_payloads() {
        let mut rng = create_rng(1);
        assert_eq!(one_point_crossover(&[5u8], &[6u8], 0.0, &mut rng), vec![5]);
        let empty: Vec<u8> = Vec::new();
        assert!(one_point_crossover(&empty, &empty, 0.0, &mut rng).is_empty());
    }

    // ---- Edge recombination ----

    #[test]
    fn test_edge_recombination_valid_permutations() {
        let mut rng = create_rng(42);
        let p1: Vec<usize> = (0..10).collect();
        let p2 = vec![3, 7, 5, 1, 6, 0, 2, 4, 9, 8];

        for _ in 0..200 {
            let child = edge_recombination(&p1, &p2, EDGE_SWAP_PROBABILITY, &mut rng);
            assert!(is_valid_permutation(&child, 10), "invalid child: {child:?}");
            assert_eq!(child[0], 0);
        }
    }

    #[test]
    fn test_edge_recombination_identical_parents() {
        let mut rng = create_rng(3);
        let p = vec![4, 2, 0, 3, 1];
        let child = edge_recombination(&p, &p, EDGE_SWAP_PROBABILITY, &mut rng);
        assert_eq!(child, p);
    }

    #[test]
    fn test_edge_recombination_prefers_partner_edges() {
        let mut rng = create_rng(4);
        let a = vec![0, 1, 2, 3];
        let b = vec![3, 2, 1, 0];
        // Never swapping: follow b's successors first. From 0, b has none,
        // so a's successor 1 is taken, then b: 1 -> 0 (used), a: 1 -> 2, ...
        let child = edge_recombination(&a, &b, 0.0, &mut rng);
        assert_eq!(child, vec![0, 1, 2, 3]);

        let c = vec![0, 3, 1, 2];
        let child = edge_recombination(&a, &c, 0.0, &mut rng);
        // 0 -> c:3; 3 -> c:1; 1 -> c:2.
        assert_eq!(child, vec![0, 3, 1, 2]);
    }

    #[test]
    fn test_edge_recombination_single_and_empty() {
        let mut rng = create_rng(2);
        assert_eq!(edge_recombination(&[0], &[0], 0.4, &mut rng), vec![0]);
        assert!(edge_recombination(&[], &[], 0.4, &mut rng).is_empty());
    }

    #[test]
    #[should_panic(expected = "parents must have equal length")]
    fn test_edge_recombination_length_mismatch() {
        let mut rng = create_rng(2);
        edge_recombination(&[0, 1], &[0], 0.4, &mut rng);
    }

    // ---- Mutation ----

    #[test]
    fn test_adjacent_swap_moves_neighbours() {
        let mut rng = create_rng(42);
        for _ in 0..100 {
            let mut perm: Vec<usize> = (0..10).collect();
            adjacent_swap_mutation(&mut perm, &mut rng);
            assert!(is_valid_permutation(&perm, 10));
            let moved: Vec<usize> = (0..10).filter(|&i| perm[i] != i).collect();
            assert_eq!(moved.len(), 2);
            assert_eq!(moved[1], moved[0] + 1);
        }
    }

    #[test]
    fn test_adjacent_swap_single_element() {
        let mut rng = create_rng(42);
        let mut genome = vec![true];
        adjacent_swap_mutation(&mut genome, &mut rng);
        assert_eq!(genome, vec![true]);
    }

    #[test]
    fn test_mutation_probability_scale() {
        assert_eq!(mutation_probability(1.0, DEFAULT_MUTATION_FACTOR), 0.0);
        assert!((mutation_probability(0.0, DEFAULT_MUTATION_FACTOR) - 0.3).abs() < 1e-15);
        assert!((mutation_probability(0.5, 0.4) - 0.2).abs() < 1e-15);
    }
}
