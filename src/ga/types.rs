//! Core definitions shared by the search engine and problem bindings.
//!
//! [`GeneticProblem`] is the contract between the generic engine and a
//! domain: it seeds, scores, recombines, and perturbs payloads.
//! [`Chromosome`] wraps one payload with its age and memoized fitness.

use super::operators::{
    adjacent_swap_mutation, mutation_probability, one_point_crossover,
    DEFAULT_PARENT_SWAP_PROBABILITY,
};
use super::runner::GenerationStats;
use rand::Rng;
use std::cmp::Ordering;

/// Defines a genetic search problem.
///
/// The payload of every chromosome is a `Vec<Self::Gene>`. The problem value
/// itself is the context object shared by all chromosomes (cost matrices,
/// parameter schemas, and so on); nothing is kept in global state.
///
/// # Fitness
///
/// **Higher fitness is better.** For minimization, negate the cost.
///
/// # Thread Safety
///
/// `GeneticProblem` must be `Send + Sync` because fitness evaluation may run
/// in parallel with the `parallel` feature.
///
/// # Implementing
///
/// ```
/// use rand::Rng;
/// use u_bitgene::ga::GeneticProblem;
///
/// struct CountOnes(usize);
///
/// impl GeneticProblem for CountOnes {
///     type Gene = bool;
///
///     fn seed<R: Rng>(&self, rng: &mut R) -> Vec<bool> {
///         (0..self.0).map(|_| rng.random_bool(0.5)).collect()
///     }
///
///     fn fitness(&self, genome: &[bool]) -> f64 {
///         genome.iter().filter(|&&b| b).count() as f64
///     }
/// }
/// ```
pub trait GeneticProblem: Send + Sync {
    /// Element type of the payload.
    type Gene: Clone + PartialEq + Send + Sync;

    /// Produces one random point in the search space.
    fn seed<R: Rng>(&self, rng: &mut R) -> Vec<Self::Gene>;

    /// Scores a payload. Must be deterministic for a given payload.
    fn fitness(&self, genome: &[Self::Gene]) -> f64;

    /// Combines two parent payloads into one child payload.
    ///
    /// Defaults to [`one_point_crossover`] with
    /// [`DEFAULT_PARENT_SWAP_PROBABILITY`].
    fn reproduce<R: Rng>(
        &self,
        parent_a: &[Self::Gene],
        parent_b: &[Self::Gene],
        rng: &mut R,
    ) -> Vec<Self::Gene> {
        one_point_crossover(parent_a, parent_b, DEFAULT_PARENT_SWAP_PROBABILITY, rng)
    }

    /// Applies one small random change to a payload.
    ///
    /// Defaults to [`adjacent_swap_mutation`]. Whether it is called at all
    /// is decided by [`Chromosome::mutate`].
    fn perturb<R: Rng>(&self, genome: &mut [Self::Gene], rng: &mut R) {
        adjacent_swap_mutation(genome, rng);
    }

    /// Called after every generation with its summary.
    fn on_generation(&self, _stats: &GenerationStats) {}
}

/// Observed fitness bounds of a set of chromosomes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitnessRange {
    /// Worst fitness in the set.
    pub min: f64,
    /// Best fitness in the set.
    pub max: f64,
}

impl FitnessRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Computes the range over the current fitness of `chromosomes`.
    ///
    /// Only finite fitness values bound the range; an individual scored
    /// `-inf` or NaN sits at its floor instead of stretching it. If no value
    /// is finite the range is converged. Returns `None` for an empty slice.
    pub fn of<G>(chromosomes: &[Chromosome<G>]) -> Option<Self> {
        if chromosomes.is_empty() {
            return None;
        }
        let bounds = chromosomes
            .iter()
            .map(Chromosome::fitness)
            .filter(|f| f.is_finite())
            .fold(None, |acc: Option<(f64, f64)>, f| match acc {
                Some((lo, hi)) => Some((lo.min(f), hi.max(f))),
                None => Some((f, f)),
            });
        let (min, max) = bounds.unwrap_or((0.0, 0.0));
        Some(Self { min, max })
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Whether every member of the set had the same fitness.
    pub fn is_converged(&self) -> bool {
        !matches!(self.span().partial_cmp(&0.0), Some(Ordering::Greater))
    }

    /// Rescales `fitness` to `[0, 1]` within this range.
    ///
    /// A converged range normalizes everything to `1.0`. Values outside the
    /// range clamp to its ends and NaN maps to `0.0`.
    pub fn normalize(&self, fitness: f64) -> f64 {
        if self.is_converged() {
            1.0
        } else if fitness.is_nan() {
            0.0
        } else {
            ((fitness - self.min) / self.span()).clamp(0.0, 1.0)
        }
    }
}

/// Orders chromosomes best first.
///
/// Incomparable values (NaN) are treated as equal.
pub fn by_fitness_descending<G>(a: &Chromosome<G>, b: &Chromosome<G>) -> Ordering {
    b.fitness()
        .partial_cmp(&a.fitness())
        .unwrap_or(Ordering::Equal)
}

/// One candidate solution.
///
/// Owns its payload outright; constructing from a borrowed slice clones it,
/// so a child never aliases a parent.
///
/// # Age
///
/// - `-1`: offspring produced this generation, not yet eligible for mutation
/// - `>= 0`: survived at least one aging step (seeded individuals start at 0)
///
/// Equality compares payloads only.
#[derive(Debug, Clone)]
pub struct Chromosome<G> {
    data: Vec<G>,
    age: i64,
    fitness: Option<f64>,
}

impl<G> Chromosome<G> {
    /// Wraps a payload with `age = 0`.
    pub fn new(data: Vec<G>) -> Self {
        Self {
            data,
            age: 0,
            fitness: None,
        }
    }

    /// Seeds a fresh individual from `problem`.
    pub fn seed<P, R>(problem: &P, rng: &mut R) -> Self
    where
        P: GeneticProblem<Gene = G>,
        R: Rng,
    {
        Self::new(problem.seed(rng))
    }

    /// Produces one offspring of `a` and `b` with `age = -1`.
    pub fn reproduce<P, R>(problem: &P, a: &Self, b: &Self, rng: &mut R) -> Self
    where
        P: GeneticProblem<Gene = G>,
        R: Rng,
    {
        let mut child = Self::new(problem.reproduce(&a.data, &b.data, rng));
        child.age = -1;
        child
    }

    pub fn data(&self) -> &[G] {
        &self.data
    }

    /// Replaces the payload and clears the cached fitness.
    pub fn set_data(&mut self, data: Vec<G>) {
        self.data = data;
        self.fitness = None;
    }

    pub fn into_data(self) -> Vec<G> {
        self.data
    }

    pub fn age(&self) -> i64 {
        self.age
    }

    pub fn set_age(&mut self, age: i64) {
        self.age = age.max(-1);
    }

    pub fn increment_age(&mut self) {
        self.age += 1;
    }

    /// Whether this individual was born in the current generation.
    pub fn is_offspring(&self) -> bool {
        self.age < 0
    }

    /// Returns the fitness, computing and caching it on first use.
    pub fn evaluate<P>(&mut self, problem: &P) -> f64
    where
        P: GeneticProblem<Gene = G>,
    {
        match self.fitness {
            Some(f) => f,
            None => {
                let f = problem.fitness(&self.data);
                self.fitness = Some(f);
                f
            }
        }
    }

    /// Cached fitness, or negative infinity if not yet evaluated.
    pub fn fitness(&self) -> f64 {
        self.fitness.unwrap_or(f64::NEG_INFINITY)
    }

    pub fn cached_fitness(&self) -> Option<f64> {
        self.fitness
    }

    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_some()
    }

    /// Fitness rescaled to `[0, 1]` within `range`.
    ///
    /// Returns `1.0` for a converged (zero-span) range and logs a warning;
    /// convergence is a signal, not an error.
    pub fn normalized_fitness(&self, range: &FitnessRange) -> f64 {
        if range.is_converged() {
            log::warn!(
                "population converged: fitness range [{}, {}] has zero span",
                range.min,
                range.max
            );
        }
        range.normalize(self.fitness())
    }

    /// Stochastically perturbs the payload in place.
    ///
    /// Offspring (`age < 0`) are never touched. Otherwise the mutation
    /// probability is `(1 - normalized_fitness) * factor`, so the best
    /// member of `range` is never mutated and the worst is mutated with
    /// probability `factor`. Returns whether the payload was perturbed.
    pub fn mutate<P, R>(
        &mut self,
        problem: &P,
        range: &FitnessRange,
        factor: f64,
        rng: &mut R,
    ) -> bool
    where
        P: GeneticProblem<Gene = G>,
        R: Rng,
    {
        if self.is_offspring() {
            return false;
        }
        let probability = mutation_probability(range.normalize(self.fitness()), factor);
        if rng.random::<f64>() < probability {
            problem.perturb(&mut self.data, rng);
            self.fitness = None;
            true
        } else {
            false
        }
    }
}

impl<G: Clone> Chromosome<G> {
    /// Copies a payload into a new chromosome with `age = 0`.
    pub fn from_slice(data: &[G]) -> Self {
        Self::new(data.to_vec())
    }
}

impl<G: PartialEq> PartialEq for Chromosome<G> {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    /// Fitness is the sum of the genes.
    struct SumProblem;

    impl GeneticProblem for SumProblem {
        type Gene = u32;

        fn seed<R: Rng>(&self, rng: &mut R) -> Vec<u32> {
            (0..6).map(|_| rng.random_range(0..10)).collect()
        }

        fn fitness(&self, genome: &[u32]) -> f64 {
            genome.iter().map(|&g| g as f64).sum()
        }
    }

    fn scored(data: Vec<u32>) -> Chromosome<u32> {
        let mut c = Chromosome::new(data);
        c.evaluate(&SumProblem);
        c
    }

    #[test]
    fn test_seed_age_zero() {
        let mut rng = create_rng(1);
        let c = Chromosome::seed(&SumProblem, &mut rng);
        assert_eq!(c.age(), 0);
        assert_eq!(c.data().len(), 6);
        assert!(!c.is_evaluated());
    }

    #[test]
    fn test_fitness_memoized() {
        let mut c = Chromosome::new(vec![1, 2, 3]);
        assert_eq!(c.fitness(), f64::NEG_INFINITY);
        assert_eq!(c.evaluate(&SumProblem), 6.0);
        assert_eq!(c.cached_fitness(), Some(6.0));

        c.set_data(vec![4]);
        assert_eq!(c.cached_fitness(), None);
        assert_eq!(c.evaluate(&SumProblem), 4.0);
    }

    #[test]
    fn test_reproduce_offspring_age() {
        let mut rng = create_rng(5);
        let a = Chromosome::new(vec![0, 0, 0, 0]);
        let b = Chromosome::new(vec![1, 1, 1, 1]);
        let child = Chromosome::reproduce(&SumProblem, &a, &b, &mut rng);
        assert_eq!(child.age(), -1);
        assert!(child.is_offspring());
        assert_eq!(child.data().len(), 4);
    }

    #[test]
    fn test_from_slice_does_not_alias() {
        let source = vec![1, 2, 3];
        let mut c = Chromosome::from_slice(&source);
        c.set_data(vec![9]);
        assert_eq!(source, vec![1, 2, 3]);
    }

    #[test]
    fn test_equality_by_payload() {
        let mut a = scored(vec![1, 2]);
        let b = Chromosome::new(vec![1, 2]);
        a.increment_age();
        assert_eq!(a, b);
        assert_ne!(a, Chromosome::new(vec![2, 1]));
    }

    #[test]
    fn test_normalized_bounds() {
        let pop = vec![scored(vec![9]), scored(vec![5]), scored(vec![1])];
        let range = FitnessRange::of(&pop).unwrap();
        assert_eq!(range, FitnessRange::new(1.0, 9.0));
        assert_eq!(pop[0].normalized_fitness(&range), 1.0);
        assert_eq!(pop[1].normalized_fitness(&range), 0.5);
        assert_eq!(pop[2].normalized_fitness(&range), 0.0);
    }

    #[test]
    fn test_converged_range() {
        let pop = vec![scored(vec![3]), scored(vec![3])];
        let range = FitnessRange::of(&pop).unwrap();
        assert!(range.is_converged());
        assert_eq!(pop[1].normalized_fitness(&range), 1.0);
    }

    #[test]
    fn test_non_finite_fitness_sits_at_floor() {
        let mut worst = Chromosome::new(vec![0]);
        worst.fitness = Some(f64::NEG_INFINITY);
        let mut broken = Chromosome::new(vec![0]);
        broken.fitness = Some(f64::NAN);
        let pop = vec![scored(vec![6]), scored(vec![2]), worst, broken];

        let range = FitnessRange::of(&pop).unwrap();
        assert_eq!(range, FitnessRange::new(2.0, 6.0));
        assert!(!range.is_converged());
        assert_eq!(pop[0].normalized_fitness(&range), 1.0);
        assert_eq!(pop[1].normalized_fitness(&range), 0.0);
        assert_eq!(pop[2].normalized_fitness(&range), 0.0);
        assert_eq!(pop[3].normalized_fitness(&range), 0.0);
        assert_eq!(range.normalize(f64::INFINITY), 1.0);
    }

    #[test]
    fn test_undecodable_individual_still_mutates() {
        let mut rng = create_rng(14);
        let pop = vec![scored(vec![6]), scored(vec![2])];
        let range = FitnessRange::of(&pop).unwrap();
        let mut hits = 0;
        for _ in 0..1000 {
            let mut c = Chromosome::new(vec![1, 2, 3]);
            c.fitness = Some(f64::NEG_INFINITY);
            if c.mutate(&SumProblem, &range, 1.0, &mut rng) {
                hits += 1;
            }
        }
        assert_eq!(hits, 1000);
    }

    #[test]
    fn test_all_non_finite_is_converged() {
        let mut a = Chromosome::<u32>::new(vec![]);
        a.fitness = Some(f64::NEG_INFINITY);
        let range = FitnessRange::of(&[a.clone(), a]).unwrap();
        assert!(range.is_converged());
    }

    #[test]
    fn test_empty_range() {
        let pop: Vec<Chromosome<u32>> = Vec::new();
        assert!(FitnessRange::of(&pop).is_none());
    }

    #[test]
    fn test_best_never_mutates() {
        let mut rng = create_rng(11);
        let range = FitnessRange::new(0.0, 10.0);
        let mut best = scored(vec![4, 6]);
        for _ in 0..1000 {
            assert!(!best.mutate(&SumProblem, &range, 1.0, &mut rng));
        }
        assert!(best.is_evaluated());
    }

    #[test]
    fn test_worst_mutates_at_factor_rate() {
        let mut rng = create_rng(12);
        let range = FitnessRange::new(0.0, 10.0);
        let mut hits = 0;
        for _ in 0..10_000 {
            let mut worst = scored(vec![0, 0, 0]);
            if worst.mutate(&SumProblem, &range, 0.3, &mut rng) {
                hits += 1;
                assert!(!worst.is_evaluated());
            }
        }
        assert!(
            (2500..3500).contains(&hits),
            "expected ~30% mutations, got {hits}/10000"
        );
    }

    #[test]
    fn test_offspring_never_mutates() {
        let mut rng = create_rng(13);
        let range = FitnessRange::new(0.0, 10.0);
        let mut child = scored(vec![0, 1]);
        child.set_age(-1);
        for _ in 0..100 {
            assert!(!child.mutate(&SumProblem, &range, 1.0, &mut rng));
        }
    }

    #[test]
    fn test_sort_descending() {
        let mut pop = vec![scored(vec![1]), scored(vec![7]), scored(vec![3])];
        pop.sort_by(by_fitness_descending);
        let order: Vec<f64> = pop.iter().map(Chromosome::fitness).collect();
        assert_eq!(order, vec![7.0, 3.0, 1.0]);
    }
}
