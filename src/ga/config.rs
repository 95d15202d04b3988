//! Search configuration.
//!
//! [`SearchConfig`] holds every construction-time parameter of a
//! [`GeneticSearch`](super::GeneticSearch) run.

use super::operators::DEFAULT_MUTATION_FACTOR;

/// Configuration for the genetic search.
///
/// # Defaults
///
/// ```
/// use u_bitgene::ga::SearchConfig;
///
/// let config = SearchConfig::default();
/// assert_eq!(config.population_size, 100);
/// assert_eq!(config.max_generations, 100);
/// assert_eq!(config.breed_count(), 66);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_bitgene::ga::SearchConfig;
///
/// let config = SearchConfig::default()
///     .with_population_size(20)
///     .with_max_generations(7)
///     .with_mutation_factor(0.4)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SearchConfig {
    /// Number of individuals kept in every generation.
    pub population_size: usize,

    /// Number of generations to run.
    pub max_generations: usize,

    /// Mutation chance of the worst aged individual (0.0–1.0).
    ///
    /// An individual with normalized fitness `f` mutates with probability
    /// `(1 - f) * mutation_factor`.
    pub mutation_factor: f64,

    /// Whether to evaluate fitness in parallel.
    ///
    /// Only takes effect when the crate is built with the `parallel`
    /// feature.
    pub parallel: bool,

    /// Random seed for reproducibility.
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_generations: 100,
            mutation_factor: DEFAULT_MUTATION_FACTOR,
            parallel: true,
            seed: None,
        }
    }
}

impl SearchConfig {
    /// Creates a configuration with the given population and generation
    /// counts and defaults for everything else.
    pub fn new(population_size: usize, max_generations: usize) -> Self {
        Self {
            population_size,
            max_generations,
            ..Self::default()
        }
    }

    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the number of generations.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the mutation factor.
    pub fn with_mutation_factor(mut self, factor: f64) -> Self {
        self.mutation_factor = factor.clamp(0.0, 1.0);
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of parents drawn by selection each generation.
    ///
    /// Two thirds of the population using integer division
    /// (`2 * population_size / 3`), so the result is rounded down rather
    /// than to nearest: a population of 4 breeds 2 parents, not 3.
    pub fn breed_count(&self) -> usize {
        2 * self.population_size / 3
    }

    /// Number of offspring produced each generation (`breed_count / 2`).
    pub fn offspring_count(&self) -> usize {
        self.breed_count() / 2
    }

    /// Validates the configuration.
    ///
    /// Returns `Err` with a description if any parameter is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.population_size < 2 {
            return Err("population_size must be at least 2".into());
        }
        if self.max_generations == 0 {
            return Err("max_generations must be at least 1".into());
        }
        if !(0.0..=1.0).contains(&self.mutation_factor) {
            return Err(format!(
                "mutation_factor must be within [0, 1], got {}",
                self.mutation_factor
            ));
        }
        Ok(())
    }
}
