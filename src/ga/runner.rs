//! Generational search loop.
//!
//! [`GeneticSearch`] orchestrates the evolutionary process:
//! seeding → (selection → reproduction → replacement → mutation → aging)
//! repeated for a fixed number of generations.
//!
//! Each phase is also exposed as a method so a caller can drive or inspect
//! a single generation by hand.

use super::config::SearchConfig;
use super::selection::roulette_wheel;
use super::types::{by_fitness_descending, Chromosome, FitnessRange, GeneticProblem};
use crate::random::rng_from_seed;
use rand::rngs::StdRng;
use rand::Rng;
use thiserror::Error;

/// Failure of a search operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    /// [`SearchConfig::validate`] rejected the configuration.
    #[error("invalid search configuration: {0}")]
    InvalidConfig(String),

    /// A generation was requested before the population was seeded.
    #[error("population has not been seeded")]
    NotSeeded,

    /// A generation was requested after `max_generations` were run.
    #[error("search already terminated after {0} generations")]
    Terminated(usize),

    /// A supplied population does not match `population_size`.
    #[error("population size mismatch: expected {expected}, got {actual}")]
    PopulationSize { expected: usize, actual: usize },

    /// The best-ranked individual scored below the worst-ranked one.
    #[error("population is not sorted: best fitness {best} < worst fitness {worst}")]
    UnsortedPopulation { best: f64, worst: f64 },

    /// More offspring than individuals available to replace.
    #[error("cannot insert {offspring} offspring into a population of {population}")]
    TooManyOffspring { offspring: usize, population: usize },
}

/// Lifecycle of a [`GeneticSearch`].
///
/// `Selecting` through `Aging` repeat once per generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Uninitialized,
    PopulationSeeded,
    Selecting,
    Reproducing,
    Replacing,
    Mutating,
    Aging,
    Terminated,
}

/// Summary of one generation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenerationStats {
    /// 1-based generation number.
    pub generation: usize,
    /// Best fitness after the generation.
    pub best: f64,
    /// Median fitness after the generation.
    pub median: f64,
    /// Worst fitness after the generation.
    pub worst: f64,
    /// Offspring inserted this generation.
    pub offspring: usize,
    /// Individuals mutated this generation.
    pub mutations: usize,
    /// Whether the generation was skipped because every individual had the
    /// same fitness.
    pub converged: bool,
}

/// Result of a completed search.
#[derive(Debug, Clone)]
pub struct SearchResult<G> {
    /// Final population, best first.
    pub population: Vec<Chromosome<G>>,

    /// Total number of generations executed.
    pub generations: usize,

    /// Generations skipped because the population had converged.
    pub converged_generations: usize,

    /// Summary of every generation, in order.
    pub history: Vec<GenerationStats>,
}

impl<G> SearchResult<G> {
    /// Fittest individual.
    pub fn best(&self) -> Option<&Chromosome<G>> {
        self.population.first()
    }

    /// Individual at the middle rank.
    pub fn median(&self) -> Option<&Chromosome<G>> {
        self.population.get(self.population.len() / 2)
    }

    /// Least fit individual.
    pub fn worst(&self) -> Option<&Chromosome<G>> {
        self.population.last()
    }
}

/// Executes the generational loop over a [`GeneticProblem`].
///
/// # Usage
///
/// ```ignore
/// let problem = MyProblem::new();
/// let config = SearchConfig::new(20, 7).with_seed(42);
/// let result = GeneticSearch::new(&problem, config)?.run()?;
/// println!("best fitness: {}", result.best().unwrap().fitness());
/// ```
///
/// The random source is owned by the search; use
/// [`with_rng`](Self::with_rng) to inject one.
pub struct GeneticSearch<'a, P: GeneticProblem, R: Rng = StdRng> {
    problem: &'a P,
    config: SearchConfig,
    rng: R,
    population: Vec<Chromosome<P::Gene>>,
    generation: usize,
    converged_generations: usize,
    state: SearchState,
    history: Vec<GenerationStats>,
}

impl<'a, P: GeneticProblem> GeneticSearch<'a, P, StdRng> {
    /// Creates a search seeded from `config.seed`.
    ///
    /// # Errors
    /// [`SearchError::InvalidConfig`] if the configuration does not validate.
    pub fn new(problem: &'a P, config: SearchConfig) -> Result<Self, SearchError> {
        let rng = rng_from_seed(config.seed);
        Self::with_rng(problem, config, rng)
    }
}

impl<'a, P: GeneticProblem, R: Rng> GeneticSearch<'a, P, R> {
    /// Creates a search that draws from `rng`.
    pub fn with_rng(problem: &'a P, config: SearchConfig, rng: R) -> Result<Self, SearchError> {
        config.validate().map_err(SearchError::InvalidConfig)?;
        Ok(Self {
            problem,
            population: Vec::with_capacity(config.population_size),
            config,
            rng,
            generation: 0,
            converged_generations: 0,
            state: SearchState::Uninitialized,
            history: Vec::new(),
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    /// Generations completed so far.
    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn breed_count(&self) -> usize {
        self.config.breed_count()
    }

    pub fn population(&self) -> &[Chromosome<P::Gene>] {
        &self.population
    }

    pub fn history(&self) -> &[GenerationStats] {
        &self.history
    }

    /// Fills the population with independently seeded individuals.
    pub fn generate_initial_population(&mut self) {
        let problem = self.problem;
        let rng = &mut self.rng;
        self.population = (0..self.config.population_size)
            .map(|_| Chromosome::seed(problem, rng))
            .collect();
        self.evaluate();
        self.state = SearchState::PopulationSeeded;
        log::info!(
            "seeded population of {} (breed count {})",
            self.population.len(),
            self.breed_count()
        );
    }

    /// Installs a caller-provided population instead of seeding one.
    ///
    /// # Errors
    /// [`SearchError::PopulationSize`] unless the population has exactly
    /// `population_size` members.
    pub fn set_population(
        &mut self,
        population: Vec<Chromosome<P::Gene>>,
    ) -> Result<(), SearchError> {
        if population.len() != self.config.population_size {
            return Err(SearchError::PopulationSize {
                expected: self.config.population_size,
                actual: population.len(),
            });
        }
        self.population = population;
        self.evaluate();
        self.state = SearchState::PopulationSeeded;
        Ok(())
    }

    /// Fitness range of the current population, or `None` if it is empty.
    pub fn fitness_range(&mut self) -> Option<FitnessRange> {
        self.evaluate();
        FitnessRange::of(&self.population)
    }

    /// Fittest individual of the current population.
    pub fn best_chromosome(&mut self) -> Option<&Chromosome<P::Gene>> {
        self.evaluate();
        self.population
            .iter()
            .min_by(|a, b| by_fitness_descending(a, b))
    }

    /// Draws `breed_count` parents by roulette-wheel selection.
    ///
    /// Sorts the population best first as a side effect.
    pub fn selection(&mut self) -> Vec<Chromosome<P::Gene>> {
        self.state = SearchState::Selecting;
        self.sort_population();
        let Some(range) = FitnessRange::of(&self.population) else {
            return Vec::new();
        };

        let count = self.breed_count();
        roulette_wheel(&self.population, &range, count, &mut self.rng)
            .into_iter()
            .map(|i| self.population[i].clone())
            .collect()
    }

    /// Pairs parents `(0, 1), (2, 3), ...` and produces one offspring per
    /// pair, each with `age = -1`. An unpaired last parent is ignored.
    pub fn reproduction(&mut self, selected: &[Chromosome<P::Gene>]) -> Vec<Chromosome<P::Gene>> {
        self.state = SearchState::Reproducing;
        let problem = self.problem;
        let mut offspring: Vec<Chromosome<P::Gene>> = selected
            .chunks_exact(2)
            .map(|pair| Chromosome::reproduce(problem, &pair[0], &pair[1], &mut self.rng))
            .collect();
        evaluate_all(problem, &mut offspring, self.config.parallel);
        offspring
    }

    /// Replaces the worst-ranked individuals with `offspring`.
    ///
    /// The population size is unchanged.
    ///
    /// # Errors
    /// - [`SearchError::TooManyOffspring`] if there are more offspring than
    ///   individuals
    /// - [`SearchError::UnsortedPopulation`] if, after sorting, the first
    ///   individual scores below the last (NaN fitness)
    pub fn replace_worst_ranked(
        &mut self,
        offspring: Vec<Chromosome<P::Gene>>,
    ) -> Result<(), SearchError> {
        self.state = SearchState::Replacing;
        let population = self.population.len();
        if offspring.len() > population {
            return Err(SearchError::TooManyOffspring {
                offspring: offspring.len(),
                population,
            });
        }

        self.sort_population();
        if let (Some(first), Some(last)) = (self.population.first(), self.population.last()) {
            let (best, worst) = (first.fitness(), last.fitness());
            match best.partial_cmp(&worst) {
                Some(std::cmp::Ordering::Less) | None => {
                    return Err(SearchError::UnsortedPopulation { best, worst });
                }
                _ => {}
            }
        }

        self.population.truncate(population - offspring.len());
        self.population.extend(offspring);
        self.evaluate();
        Ok(())
    }

    /// Mutates every aged individual (`age >= 0`).
    ///
    /// Mutation chances are computed against the fitness range of the aged
    /// individuals only, so offspring neither mutate nor affect the range.
    /// Returns the number of individuals mutated.
    pub fn mutate(&mut self) -> usize {
        self.state = SearchState::Mutating;
        self.evaluate();

        let aged: Vec<Chromosome<P::Gene>> = self
            .population
            .iter()
            .filter(|c| !c.is_offspring())
            .cloned()
            .collect();
        let Some(range) = FitnessRange::of(&aged) else {
            return 0;
        };
        if range.is_converged() {
            log::warn!(
                "aged individuals converged at fitness {}; no mutation this generation",
                range.max
            );
        }

        let factor = self.config.mutation_factor;
        let mut mutated = 0;
        for chromosome in self.population.iter_mut() {
            if chromosome.mutate(self.problem, &range, factor, &mut self.rng) {
                mutated += 1;
            }
        }
        self.evaluate();
        mutated
    }

    /// Adds one to every individual's age.
    pub fn increment_age(&mut self) {
        self.state = SearchState::Aging;
        for chromosome in self.population.iter_mut() {
            chromosome.increment_age();
        }
    }

    /// Runs one generation.
    ///
    /// If every individual has the same fitness the generation is a no-op
    /// (no replacement, mutation, or aging) but still counts toward
    /// `max_generations`.
    ///
    /// # Errors
    /// - [`SearchError::NotSeeded`] before the population exists
    /// - [`SearchError::Terminated`] once `max_generations` have run
    /// - errors from [`replace_worst_ranked`](Self::replace_worst_ranked)
    pub fn step(&mut self) -> Result<GenerationStats, SearchError> {
        match self.state {
            SearchState::Uninitialized => return Err(SearchError::NotSeeded),
            SearchState::Terminated => return Err(SearchError::Terminated(self.generation)),
            _ => {}
        }

        let converged = self.fitness_range().map_or(true, |r| r.is_converged());
        let (offspring, mutations) = if converged {
            self.converged_generations += 1;
            log::warn!(
                "generation {}: population converged, skipping",
                self.generation + 1
            );
            (0, 0)
        } else {
            let selected = self.selection();
            let children = self.reproduction(&selected);
            let offspring = children.len();
            self.replace_worst_ranked(children)?;
            let mutations = self.mutate();
            self.increment_age();
            (offspring, mutations)
        };

        self.generation += 1;
        let stats = self.summarize(offspring, mutations, converged);
        log::debug!(
            "generation {}: best={:.4} median={:.4} worst={:.4} offspring={} mutations={}",
            stats.generation,
            stats.best,
            stats.median,
            stats.worst,
            stats.offspring,
            stats.mutations
        );
        self.history.push(stats);
        self.problem.on_generation(&stats);

        if self.generation >= self.config.max_generations {
            self.state = SearchState::Terminated;
        }
        Ok(stats)
    }

    /// Runs the remaining generations and returns the final population,
    /// best first. Seeds the population first if needed.
    pub fn run(mut self) -> Result<SearchResult<P::Gene>, SearchError> {
        if self.state == SearchState::Uninitialized {
            self.generate_initial_population();
        }
        while self.state != SearchState::Terminated {
            self.step()?;
        }

        self.sort_population();
        log::info!(
            "search finished after {} generations ({} converged), best fitness {}",
            self.generation,
            self.converged_generations,
            self.population
                .first()
                .map_or(f64::NEG_INFINITY, Chromosome::fitness)
        );

        Ok(SearchResult {
            population: self.population,
            generations: self.generation,
            converged_generations: self.converged_generations,
            history: self.history,
        })
    }

    /// Evaluates every individual whose fitness is not cached.
    fn evaluate(&mut self) {
        evaluate_all(self.problem, &mut self.population, self.config.parallel);
    }

    /// Sorts the population best first. The sort is stable, so equal
    /// individuals keep their relative order.
    fn sort_population(&mut self) {
        self.evaluate();
        self.population.sort_by(by_fitness_descending);
    }

    fn summarize(&mut self, offspring: usize, mutations: usize, converged: bool) -> GenerationStats {
        self.sort_population();
        let fitness_at = |i: usize| {
            self.population
                .get(i)
                .map_or(f64::NEG_INFINITY, Chromosome::fitness)
        };
        let n = self.population.len();
        GenerationStats {
            generation: self.generation,
            best: fitness_at(0),
            median: fitness_at(n / 2),
            worst: fitness_at(n.saturating_sub(1)),
            offspring,
            mutations,
            converged,
        }
    }
}

/// Evaluate all unscored individuals.
#[cfg(feature = "parallel")]
fn evaluate_all<P: GeneticProblem>(
    problem: &P,
    population: &mut [Chromosome<P::Gene>],
    parallel: bool,
) {
    use rayon::prelude::*;

    if parallel {
        population.par_iter_mut().for_each(|c| {
            c.evaluate(problem);
        });
    } else {
        for c in population.iter_mut() {
            c.evaluate(problem);
        }
    }
}

/// Evaluate all unscored individuals.
#[cfg(not(feature = "parallel"))]
fn evaluate_all<P: GeneticProblem>(
    problem: &P,
    population: &mut [Chromosome<P::Gene>],
    _parallel: bool,
) {
    for c in population.iter_mut() {
        c.evaluate(problem);
    }
}

// ============================================================================
// Tests
// ============================================================================
