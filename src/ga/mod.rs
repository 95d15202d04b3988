//! Generational genetic search.
//!
//! A generic, domain-agnostic engine built on one trait. Users describe
//! their problem by implementing [`GeneticProblem`], which says how to
//! seed, score, recombine, and perturb a genome.
//!
//! # Key Types
//!
//! - [`SearchConfig`]: Population size, generation count, mutation factor
//! - [`GeneticSearch`]: Executes the generational loop, phase by phase
//! - [`SearchResult`]: Final ranked population with per-generation history
//! - [`Chromosome`]: A genome with its age and cached fitness
//! - [`ParameterProblem`]: Bit-genome problem over a
//!   [`BitBackedHash`](crate::encoding::BitBackedHash) schema
//!
//! # Generation
//!
//! Each generation evaluates and ranks the population, draws two thirds of
//! it by roulette wheel on normalized fitness, pairs the draws into
//! offspring, overwrites the worst-ranked individuals with them, mutates
//! aged individuals in proportion to how poorly they rank, and ages
//! everyone by one. A population whose fitness has zero span skips all of
//! that and only counts the generation.
//!
//! # Submodules
//!
//! - [`operators`]: One-point crossover, edge recombination, adjacent swap
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*

mod config;
pub mod operators;
mod parameters;
mod runner;
mod selection;
mod types;

pub use config::SearchConfig;
pub use parameters::ParameterProblem;
pub use runner::{GenerationStats, GeneticSearch, SearchError, SearchResult, SearchState};
pub use selection::roulette_wheel;
pub use types::{by_fitness_descending, Chromosome, FitnessRange, GeneticProblem};
