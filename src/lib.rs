//! Generic genetic search over bit-encoded parameters.
//!
//! - **Encoding**: Real-valued parameters stored as fixed-width bit fields
//!   behind named keys, flattened to one bit genome and read back.
//! - **Genetic search**: A generational loop with roulette-wheel selection,
//!   age-aware rank-scaled mutation, and pluggable recombination through
//!   the [`GeneticProblem`](ga::GeneticProblem) trait.
//!
//! # Architecture
//!
//! The engine knows nothing about what a genome means. Bit-encoded
//! parameter search is one problem built on top of it
//! ([`ga::ParameterProblem`]); permutation problems plug in the same way
//! using [`ga::operators::edge_recombination`].

pub mod encoding;
pub mod ga;
pub mod random;
