//! Bit-genome problems over named real parameters.
//!
//! [`ParameterProblem`] turns a [`BitBackedHash`] schema and an objective
//! over decoded parameters into a [`GeneticProblem`] whose genes are the
//! flattened bits. Crossover and mutation act on raw bits; the objective
//! only ever sees decoded values.

use super::types::GeneticProblem;
use crate::encoding::{BitBackedHash, EncodingError};
use rand::Rng;
use std::fmt;

/// A genetic problem over the parameters of a [`BitBackedHash`] schema.
///
/// # Examples
///
/// ```
/// use u_bitgene::encoding::BitBackedHash;
/// use u_bitgene::ga::{GeneticSearch, ParameterProblem, SearchConfig};
///
/// let mut schema = BitBackedHash::new();
/// schema.add_parameter("x", 0.0..=31.0, 8).unwrap();
///
/// let problem = ParameterProblem::new(schema, |p: &BitBackedHash<&str>| {
///     let x = p.get(&"x").unwrap_or(0.0);
///     -0.1 * x * x + 3.0 * x
/// })
/// .unwrap();
///
/// let config = SearchConfig::new(10, 20).with_seed(7);
/// let result = GeneticSearch::new(&problem, config).unwrap().run().unwrap();
/// let best = problem.decode(result.best().unwrap().data()).unwrap();
/// assert!((0.0..=31.0).contains(&best.get(&"x").unwrap()));
/// ```
pub struct ParameterProblem<K, F> {
    schema: BitBackedHash<K>,
    objective: F,
}

impl<K, F> ParameterProblem<K, F>
where
    K: Ord + Clone + fmt::Debug,
    F: Fn(&BitBackedHash<K>) -> f64,
{
    /// Wraps a schema and an objective. Current values in `schema` are
    /// discarded.
    ///
    /// # Errors
    ///
    /// [`EncodingError::NoParameters`] if the schema is empty.
    pub fn new(schema: BitBackedHash<K>, objective: F) -> Result<Self, EncodingError> {
        if schema.is_empty() {
            return Err(EncodingError::NoParameters);
        }
        Ok(Self {
            schema: schema.cleared(),
            objective,
        })
    }

    /// The parameter layout, with every bit cleared.
    pub fn schema(&self) -> &BitBackedHash<K> {
        &self.schema
    }

    /// Number of bits in every genome.
    pub fn genome_len(&self) -> usize {
        self.schema.total_bits()
    }

    /// Decodes a genome into a parameter collection.
    pub fn decode(&self, genome: &[bool]) -> Result<BitBackedHash<K>, EncodingError> {
        let mut params = self.schema.clone();
        params.import_bits(genome)?;
        Ok(params)
    }
}

impl<K, F> GeneticProblem for ParameterProblem<K, F>
where
    K: Ord + Clone + fmt::Debug + Send + Sync,
    F: Fn(&BitBackedHash<K>) -> f64 + Send + Sync,
{
    type Gene = bool;

    fn seed<R: Rng>(&self, rng: &mut R) -> Vec<bool> {
        let mut params = self.schema.clone();
        params.randomize(rng);
        params.concat_bits()
    }

    fn fitness(&self, genome: &[bool]) -> f64 {
        match self.decode(genome) {
            Ok(params) => (self.objective)(&params),
            Err(e) => {
                log::warn!("undecodable genome scored as worst: {e}");
                f64::NEG_INFINITY
            }
        }
    }
}

impl<K: fmt::Debug, F> fmt::Debug for ParameterProblem<K, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterProblem")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    fn two_params() -> BitBackedHash<&'static str> {
        let mut schema = BitBackedHash::new();
        schema.add_parameter("a", -1.0..=1.0, 5).unwrap();
        schema.add_parameter("b", 0.0..=100.0, 10).unwrap();
        schema
    }

    #[test]
    fn test_empty_schema_rejected() {
        let schema: BitBackedHash<&str> = BitBackedHash::new();
        let err = ParameterProblem::new(schema, |_: &BitBackedHash<&str>| 0.0).unwrap_err();
        assert_eq!(err, EncodingError::NoParameters);
    }

    #[test]
    fn test_genome_len() {
        let problem = ParameterProblem::new(two_params(), |_: &BitBackedHash<&str>| 0.0).unwrap();
        assert_eq!(problem.genome_len(), 15);
        assert_eq!(problem.schema().len(), 2);
    }

    #[test]
    fn test_new_clears_values() {
        let mut schema = two_params();
        schema.set(&"b", 80.0).unwrap();
        let problem = ParameterProblem::new(schema, |_: &BitBackedHash<&str>| 0.0).unwrap();
        assert_eq!(problem.schema().get(&"b").unwrap(), 0.0);
    }

    #[test]
    fn test_seed_decodes_in_range() {
        let problem = ParameterProblem::new(two_params(), |_: &BitBackedHash<&str>| 0.0).unwrap();
        let mut rng = create_rng(42);
        for _ in 0..50 {
            let genome = problem.seed(&mut rng);
            assert_eq!(genome.len(), 15);
            let params = problem.decode(&genome).unwrap();
            assert!((-1.0..=1.0).contains(&params.get(&"a").unwrap()));
            assert!((0.0..=100.0).contains(&params.get(&"b").unwrap()));
        }
    }

    #[test]
    fn test_fitness_uses_decoded_values() {
        let problem =
            ParameterProblem::new(two_params(), |p: &BitBackedHash<&str>| p.get(&"b").unwrap())
                .unwrap();
        let mut params = problem.schema().clone();
        let stored = params.set(&"b", 42.0).unwrap();
        let genome = params.export_bits().unwrap();
        assert_eq!(problem.fitness(&genome), stored);
    }

    #[test]
    fn test_wrong_length_is_worst() {
        let problem = ParameterProblem::new(two_params(), |_: &BitBackedHash<&str>| 1.0).unwrap();
        assert_eq!(problem.fitness(&[true; 3]), f64::NEG_INFINITY);
        assert!(problem.decode(&[true; 3]).is_err());
    }
}
