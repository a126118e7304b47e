//! Token-id inputs handed to a backend

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// A batch of token-id sequences
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendInputs {
    pub input_ids: Vec<Vec<u32>>,
}

impl BackendInputs {
    pub fn new(input_ids: Vec<Vec<u32>>) -> Self {
        Self { input_ids }
    }

    /// Synthetic inputs of a fixed shape, reproducible for a given seed
    pub fn random(batch_size: usize, sequence_length: usize, vocab_size: u32, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let upper = vocab_size.max(1);

        let input_ids = (0..batch_size)
            .map(|_| (0..sequence_length).map(|_| rng.gen_range(0..upper)).collect())
            .collect();

        Self { input_ids }
    }

    pub fn batch_size(&self) -> usize {
        self.input_ids.len()
    }

    /// Length of the longest sequence in the batch
    pub fn sequence_length(&self) -> usize {
        self.input_ids.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.input_ids.is_empty()
    }
}

impl From<Vec<Vec<u32>>> for BackendInputs {
    fn from(input_ids: Vec<Vec<u32>>) -> Self {
        Self::new(input_ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_shape_and_range() {
        let inputs = BackendInputs::random(3, 16, 100, 42);

        assert_eq!(inputs.batch_size(), 3);
        assert_eq!(inputs.sequence_length(), 16);
        assert!(inputs.input_ids.iter().flatten().all(|&id| id < 100));
    }

    #[test]
    fn test_random_is_reproducible() {
        assert_eq!(
            BackendInputs::random(2, 8, 32000, 7),
            BackendInputs::random(2, 8, 32000, 7)
        );
    }

    #[test]
    fn test_sequence_length_uses_longest_row() {
        let inputs = BackendInputs::new(vec![vec![1, 2], vec![3, 4, 5]]);

        assert_eq!(inputs.sequence_length(), 3);
        assert!(!inputs.is_empty());
        assert!(BackendInputs::default().is_empty());
    }
}
