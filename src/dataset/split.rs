//! Seeded hold-out split of corpus row indices.

use rand::rngs::StdRng;
use rand::{SeedableRng, seq::SliceRandom};

/// Row indices assigned to the training and test partitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..len` with `seed` and hold out `ceil(len * test_fraction)` rows.
///
/// A non-zero fraction on a corpus of two or more rows always yields at least one
/// row on each side.
pub fn train_test_split(len: usize, test_fraction: f64, seed: u64) -> SplitIndices {
    let mut indices: Vec<usize> = (0..len).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let fraction = if test_fraction.is_finite() {
        test_fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let mut test_len = (len as f64 * fraction).ceil() as usize;
    if fraction > 0.0 && len >= 2 {
        test_len = test_len.clamp(1, len - 1);
    } else {
        test_len = test_len.min(len);
    }

    let train = indices.split_off(test_len);
    SplitIndices {
        train,
        test: indices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_is_a_partition_of_all_rows() {
        let split = train_test_split(101, 0.2, 42);
        assert_eq!(split.test.len(), 21);
        assert_eq!(split.train.len(), 80);
        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..101).collect::<Vec<_>>());
    }

    #[test]
    fn same_seed_gives_same_split() {
        assert_eq!(train_test_split(50, 0.3, 7), train_test_split(50, 0.3, 7));
        assert_ne!(train_test_split(50, 0.3, 7), train_test_split(50, 0.3, 8));
    }

    #[test]
    fn tiny_corpus_keeps_a_training_row() {
        let split = train_test_split(2, 0.9, 1);
        assert_eq!(split.train.len(), 1);
        assert_eq!(split.test.len(), 1);
    }

    #[test]
    fn zero_fraction_keeps_everything_for_training() {
        let split = train_test_split(10, 0.0, 1);
        assert!(split.test.is_empty());
        assert_eq!(split.train.len(), 10);
    }
}
