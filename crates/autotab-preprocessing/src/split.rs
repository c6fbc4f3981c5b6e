use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{PreprocessError, PreprocessResult};

/// Split `0..n` into shuffled training and test row indices.
///
/// The test side gets `ceil(n * test_ratio)` rows. Both sides must end up
/// non-empty. Returns `(train, test)`.
pub fn train_test_split_indices(
    n: usize,
    test_ratio: f64,
    seed: Option<u64>,
) -> PreprocessResult<(Vec<usize>, Vec<usize>)> {
    if !(test_ratio > 0.0 && test_ratio < 1.0) {
        return Err(PreprocessError::InvalidSplit(format!(
            "test ratio must be in (0, 1), got {}",
            test_ratio
        )));
    }
    let test_size = (n as f64 * test_ratio).ceil() as usize;
    if test_size == 0 || test_size >= n {
        return Err(PreprocessError::InvalidSplit(format!(
            "{} rows cannot be split with test ratio {}",
            n, test_ratio
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    indices.shuffle(&mut rng);

    let test = indices.split_off(n - test_size);
    Ok((indices, test))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sizes() {
        let (train, test) = train_test_split_indices(10, 0.2, Some(42)).unwrap();
        assert_eq!(train.len(), 8);
        assert_eq!(test.len(), 2);

        let mut all: Vec<usize> = train.iter().chain(&test).copied().collect();
        all.sort();
        assert_eq!(all, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_test_side_rounds_up() {
        let (train, test) = train_test_split_indices(6, 0.2, Some(42)).unwrap();
        assert_eq!((train.len(), test.len()), (4, 2));
        let (train, test) = train_test_split_indices(2, 0.2, Some(0)).unwrap();
        assert_eq!((train.len(), test.len()), (1, 1));
    }

    #[test]
    fn test_seeded_split_is_deterministic() {
        let a = train_test_split_indices(50, 0.2, Some(7)).unwrap();
        let b = train_test_split_indices(50, 0.2, Some(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rejects_degenerate_splits() {
        assert!(train_test_split_indices(1, 0.2, Some(42)).is_err());
        assert!(train_test_split_indices(10, 1.0, Some(42)).is_err());
        assert!(train_test_split_indices(10, 0.0, Some(42)).is_err());
    }
}
