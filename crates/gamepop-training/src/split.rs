//! Seeded train/test split.

use rand::{SeedableRng as _, seq::SliceRandom as _};
use rand_pcg::Pcg32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffles `0..n` with `seed` and holds out `ceil(test_fraction · n)` rows.
///
/// ```
/// use gamepop_training::split::train_test_split;
///
/// let split = train_test_split(10, 0.2, 123);
/// assert_eq!((split.train.len(), split.test.len()), (8, 2));
/// ```
#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
#[must_use]
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> SplitIndices {
    let n_test = ((n as f64 * test_fraction).ceil() as usize).min(n);
    let mut indices = (0..n).collect::<Vec<_>>();
    let mut rng = Pcg32::seed_from_u64(seed);
    indices.shuffle(&mut rng);
    let train = indices.split_off(n_test);
    SplitIndices {
        train,
        test: indices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes_round_test_up() {
        let split = train_test_split(11, 0.2, 0);
        assert_eq!(split.test.len(), 3);
        assert_eq!(split.train.len(), 8);
    }

    #[test]
    fn test_partition_covers_every_row_once() {
        let split = train_test_split(50, 0.2, 7);
        let mut all = split.train.clone();
        all.extend(&split.test);
        all.sort_unstable();
        assert_eq!(all, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_seed_determines_split() {
        assert_eq!(train_test_split(30, 0.2, 123), train_test_split(30, 0.2, 123));
        assert_ne!(
            train_test_split(30, 0.2, 123).test,
            train_test_split(30, 0.2, 124).test
        );
    }

    #[test]
    fn test_zero_fraction_holds_nothing_out() {
        let split = train_test_split(5, 0.0, 1);
        assert!(split.test.is_empty());
        assert_eq!(split.train.len(), 5);
    }
}
