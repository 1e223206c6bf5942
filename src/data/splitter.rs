// ============================================================
// Layer 4 — Train/Validation Splitter
// ============================================================
// Shuffles examples with a seeded RNG and splits off a
// validation set.
//
// The seed makes preprocessing reproducible: running it twice
// on the same corpus yields the same train.jsonl / valid.jsonl.
//
// For one2one data the split happens on documents (before they
// are flattened into per-keyphrase examples), otherwise the
// same source text would end up on both sides.

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// Shuffle `items` and return (train, valid) with
/// `round(len * valid_fraction)` items in valid.
pub fn split_train_valid<T>(mut items: Vec<T>, valid_fraction: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    let mut rng = StdRng::seed_from_u64(seed);
    items.shuffle(&mut rng);

    let total     = items.len();
    let valid_len = ((total as f64) * valid_fraction.clamp(0.0, 1.0)).round() as usize;
    let valid     = items.split_off(total - valid_len.min(total));

    tracing::debug!("Split {} items: {} train, {} valid", total, items.len(), valid.len());
    (items, valid)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sizes() {
        let (train, valid) = split_train_valid((0..100).collect::<Vec<usize>>(), 0.2, 7);
        assert_eq!(train.len(), 80);
        assert_eq!(valid.len(), 20);
    }

    #[test]
    fn test_same_seed_same_split() {
        let a = split_train_valid((0..50).collect::<Vec<usize>>(), 0.3, 42);
        let b = split_train_valid((0..50).collect::<Vec<usize>>(), 0.3, 42);
        assert_eq!(a, b);
    }

    #[test]
    fn test_nothing_lost() {
        let (mut train, valid) = split_train_valid((0..33).collect::<Vec<usize>>(), 0.5, 1);
        train.extend(valid);
        train.sort();
        assert_eq!(train, (0..33).collect::<Vec<_>>());
    }

    #[test]
    fn test_zero_fraction_and_empty() {
        let (train, valid) = split_train_valid((0..10).collect::<Vec<usize>>(), 0.0, 1);
        assert_eq!(train.len(), 10);
        assert!(valid.is_empty());

        let (train, valid) = split_train_valid(Vec::<usize>::new(), 0.5, 1);
        assert!(train.is_empty() && valid.is_empty());
    }
}
