//! Random table and placement helpers
//!
//! Shared by the world generators. All randomness comes from the caller's
//! RNG so generation stays reproducible for a given seed.

use glam::IVec2;
use rand::Rng;

/// Pick from a weighted table given a uniform draw `r` in [0, 1).
///
/// Weights are accumulated in table order and the first entry whose
/// cumulative weight reaches `r * total` wins. If floating-point drift
/// exhausts the table without a match, the first entry is returned.
pub fn pick_weighted<T>(items: &[T], weight: impl Fn(&T) -> f64, r: f64) -> Option<&T> {
    let total: f64 = items.iter().map(&weight).sum();
    let target = r * total;
    let mut accumulated = 0.0;
    for item in items {
        accumulated += weight(item);
        if target <= accumulated {
            return Some(item);
        }
    }
    items.first()
}

/// Draw from the RNG and pick from a weighted table
pub fn pick_weighted_with<'a, T, R: Rng>(
    rng: &mut R,
    items: &'a [T],
    weight: impl Fn(&T) -> f64,
) -> Option<&'a T> {
    let r: f64 = rng.random();
    pick_weighted(items, weight, r)
}

/// Sample candidate cells until one is free, giving up after `attempts`.
///
/// `propose` may return `None` for a rejected candidate (e.g. out of bounds);
/// that still counts as an attempt.
pub fn find_free_cell<R: Rng>(
    rng: &mut R,
    attempts: usize,
    mut propose: impl FnMut(&mut R) -> Option<IVec2>,
    mut is_free: impl FnMut(IVec2) -> bool,
) -> Option<IVec2> {
    for _ in 0..attempts {
        if let Some(cell) = propose(rng) {
            if is_free(cell) {
                return Some(cell);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_pick_weighted_boundaries() {
        let table = [("a", 0.5), ("b", 0.25), ("c", 0.25)];
        let w = |e: &(&str, f64)| e.1;
        assert_eq!(pick_weighted(&table, w, 0.0).unwrap().0, "a");
        assert_eq!(pick_weighted(&table, w, 0.5).unwrap().0, "a");
        assert_eq!(pick_weighted(&table, w, 0.51).unwrap().0, "b");
        assert_eq!(pick_weighted(&table, w, 0.99).unwrap().0, "c");
    }

    #[test]
    fn test_pick_weighted_falls_back_to_first() {
        let table = [("a", 0.5), ("b", 0.5)];
        // r past the end of the table (drift) -> first entry
        assert_eq!(pick_weighted(&table, |e| e.1, 1.5).unwrap().0, "a");
        let empty: [(&str, f64); 0] = [];
        assert!(pick_weighted(&empty, |e| e.1, 0.3).is_none());
    }

    #[test]
    fn test_find_free_cell_gives_up() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut calls = 0;
        let found = find_free_cell(
            &mut rng,
            10,
            |_| {
                calls += 1;
                Some(IVec2::ZERO)
            },
            |_| false,
        );
        assert!(found.is_none());
        assert_eq!(calls, 10);
    }

    #[test]
    fn test_find_free_cell_skips_rejected_proposals() {
        let mut rng = Pcg32::seed_from_u64(7);
        let found = find_free_cell(
            &mut rng,
            50,
            |r| {
                let x = r.random_range(0..4);
                (x != 0).then_some(IVec2::new(x, 0))
            },
            |c| c.x == 3,
        );
        assert_eq!(found, Some(IVec2::new(3, 0)));
    }
}
