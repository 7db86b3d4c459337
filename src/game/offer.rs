//! Per-turn building offers.
//!
//! Offers are a pure function of `(seed, turn)`: the RNG is seeded from the
//! session seed and switched to a stream keyed by the turn number, so a
//! restored session draws the same future offers as the original would have.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use crate::game::Category;

/// Draw `count` distinct categories for a turn, in menu order.
///
/// `None` offers every category.
#[must_use]
pub fn draw_offers(seed: u64, turn: u32, count: Option<usize>) -> Vec<Category> {
    let Some(count) = count else {
        return Category::ALL.to_vec();
    };

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(u64::from(turn));

    let mut offers: Vec<Category> = Category::ALL
        .choose_multiple(&mut rng, count)
        .copied()
        .collect();
    offers.sort_unstable();
    offers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_when_unlimited() {
        assert_eq!(draw_offers(1, 0, None), Category::ALL.to_vec());
    }

    #[test]
    fn test_distinct_and_sized() {
        for turn in 0..50 {
            let offers = draw_offers(7, turn, Some(2));
            assert_eq!(offers.len(), 2);
            assert_ne!(offers[0], offers[1]);
        }
    }

    #[test]
    fn test_deterministic() {
        for turn in 0..20 {
            assert_eq!(draw_offers(99, turn, Some(2)), draw_offers(99, turn, Some(2)));
        }
    }

    #[test]
    fn test_turns_vary() {
        let draws: std::collections::HashSet<_> =
            (0..40).map(|turn| draw_offers(3, turn, Some(2))).collect();
        assert!(draws.len() > 1);
    }
}
