use rand::Rng;
use rand::seq::IndexedRandom;

use crate::flower::Flower;
use crate::scoring::{is_learned, learning_weight};

/// Pick the next card to present. Cards further from mastery are
/// proportionally more likely; learned cards are excluded entirely.
/// Returns `None` once every card is learned. The draw has no memory, so
/// back-to-back repeats of the same card are possible.
pub fn next_card<'a, R>(deck: &'a [Flower], rng: &mut R) -> Option<&'a Flower>
where
    R: Rng + ?Sized,
{
    let pool: Vec<&Flower> = deck.iter().filter(|f| !is_learned(f)).collect();
    if pool.is_empty() {
        return None;
    }

    // Weights are 1..=3 for every pool member, so the draw cannot fail.
    pool.choose_weighted(rng, |f| learning_weight(f)).ok().copied()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::scoring::LEARNED_THRESHOLD;

    fn deck(counts: &[u32]) -> Vec<Flower> {
        counts
            .iter()
            .enumerate()
            .map(|(i, &count)| {
                let mut flower = Flower::new(
                    format!("flower-{i}"),
                    format!("Flora {i}"),
                    "Asteraceae",
                    format!("images/{i}.jpg"),
                );
                flower.correct_count = count;
                flower
            })
            .collect()
    }

    #[test]
    fn returns_none_when_everything_is_learned() {
        let deck = deck(&[3, 3, 4]);
        let mut rng = StdRng::seed_from_u64(7);
        assert!(next_card(&deck, &mut rng).is_none());
    }

    #[test]
    fn only_ever_draws_pool_members() {
        let deck = deck(&[0, 2, 3, 1, 3]);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let drawn = next_card(&deck, &mut rng).unwrap();
            assert!(drawn.correct_count < LEARNED_THRESHOLD);
            assert!(deck.contains(drawn));
        }
    }

    #[test]
    fn equal_weights_draw_roughly_uniformly() {
        let deck = deck(&[0, 0, 0]);
        let mut rng = StdRng::seed_from_u64(42);
        let mut counts: HashMap<String, usize> = HashMap::new();
        for _ in 0..100 {
            let drawn = next_card(&deck, &mut rng).unwrap();
            *counts.entry(drawn.common_name.clone()).or_insert(0) += 1;
        }
        assert_eq!(counts.len(), 3);
        for count in counts.values() {
            // ~33 each; allow generous slack for 100 draws.
            assert!((15..=55).contains(count), "skewed draw: {counts:?}");
        }
    }

    #[test]
    fn under_learned_cards_are_favoured() {
        let deck = deck(&[0, 2]);
        let mut rng = StdRng::seed_from_u64(9);
        let mut heavy = 0;
        for _ in 0..300 {
            if next_card(&deck, &mut rng).unwrap().common_name == "flower-0" {
                heavy += 1;
            }
        }
        // weight 3 vs 1: expect ~225 of 300.
        assert!(heavy > 180, "weight-3 card drawn only {heavy}/300 times");
    }
}
