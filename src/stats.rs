use std::collections::BTreeMap;

use crate::flower::{AnswerLogEntry, Flower};
use crate::scoring::{LEARNED_THRESHOLD, is_learned};

/// Aggregate view of the deck and the answer log.
#[derive(Debug, Default)]
pub struct DeckStats {
    pub total: usize,
    pub learned: usize,
    pub in_progress: usize,
    pub unseen: usize,
    /// Cards per correct-count, the last bin holding everything learned.
    pub mastery_bins: [usize; (LEARNED_THRESHOLD + 1) as usize],
    pub families: BTreeMap<String, usize>,
    pub attempts: usize,
    pub correct_attempts: usize,
}

pub fn learned_count(deck: &[Flower]) -> usize {
    deck.iter().filter(|f| is_learned(f)).count()
}

impl DeckStats {
    pub fn collect(deck: &[Flower], log: &[AnswerLogEntry]) -> Self {
        let mut stats = DeckStats {
            attempts: log.len(),
            correct_attempts: log.iter().filter(|e| e.all_correct).count(),
            ..Default::default()
        };
        for flower in deck {
            stats.update(flower);
        }
        stats
    }

    fn update(&mut self, flower: &Flower) {
        self.total += 1;
        if is_learned(flower) {
            self.learned += 1;
        } else if flower.correct_count > 0 {
            self.in_progress += 1;
        } else {
            self.unseen += 1;
        }

        let bin = flower.correct_count.min(LEARNED_THRESHOLD) as usize;
        self.mastery_bins[bin] += 1;

        *self.families.entry(flower.family.clone()).or_insert(0) += 1;
    }

    pub fn accuracy(&self) -> Option<f64> {
        if self.attempts == 0 {
            None
        } else {
            Some(self.correct_attempts as f64 / self.attempts as f64)
        }
    }

    pub fn all_learned(&self) -> bool {
        self.total > 0 && self.learned == self.total
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn flower(name: &str, family: &str, count: u32) -> Flower {
        let mut flower = Flower::new(name, format!("{name} latin"), family, "");
        flower.correct_count = count;
        flower
    }

    fn entry(all_correct: bool) -> AnswerLogEntry {
        AnswerLogEntry {
            guess_common_name: "g".into(),
            guess_scientific_name: "g".into(),
            guess_family: "g".into(),
            common_name: "rose".into(),
            scientific_name: "Rosa".into(),
            family: "Rosaceae".into(),
            all_correct,
            answered_at: Utc::now(),
        }
    }

    #[test]
    fn buckets_cards_by_progress() {
        let deck = vec![
            flower("a", "Rosaceae", 0),
            flower("b", "Rosaceae", 2),
            flower("c", "Liliaceae", 3),
            flower("d", "Liliaceae", 5),
        ];
        let stats = DeckStats::collect(&deck, &[]);

        assert_eq!(stats.total, 4);
        assert_eq!(stats.unseen, 1);
        assert_eq!(stats.in_progress, 1);
        assert_eq!(stats.learned, 2);
        assert_eq!(stats.mastery_bins, [1, 0, 1, 2]);
        assert_eq!(stats.families.get("Rosaceae"), Some(&2));
        assert_eq!(stats.families.get("Liliaceae"), Some(&2));
        assert!(!stats.all_learned());
    }

    #[test]
    fn learned_count_uses_the_threshold() {
        let deck = vec![flower("a", "f", 2), flower("b", "f", 3), flower("c", "f", 9)];
        assert_eq!(learned_count(&deck), 2);
    }

    #[test]
    fn accuracy_comes_from_the_log() {
        let stats = DeckStats::collect(&[], &[entry(true), entry(false), entry(true), entry(true)]);
        assert_eq!(stats.attempts, 4);
        assert_eq!(stats.correct_attempts, 3);
        assert!((stats.accuracy().unwrap() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn accuracy_is_none_without_attempts() {
        let stats = DeckStats::collect(&[], &[]);
        assert_eq!(stats.accuracy(), None);
        assert!(!stats.all_learned());
    }

    #[test]
    fn fully_learned_deck_is_flagged() {
        let deck = vec![flower("a", "f", 3), flower("b", "f", 4)];
        let stats = DeckStats::collect(&deck, &[]);
        assert!(stats.all_learned());
    }
}
