use crate::flower::Flower;

/// Cards with this many fully-correct answers leave the learning pool.
pub const LEARNED_THRESHOLD: u32 = 3;

/// Raw text entered for the three fields. Missing input is an empty string.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Guesses {
    pub common_name: String,
    pub scientific_name: String,
    pub family: String,
}

impl Guesses {
    pub fn new(
        common_name: impl Into<String>,
        scientific_name: impl Into<String>,
        family: impl Into<String>,
    ) -> Self {
        Guesses {
            common_name: common_name.into(),
            scientific_name: scientific_name.into(),
            family: family.into(),
        }
    }
}

/// Per-field pass/fail for one attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Verdict {
    pub common_name: bool,
    pub scientific_name: bool,
    pub family: bool,
}

impl Verdict {
    pub fn all_correct(&self) -> bool {
        self.common_name && self.scientific_name && self.family
    }
}

/// Trimmed, case-insensitive exact match. An empty stored field only
/// matches an empty guess.
pub fn field_matches(solution: &str, guess: &str) -> bool {
    guess.trim().to_lowercase() == solution.to_lowercase()
}

pub fn evaluate(flower: &Flower, guesses: &Guesses) -> Verdict {
    Verdict {
        common_name: field_matches(&flower.common_name, &guesses.common_name),
        scientific_name: field_matches(&flower.scientific_name, &guesses.scientific_name),
        family: field_matches(&flower.family, &guesses.family),
    }
}

/// Draw weight for the selection engine: distance from mastery, 1..=3 for
/// pool members, 0 once learned.
pub fn learning_weight(flower: &Flower) -> u32 {
    LEARNED_THRESHOLD.saturating_sub(flower.correct_count)
}

pub fn is_learned(flower: &Flower) -> bool {
    flower.correct_count >= LEARNED_THRESHOLD
}
