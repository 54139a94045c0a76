use anyhow::{Result, bail};
use chrono::Utc;
use rand::Rng;

use crate::flower::{AnswerLogEntry, Field, Flower};
use crate::hint::{RevealPolicy, reveal};
use crate::scoring::{Guesses, Verdict, evaluate, is_learned};
use crate::select::next_card;

/// Where an interactive session currently stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    NoCardSelected,
    CardActive,
    /// Terminal until a reset puts cards back into the pool.
    AllLearned,
}

/// Explicit per-session state: the selected card's key, the guesses last
/// typed, and whether the last attempt was fully correct. The deck itself
/// is owned by the caller and passed into each interaction.
#[derive(Clone, Debug, Default)]
pub struct Session {
    current: Option<String>,
    last_all_correct: bool,
}

/// Everything one evaluated attempt produced: the verdict, hints for each
/// wrong field, and the log entry to persist.
#[derive(Clone, Debug)]
pub struct Attempt {
    pub verdict: Verdict,
    pub hints: Vec<(Field, String)>,
    pub entry: AnswerLogEntry,
}

/// Count toward mastery: +1 only on a fully correct attempt.
pub fn record_attempt(flower: &mut Flower, all_correct: bool) {
    if all_correct {
        flower.correct_count += 1;
    }
}

impl Session {
    pub fn new() -> Self {
        Session::default()
    }

    pub fn phase(&self, deck: &[Flower]) -> Phase {
        if self.current.is_some() {
            Phase::CardActive
        } else if !deck.is_empty() && deck.iter().all(is_learned) {
            Phase::AllLearned
        } else {
            Phase::NoCardSelected
        }
    }

    pub fn last_all_correct(&self) -> bool {
        self.last_all_correct
    }

    /// Draw a new card into the session. Clears the selection when the
    /// pool is empty, which moves the phase to `AllLearned`.
    pub fn draw<'a, R>(&mut self, deck: &'a [Flower], rng: &mut R) -> Option<&'a Flower>
    where
        R: Rng + ?Sized,
    {
        let drawn = next_card(deck, rng);
        self.current = drawn.map(|f| f.common_name.clone());
        self.last_all_correct = false;
        drawn
    }

    pub fn current_card<'a>(&self, deck: &'a [Flower]) -> Option<&'a Flower> {
        let key = self.current.as_deref()?;
        deck.iter().find(|f| f.common_name == key)
    }

    /// Back to `NoCardSelected`, e.g. after a reset.
    pub fn clear(&mut self) {
        self.current = None;
        self.last_all_correct = false;
    }

    /// Score the guesses against the active card, update its count in the
    /// deck, and produce hints for every field that was wrong. The caller
    /// persists the updated deck and the returned log entry.
    pub fn submit<R>(
        &mut self,
        deck: &mut [Flower],
        guesses: &Guesses,
        policy: RevealPolicy,
        rng: &mut R,
    ) -> Result<Attempt>
    where
        R: Rng + ?Sized,
    {
        let Some(key) = self.current.as_deref() else {
            bail!("No card is selected");
        };
        let Some(idx) = deck.iter().position(|f| f.common_name == key) else {
            bail!("Selected card '{key}' is no longer in the deck");
        };

        let verdict = evaluate(&deck[idx], guesses);
        let all_correct = verdict.all_correct();
        record_attempt(&mut deck[idx], all_correct);

        let flower = &deck[idx];
        let entry = AnswerLogEntry {
            guess_common_name: guesses.common_name.clone(),
            guess_scientific_name: guesses.scientific_name.clone(),
            guess_family: guesses.family.clone(),
            common_name: flower.common_name.clone(),
            scientific_name: flower.scientific_name.clone(),
            family: flower.family.clone(),
            all_correct,
            answered_at: Utc::now(),
        };

        let mut hints = Vec::new();
        if !all_correct {
            for field in Field::ALL {
                let correct = match field {
                    Field::CommonName => verdict.common_name,
                    Field::ScientificName => verdict.scientific_name,
                    Field::Family => verdict.family,
                };
                if !correct {
                    let guess = match field {
                        Field::CommonName => &guesses.common_name,
                        Field::ScientificName => &guesses.scientific_name,
                        Field::Family => &guesses.family,
                    };
                    hints.push((field, reveal(field.solution(flower), guess, policy, rng)));
                }
            }
        }

        self.last_all_correct = all_correct;
        Ok(Attempt {
            verdict,
            hints,
            entry,
        })
    }
}
