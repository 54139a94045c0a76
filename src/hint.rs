use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

const MASK: char = '_';

/// How the one extra character of a hint is chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevealPolicy {
    /// First still-masked position, left to right. Deterministic.
    Leftmost,
    /// Uniformly random among still-masked positions.
    #[default]
    Random,
}

/// Build a partially-redacted reveal of `solution` after a wrong guess.
///
/// The result has exactly as many characters as the solution: positions
/// where the guess already matches (case-insensitively) show the solution
/// character, every other position is masked. One additional masked
/// position is then revealed so repeated attempts always move forward.
pub fn reveal<R>(solution: &str, guess: &str, policy: RevealPolicy, rng: &mut R) -> String
where
    R: Rng + ?Sized,
{
    let solution_chars: Vec<char> = solution.chars().collect();
    let guess_chars: Vec<char> = guess.trim().chars().collect();

    let mut out: Vec<char> = Vec::with_capacity(solution_chars.len());
    let mut masked: Vec<usize> = Vec::new();

    for (i, &ch) in solution_chars.iter().enumerate() {
        let matches = guess_chars
            .get(i)
            .is_some_and(|g| g.to_lowercase().eq(ch.to_lowercase()));
        if matches {
            out.push(ch);
        } else {
            masked.push(i);
            out.push(MASK);
        }
    }

    let extra = match policy {
        RevealPolicy::Leftmost => masked.first().copied(),
        RevealPolicy::Random => masked.choose(rng).copied(),
    };
    if let Some(pos) = extra {
        out[pos] = solution_chars[pos];
    }

    out.into_iter().collect()
}
