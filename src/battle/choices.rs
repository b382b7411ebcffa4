//! Answer choice generation
//!
//! All shuffles go through `SliceRandom::shuffle` (Fisher-Yates), so every
//! ordering of the presented choices is equally likely.

use rand::Rng;
use rand::seq::SliceRandom;

/// Number of wrong answers shown next to the correct one
pub const WRONG_CHOICES: usize = 2;

/// Build the choice set for a question: the correct answer plus up to two
/// distinct wrong answers from `universe`, in random order.
pub fn generate_choices<R: Rng + ?Sized>(
    correct: &str,
    universe: &[String],
    rng: &mut R,
) -> Vec<String> {
    let mut wrong: Vec<&String> = universe
        .iter()
        .filter(|name| name.as_str() != correct)
        .collect();
    wrong.dedup();
    wrong.shuffle(rng);

    let mut choices: Vec<String> = Vec::with_capacity(WRONG_CHOICES + 1);
    choices.push(correct.to_string());
    for name in wrong {
        if choices.len() > WRONG_CHOICES {
            break;
        }
        if !choices.contains(name) {
            choices.push(name.clone());
        }
    }

    choices.shuffle(rng);
    choices
}

/// Shuffle a fixed pool (the opening two-spell choice set)
pub fn shuffled<R: Rng + ?Sized>(pool: &[&str], rng: &mut R) -> Vec<String> {
    let mut choices: Vec<String> = pool.iter().map(|s| s.to_string()).collect();
    choices.shuffle(rng);
    choices
}
