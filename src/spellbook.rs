//! Spellbook - the nameable intervals a player can answer with

use serde::{Deserialize, Serialize};

use crate::music::{Note, NoteError};

/// One castable interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spell {
    pub name: String,
    pub notes: [String; 2],
    pub description: String,
}

impl Spell {
    pub fn new(name: &str, first: &str, second: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            notes: [first.to_string(), second.to_string()],
            description: description.to_string(),
        }
    }

    /// Semitone span between the two notes
    pub fn semitones(&self) -> Result<i32, NoteError> {
        let first = Note::parse(&self.notes[0])?;
        let second = Note::parse(&self.notes[1])?;
        Ok(first.semitones_to(&second))
    }
}

/// Spells offered in the opening choice set of a battle
pub const STARTER_SPELLS: [&str; 2] = ["Major Third", "Perfect Fifth"];

/// Ordered, read-only lookup of spells by name
#[derive(Debug, Clone)]
pub struct Spellbook {
    spells: Vec<Spell>,
}

impl Default for Spellbook {
    fn default() -> Self {
        Self::standard()
    }
}

impl Spellbook {
    /// The four intervals taught by the game
    pub fn standard() -> Self {
        Self::from_spells(vec![
            Spell::new("Major Third", "C4", "E4", "A bright, happy sound."),
            Spell::new("Perfect Fifth", "C4", "G4", "A stable, heroic sound."),
            Spell::new("Minor Third", "C4", "Eb4", "A sad, thoughtful sound."),
            Spell::new("Tritone", "C4", "F#4", "A dissonant, unstable sound."),
        ])
    }

    pub fn from_spells(spells: Vec<Spell>) -> Self {
        Self { spells }
    }

    pub fn get(&self, name: &str) -> Option<&Spell> {
        self.spells.iter().find(|s| s.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Spell names in spellbook order
    pub fn names(&self) -> Vec<String> {
        self.spells.iter().map(|s| s.name.clone()).collect()
    }

    pub fn spells(&self) -> &[Spell] {
        &self.spells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_order_and_lookup() {
        let book = Spellbook::standard();
        assert_eq!(
            book.names(),
            vec!["Major Third", "Perfect Fifth", "Minor Third", "Tritone"]
        );
        let fifth = book.get("Perfect Fifth").unwrap();
        assert_eq!(fifth.notes, ["C4".to_string(), "G4".to_string()]);
        assert!(book.get("Octave").is_none());
    }

    #[test]
    fn test_spell_names_match_their_spans() {
        let book = Spellbook::standard();
        let spans: Vec<i32> = book.spells().iter().map(|s| s.semitones().unwrap()).collect();
        assert_eq!(spans, vec![4, 7, 3, 6]);
    }

    #[test]
    fn test_starters_are_in_book() {
        let book = Spellbook::standard();
        for name in STARTER_SPELLS {
            assert!(book.contains(name), "{} missing", name);
        }
    }
}
