//! Tutorial script and battle narration

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::music::{IntervalRelation, NoteError, classify_names};

pub const INTRO_MESSAGES: [&str; 7] = [
    "In the dawn of time, all of reality was woven from a single symphony, the Great Harmony.",
    "But this music has faded, corrupted by the creeping silence of the Kakophony.",
    "The world's song has become a meaningless drone. Yet you are different. You are an Echo, born with the curse and gift of hearing the faint, ghostly melodies of what was lost.",
    "Haunted by these phantom sounds, your search for answers has led you here, to the base of the legendary Tower of Vibrato, the last sanctuary of true music.",
    "You seek its guardian, Maestro Bethovan, the last master who remembers the true sound of the Weave.",
    "As you approach, a voice, powerful and sharp as a trumpet's blast, echoes from the tower's peak...",
    "Another stray Echo, drawn to the flame? The Harmony is not a toy! If the simplest dissonance of that creature overwhelms you, you are not worthy of my teachings. Prove you can even tell up from down!",
];

pub const REWARD_MESSAGES: [&str; 4] = [
    "Hmph. Not bad. You have a basic sense of pitch...",
    "You have learned: Major Third Strike!",
    "You have learned: Perfect Fifth Shield!",
    "Now the real training begins. Prepare for your first true battle.",
];

/// One scripted attack of the tutorial drill
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TutorialAttack {
    /// Relation the script announces for this attack
    pub relation: IntervalRelation,
    pub notes: [&'static str; 2],
}

impl TutorialAttack {
    /// Relation derived from the notes themselves
    pub fn expected_relation(&self) -> Result<IntervalRelation, NoteError> {
        classify_names(self.notes[0], self.notes[1])
    }
}

pub const TUTORIAL_COMBAT_SEQUENCE: [TutorialAttack; 4] = [
    TutorialAttack {
        relation: IntervalRelation::Higher,
        notes: ["C4", "E4"],
    },
    TutorialAttack {
        relation: IntervalRelation::Lower,
        notes: ["G4", "D4"],
    },
    TutorialAttack {
        relation: IntervalRelation::Equal,
        notes: ["F4", "F4"],
    },
    TutorialAttack {
        relation: IntervalRelation::Higher,
        notes: ["D4", "A4"],
    },
];

/// Player responses during the tutorial drill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TutorialAction {
    /// Answer "higher"
    Bend,
    /// Answer "lower"
    Jump,
    /// Answer "equal"
    Brace,
}

impl TutorialAction {
    pub fn relation(&self) -> IntervalRelation {
        match self {
            TutorialAction::Bend => IntervalRelation::Higher,
            TutorialAction::Jump => IntervalRelation::Lower,
            TutorialAction::Brace => IntervalRelation::Equal,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Bend" => Some(TutorialAction::Bend),
            "Jump" => Some(TutorialAction::Jump),
            "Brace" => Some(TutorialAction::Brace),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TutorialAction::Bend => "Bend",
            TutorialAction::Jump => "Jump",
            TutorialAction::Brace => "Brace",
        }
    }
}

impl fmt::Display for TutorialAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// NARRATION
// =============================================================================

pub const BATTLE_BEGINS: &str = "The battle begins!";
pub const ENEMY_ATTACK: &str = "The Imp shrieks a dissonant sound...";
pub const BATTLE_VICTORY: &str = "You have defeated the Shrieking Imp! Victory!";
pub const TUTORIAL_VICTORY: &str = "You have defeated the Dissonant Beast! Victory!";
pub const DEFEAT: &str = "You have been defeated... The world remains in dissonance.";

pub fn correct_spell(spell: &str, damage: i32) -> String {
    format!("Correct! You cast \"{}\" and deal {} damage!", spell, damage)
}

pub fn correct_action(action: TutorialAction, damage: i32) -> String {
    format!("Correct! You chose {} and deal {} damage!", action, damage)
}

pub fn wrong_answer(answer: Option<&str>, damage: i32) -> String {
    match answer {
        Some(answer) => format!("Wrong! It was a {}. You take {} damage!", answer, damage),
        None => format!("Wrong! You take {} damage!", damage),
    }
}

pub fn tutorial_attack(relation: IntervalRelation) -> String {
    format!("The Dissonant Beast plays a {} interval.", relation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_classifies_as_authored() {
        for attack in TUTORIAL_COMBAT_SEQUENCE {
            assert_eq!(attack.expected_relation(), Ok(attack.relation));
        }
    }

    #[test]
    fn test_action_mapping() {
        assert_eq!(TutorialAction::Bend.relation(), IntervalRelation::Higher);
        assert_eq!(TutorialAction::Jump.relation(), IntervalRelation::Lower);
        assert_eq!(TutorialAction::Brace.relation(), IntervalRelation::Equal);
        assert_eq!(TutorialAction::from_name("Brace"), Some(TutorialAction::Brace));
        assert_eq!(TutorialAction::from_name("brace"), None);
    }

    #[test]
    fn test_narration() {
        assert_eq!(
            correct_spell("Tritone", 34),
            "Correct! You cast \"Tritone\" and deal 34 damage!"
        );
        assert_eq!(
            wrong_answer(Some("Minor Third"), 25),
            "Wrong! It was a Minor Third. You take 25 damage!"
        );
        assert_eq!(wrong_answer(None, 25), "Wrong! You take 25 damage!");
        assert_eq!(
            tutorial_attack(IntervalRelation::Lower),
            "The Dissonant Beast plays a lower interval."
        );
    }
}
