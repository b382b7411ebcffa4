//! Battle and tutorial state owned by the controller

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::STARTING_HEALTH;

/// Which side of the battle a health value belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Combatant {
    Player,
    Enemy,
}

impl fmt::Display for Combatant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Combatant::Player => write!(f, "player"),
            Combatant::Enemy => write!(f, "enemy"),
        }
    }
}

/// Top-level screen the presentation layer should show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    #[default]
    Tutorial,
    Battle,
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameMode::Tutorial => write!(f, "tutorial"),
            GameMode::Battle => write!(f, "battle"),
        }
    }
}

/// Stage of the scripted tutorial.
///
/// Only `Intro` and `Reward` have transitions driven by `advance_tutorial`;
/// the remaining stages are reachable but advanced by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TutorialPhase {
    #[default]
    Intro,
    LearningPitch,
    Combat,
    Climax,
    Reward,
}

impl TutorialPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TutorialPhase::Intro => "intro",
            TutorialPhase::LearningPitch => "learningPitch",
            TutorialPhase::Combat => "combat",
            TutorialPhase::Climax => "climax",
            TutorialPhase::Reward => "reward",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "intro" => Some(TutorialPhase::Intro),
            "learningPitch" => Some(TutorialPhase::LearningPitch),
            "combat" => Some(TutorialPhase::Combat),
            "climax" => Some(TutorialPhase::Climax),
            "reward" => Some(TutorialPhase::Reward),
            _ => None,
        }
    }
}

impl fmt::Display for TutorialPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Health, turn guard and the pending question
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    /// Not clamped; may go negative on the killing blow
    pub player_health: i32,
    pub enemy_health: i32,
    pub is_battling: bool,
    /// Set when a question is posed, cleared when the next turn begins
    pub turn_in_progress: bool,
    /// Correct spell name for the pending question
    pub current_answer: Option<String>,
    pub choices: Vec<String>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            player_health: STARTING_HEALTH,
            enemy_health: STARTING_HEALTH,
            is_battling: false,
            turn_in_progress: false,
            current_answer: None,
            choices: Vec::new(),
        }
    }
}

impl GameState {
    pub fn health(&self, combatant: Combatant) -> i32 {
        match combatant {
            Combatant::Player => self.player_health,
            Combatant::Enemy => self.enemy_health,
        }
    }

    /// Subtract damage and return the new health
    pub fn damage(&mut self, combatant: Combatant, amount: i32) -> i32 {
        let health = match combatant {
            Combatant::Player => &mut self.player_health,
            Combatant::Enemy => &mut self.enemy_health,
        };
        *health -= amount;
        *health
    }

    pub fn is_defeated(&self, combatant: Combatant) -> bool {
        self.health(combatant) <= 0
    }
}

/// Cursors into the tutorial script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TutorialState {
    pub phase: TutorialPhase,
    pub message_index: usize,
    pub combat_index: usize,
}
