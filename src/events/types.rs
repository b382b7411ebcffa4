//! Event type definitions for the event channel
//!
//! `Intent`s flow from the presentation layer into the controller;
//! `Notice`s flow back out. Each variant corresponds to one named topic.

use serde::{Deserialize, Serialize};

use crate::battle::{Combatant, GameMode, TutorialAction, TutorialPhase};

/// Player/presentation requests consumed by the controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "topic", content = "payload", rename_all = "kebab-case")]
pub enum Intent {
    /// Player cast a spell by name
    PlayerAction(String),
    StartBattle,
    HandleTutorialAction(TutorialAction),
    AdvanceTutorial,
    PlayNextTutorialAttack,
    /// Play one note, or two notes as a melodic interval
    PlaySound {
        note1: String,
        note2: Option<String>,
    },
    PlayGreatHarmonyTheme,
}

impl Intent {
    pub fn topic(&self) -> &'static str {
        match self {
            Intent::PlayerAction(_) => "player-action",
            Intent::StartBattle => "start-battle",
            Intent::HandleTutorialAction(_) => "handle-tutorial-action",
            Intent::AdvanceTutorial => "advance-tutorial",
            Intent::PlayNextTutorialAttack => "play-next-tutorial-attack",
            Intent::PlaySound { .. } => "play-sound",
            Intent::PlayGreatHarmonyTheme => "play-great-harmony-theme",
        }
    }

    /// Build an intent from a topic name and its textual payload
    pub fn from_topic(topic: &str, payload: Option<&str>) -> Result<Self, String> {
        let payload = payload.map(str::trim).filter(|p| !p.is_empty());
        match topic {
            "player-action" => payload
                .map(|p| Intent::PlayerAction(p.to_string()))
                .ok_or_else(|| "player-action needs a spell name".to_string()),
            "start-battle" => Ok(Intent::StartBattle),
            "handle-tutorial-action" => {
                let name = payload.ok_or("handle-tutorial-action needs Bend, Jump or Brace")?;
                TutorialAction::from_name(name)
                    .map(Intent::HandleTutorialAction)
                    .ok_or_else(|| format!("Unknown tutorial action '{}'", name))
            }
            "advance-tutorial" => Ok(Intent::AdvanceTutorial),
            "play-next-tutorial-attack" => Ok(Intent::PlayNextTutorialAttack),
            "play-sound" => {
                let mut notes = payload.unwrap_or_default().split_whitespace();
                let note1 = notes.next().ok_or("play-sound needs at least one note")?;
                Ok(Intent::PlaySound {
                    note1: note1.to_string(),
                    note2: notes.next().map(str::to_string),
                })
            }
            "play-great-harmony-theme" => Ok(Intent::PlayGreatHarmonyTheme),
            other => Err(format!("Unknown topic '{}'", other)),
        }
    }
}

/// State changes and narration published by the controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "topic", content = "payload", rename_all = "kebab-case")]
pub enum Notice {
    UpdateHealth { combatant: Combatant, health: i32 },
    Message(String),
    SetGameState(GameMode),
    SetTutorialPhase(TutorialPhase),
    SetTutorialMessageIndex(usize),
    SetTutorialCombatIndex(usize),
    SetChoices(Vec<String>),
}

impl Notice {
    pub fn topic(&self) -> &'static str {
        match self {
            Notice::UpdateHealth { .. } => "update-health",
            Notice::Message(_) => "message",
            Notice::SetGameState(_) => "set-game-state",
            Notice::SetTutorialPhase(_) => "set-tutorial-phase",
            Notice::SetTutorialMessageIndex(_) => "set-tutorial-message-index",
            Notice::SetTutorialCombatIndex(_) => "set-tutorial-combat-index",
            Notice::SetChoices(_) => "set-choices",
        }
    }

    /// Get the event type code for compact serialization
    pub fn type_code(&self) -> &'static str {
        match self {
            Notice::UpdateHealth { .. } => "HP",
            Notice::Message(_) => "MG",
            Notice::SetGameState(_) => "GS",
            Notice::SetTutorialPhase(_) => "TP",
            Notice::SetTutorialMessageIndex(_) => "TM",
            Notice::SetTutorialCombatIndex(_) => "TC",
            Notice::SetChoices(_) => "CH",
        }
    }

    /// Payload rendered as plain text (used by scenario matching)
    pub fn payload_text(&self) -> String {
        match self {
            Notice::UpdateHealth { combatant, health } => format!("{} {}", combatant, health),
            Notice::Message(text) => text.clone(),
            Notice::SetGameState(mode) => mode.to_string(),
            Notice::SetTutorialPhase(phase) => phase.to_string(),
            Notice::SetTutorialMessageIndex(idx) | Notice::SetTutorialCombatIndex(idx) => {
                idx.to_string()
            }
            Notice::SetChoices(choices) => choices.join(", "),
        }
    }
}
