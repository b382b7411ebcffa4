//! Compact text format for session transcripts
//!
//! Format: `T:NNNNN|CODE|payload`
//! - T:NNNNN = timestamp in milliseconds (5 digits, wraps at 99999)
//! - CODE = 2-char notice type code
//! - payload = pipe-separated values specific to the notice
//!
//! Examples:
//! ```text
//! T:00000|GS|tutorial
//! T:00000|TP|intro
//! T:04120|HP|enemy|66
//! T:04120|MG|Correct! You cast "Tritone" and deal 34 damage!
//! T:06120|CH|Minor Third;Tritone;Major Third
//! ```
//!
//! Messages are always the last field, so they may contain `|`.

use super::types::Notice;
use crate::battle::{Combatant, GameMode, TutorialPhase};

/// Serialize a notice to compact text format
pub fn serialize_notice(time_ms: u32, notice: &Notice) -> String {
    let ts = format!("T:{:05}", time_ms % 100000);
    let code = notice.type_code();

    let data = match notice {
        Notice::UpdateHealth { combatant, health } => format!("{}|{}", combatant, health),
        Notice::Message(text) => text.replace('\n', " "),
        Notice::SetGameState(mode) => mode.to_string(),
        Notice::SetTutorialPhase(phase) => phase.to_string(),
        Notice::SetTutorialMessageIndex(idx) => idx.to_string(),
        Notice::SetTutorialCombatIndex(idx) => idx.to_string(),
        Notice::SetChoices(choices) => choices.join(";"),
    };

    format!("{}|{}|{}", ts, code, data)
}

/// Parse a transcript line back into (time_ms, notice)
pub fn parse_notice(line: &str) -> Option<(u32, Notice)> {
    let mut parts = line.splitn(3, '|');
    let ts = parts.next()?.strip_prefix("T:")?.parse::<u32>().ok()?;
    let code = parts.next()?;
    let data = parts.next().unwrap_or("");

    let notice = match code {
        "HP" => {
            let (who, health) = data.split_once('|')?;
            let combatant = match who {
                "player" => Combatant::Player,
                "enemy" => Combatant::Enemy,
                _ => return None,
            };
            Notice::UpdateHealth {
                combatant,
                health: health.parse().ok()?,
            }
        }
        "MG" => Notice::Message(data.to_string()),
        "GS" => Notice::SetGameState(match data {
            "tutorial" => GameMode::Tutorial,
            "battle" => GameMode::Battle,
            _ => return None,
        }),
        "TP" => Notice::SetTutorialPhase(TutorialPhase::from_name(data)?),
        "TM" => Notice::SetTutorialMessageIndex(data.parse().ok()?),
        "TC" => Notice::SetTutorialCombatIndex(data.parse().ok()?),
        "CH" => Notice::SetChoices(if data.is_empty() {
            Vec::new()
        } else {
            data.split(';').map(str::to_string).collect()
        }),
        _ => return None,
    };

    Some((ts, notice))
}
