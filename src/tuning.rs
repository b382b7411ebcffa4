//! Battle tuning settings
//!
//! The numbers every battle is played with. Missing fields in the config
//! file fall back to the defaults in `constants`.

use bevy::log::warn;
use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::constants::*;

fn default_starting_health() -> i32 {
    STARTING_HEALTH
}
fn default_correct_damage() -> i32 {
    CORRECT_ANSWER_DAMAGE
}
fn default_wrong_damage() -> i32 {
    WRONG_ANSWER_DAMAGE
}
fn default_turn_delay_ms() -> u64 {
    TURN_DELAY_MS
}

/// Serializable tuning values stored in config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Resource)]
pub struct BattleTuning {
    #[serde(default = "default_starting_health")]
    pub starting_health: i32,
    #[serde(default = "default_correct_damage")]
    pub correct_damage: i32,
    #[serde(default = "default_wrong_damage")]
    pub wrong_damage: i32,
    #[serde(default = "default_turn_delay_ms")]
    pub turn_delay_ms: u64,
}

impl Default for BattleTuning {
    fn default() -> Self {
        Self {
            starting_health: STARTING_HEALTH,
            correct_damage: CORRECT_ANSWER_DAMAGE,
            wrong_damage: WRONG_ANSWER_DAMAGE,
            turn_delay_ms: TURN_DELAY_MS,
        }
    }
}

pub fn load_battle_tuning_from_file(path: &str) -> Result<BattleTuning, String> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path, e))?;
    serde_json::from_str(&contents).map_err(|e| format!("Failed to parse {}: {}", path, e))
}

/// Load the global tuning file, warning and using defaults on failure
pub fn load_global_tuning() -> BattleTuning {
    if !std::path::Path::new(BATTLE_TUNING_FILE).exists() {
        return BattleTuning::default();
    }
    match load_battle_tuning_from_file(BATTLE_TUNING_FILE) {
        Ok(tuning) => tuning,
        Err(err) => {
            warn!("{}, using defaults", err);
            BattleTuning::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let tuning = BattleTuning::default();
        assert_eq!(tuning.starting_health, 100);
        assert_eq!(tuning.correct_damage, 34);
        assert_eq!(tuning.wrong_damage, 25);
        assert_eq!(tuning.turn_delay_ms, 2000);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let tuning: BattleTuning = serde_json::from_str(r#"{"wrong_damage": 50}"#).unwrap();
        assert_eq!(tuning.wrong_damage, 50);
        assert_eq!(tuning.correct_damage, 34);
        assert_eq!(tuning.turn_delay_ms, 2000);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = load_battle_tuning_from_file("config/does_not_exist.json").unwrap_err();
        assert!(err.starts_with("Failed to read"));
    }
}
