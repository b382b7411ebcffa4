//! Tunable constants for vibrato
//!
//! All gameplay values are defined here for easy tweaking.

// =============================================================================
// COMBAT
// =============================================================================

/// Health both combatants start every battle with
pub const STARTING_HEALTH: i32 = 100;

/// Damage dealt to the enemy on a correct answer
pub const CORRECT_ANSWER_DAMAGE: i32 = 34;

/// Damage dealt to the player on a wrong answer
pub const WRONG_ANSWER_DAMAGE: i32 = 25;

/// Pause between a resolved answer and the next question (milliseconds)
pub const TURN_DELAY_MS: u64 = 2000;

// =============================================================================
// AUDIO
// =============================================================================

/// Gap between the onsets of a two-note sequence (seconds)
pub const MELODIC_GAP_SECS: f32 = 0.5;

/// Length of a single played note, an eighth note at 120 bpm (seconds)
pub const NOTE_LENGTH_SECS: f32 = 0.25;

/// Concert pitch reference
pub const A4_FREQUENCY: f64 = 440.0;
pub const A4_MIDI: i32 = 69;

/// Tempo of the background theme
pub const THEME_BPM: f32 = 120.0;

// =============================================================================
// CONSOLE
// =============================================================================

/// Update rate of the headless app loop
pub const CONSOLE_FPS: f32 = 60.0;

// =============================================================================
// FILES
// =============================================================================

pub const BATTLE_TUNING_FILE: &str = "config/battle_tuning.json";
pub const SETTINGS_FILE: &str = "config/init_settings.json";
pub const DEBUG_LOG_SETTINGS_FILE: &str = "config/debug_logging.json";
