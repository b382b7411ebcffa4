//! Vibrato - a music-theory battle game
//!
//! The player identifies melodic intervals to cast spells against enemies,
//! after a scripted tutorial that teaches higher/lower/equal pitch. This
//! crate provides the game core, its event channel, audio seam, and a
//! headless Bevy front-end.

// Core modules
pub mod app;
pub mod audio;
pub mod config_watcher;
pub mod constants;
pub mod debug_logging;
pub mod events;
pub mod settings;
pub mod testing;
pub mod tuning;

// Game logic modules
pub mod battle;
pub mod music;
pub mod spellbook;

// Re-export commonly used types for convenience
pub use app::{
    Command, ConsoleController, ConsoleInput, ConsoleView, GameSession, HELP_TEXT,
    HeadlessAppBuilder, parse_command,
};
pub use audio::{AudioError, AudioService, ConsoleAudio, GREAT_HARMONY_THEME, Playback, RecordingAudio};
pub use battle::{
    BattleController, Combatant, Continuation, GameMode, GameState, TurnScheduler, TutorialAction,
    TutorialPhase, TutorialState,
};
pub use config_watcher::ConfigWatcher;
pub use constants::*;
pub use debug_logging::DebugLogConfig;
pub use events::{BusEvent, EventBus, EventChannel, Intent, Notice, TranscriptConfig, TranscriptLogger};
pub use music::{IntervalRelation, Note, NoteError, classify_interval};
pub use settings::{CurrentSettings, InitSettings, save_settings_system};
pub use spellbook::{STARTER_SPELLS, Spell, Spellbook};
pub use tuning::{BattleTuning, load_global_tuning};
