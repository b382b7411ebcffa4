//! Audio interval service
//!
//! The controller only ever asks for three things: a single note, two notes
//! as a melodic interval, and the background theme. Playback is
//! fire-and-forget; nothing waits for a sound to finish.

use bevy::prelude::*;
use std::fmt;

use crate::constants::{MELODIC_GAP_SECS, NOTE_LENGTH_SECS, THEME_BPM};
use crate::music::{Note, NoteError};

/// Failure to bring up audio output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    /// Output device or context could not be started
    Unavailable(String),
    BadNote(NoteError),
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioError::Unavailable(reason) => write!(f, "audio unavailable: {}", reason),
            AudioError::BadNote(e) => write!(f, "bad note: {}", e),
        }
    }
}

impl std::error::Error for AudioError {}

impl From<NoteError> for AudioError {
    fn from(e: NoteError) -> Self {
        AudioError::BadNote(e)
    }
}

/// Playback capability the controller is constructed with
pub trait AudioService {
    /// Make sure output is running. Called before every battle.
    fn ensure_started(&mut self) -> Result<(), AudioError> {
        Ok(())
    }

    fn play_note(&mut self, note: &str);

    /// Play `first`, then `second` after a fixed gap
    fn play_two_note_sequence(&mut self, first: &str, second: &str);

    fn play_background_theme(&mut self);
}

/// One note of the background theme
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThemeNote {
    pub bar: u32,
    pub beat: u32,
    pub note: &'static str,
    /// Length in quarter-note beats
    pub beats: f32,
}

impl ThemeNote {
    const fn new(bar: u32, beat: u32, note: &'static str, beats: f32) -> Self {
        Self {
            bar,
            beat,
            note,
            beats,
        }
    }

    /// Onset in seconds from the start of the theme (4/4 time)
    pub fn start_secs(&self, bpm: f32) -> f32 {
        (self.bar * 4 + self.beat) as f32 * 60.0 / bpm
    }
}

/// The Great Harmony theme (Ode to Joy, first phrase)
pub const GREAT_HARMONY_THEME: [ThemeNote; 14] = [
    ThemeNote::new(0, 0, "E4", 1.0),
    ThemeNote::new(0, 1, "E4", 1.0),
    ThemeNote::new(0, 2, "F4", 1.0),
    ThemeNote::new(0, 3, "G4", 1.0),
    ThemeNote::new(1, 0, "G4", 1.0),
    ThemeNote::new(1, 1, "F4", 1.0),
    ThemeNote::new(1, 2, "E4", 1.0),
    ThemeNote::new(1, 3, "D4", 1.0),
    ThemeNote::new(2, 0, "C4", 1.0),
    ThemeNote::new(2, 1, "C4", 1.0),
    ThemeNote::new(2, 2, "D4", 1.0),
    ThemeNote::new(2, 3, "E4", 1.0),
    ThemeNote::new(3, 0, "E4", 2.0),
    ThemeNote::new(3, 2, "D4", 2.0),
];

/// Headless backend that logs what would be heard
#[derive(Debug, Default)]
pub struct ConsoleAudio {
    pub muted: bool,
    started: bool,
}

impl ConsoleAudio {
    pub fn new(muted: bool) -> Self {
        Self {
            muted,
            started: false,
        }
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    fn emit(&self, note: &str, offset_secs: f32, length_secs: f32) {
        if self.muted {
            return;
        }
        match Note::parse(note) {
            Ok(parsed) => info!(
                "♪ {} ({:.1} Hz) at +{:.2}s for {:.2}s",
                parsed,
                parsed.frequency(),
                offset_secs,
                length_secs
            ),
            Err(e) => warn!("Cannot play '{}': {}", note, e),
        }
    }
}

impl AudioService for ConsoleAudio {
    fn ensure_started(&mut self) -> Result<(), AudioError> {
        if !self.started {
            self.started = true;
            info!("Audio context is ready.");
        }
        Ok(())
    }

    fn play_note(&mut self, note: &str) {
        self.emit(note, 0.0, NOTE_LENGTH_SECS);
    }

    fn play_two_note_sequence(&mut self, first: &str, second: &str) {
        self.emit(first, 0.0, NOTE_LENGTH_SECS);
        self.emit(second, MELODIC_GAP_SECS, NOTE_LENGTH_SECS);
    }

    fn play_background_theme(&mut self) {
        // Theme may be requested before a battle has started the context
        self.started = true;
        let beat_secs = 60.0 / THEME_BPM;
        for note in GREAT_HARMONY_THEME {
            self.emit(note.note, note.start_secs(THEME_BPM), note.beats * beat_secs);
        }
    }
}

/// What a `RecordingAudio` was asked to play
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Playback {
    Note(String),
    Sequence(String, String),
    Theme,
}

/// In-memory backend for tests and scenarios
#[derive(Debug, Default)]
pub struct RecordingAudio {
    pub played: Vec<Playback>,
    pub start_calls: usize,
    /// Make `ensure_started` fail
    pub fail_start: bool,
}

impl RecordingAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_start: true,
            ..Self::default()
        }
    }

    pub fn last(&self) -> Option<&Playback> {
        self.played.last()
    }
}

impl AudioService for RecordingAudio {
    fn ensure_started(&mut self) -> Result<(), AudioError> {
        self.start_calls += 1;
        if self.fail_start {
            return Err(AudioError::Unavailable("no output device".to_string()));
        }
        Ok(())
    }

    fn play_note(&mut self, note: &str) {
        self.played.push(Playback::Note(note.to_string()));
    }

    fn play_two_note_sequence(&mut self, first: &str, second: &str) {
        self.played
            .push(Playback::Sequence(first.to_string(), second.to_string()));
    }

    fn play_background_theme(&mut self) {
        self.played.push(Playback::Theme);
    }
}
