//! Persistent settings for session initialization
//!
//! Saves and loads user preferences (audio, transcript, seed) to/from an
//! init_settings.json file in the config directory. Command-line flags
//! override what the file says for a single run.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::constants::SETTINGS_FILE;

/// Persistent settings that survive between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitSettings {
    /// Fixed RNG seed (None = fresh entropy every run)
    pub seed: Option<u64>,
    /// Whether notes are rendered at all
    pub audio_enabled: bool,
    /// Write a session transcript
    pub transcript_enabled: bool,
    /// Directory for transcript files
    pub transcript_dir: String,
    /// Skip the tutorial and go straight to battle
    pub skip_tutorial: bool,
}

impl Default for InitSettings {
    fn default() -> Self {
        Self {
            seed: None,
            audio_enabled: true,
            transcript_enabled: true,
            transcript_dir: "logs".to_string(),
            skip_tutorial: false,
        }
    }
}

impl InitSettings {
    /// Load settings from file, or return defaults if file doesn't exist
    pub fn load() -> Self {
        Self::load_from(SETTINGS_FILE)
    }

    pub fn load_from(path: &str) -> Self {
        if !Path::new(path).exists() {
            info!("No {} found, using defaults", path);
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(settings) => {
                    info!("Loaded settings from {}", path);
                    settings
                }
                Err(e) => {
                    warn!("Failed to parse {}: {}, using defaults", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read {}: {}, using defaults", path, e);
                Self::default()
            }
        }
    }

    /// Save settings to file
    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(SETTINGS_FILE)
    }

    pub fn save_to(&self, path: &str) -> Result<(), std::io::Error> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        if let Some(parent) = Path::new(path).parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, json)?;
        info!("Saved settings to {}", path);
        Ok(())
    }

    /// Apply `--seed N`, `--mute`, `--no-transcript` and `--skip-tutorial`
    pub fn apply_args(&mut self, args: &[String]) -> Result<(), String> {
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--seed" => {
                    let value = iter.next().ok_or("--seed needs a value")?;
                    let seed = value
                        .parse::<u64>()
                        .map_err(|e| format!("Invalid seed '{}': {}", value, e))?;
                    self.seed = Some(seed);
                }
                "--mute" => self.audio_enabled = false,
                "--no-transcript" => self.transcript_enabled = false,
                "--skip-tutorial" => self.skip_tutorial = true,
                _ => {}
            }
        }
        Ok(())
    }
}

/// Resource tracking the current init settings (for change detection)
#[derive(Resource)]
pub struct CurrentSettings {
    pub settings: InitSettings,
    pub dirty: bool,
}

impl CurrentSettings {
    pub fn new(settings: InitSettings) -> Self {
        Self {
            settings,
            dirty: false,
        }
    }

    /// Mark settings as changed (will be saved on next update)
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Save if dirty
    pub fn save_if_dirty(&mut self) {
        if self.dirty {
            if let Err(e) = self.settings.save() {
                warn!("Failed to save settings: {}", e);
            }
            self.dirty = false;
        }
    }
}

/// System to save settings when changed
pub fn save_settings_system(mut settings: ResMut<CurrentSettings>) {
    settings.save_if_dirty();
}
