//! Config file auto-reload system
//!
//! Polls the battle tuning file every 10 seconds and swaps the new values
//! into the running session when it changes. Health already lost stays
//! lost; only future damage and turn pacing pick up the new numbers.

use bevy::prelude::*;
use std::fs;
use std::time::SystemTime;

use crate::app::GameSession;
use crate::constants::BATTLE_TUNING_FILE;
use crate::tuning::load_battle_tuning_from_file;

/// How often to check for config changes (seconds)
const CHECK_INTERVAL: f32 = 10.0;

/// Tracks modification times of config files for hot-reload
#[derive(Resource)]
pub struct ConfigWatcher {
    /// Time since last check
    pub timer: f32,
    pub tuning_path: String,
    pub tuning_mtime: Option<SystemTime>,
}

impl Default for ConfigWatcher {
    fn default() -> Self {
        Self::watching(BATTLE_TUNING_FILE)
    }
}

impl ConfigWatcher {
    pub fn watching(path: &str) -> Self {
        Self {
            timer: 0.0,
            tuning_path: path.to_string(),
            tuning_mtime: get_mtime(path),
        }
    }

    /// Record the current mtime and report whether it moved
    pub fn tuning_changed(&mut self) -> bool {
        let mtime = get_mtime(&self.tuning_path);
        if mtime == self.tuning_mtime {
            return false;
        }
        self.tuning_mtime = mtime;
        true
    }
}

/// Get file modification time, or None if file doesn't exist
fn get_mtime(path: &str) -> Option<SystemTime> {
    fs::metadata(path).ok().and_then(|m| m.modified().ok())
}

/// Check for config file changes and reload as needed.
/// Runs every 10 seconds.
pub fn check_config_changes(
    time: Res<Time>,
    mut watcher: ResMut<ConfigWatcher>,
    mut session: ResMut<GameSession>,
) {
    watcher.timer += time.delta_secs();

    if watcher.timer < CHECK_INTERVAL {
        return;
    }
    watcher.timer = 0.0;

    if !watcher.tuning_changed() {
        return;
    }

    match load_battle_tuning_from_file(&watcher.tuning_path) {
        Ok(tuning) => {
            info!("Auto-reloaded battle tuning from {}", watcher.tuning_path);
            session.controller.set_tuning(tuning);
        }
        Err(e) => warn!("{}, keeping current tuning", e),
    }
}
