//! Debug logging configuration shared across binaries.

use bevy::log::{Level, LogPlugin, warn};
use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::constants::DEBUG_LOG_SETTINGS_FILE;

#[derive(Debug, Clone, Serialize, Deserialize, Resource)]
#[serde(default)]
pub struct DebugLogConfig {
    pub enabled: bool,
    /// Extra filter directives, e.g. "vibrato::battle=trace"
    pub filter: Option<String>,
}

impl Default for DebugLogConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            filter: None,
        }
    }
}

impl DebugLogConfig {
    pub fn load() -> Self {
        Self::load_from(DEBUG_LOG_SETTINGS_FILE)
    }

    /// Read `path`, warning and using defaults when it is unreadable or malformed
    pub fn load_from(path: &str) -> Self {
        if !Path::new(path).exists() {
            return Self::default();
        }
        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => config,
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

    pub fn enabled_from_args(args: &[String]) -> bool {
        args.iter().any(|arg| arg == "--debug-log")
    }

    pub fn load_with_args(args: &[String]) -> Self {
        let mut config = Self::load();
        if Self::enabled_from_args(args) {
            config.enabled = true;
        }
        config
    }

    pub fn level(&self) -> Level {
        if self.enabled { Level::DEBUG } else { Level::INFO }
    }

    pub fn filter_directives(&self) -> String {
        let base = if self.enabled {
            "wgpu=error,vibrato=debug"
        } else {
            "wgpu=error"
        };
        match &self.filter {
            Some(extra) if !extra.is_empty() => format!("{},{}", base, extra),
            _ => base.to_string(),
        }
    }

    /// LogPlugin configured for this run
    pub fn log_plugin(&self) -> LogPlugin {
        LogPlugin {
            level: self.level(),
            filter: self.filter_directives(),
            ..Default::default()
        }
    }
}
