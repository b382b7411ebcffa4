//! Session transcript logger
//!
//! Writes every rendered notice of a play session to one `.evlog` file.

use bevy::prelude::*;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::bus::BusEvent;
use super::format::serialize_notice;

/// Configuration for transcript logging
#[derive(Resource, Clone, Debug)]
pub struct TranscriptConfig {
    /// Directory for log files
    pub log_dir: PathBuf,
    /// Whether logging is enabled
    pub enabled: bool,
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("logs"),
            enabled: true,
        }
    }
}

/// Active transcript logger with file handle
#[derive(Resource)]
pub struct TranscriptLogger {
    writer: Option<BufWriter<File>>,
    session_id: String,
    path: Option<PathBuf>,
    config: TranscriptConfig,
}

impl TranscriptLogger {
    /// Create a new logger (but don't open the file yet)
    pub fn new(config: TranscriptConfig) -> Self {
        Self {
            writer: None,
            session_id: String::new(),
            path: None,
            config,
        }
    }

    /// Start a new transcript. `timestamp` names the file, a fresh UUID
    /// keeps it unique.
    pub fn start_session(&mut self, timestamp: &str) {
        if !self.config.enabled {
            return;
        }

        self.session_id = Uuid::new_v4().to_string();

        if let Err(e) = std::fs::create_dir_all(&self.config.log_dir) {
            warn!("Failed to create log directory: {}", e);
            return;
        }

        let filename = format!("{}_{}.evlog", timestamp, &self.session_id[..8]);
        let path = self.config.log_dir.join(filename);

        match OpenOptions::new().create(true).write(true).truncate(true).open(&path) {
            Ok(file) => {
                let mut writer = BufWriter::new(file);
                if let Err(e) = writeln!(writer, "# session {} {}", self.session_id, timestamp) {
                    warn!("Failed to write transcript header: {}", e);
                }
                info!("Transcript started: {} (session: {})", path.display(), &self.session_id[..8]);
                self.writer = Some(writer);
                self.path = Some(path);
            }
            Err(e) => {
                warn!("Failed to open transcript: {}", e);
            }
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Append one notice
    pub fn log(&mut self, event: &BusEvent) {
        let Some(writer) = &mut self.writer else {
            return;
        };
        let line = serialize_notice(event.time_ms, &event.notice);
        if let Err(e) = writeln!(writer, "{}", line) {
            warn!("Failed to write notice: {}", e);
        }
    }

    /// Flush and close the transcript
    pub fn end_session(&mut self) {
        if let Some(mut writer) = self.writer.take()
            && let Err(e) = writer.flush()
        {
            warn!("Failed to flush transcript: {}", e);
        }
    }

    pub fn is_active(&self) -> bool {
        self.writer.is_some()
    }
}

impl Default for TranscriptLogger {
    fn default() -> Self {
        Self::new(TranscriptConfig::default())
    }
}
