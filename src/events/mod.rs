//! Event channel between the battle controller and the presentation layer
//!
//! Provides the typed topics, the in-memory bus, and the compact transcript
//! format used to log a play session.

mod bus;
mod format;
mod logger;
mod types;

pub use bus::{BusEvent, EventBus, EventChannel};
pub use format::{parse_notice, serialize_notice};
pub use logger::{TranscriptConfig, TranscriptLogger};
pub use types::{Intent, Notice};
