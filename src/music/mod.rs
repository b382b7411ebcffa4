//! Pitch arithmetic: note names, frequencies, and interval comparison

mod interval;
mod note;

pub use interval::{IntervalRelation, classify_interval, classify_names};
pub use note::{Note, NoteError};
