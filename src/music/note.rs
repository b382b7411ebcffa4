//! Scientific pitch notation (`C4`, `Eb4`, `F#4`) and equal-temperament frequencies

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{A4_FREQUENCY, A4_MIDI};

/// A parsed note name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Letter name, uppercase `A`..=`G`
    pub letter: char,
    /// Semitone offset from accidentals (`#` = +1, `b` = -1, `x` = +2)
    pub accidental: i8,
    pub octave: i8,
}

/// Why a note name failed to parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteError {
    Empty,
    InvalidLetter(char),
    InvalidOctave(String),
    /// Accidentals push the pitch out of range
    AccidentalOverflow(String),
}

impl fmt::Display for NoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoteError::Empty => write!(f, "empty note name"),
            NoteError::InvalidLetter(c) => write!(f, "invalid note letter '{}'", c),
            NoteError::InvalidOctave(s) => write!(f, "invalid octave '{}'", s),
            NoteError::AccidentalOverflow(s) => write!(f, "too many accidentals in '{}'", s),
        }
    }
}

impl std::error::Error for NoteError {}

fn letter_pitch_class(letter: char) -> Option<i32> {
    match letter {
        'C' => Some(0),
        'D' => Some(2),
        'E' => Some(4),
        'F' => Some(5),
        'G' => Some(7),
        'A' => Some(9),
        'B' => Some(11),
        _ => None,
    }
}

impl Note {
    /// Parse a note name. Letters are case-insensitive, accidentals may be
    /// `#`, `b`, `x` (double sharp) or repeated (`##`, `bb`).
    pub fn parse(name: &str) -> Result<Self, NoteError> {
        let name = name.trim();
        let mut chars = name.chars();
        let first = chars.next().ok_or(NoteError::Empty)?;
        let letter = first.to_ascii_uppercase();
        if letter_pitch_class(letter).is_none() {
            return Err(NoteError::InvalidLetter(first));
        }

        let rest = chars.as_str();
        let octave_start = rest
            .find(|c: char| c.is_ascii_digit() || c == '-')
            .unwrap_or(rest.len());
        let (accidentals, octave) = rest.split_at(octave_start);

        let mut accidental: i8 = 0;
        for c in accidentals.chars() {
            let step = match c {
                '#' => 1,
                'b' => -1,
                'x' => 2,
                _ => return Err(NoteError::InvalidOctave(rest.to_string())),
            };
            accidental = accidental
                .checked_add(step)
                .ok_or_else(|| NoteError::AccidentalOverflow(accidentals.to_string()))?;
        }

        let octave = octave
            .parse::<i8>()
            .map_err(|_| NoteError::InvalidOctave(octave.to_string()))?;

        Ok(Self {
            letter,
            accidental,
            octave,
        })
    }

    /// MIDI note number (C4 = 60, A4 = 69)
    pub fn midi(&self) -> i32 {
        let pitch_class = letter_pitch_class(self.letter).unwrap_or(0);
        (self.octave as i32 + 1) * 12 + pitch_class + self.accidental as i32
    }

    /// Frequency in Hz, twelve-tone equal temperament with A4 = 440 Hz
    pub fn frequency(&self) -> f64 {
        A4_FREQUENCY * 2f64.powf((self.midi() - A4_MIDI) as f64 / 12.0)
    }

    /// Signed semitone distance from `self` up to `other`
    pub fn semitones_to(&self, other: &Note) -> i32 {
        other.midi() - self.midi()
    }
}

impl FromStr for Note {
    type Err = NoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Note::parse(s)
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter)?;
        if self.accidental >= 0 {
            for _ in 0..self.accidental {
                write!(f, "#")?;
            }
        } else {
            for _ in 0..(-self.accidental) {
                write!(f, "b")?;
            }
        }
        write!(f, "{}", self.octave)
    }
}
