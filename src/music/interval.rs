//! Interval comparison between two notes

use serde::{Deserialize, Serialize};
use std::fmt;

use super::note::{Note, NoteError};

/// Direction of the second note relative to the first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalRelation {
    Higher,
    Lower,
    Equal,
}

impl IntervalRelation {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntervalRelation::Higher => "higher",
            IntervalRelation::Lower => "lower",
            IntervalRelation::Equal => "equal",
        }
    }
}

impl fmt::Display for IntervalRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify `second` against `first` by frequency.
pub fn classify_interval(first: &Note, second: &Note) -> IntervalRelation {
    let f1 = first.frequency();
    let f2 = second.frequency();

    if f2 > f1 {
        IntervalRelation::Higher
    } else if f2 < f1 {
        IntervalRelation::Lower
    } else {
        IntervalRelation::Equal
    }
}

/// Parse both note names and classify them.
pub fn classify_names(first: &str, second: &str) -> Result<IntervalRelation, NoteError> {
    let first = Note::parse(first)?;
    let second = Note::parse(second)?;
    Ok(classify_interval(&first, &second))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documented_pairs() {
        assert_eq!(classify_names("C4", "E4"), Ok(IntervalRelation::Higher));
        assert_eq!(classify_names("G4", "D4"), Ok(IntervalRelation::Lower));
        assert_eq!(classify_names("F4", "F4"), Ok(IntervalRelation::Equal));
        assert_eq!(classify_names("D4", "A4"), Ok(IntervalRelation::Higher));
    }

    #[test]
    fn test_octave_boundary() {
        // B3 sits just below C4 even though B is the "later" letter
        assert_eq!(classify_names("C4", "B3"), Ok(IntervalRelation::Lower));
        assert_eq!(classify_names("B3", "C4"), Ok(IntervalRelation::Higher));
    }

    #[test]
    fn test_enharmonic_is_equal() {
        assert_eq!(classify_names("F#4", "Gb4"), Ok(IntervalRelation::Equal));
    }

    #[test]
    fn test_exhaustive_direction_over_two_octaves() {
        let names = [
            "C4", "C#4", "D4", "Eb4", "E4", "F4", "F#4", "G4", "Ab4", "A4", "Bb4", "B4", "C5",
        ];
        for (i, a) in names.iter().enumerate() {
            for (j, b) in names.iter().enumerate() {
                let expected = match j.cmp(&i) {
                    std::cmp::Ordering::Greater => IntervalRelation::Higher,
                    std::cmp::Ordering::Less => IntervalRelation::Lower,
                    std::cmp::Ordering::Equal => IntervalRelation::Equal,
                };
                assert_eq!(classify_names(a, b), Ok(expected), "{} -> {}", a, b);
            }
        }
    }

    #[test]
    fn test_bad_name_propagates() {
        assert!(classify_names("C4", "Q4").is_err());
    }
}
