//! Tablature input model
//!
//! The tablature side arrives already translated from fret/course positions
//! to pitches. Notes are ordered by onset; notes sharing an onset form one
//! chord and carry the same `chord_seq`.

use crate::models::meter::{self, MeterInfo, MetricPosition};
use crate::rational::Rational;
use serde::{Deserialize, Serialize};

/// Maximum number of courses (simultaneous tablature notes)
pub const MAX_COURSES: usize = 6;

/// A single tablature note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabNote {
    /// MIDI pitch
    pub pitch: u8,
    /// Onset as a whole-note fraction
    pub onset: Rational,
    /// Duration until the next tablature onset
    pub min_duration: Rational,
    /// Sequence number of the chord this note belongs to
    pub chord_seq: usize,
    /// Number of notes in that chord
    pub chord_size: usize,
}

/// A piece of tablature with its meter sections
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tablature {
    pub notes: Vec<TabNote>,
    #[serde(default)]
    pub meters: Vec<MeterInfo>,
}

impl Tablature {
    pub fn new(notes: Vec<TabNote>, meters: Vec<MeterInfo>) -> Self {
        Self { notes, meters }
    }

    /// Build a tablature from `(onset, duration, pitches)` chords
    ///
    /// Chord sequence numbers and sizes are derived from the order given.
    pub fn from_chords(chords: &[(Rational, Rational, Vec<u8>)], meters: Vec<MeterInfo>) -> Self {
        let notes = chords
            .iter()
            .enumerate()
            .flat_map(|(seq, (onset, duration, pitches))| {
                pitches.iter().map(move |&pitch| TabNote {
                    pitch,
                    onset: *onset,
                    min_duration: *duration,
                    chord_seq: seq,
                    chord_size: pitches.len(),
                })
            })
            .collect();
        Self { notes, meters }
    }

    pub fn metric_position(&self, onset: Rational) -> MetricPosition {
        meter::metric_position(&self.meters, onset)
    }

    pub fn meter_at(&self, onset: Rational) -> MeterInfo {
        meter::meter_at(&self.meters, onset)
    }

    /// Number of chords (distinct chord sequence numbers)
    pub fn chord_count(&self) -> usize {
        let mut count = 0;
        let mut last = None;
        for note in &self.notes {
            if last != Some(note.chord_seq) {
                count += 1;
                last = Some(note.chord_seq);
            }
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_chords_numbers_chords() {
        let tab = Tablature::from_chords(
            &[
                (Rational::new(0, 1), Rational::new(1, 4), vec![48, 60]),
                (Rational::new(1, 4), Rational::new(1, 4), vec![62]),
            ],
            vec![],
        );
        assert_eq!(tab.notes.len(), 3);
        assert_eq!(tab.notes[1].chord_seq, 0);
        assert_eq!(tab.notes[1].chord_size, 2);
        assert_eq!(tab.notes[2].chord_seq, 1);
        assert_eq!(tab.chord_count(), 2);
    }
}
