//! Transcription (ground truth) input model
//!
//! Voices are indexed from the top: voice 0 is the highest voice. Each
//! voice is a time-ordered list of notes.

use crate::models::key::KeyInfo;
use crate::rational::Rational;
use serde::{Deserialize, Serialize};

/// Maximum number of voices a transcription may have
pub const MAX_VOICES: usize = 6;

/// A single transcription note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransNote {
    pub pitch: u8,
    pub onset: Rational,
    pub duration: Rational,
}

impl TransNote {
    pub fn new(pitch: u8, onset: Rational, duration: Rational) -> Self {
        Self { pitch, onset, duration }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcription {
    pub voices: Vec<Vec<TransNote>>,
    #[serde(default)]
    pub keys: Vec<KeyInfo>,
}

impl Transcription {
    pub fn new(voices: Vec<Vec<TransNote>>, keys: Vec<KeyInfo>) -> Self {
        Self { voices, keys }
    }

    pub fn num_voices(&self) -> usize {
        self.voices.len()
    }

    pub fn note_count(&self) -> usize {
        self.voices.iter().map(Vec::len).sum()
    }

    /// Key in effect at `onset` (the last section starting at or before it)
    pub fn key_at(&self, onset: Rational) -> KeyInfo {
        self.keys
            .iter()
            .filter(|k| k.onset <= onset)
            .last()
            .or_else(|| self.keys.first())
            .copied()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::key::Mode;

    #[test]
    fn test_key_at_picks_latest_section() {
        let trans = Transcription::new(
            vec![],
            vec![
                KeyInfo::new(0, Mode::Major, Rational::from_integer(0)),
                KeyInfo::new(-1, Mode::Minor, Rational::from_integer(8)),
            ],
        );
        assert_eq!(trans.key_at(Rational::new(15, 2)).key_signature, 0);
        assert_eq!(trans.key_at(Rational::from_integer(8)).key_signature, -1);
    }

    #[test]
    fn test_key_at_without_sections_is_c_major() {
        let trans = Transcription::default();
        let key = trans.key_at(Rational::from_integer(3));
        assert_eq!(key.key_signature, 0);
        assert_eq!(key.mode, Mode::Major);
    }
}
