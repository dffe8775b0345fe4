//! Label and mismatch types produced by the mapper

use crate::rational::Rational;
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

/// One 0.0/1.0 entry per voice (voice 0 = highest)
///
/// Normally one bit is set, two for a unison or suspended-note unison.
/// More than two appear only while an extended SNU is being resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoiceLabel(Vec<f64>);

impl VoiceLabel {
    pub fn empty(num_voices: usize) -> Self {
        VoiceLabel(vec![0.0; num_voices])
    }

    pub fn one_hot(num_voices: usize, voice: usize) -> Self {
        let mut label = Self::empty(num_voices);
        label.set(voice);
        label
    }

    pub fn set(&mut self, voice: usize) {
        if let Some(bit) = self.0.get_mut(voice) {
            *bit = 1.0;
        }
    }

    pub fn clear(&mut self, voice: usize) {
        if let Some(bit) = self.0.get_mut(voice) {
            *bit = 0.0;
        }
    }

    pub fn has(&self, voice: usize) -> bool {
        self.0.get(voice).is_some_and(|&bit| bit == 1.0)
    }

    /// Number of voices set
    pub fn count(&self) -> usize {
        self.0.iter().filter(|&&bit| bit == 1.0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Voices set, highest voice (lowest index) first
    pub fn voices(&self) -> Vec<usize> {
        (0..self.0.len()).filter(|&v| self.has(v)).collect()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// Mapping state of one tablature note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "label", rename_all = "camelCase")]
pub enum Assignment {
    Assigned(VoiceLabel),
    /// Ornamental note not (yet) attached to a voice
    Ornamental,
    Unmatched,
}

impl Assignment {
    pub fn label(&self) -> Option<&VoiceLabel> {
        match self {
            Assignment::Assigned(label) => Some(label),
            _ => None,
        }
    }
}

/// Cause of a mismatch between tablature and transcription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum MismatchCategory {
    Ornamentation = 0,
    Repetition = 1,
    Ficta = 2,
    Other = 3,
}

impl MismatchCategory {
    pub const ALL: [MismatchCategory; 4] = [
        MismatchCategory::Ornamentation,
        MismatchCategory::Repetition,
        MismatchCategory::Ficta,
        MismatchCategory::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MismatchCategory::Ornamentation => "ornamentation",
            MismatchCategory::Repetition => "repetition",
            MismatchCategory::Ficta => "ficta",
            MismatchCategory::Other => "other",
        }
    }
}

/// One tablature note whose voice was not read off the transcription directly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MismatchRecord {
    /// Index into the tablature's note list
    pub tab_index: usize,
    pub pitch: u8,
    /// Tablature chord sequence number
    pub chord_index: usize,
    pub bar: u32,
    /// Offset within the bar
    pub position: Rational,
    /// `None` for a note no voice could be found for
    pub voice: Option<usize>,
    /// Semitone distance to the pitch the voice was compared against
    pub cost: u32,
    pub category: MismatchCategory,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_label_bits() {
        let mut label = VoiceLabel::one_hot(4, 2);
        assert_eq!(label.as_slice(), &[0.0, 0.0, 1.0, 0.0]);
        label.set(0);
        assert_eq!(label.voices(), vec![0, 2]);
        label.clear(2);
        assert_eq!(label.count(), 1);
        label.set(7);
        assert_eq!(label.count(), 1);
    }

    #[test]
    fn test_category_serializes_as_integer() {
        let json = serde_json::to_string(&MismatchCategory::Ficta).unwrap();
        assert_eq!(json, "2");
    }

    #[test]
    fn test_assignment_serialization() {
        let json = serde_json::to_string(&Assignment::Assigned(VoiceLabel::one_hot(2, 1))).unwrap();
        assert_eq!(json, r#"{"state":"assigned","label":[0.0,1.0]}"#);
        let json = serde_json::to_string(&Assignment::Unmatched).unwrap();
        assert_eq!(json, r#"{"state":"unmatched"}"#);
    }
}
