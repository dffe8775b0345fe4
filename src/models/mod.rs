//! Input models for the voice mapper
//!
//! These types stand in for the tablature and transcription collaborators:
//! parsing of the source encodings happens elsewhere, and the mapper only
//! sees pitches, onsets, durations, meters and keys.

pub mod key;
pub mod meter;
pub mod spelling;
pub mod tablature;
pub mod transcription;

// Re-export commonly used types
pub use key::{KeyInfo, Mode};
pub use meter::{MeterInfo, MetricPosition};
pub use spelling::{Letter, SpelledPitch, SpellingGrid};
pub use tablature::{TabNote, Tablature, MAX_COURSES};
pub use transcription::{TransNote, Transcription, MAX_VOICES};
