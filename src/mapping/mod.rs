//! Voice mapping of tablature onto a transcription
//!
//! Each tablature note is given the transcription voice (or voices) it
//! realises, and every note whose voice could not be read straight off the
//! transcription is recorded as a mismatch with its likely cause.

pub mod chord;
pub mod combinations;
pub mod context;
pub mod errors;
pub mod grid;
pub mod mapper;
pub mod ornaments;
pub mod orphans;
pub mod types;

// Re-export commonly used types
pub use chord::{match_chord, ChordMatch, MatchCase};
pub use errors::{MappingError, Result};
pub use grid::{build_grid, ChordSlot, Grid, Mask, MaskRow};
pub use mapper::{map_piece, MappedNote, MappingResult};
pub use orphans::cheapest_mapping;
pub use types::{Assignment, MismatchCategory, MismatchRecord, VoiceLabel};
