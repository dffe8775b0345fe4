//! Error types for voice mapping
//!
//! Musical anomalies are not errors: they become mismatch records. Errors
//! are reserved for input the mapper cannot work with at all and for
//! internal states that point at an unmodeled musical case.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MappingError {
    /// The transcription has no voices
    #[error("transcription has no voices")]
    NoVoices,

    /// More voices than the mapper supports
    #[error("transcription has {0} voices (at most {max} supported)", max = crate::models::MAX_VOICES)]
    TooManyVoices(usize),

    /// Grid unit must be a positive fraction
    #[error("invalid grid unit: {0}")]
    InvalidGridUnit(String),

    /// Internal state that should be unreachable (abort the piece)
    #[error("invariant violated at bar {bar}, onset {onset}: {context}")]
    Invariant {
        bar: u32,
        onset: String,
        context: String,
    },
}

pub type Result<T> = std::result::Result<T, MappingError>;
