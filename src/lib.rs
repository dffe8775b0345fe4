//! Lute tablature voice mapping WASM Module
//!
//! Aligns a tablature encoding with a voice-separated transcription of the
//! same piece and assigns every tablature note to a transcription voice,
//! classifying each note that does not match directly.

pub mod api;
pub mod config;
pub mod mapping;
pub mod models;
pub mod rational;
pub mod report;
pub mod stats;

// Re-export commonly used types
pub use config::{ConfigError, DurationMode, MappingConfig, OrnamentDirection};
pub use mapping::{map_piece, Assignment, MappingError, MappingResult, MismatchCategory, VoiceLabel};
pub use models::{KeyInfo, MeterInfo, Mode, TabNote, Tablature, TransNote, Transcription};
pub use rational::Rational;
pub use stats::{CorpusStatistics, MismatchIndex, PieceStatistics};

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    // a second init (module re-instantiated) keeps the existing logger
    #[cfg(feature = "console_log")]
    let _ = console_log::init_with_level(log::Level::Debug);

    log::info!("Tablature voice mapping WASM module initialized");
}
