//! Tablature voice mapping WASM API
//!
//! # Module Structure
//!
//! - `helpers`: console logging macros, serialization, error conversion and
//!   the corpus accumulator
//! - `mapping`: piece mapping, reports, configuration parsing and corpus
//!   statistics

pub mod helpers;
pub mod mapping;

pub use mapping::{
    corpus_statistics, map_piece_js, map_piece_json, mapping_csv, mapping_report, parse_mapping_config,
    reset_corpus, run, MappingOutput, PieceInput,
};
