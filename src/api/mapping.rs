//! Voice mapping operations for the WASM API
//!
//! JavaScript passes one piece as
//! `{ tablature, transcription, config? }` (camelCase, rationals as
//! `[numerator, denominator]`) and gets back the mapping result, a text
//! report or a CSV mismatch list. Pieces mapped through `mapPiece` and
//! `mapPieceJson` are also added to the module's corpus statistics; the
//! report and CSV views leave the corpus alone.

use crate::api::helpers::{deserialize, js_error, lock_corpus, serialize};
use crate::config::MappingConfig;
use crate::mapping::{map_piece, Assignment, MappingError, MappingResult, VoiceLabel};
use crate::models::{Tablature, Transcription};
use crate::stats::{CorpusStatistics, MismatchIndex, PieceStatistics};
use crate::{wasm_info, wasm_log, wasm_warn};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

/// One piece to map
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PieceInput {
    pub tablature: Tablature,
    pub transcription: Transcription,
    #[serde(default)]
    pub config: MappingConfig,
}

/// Mapping result with the derived views the exporters need
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingOutput {
    pub result: MappingResult,
    pub voice_labels: Vec<Option<VoiceLabel>>,
    pub mismatch_index: MismatchIndex,
}

/// Corpus statistics with the derived ratios spelled out
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusSummary {
    pub pieces: usize,
    pub pooled: PieceStatistics,
    pub mean_strict: f64,
    pub mean_lenient_1: f64,
    pub mean_lenient_2: f64,
    pub pooled_strict: f64,
    pub pooled_lenient_1: f64,
    pub pooled_lenient_2: f64,
}

impl From<&CorpusStatistics> for CorpusSummary {
    fn from(corpus: &CorpusStatistics) -> Self {
        Self {
            pieces: corpus.pieces,
            pooled: corpus.pooled,
            mean_strict: corpus.mean_strict(),
            mean_lenient_1: corpus.mean_lenient_1(),
            mean_lenient_2: corpus.mean_lenient_2(),
            pooled_strict: corpus.pooled.strict(),
            pooled_lenient_1: corpus.pooled.lenient_1(),
            pooled_lenient_2: corpus.pooled.lenient_2(),
        }
    }
}

/// Map one piece (no JS involved)
pub fn run(input: &PieceInput) -> Result<MappingOutput, MappingError> {
    let result = map_piece(&input.tablature, &input.transcription, &input.config)?;
    Ok(MappingOutput {
        voice_labels: result.voice_labels(),
        mismatch_index: result.mismatch_index(),
        result,
    })
}

fn run_js(input: &PieceInput) -> Result<MappingOutput, JsValue> {
    wasm_log!(
        "  {} tablature notes, {} voices",
        input.tablature.notes.len(),
        input.transcription.num_voices()
    );
    let output = run(input).map_err(|e| js_error(format!("Mapping error: {}", e)))?;
    let unmatched = output
        .result
        .notes
        .iter()
        .filter(|n| n.assignment == Assignment::Unmatched)
        .count();
    if unmatched > 0 {
        wasm_warn!("  {} notes left without a voice", unmatched);
    }
    wasm_info!(
        "  {} mismatches, strict {:.3}",
        output.result.statistics.mismatches,
        output.result.statistics.strict()
    );
    Ok(output)
}

/// Map a piece and add it to the corpus statistics
fn run_and_accumulate(input: &PieceInput) -> Result<MappingOutput, JsValue> {
    let output = run_js(input)?;
    lock_corpus()?.add(&output.result.statistics);
    Ok(output)
}

// ============================================================================
// Mapping
// ============================================================================

/// Map a piece given as a JS object
#[wasm_bindgen(js_name = mapPiece)]
pub fn map_piece_js(input: JsValue) -> Result<JsValue, JsValue> {
    wasm_info!("mapPiece called");
    let input: PieceInput = deserialize(input, "Invalid piece input")?;
    let output = run_and_accumulate(&input)?;
    serialize(&output, "Failed to serialize mapping result")
}

/// Map a piece given as a JSON string; returns JSON
#[wasm_bindgen(js_name = mapPieceJson)]
pub fn map_piece_json(input: &str) -> Result<String, JsValue> {
    wasm_info!("mapPieceJson called ({} bytes)", input.len());
    let input: PieceInput =
        serde_json::from_str(input).map_err(|e| js_error(format!("Invalid piece input: {}", e)))?;
    let output = run_and_accumulate(&input)?;
    serde_json::to_string(&output).map_err(|e| js_error(format!("Failed to serialize mapping result: {}", e)))
}

// ============================================================================
// Reports
// ============================================================================

/// Per-chord text report of a piece
#[wasm_bindgen(js_name = mappingReport)]
pub fn mapping_report(input: JsValue) -> Result<String, JsValue> {
    wasm_info!("mappingReport called");
    let input: PieceInput = deserialize(input, "Invalid piece input")?;
    Ok(run_js(&input)?.result.report())
}

/// CSV list of the mismatches of a piece
#[wasm_bindgen(js_name = mappingCsv)]
pub fn mapping_csv(input: JsValue) -> Result<String, JsValue> {
    wasm_info!("mappingCsv called");
    let input: PieceInput = deserialize(input, "Invalid piece input")?;
    Ok(run_js(&input)?.result.to_csv())
}

// ============================================================================
// Configuration and corpus
// ============================================================================

/// Parse a YAML (or JSON) configuration document into a config object
#[wasm_bindgen(js_name = parseMappingConfig)]
pub fn parse_mapping_config(source: &str) -> Result<JsValue, JsValue> {
    let config = MappingConfig::from_yaml(source).map_err(|e| js_error(e.to_string()))?;
    serialize(&config, "Failed to serialize configuration")
}

/// Statistics over every piece mapped so far
#[wasm_bindgen(js_name = corpusStatistics)]
pub fn corpus_statistics() -> Result<JsValue, JsValue> {
    let corpus = lock_corpus()?;
    serialize(&CorpusSummary::from(&*corpus), "Failed to serialize corpus statistics")
}

#[wasm_bindgen(js_name = resetCorpus)]
pub fn reset_corpus() -> Result<(), JsValue> {
    *lock_corpus()? = CorpusStatistics::new();
    wasm_info!("corpus statistics reset");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIECE: &str = r#"{
        "tablature": {
            "notes": [
                {"pitch": 60, "onset": [0, 1], "minDuration": [1, 2], "chordSeq": 0, "chordSize": 3},
                {"pitch": 64, "onset": [0, 1], "minDuration": [1, 2], "chordSeq": 0, "chordSize": 3},
                {"pitch": 67, "onset": [0, 1], "minDuration": [1, 2], "chordSeq": 0, "chordSize": 3}
            ],
            "meters": [{"numerator": 4, "denominator": 4, "firstBar": 1, "lastBar": 8}]
        },
        "transcription": {
            "voices": [
                [{"pitch": 67, "onset": [0, 1], "duration": [1, 2]}],
                [{"pitch": 64, "onset": [0, 1], "duration": [1, 2]}],
                [{"pitch": 60, "onset": [0, 1], "duration": [1, 2]}],
                []
            ]
        }
    }"#;

    #[test]
    fn test_run_from_json_input() {
        let input: PieceInput = serde_json::from_str(PIECE).unwrap();
        assert_eq!(input.config, MappingConfig::default());
        let output = run(&input).unwrap();
        let voices: Vec<Vec<usize>> = output
            .voice_labels
            .iter()
            .map(|l| l.as_ref().unwrap().voices())
            .collect();
        assert_eq!(voices, vec![vec![2], vec![1], vec![0]]);
        assert!(output.mismatch_index.other.is_empty());
    }

    #[test]
    fn test_run_rejects_empty_transcription() {
        let mut input: PieceInput = serde_json::from_str(PIECE).unwrap();
        input.transcription.voices.clear();
        assert_eq!(run(&input).unwrap_err(), MappingError::NoVoices);
    }
}
