//! Match statistics per piece and over a corpus
//!
//! Three match rates are derived from the mismatch counts:
//!
//! | ratio      | counted against the piece                      |
//! |------------|------------------------------------------------|
//! | strict     | every mismatch                                 |
//! | lenient_1  | "other" only (the three musical causes forgiven) |
//! | lenient_2  | "other" only, over the notes not forgiven      |

use crate::mapping::types::{MismatchCategory, MismatchRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Tablature note indices bucketed by mismatch category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MismatchIndex {
    pub ornamentation: Vec<usize>,
    pub repetition: Vec<usize>,
    pub ficta: Vec<usize>,
    pub other: Vec<usize>,
}

impl MismatchIndex {
    /// Sorted, de-duplicated indices per category
    pub fn from_records(records: &[MismatchRecord]) -> Self {
        let mut buckets: [BTreeSet<usize>; 4] = Default::default();
        for record in records {
            buckets[record.category as usize].insert(record.tab_index);
        }
        let [ornamentation, repetition, ficta, other] = buckets.map(|b| b.into_iter().collect::<Vec<usize>>());
        Self { ornamentation, repetition, ficta, other }
    }

    pub fn get(&self, category: MismatchCategory) -> &[usize] {
        match category {
            MismatchCategory::Ornamentation => &self.ornamentation,
            MismatchCategory::Repetition => &self.repetition,
            MismatchCategory::Ficta => &self.ficta,
            MismatchCategory::Other => &self.other,
        }
    }

    /// Distinct notes with at least one mismatch
    pub fn mismatched_notes(&self) -> usize {
        MismatchCategory::ALL
            .iter()
            .flat_map(|&c| self.get(c).iter().copied())
            .collect::<BTreeSet<_>>()
            .len()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PieceStatistics {
    pub total_notes: usize,
    /// Distinct notes with any mismatch
    pub mismatches: usize,
    pub ornamentation: usize,
    pub repetition: usize,
    pub ficta: usize,
    pub other: usize,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        1.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl PieceStatistics {
    /// Counts for a piece of `total_notes` notes; a note counts once per category
    pub fn from_records(total_notes: usize, records: &[MismatchRecord]) -> Self {
        let index = MismatchIndex::from_records(records);
        Self {
            total_notes,
            mismatches: index.mismatched_notes(),
            ornamentation: index.ornamentation.len(),
            repetition: index.repetition.len(),
            ficta: index.ficta.len(),
            other: index.other.len(),
        }
    }

    pub fn count(&self, category: MismatchCategory) -> usize {
        match category {
            MismatchCategory::Ornamentation => self.ornamentation,
            MismatchCategory::Repetition => self.repetition,
            MismatchCategory::Ficta => self.ficta,
            MismatchCategory::Other => self.other,
        }
    }

    fn forgiven(&self) -> usize {
        self.ornamentation + self.repetition + self.ficta
    }

    pub fn strict(&self) -> f64 {
        ratio(self.total_notes.saturating_sub(self.mismatches), self.total_notes)
    }

    pub fn lenient_1(&self) -> f64 {
        ratio(self.total_notes.saturating_sub(self.other), self.total_notes)
    }

    pub fn lenient_2(&self) -> f64 {
        let considered = self.total_notes.saturating_sub(self.forgiven());
        ratio(considered.saturating_sub(self.other), considered)
    }

    fn add_counts(&mut self, other: &PieceStatistics) {
        self.total_notes += other.total_notes;
        self.mismatches += other.mismatches;
        self.ornamentation += other.ornamentation;
        self.repetition += other.repetition;
        self.ficta += other.ficta;
        self.other += other.other;
    }
}

/// Running sums over many pieces
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusStatistics {
    pub pieces: usize,
    /// Counts summed over all pieces
    pub pooled: PieceStatistics,
    strict_sum: f64,
    lenient_1_sum: f64,
    lenient_2_sum: f64,
}

impl CorpusStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, piece: &PieceStatistics) {
        self.pieces += 1;
        self.pooled.add_counts(piece);
        self.strict_sum += piece.strict();
        self.lenient_1_sum += piece.lenient_1();
        self.lenient_2_sum += piece.lenient_2();
    }

    /// Combine partial sums, e.g. from pieces mapped in parallel
    pub fn merge(&mut self, other: &CorpusStatistics) {
        self.pieces += other.pieces;
        self.pooled.add_counts(&other.pooled);
        self.strict_sum += other.strict_sum;
        self.lenient_1_sum += other.lenient_1_sum;
        self.lenient_2_sum += other.lenient_2_sum;
    }

    fn mean(&self, sum: f64) -> f64 {
        if self.pieces == 0 {
            1.0
        } else {
            sum / self.pieces as f64
        }
    }

    pub fn mean_strict(&self) -> f64 {
        self.mean(self.strict_sum)
    }

    pub fn mean_lenient_1(&self) -> f64 {
        self.mean(self.lenient_1_sum)
    }

    pub fn mean_lenient_2(&self) -> f64 {
        self.mean(self.lenient_2_sum)
    }
}
