//! Chord matcher: tablature chord against one grid row
//!
//! Every tablature pitch is compared with every sounding transcription
//! pitch of the row. A candidate pair exists when the pitches are equal or
//! ficta equivalents. How a candidate is treated depends on how often the
//! pitch occurs on each side:
//!
//! | tab | GT | case            |
//! |-----|----|-----------------|
//! | 1   | 0  | Unmapped        |
//! | 1   | 1  | Simple          |
//! | 1   | 2  | Snu             |
//! | 1   | >2 | ExtendedSnu     |
//! | ≥2  | 0  | UnmappedUnison  |
//! | ≥2  | 1  | HalfUnison      |
//! | ≥2  | ≤tab | MappedUnison  |
//! | ≥2  | >tab | ExtendedUnison |
//!
//! Pitches left without a voice are handed to the orphan resolver.

use crate::mapping::grid::{ChordSlot, MaskRow};
use crate::mapping::types::VoiceLabel;
use crate::models::{MeterInfo, SpellingGrid};
use crate::rational::Rational;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchCase {
    Unmapped,
    Simple,
    Snu,
    ExtendedSnu,
    UnmappedUnison,
    HalfUnison,
    MappedUnison,
    ExtendedUnison,
}

impl MatchCase {
    /// Classify by occurrences in the tablature chord and the GT chord
    pub fn classify(freq_in_tab: usize, freq_in_gt: usize) -> Self {
        match (freq_in_tab, freq_in_gt) {
            (0 | 1, 0) => MatchCase::Unmapped,
            (_, 0) => MatchCase::UnmappedUnison,
            (0 | 1, 1) => MatchCase::Simple,
            (0 | 1, 2) => MatchCase::Snu,
            (0 | 1, _) => MatchCase::ExtendedSnu,
            (_, 1) => MatchCase::HalfUnison,
            (t, g) if g <= t => MatchCase::MappedUnison,
            _ => MatchCase::ExtendedUnison,
        }
    }

    fn handler(self) -> Handler {
        match self {
            MatchCase::Unmapped | MatchCase::UnmappedUnison => defer,
            MatchCase::Simple | MatchCase::ExtendedSnu => map_voice,
            MatchCase::Snu => map_snu,
            MatchCase::HalfUnison => map_half_unison,
            MatchCase::MappedUnison => map_unison,
            MatchCase::ExtendedUnison => map_extended_unison,
        }
    }
}

/// One (tab pitch, GT voice) candidate pair
#[derive(Debug, Clone, Copy)]
struct Candidate {
    voice: usize,
    /// Occurrence rank of the pitch among equal tab pitches
    tab_rank: usize,
    freq_in_tab: usize,
    /// Occurrence rank of the GT pitch, lowest column first
    gt_rank: usize,
}

/// Per-chord facts a handler may consult
struct MatchState<'a> {
    /// Tab chord smaller than the voice count
    room: bool,
    mapped: &'a BTreeSet<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    Map,
    Skip,
    NonMappedSnu,
}

type Handler = fn(&Candidate, &MatchState) -> Decision;

fn defer(_: &Candidate, _: &MatchState) -> Decision {
    Decision::Skip
}

fn map_voice(_: &Candidate, _: &MatchState) -> Decision {
    Decision::Map
}

fn map_snu(c: &Candidate, state: &MatchState) -> Decision {
    if state.room || c.gt_rank == 0 {
        Decision::Map
    } else {
        Decision::NonMappedSnu
    }
}

fn map_half_unison(c: &Candidate, state: &MatchState) -> Decision {
    if state.mapped.contains(&c.voice) {
        Decision::Skip
    } else {
        Decision::Map
    }
}

fn map_unison(c: &Candidate, _: &MatchState) -> Decision {
    if c.tab_rank == c.gt_rank {
        Decision::Map
    } else {
        Decision::Skip
    }
}

fn map_extended_unison(c: &Candidate, _: &MatchState) -> Decision {
    let last_tab = c.tab_rank + 1 == c.freq_in_tab;
    if c.tab_rank == c.gt_rank || (last_tab && c.gt_rank > c.tab_rank) {
        Decision::Map
    } else {
        Decision::Skip
    }
}

/// A tab pitch matched to a GT pitch of different spelling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FictaMatch {
    pub position: usize,
    pub pitch: u8,
    pub gt_pitch: u8,
    pub voice: usize,
}

/// Result of matching one tablature chord
#[derive(Debug, Clone, PartialEq)]
pub struct ChordMatch {
    /// Tab pitches, low to high
    pub pitches: Vec<u8>,
    /// One label per tab pitch; `None` while unmatched
    pub labels: Vec<Option<VoiceLabel>>,
    /// `(pitch, position)` of every pitch without a voice
    pub unmatched: Vec<(u8, usize)>,
    /// Voices that received a pitch in this chord
    pub mapped_voices: BTreeSet<usize>,
    pub ficta: Vec<FictaMatch>,
    /// `(pitch, position)` of SNU pitches that could take only one voice
    pub non_mapped_snu: Vec<(u8, usize)>,
    /// Positions whose label covers more than two voices
    pub extended_snu: Vec<usize>,
}

impl ChordMatch {
    /// Tab pitch sounding in `voice`, if any
    pub fn pitch_in_voice(&self, voice: usize) -> Option<u8> {
        self.labels
            .iter()
            .zip(&self.pitches)
            .find(|(label, _)| label.as_ref().is_some_and(|l| l.has(voice)))
            .map(|(_, &pitch)| pitch)
    }
}

/// Match a low-to-high tab chord against one grid row
pub fn match_chord(pitches: &[u8], slot: &ChordSlot, spelling: &SpellingGrid) -> ChordMatch {
    let num_voices = slot.num_voices();
    let columns: Vec<(usize, usize, u8)> = slot.columns().collect();
    let room = pitches.len() < num_voices;

    let mut result = ChordMatch {
        pitches: pitches.to_vec(),
        labels: Vec::with_capacity(pitches.len()),
        unmatched: Vec::new(),
        mapped_voices: BTreeSet::new(),
        ficta: Vec::new(),
        non_mapped_snu: Vec::new(),
        extended_snu: Vec::new(),
    };

    for (position, &pitch) in pitches.iter().enumerate() {
        let freq_in_tab = pitches.iter().filter(|&&p| p == pitch).count();
        let tab_rank = pitches[..position].iter().filter(|&&p| p == pitch).count();

        // Exact matches win; ficta is only considered without one
        let exact = columns.iter().any(|&(_, _, g)| g == pitch);
        let candidates = columns.iter().filter(|&&(_, _, g)| {
            if exact {
                g == pitch
            } else {
                spelling.is_ficta_equivalent(pitch, g)
            }
        });

        let mut label = VoiceLabel::empty(num_voices);
        for &(column, voice, gt_pitch) in candidates {
            let freq_in_gt = columns.iter().filter(|&&(_, _, g)| g == gt_pitch).count();
            let gt_rank = columns[..column]
                .iter()
                .filter(|&&(_, _, g)| g == gt_pitch)
                .count();
            let candidate = Candidate { voice, tab_rank, freq_in_tab, gt_rank };
            let case = MatchCase::classify(freq_in_tab, freq_in_gt);
            let state = MatchState { room, mapped: &result.mapped_voices };

            match (case.handler())(&candidate, &state) {
                Decision::Map => {
                    label.set(voice);
                    result.mapped_voices.insert(voice);
                    if !exact {
                        result.ficta.push(FictaMatch { position, pitch, gt_pitch, voice });
                    }
                }
                Decision::NonMappedSnu => {
                    if !result.non_mapped_snu.iter().any(|&(_, p)| p == position) {
                        result.non_mapped_snu.push((pitch, position));
                    }
                }
                Decision::Skip => {}
            }
        }

        if label.is_empty() {
            result.unmatched.push((pitch, position));
            result.labels.push(None);
        } else {
            if label.count() > 2 {
                result.extended_snu.push(position);
            }
            result.labels.push(Some(label));
        }
    }

    result
}

/// Longest duration an ornamental note may have under `meter`
///
/// Half a minim in 2/2, scaled with the meter denominator.
pub fn ornament_threshold(meter: &MeterInfo) -> Rational {
    Rational::new(1, 2 * i64::from(meter.denominator.max(1)))
}

/// A single short tab note where the transcription is silent
pub fn is_ornamental(row: &MaskRow, slot: &ChordSlot, threshold: Rational) -> bool {
    row.len() == 1 && row.durations[0] <= threshold && slot.is_silent()
}
