//! Piece mapper: drives the grid, chord matcher, orphan resolver and
//! ornamentation handler over one piece
//!
//! # Architecture
//!
//! ```text
//! Tablature ─┐
//!            ├─→ build_grid ─→ for each row with tablature notes:
//! Transcr. ──┘                   ornamental? ─→ buffer in the run
//!                                otherwise   ─→ match_chord
//!                                             ─→ resolve_orphans
//!                                             ─→ attach buffered run
//!                                             ─→ becomes the last chord
//!            ─→ durations ─→ statistics ─→ MappingResult
//! ```
//!
//! Rows are processed strictly in onset order: the orphan resolver and the
//! ornament runs both depend on the chord resolved just before.

use crate::config::{DurationMode, MappingConfig};
use crate::mapping::chord::{is_ornamental, match_chord, ornament_threshold};
use crate::mapping::context::{ResolutionContext, ResolvedChord};
use crate::mapping::errors::Result;
use crate::mapping::grid::{build_grid, ChordSlot, Grid, Mask, MaskRow};
use crate::mapping::ornaments::resolve_run;
use crate::mapping::orphans::{resolve_orphans, OrphanContext};
use crate::mapping::types::{Assignment, MismatchCategory, MismatchRecord, VoiceLabel};
use crate::models::{SpellingGrid, Tablature, Transcription};
use crate::rational::Rational;
use crate::stats::{MismatchIndex, PieceStatistics};
use serde::{Deserialize, Serialize};

/// One tablature note with its mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappedNote {
    /// Index into the tablature's note list
    pub index: usize,
    pub pitch: u8,
    pub onset: Rational,
    pub bar: u32,
    pub position: Rational,
    pub chord_index: usize,
    pub duration: Rational,
    pub assignment: Assignment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingResult {
    pub num_voices: usize,
    pub notes: Vec<MappedNote>,
    /// Sorted by tablature index
    pub mismatches: Vec<MismatchRecord>,
    pub statistics: PieceStatistics,
    pub include_ornamentation: bool,
}

impl MappingResult {
    /// Voice label per note; ornamental notes are left out when excluded
    pub fn voice_labels(&self) -> Vec<Option<VoiceLabel>> {
        self.notes
            .iter()
            .filter(|note| self.include_ornamentation || note.assignment != Assignment::Ornamental)
            .map(|note| note.assignment.label().cloned())
            .collect()
    }

    pub fn mismatch_index(&self) -> MismatchIndex {
        MismatchIndex::from_records(&self.mismatches)
    }
}

/// Bar and position of every tablature note, read from the mask
fn note_placement(tab: &Tablature, mask: &Mask) -> Vec<(u32, Rational)> {
    let mut placement = vec![(1, Rational::from_integer(0)); tab.notes.len()];
    for row in &mask.rows {
        for &index in &row.indices {
            if let Some(slot) = placement.get_mut(index) {
                *slot = (row.bar, row.position);
            }
        }
    }
    placement
}

struct PieceMapper<'a> {
    tab: &'a Tablature,
    trans: &'a Transcription,
    config: &'a MappingConfig,
    grid: &'a Grid,
    placement: Vec<(u32, Rational)>,
    ctx: ResolutionContext,
}

impl<'a> PieceMapper<'a> {
    fn record(&mut self, tab_index: usize, voice: Option<usize>, cost: u32, category: MismatchCategory) {
        let Some(note) = self.tab.notes.get(tab_index) else {
            return;
        };
        let (bar, position) = self.placement[tab_index];
        self.ctx.mismatches.push(MismatchRecord {
            tab_index,
            pitch: note.pitch,
            chord_index: note.chord_seq,
            bar,
            position,
            voice,
            cost,
            category,
        });
    }

    /// Match, resolve and label one non-ornamental chord
    fn resolve_chord(&mut self, row_index: usize, slot: &ChordSlot, row: &MaskRow) -> Result<ResolvedChord> {
        let spelling = SpellingGrid::for_key(&self.trans.key_at(slot.onset));
        let mut chord = match_chord(&row.pitches, slot, &spelling);

        for ficta in &chord.ficta {
            let cost = u32::from(ficta.pitch.abs_diff(ficta.gt_pitch));
            self.record(row.indices[ficta.position], Some(ficta.voice), cost, MismatchCategory::Ficta);
        }

        let tuplet = self.ctx.tuplet_predecessor(row.len(), row.onset).cloned();
        let orphan_ctx = OrphanContext {
            grid: self.grid,
            slot,
            tuplet: tuplet.as_ref(),
        };
        let resolution = resolve_orphans(&orphan_ctx, &mut chord)?;
        for assignment in &resolution.assignments {
            self.record(
                row.indices[assignment.position],
                Some(assignment.voice),
                assignment.cost,
                assignment.category,
            );
        }

        if !chord.unmatched.is_empty() {
            log::warn!(
                "bar {}: {} tablature pitches left without a voice",
                row.bar,
                chord.unmatched.len()
            );
        }

        let mut voiced = Vec::new();
        for (position, label) in chord.labels.iter().enumerate() {
            let index = row.indices[position];
            self.ctx.assignments[index] = match label {
                Some(label) => {
                    voiced.extend(label.voices().into_iter().map(|v| (row.pitches[position], v)));
                    Assignment::Assigned(label.clone())
                }
                None => Assignment::Unmatched,
            };
        }

        Ok(ResolvedChord {
            row: row_index,
            onset: row.onset,
            size: row.len(),
            orphan_count: resolution.assignments.len() + chord.unmatched.len(),
            voiced,
        })
    }

    /// Every note still without a voice counts as an "other" mismatch
    fn record_unmatched(&mut self) {
        let unmatched: Vec<usize> = (0..self.ctx.assignments.len())
            .filter(|&i| self.ctx.assignments[i] == Assignment::Unmatched)
            .collect();
        if !unmatched.is_empty() {
            log::warn!("{} tablature notes left without a voice", unmatched.len());
        }
        for index in unmatched {
            self.record(index, None, 0, MismatchCategory::Other);
        }
    }

    /// Give the buffered ornamental run a voice between `following` and the last chord
    fn attach_ornaments(&mut self, following: Option<&ResolvedChord>) {
        let run = self.ctx.take_ornament_run();
        if run.is_empty() || !self.config.include_ornamentation {
            return;
        }
        let pitches: Vec<u8> = run.iter().map(|&i| self.tab.notes[i].pitch).collect();
        let preceding = self.ctx.last_chord.clone();

        let Some(resolved) = resolve_run(&pitches, preceding.as_ref(), following, self.config.ornament_direction)
        else {
            log::warn!("ornamental run of {} notes has no neighbouring chord", run.len());
            for &index in &run {
                self.ctx.assignments[index] = Assignment::Unmatched;
            }
            return;
        };

        for (&index, &pitch) in run.iter().zip(&pitches) {
            let label = VoiceLabel::one_hot(self.grid.num_voices, resolved.voice);
            self.ctx.assignments[index] = Assignment::Assigned(label);
            let cost = u32::from(pitch.abs_diff(resolved.neighbour));
            self.record(index, Some(resolved.voice), cost, MismatchCategory::Ornamentation);
        }
    }
}

/// Map every tablature note of a piece onto the transcription's voices
pub fn map_piece(tab: &Tablature, trans: &Transcription, config: &MappingConfig) -> Result<MappingResult> {
    let (grid, mask) = build_grid(tab, trans, config.grid_unit)?;
    let mut mapper = PieceMapper {
        tab,
        trans,
        config,
        grid: &grid,
        placement: note_placement(tab, &mask),
        ctx: ResolutionContext::new(tab.notes.len()),
    };

    for (row_index, (slot, row)) in grid.slots.iter().zip(&mask.rows).enumerate() {
        if row.is_empty() {
            continue;
        }
        let threshold = ornament_threshold(&tab.meter_at(row.onset));
        if is_ornamental(row, slot, threshold) {
            mapper.ctx.buffer_ornament(row.indices[0]);
            continue;
        }

        let chord = mapper.resolve_chord(row_index, slot, row)?;
        mapper.attach_ornaments(Some(&chord));
        mapper.ctx.finish_chord(chord);
    }
    // a run at the end of the piece looks back
    mapper.attach_ornaments(None);
    mapper.record_unmatched();

    let ResolutionContext { assignments, mut mismatches, .. } = mapper.ctx;
    let placement = mapper.placement;
    mismatches.sort_by_key(|m| m.tab_index);

    let durations = note_durations(tab, &assignments, config.duration_mode);
    let notes: Vec<MappedNote> = tab
        .notes
        .iter()
        .zip(assignments)
        .zip(durations)
        .enumerate()
        .map(|(index, ((note, assignment), duration))| MappedNote {
            index,
            pitch: note.pitch,
            onset: note.onset,
            bar: placement[index].0,
            position: placement[index].1,
            chord_index: note.chord_seq,
            duration,
            assignment,
        })
        .collect();

    let total_notes = notes
        .iter()
        .filter(|n| config.include_ornamentation || n.assignment != Assignment::Ornamental)
        .count();
    let statistics = PieceStatistics::from_records(total_notes, &mismatches);

    log::debug!(
        "mapped {} notes onto {} voices: {} mismatches ({} other)",
        total_notes,
        grid.num_voices,
        statistics.mismatches,
        statistics.other
    );

    Ok(MappingResult {
        num_voices: grid.num_voices,
        notes,
        mismatches,
        statistics,
        include_ornamentation: config.include_ornamentation,
    })
}

/// Output duration of every note under `mode`
fn note_durations(tab: &Tablature, assignments: &[Assignment], mode: DurationMode) -> Vec<Rational> {
    let matched: Vec<Rational> = tab.notes.iter().map(|n| n.min_duration).collect();
    if mode == DurationMode::AsMatched {
        return matched;
    }

    // onsets of the notes in each voice, sorted
    let mut voice_onsets: Vec<Vec<Rational>> = Vec::new();
    for (note, assignment) in tab.notes.iter().zip(assignments) {
        let Some(label) = assignment.label() else {
            continue;
        };
        for voice in label.voices() {
            if voice_onsets.len() <= voice {
                voice_onsets.resize(voice + 1, Vec::new());
            }
            voice_onsets[voice].push(note.onset);
        }
    }
    for onsets in &mut voice_onsets {
        onsets.sort();
        onsets.dedup();
    }

    tab.notes
        .iter()
        .zip(assignments)
        .zip(matched)
        .map(|((note, assignment), min_duration)| {
            let Some(label) = assignment.label() else {
                return min_duration;
            };
            let mp = tab.metric_position(note.onset);
            let bar_end = note.onset - mp.position + tab.meter_at(note.onset).bar_length();
            let next = label
                .voices()
                .into_iter()
                .filter_map(|v| voice_onsets.get(v)?.iter().find(|&&o| o > note.onset).copied())
                .min();
            let end = next.map_or(bar_end, |n| n.min(bar_end));
            (end - note.onset).max(min_duration)
        })
        .collect()
}
