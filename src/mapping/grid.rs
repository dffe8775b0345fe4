//! Grid builder: one onset-aligned row per distinct onset
//!
//! The transcription and the tablature each have their own onset timeline.
//! Both are merged into a single sequence of rows keyed by the onset
//! rounded to the smallest rhythmic unit:
//!
//! ```text
//! Transcription voices ─┐                 ┌─→ Grid (per-voice pitch/duration)
//!                       ├─→ rounded keys ─┤
//! Tablature chords ─────┘                 └─→ Mask (tab pitches/durations/indices)
//! ```
//!
//! Transcription onsets that are not a multiple of the unit (tied or
//! triplet values) are snapped first. Rows are merged by rounded key, never
//! by exact onset, so an imprecise triplet encoding on one side still lands
//! on the same row as the other side. When both sides contribute to a row,
//! the transcription onset is the one kept.

use crate::mapping::errors::{MappingError, Result};
use crate::models::{Tablature, Transcription, MAX_COURSES, MAX_VOICES};
use crate::rational::{find_closest_multiple, onset_key, Rational};
use serde::Serialize;
use std::collections::BTreeMap;

/// Transcription side of one grid row, indexed by voice (0 = highest)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChordSlot {
    pub bar: u32,
    pub position: Rational,
    pub onset: Rational,
    /// Onset as a count of grid units
    pub key: i64,
    pub pitches: Vec<Option<u8>>,
    pub durations: Vec<Option<Rational>>,
}

impl ChordSlot {
    pub fn num_voices(&self) -> usize {
        self.pitches.len()
    }

    /// Sounding pitches from the lowest voice up as `(column, voice, pitch)`
    ///
    /// Column `j` belongs to voice `num_voices - 1 - j`.
    pub fn columns(&self) -> impl Iterator<Item = (usize, usize, u8)> + '_ {
        let n = self.pitches.len();
        (0..n).filter_map(move |j| {
            let voice = n - 1 - j;
            self.pitches[voice].map(|pitch| (j, voice, pitch))
        })
    }

    /// True when no transcription note starts at this row
    pub fn is_silent(&self) -> bool {
        self.pitches.iter().all(Option::is_none)
    }

    pub fn pitch_in_voice(&self, voice: usize) -> Option<u8> {
        self.pitches.get(voice).copied().flatten()
    }
}

/// Tablature side of one grid row, pitches ordered low to high
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaskRow {
    pub bar: u32,
    pub position: Rational,
    pub onset: Rational,
    pub key: i64,
    pub pitches: Vec<u8>,
    pub durations: Vec<Rational>,
    /// Index of each pitch in the tablature's note list
    pub indices: Vec<usize>,
}

impl MaskRow {
    pub fn is_empty(&self) -> bool {
        self.pitches.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pitches.len()
    }
}

/// Time-ordered `(key, pitch)` list of one transcription voice
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoiceTimeline {
    entries: Vec<(i64, u8)>,
}

impl VoiceTimeline {
    /// Pitch of the note immediately before `key`
    pub fn last_before(&self, key: i64) -> Option<u8> {
        let idx = self.entries.partition_point(|&(k, _)| k < key);
        idx.checked_sub(1).map(|i| self.entries[i].1)
    }

    /// Pitch of the first note at or after `key`
    pub fn first_from(&self, key: i64) -> Option<u8> {
        let idx = self.entries.partition_point(|&(k, _)| k < key);
        self.entries.get(idx).map(|&(_, pitch)| pitch)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub slots: Vec<ChordSlot>,
    pub num_voices: usize,
    pub unit: Rational,
    timelines: Vec<VoiceTimeline>,
}

impl Grid {
    pub fn timeline(&self, voice: usize) -> Option<&VoiceTimeline> {
        self.timelines.get(voice)
    }

    /// Comparator pitch for a voice at `key`: its previous note, or its
    /// first note from `key` on when the voice has not started yet
    pub fn reference_pitch(&self, voice: usize, key: i64) -> Option<u8> {
        let timeline = self.timeline(voice)?;
        timeline.last_before(key).or_else(|| timeline.first_from(key))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    pub rows: Vec<MaskRow>,
}

/// Transcription onset snapped onto the grid
fn snapped_onset(onset: Rational, unit: Rational) -> Rational {
    if (onset / unit).is_integer() {
        onset
    } else {
        find_closest_multiple(onset, unit)
    }
}

/// Build the onset-aligned Grid and Mask for one piece
pub fn build_grid(tab: &Tablature, trans: &Transcription, unit: Rational) -> Result<(Grid, Mask)> {
    let num_voices = trans.num_voices();
    if num_voices == 0 {
        return Err(MappingError::NoVoices);
    }
    if num_voices > MAX_VOICES {
        return Err(MappingError::TooManyVoices(num_voices));
    }
    if unit <= Rational::from_integer(0) {
        return Err(MappingError::InvalidGridUnit(unit.to_string()));
    }

    // 1-3. Transcription onsets first so they win the merge, then the
    // tablature onsets not already present; BTreeMap keeps rows sorted.
    let mut onsets: BTreeMap<i64, Rational> = BTreeMap::new();
    for voice in &trans.voices {
        for note in voice {
            let onset = snapped_onset(note.onset, unit);
            onsets.entry(onset_key(onset, unit)).or_insert(onset);
        }
    }
    for note in &tab.notes {
        onsets.entry(onset_key(note.onset, unit)).or_insert(note.onset);
    }

    // 4. Row skeletons
    let mut row_of: BTreeMap<i64, usize> = BTreeMap::new();
    let mut slots = Vec::with_capacity(onsets.len());
    let mut rows = Vec::with_capacity(onsets.len());
    for (row, (&key, &onset)) in onsets.iter().enumerate() {
        let mp = tab.metric_position(onset);
        row_of.insert(key, row);
        slots.push(ChordSlot {
            bar: mp.bar,
            position: mp.position,
            onset,
            key,
            pitches: vec![None; num_voices],
            durations: vec![None; num_voices],
        });
        rows.push(MaskRow {
            bar: mp.bar,
            position: mp.position,
            onset,
            key,
            pitches: Vec::new(),
            durations: Vec::new(),
            indices: Vec::new(),
        });
    }

    // 5a. Transcription columns
    let mut timelines = Vec::with_capacity(num_voices);
    for (voice, notes) in trans.voices.iter().enumerate() {
        let mut entries = Vec::with_capacity(notes.len());
        for note in notes {
            let key = onset_key(snapped_onset(note.onset, unit), unit);
            let Some(&row) = row_of.get(&key) else {
                continue;
            };
            let slot = &mut slots[row];
            if slot.pitches[voice].is_some() {
                log::warn!(
                    "voice {} has two notes on grid row {} (bar {}); keeping the later one",
                    voice, row, slot.bar
                );
            }
            slot.pitches[voice] = Some(note.pitch);
            slot.durations[voice] = Some(note.duration);
            entries.push((key, note.pitch));
        }
        entries.sort_by_key(|&(key, _)| key);
        timelines.push(VoiceTimeline { entries });
    }

    // 5b. Tablature rows, grouped by onset and ordered low to high
    for (index, note) in tab.notes.iter().enumerate() {
        let key = onset_key(note.onset, unit);
        let Some(&row) = row_of.get(&key) else {
            continue;
        };
        let mask_row = &mut rows[row];
        mask_row.pitches.push(note.pitch);
        mask_row.durations.push(note.min_duration);
        mask_row.indices.push(index);
    }
    for row in rows.iter_mut().filter(|r| r.len() > 1) {
        let mut order: Vec<usize> = (0..row.len()).collect();
        order.sort_by_key(|&i| row.pitches[i]);
        row.pitches = order.iter().map(|&i| row.pitches[i]).collect();
        row.durations = order.iter().map(|&i| row.durations[i]).collect();
        row.indices = order.iter().map(|&i| row.indices[i]).collect();
        if row.len() > MAX_COURSES {
            log::warn!("bar {}: tablature chord with {} notes exceeds {} courses", row.bar, row.len(), MAX_COURSES);
        }
    }

    log::debug!(
        "grid built: {} rows, {} voices, {} tablature notes",
        slots.len(),
        num_voices,
        tab.notes.len()
    );

    Ok((
        Grid { slots, num_voices, unit, timelines },
        Mask { rows },
    ))
}
