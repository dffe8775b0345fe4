//! Orphan resolver: voices for tablature pitches the chord matcher left open
//!
//! Each orphan goes to the voice whose previous pitch is closest, with the
//! total semitone distance over the chord minimised by exhaustive search:
//!
//! ```text
//! orphans ─→ candidate sets (subsets when there are more orphans than voices)
//!         ─→ every pairing of set onto available voices
//!         ─→ cheapest (ties: most zero-cost pairs, then first found)
//! ```
//!
//! The first pass only offers voices the chord matcher left empty; later
//! passes offer every voice. The number of passes follows the shape of the
//! chord (oversized chords, extended SNUs and fully mapped rows get a
//! second pass; very crowded chords a third). When orphans are still left
//! after the planned passes, further open passes run as long as they place
//! something.

use crate::mapping::chord::ChordMatch;
use crate::mapping::combinations::{combinations, pad, subsets};
use crate::mapping::context::ResolvedChord;
use crate::mapping::errors::{MappingError, Result};
use crate::mapping::grid::{ChordSlot, Grid};
use crate::mapping::types::{MismatchCategory, VoiceLabel};
use std::collections::BTreeSet;

/// One pitch placed by a cheapest mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappedPitch {
    pub voice: usize,
    /// Index into the candidate pitch list
    pub slot: usize,
    pub pitch: u8,
    pub cost: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheapestMapping {
    pub pairs: Vec<MappedPitch>,
    pub total_cost: u32,
    pub zero_cost: usize,
}

impl CheapestMapping {
    /// More pitches placed, then lower cost, then more exact repetitions
    fn beats(&self, other: &CheapestMapping) -> bool {
        if self.pairs.len() != other.pairs.len() {
            return self.pairs.len() > other.pairs.len();
        }
        self.total_cost < other.total_cost
            || (self.total_cost == other.total_cost && self.zero_cost > other.zero_cost)
    }
}

/// Cheapest pairing of `pitches` onto `available` `(voice, reference pitch)` slots
///
/// `pitches` is padded with `None` up to the number of voice slots.
pub fn cheapest_mapping(available: &[(usize, u8)], pitches: &[Option<u8>]) -> Option<CheapestMapping> {
    let n = available.len().max(pitches.len());
    let mut best: Option<CheapestMapping> = None;

    for pairing in combinations(n) {
        let mut pairs = Vec::new();
        let mut total_cost = 0;
        let mut zero_cost = 0;
        for (voice_slot, pitch_slot) in pairing {
            let (Some(&(voice, reference)), Some(&Some(pitch))) =
                (available.get(voice_slot), pitches.get(pitch_slot))
            else {
                continue;
            };
            let cost = u32::from(pitch.abs_diff(reference));
            total_cost += cost;
            if cost == 0 {
                zero_cost += 1;
            }
            pairs.push(MappedPitch { voice, slot: pitch_slot, pitch, cost });
        }
        if pairs.is_empty() {
            continue;
        }
        pairs.sort_by_key(|p| p.slot);
        let candidate = CheapestMapping { pairs, total_cost, zero_cost };
        if best.as_ref().map_or(true, |b| candidate.beats(b)) {
            best = Some(candidate);
        }
    }

    best
}

/// Planned number of resolver passes for a chord
pub fn iteration_count(
    chord_size: usize,
    num_voices: usize,
    has_extended_snu: bool,
    all_voices_mapped: bool,
    unmatched: usize,
) -> usize {
    let mut passes = if chord_size > num_voices || has_extended_snu || all_voices_mapped {
        2
    } else {
        1
    };
    if unmatched > 2 * num_voices {
        passes += 1;
    }
    passes
}

/// What the resolver needs to know besides the chord itself
pub struct OrphanContext<'a> {
    pub grid: &'a Grid,
    pub slot: &'a ChordSlot,
    /// Previous chord when this one continues its tuplet group
    pub tuplet: Option<&'a ResolvedChord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrphanAssignment {
    pub position: usize,
    pub pitch: u8,
    pub voice: usize,
    pub cost: u32,
    pub category: MismatchCategory,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrphanResolution {
    pub assignments: Vec<OrphanAssignment>,
    /// `(position, voice)` of downgraded SNUs that got their second voice back
    pub snu_corrections: Vec<(usize, usize)>,
    /// Passes actually run
    pub passes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Orphan {
    pitch: u8,
    position: usize,
    /// Downgraded SNU pitch looking for its second voice
    snu: bool,
}

fn invariant(slot: &ChordSlot, context: String) -> MappingError {
    MappingError::Invariant {
        bar: slot.bar,
        onset: slot.onset.to_string(),
        context,
    }
}

/// Give every orphan of `chord` a voice, patching its labels in place
pub fn resolve_orphans(ctx: &OrphanContext, chord: &mut ChordMatch) -> Result<OrphanResolution> {
    let num_voices = ctx.slot.num_voices();
    let all_mapped_before = chord.mapped_voices.len() == num_voices;

    let mut pool: Vec<Orphan> = chord
        .unmatched
        .iter()
        .map(|&(pitch, position)| Orphan { pitch, position, snu: false })
        .chain(
            chord
                .non_mapped_snu
                .iter()
                .map(|&(pitch, position)| Orphan { pitch, position, snu: true }),
        )
        .collect();

    let mut resolution = OrphanResolution::default();
    if pool.is_empty() {
        return Ok(resolution);
    }

    let planned = iteration_count(
        chord.pitches.len(),
        num_voices,
        !chord.extended_snu.is_empty(),
        all_mapped_before,
        chord.unmatched.len(),
    );

    let mut iteration = 0;
    let mut progress = true;
    while !pool.is_empty() {
        if iteration >= planned && iteration > 1 && !progress {
            break;
        }
        if iteration == 1 {
            // downgraded SNUs only compete in the restricted pass
            pool.retain(|o| !o.snu);
            if pool.is_empty() {
                break;
            }
        }
        let placed = run_pass(iteration, ctx, chord, &mut pool, &mut resolution)?;
        progress = placed > 0;
        iteration += 1;
    }
    resolution.passes = iteration;

    // An orphan may now share a voice with an SNU that only held that voice
    // because every voice was taken before orphans were placed
    if all_mapped_before && !resolution.assignments.is_empty() {
        let orphan_voices: BTreeSet<usize> = resolution.assignments.iter().map(|a| a.voice).collect();
        let orphan_positions: BTreeSet<usize> =
            resolution.assignments.iter().map(|a| a.position).collect();
        for (position, label) in chord.labels.iter_mut().enumerate() {
            if orphan_positions.contains(&position) {
                continue;
            }
            let Some(label) = label else {
                continue;
            };
            if label.count() != 2 {
                continue;
            }
            for voice in label.voices() {
                if orphan_voices.contains(&voice) && label.count() > 1 {
                    label.clear(voice);
                }
            }
        }
    }

    chord.unmatched = pool
        .iter()
        .filter(|o| !o.snu)
        .map(|o| (o.pitch, o.position))
        .collect();

    log::debug!(
        "bar {}: {} orphans placed in {} passes, {} SNU corrections, {} left",
        ctx.slot.bar,
        resolution.assignments.len(),
        resolution.passes,
        resolution.snu_corrections.len(),
        chord.unmatched.len()
    );

    Ok(resolution)
}

/// One resolver pass; returns the number of pool entries settled
fn run_pass(
    iteration: usize,
    ctx: &OrphanContext,
    chord: &mut ChordMatch,
    pool: &mut Vec<Orphan>,
    resolution: &mut OrphanResolution,
) -> Result<usize> {
    let num_voices = ctx.slot.num_voices();
    let key = ctx.slot.key;
    let open = iteration > 0;

    // Previous pitch of every offered voice
    let mut available: Vec<(usize, u8)> = (0..num_voices)
        .filter(|v| open || !chord.mapped_voices.contains(v))
        .filter_map(|v| ctx.grid.reference_pitch(v, key).map(|p| (v, p)))
        .collect();
    let orphans = pool.iter().filter(|o| !o.snu).count();
    if orphans > available.len() {
        // Voices filled in this chord compete with the pitch they just got
        for &voice in &chord.mapped_voices {
            if available.iter().any(|&(v, _)| v == voice) {
                continue;
            }
            if let Some(pitch) = chord.pitch_in_voice(voice) {
                available.push((voice, pitch));
            }
        }
    }
    available.sort_by(|a, b| b.0.cmp(&a.0));

    let mut settled: Vec<usize> = Vec::new();

    // Tuplet continuation: reuse the previous chord's voice for shared pitches
    if iteration == 0 {
        if let Some(previous) = ctx.tuplet {
            let mut used = BTreeSet::new();
            for (index, orphan) in pool.iter().enumerate() {
                if orphan.snu {
                    continue;
                }
                let Some(voice) = previous.voice_of(orphan.pitch) else {
                    continue;
                };
                // a voice with nothing to compare against is left to the search
                let Some(reference) = available
                    .iter()
                    .find(|&&(v, _)| v == voice)
                    .map(|&(_, p)| p)
                    .or_else(|| ctx.grid.reference_pitch(voice, key))
                else {
                    continue;
                };
                if !used.insert(voice) {
                    continue;
                }
                let cost = u32::from(orphan.pitch.abs_diff(reference));
                assign(chord, resolution, num_voices, *orphan, voice, cost);
                available.retain(|&(v, _)| v != voice);
                settled.push(index);
            }
        }
    }

    let remaining: Vec<usize> = (0..pool.len()).filter(|i| !settled.contains(i)).collect();
    let slots = available.len();
    if slots > 0 && !remaining.is_empty() {
        let sets = if remaining.len() > slots {
            subsets(&remaining, slots)
        } else {
            vec![remaining]
        };

        let mut best: Option<(Vec<usize>, CheapestMapping)> = None;
        for set in sets {
            let pitches: Vec<u8> = set.iter().map(|&i| pool[i].pitch).collect();
            let Some(mapping) = cheapest_mapping(&available, &pad(&pitches, slots)) else {
                continue;
            };
            if best.as_ref().map_or(true, |(_, b)| mapping.beats(b)) {
                best = Some((set, mapping));
            }
        }

        if let Some((set, mapping)) = best {
            for pair in &mapping.pairs {
                let index = set[pair.slot];
                let orphan = pool[index];
                if orphan.snu {
                    let already_held = chord
                        .labels
                        .get(orphan.position)
                        .and_then(Option::as_ref)
                        .is_some_and(|l| l.has(pair.voice));
                    if !already_held && ctx.slot.pitch_in_voice(pair.voice) == Some(orphan.pitch) {
                        let label = chord
                            .labels
                            .get_mut(orphan.position)
                            .and_then(Option::as_mut)
                            .ok_or_else(|| {
                                invariant(
                                    ctx.slot,
                                    format!(
                                        "downgraded SNU pitch {} at chord position {} has no voice",
                                        orphan.pitch, orphan.position
                                    ),
                                )
                            })?;
                        label.set(pair.voice);
                        chord.mapped_voices.insert(pair.voice);
                        resolution.snu_corrections.push((orphan.position, pair.voice));
                    } else {
                        log::warn!(
                            "bar {}: SNU pitch {} fits voice {} better than its own unison voice; left single",
                            ctx.slot.bar, orphan.pitch, pair.voice
                        );
                    }
                } else {
                    assign(chord, resolution, num_voices, orphan, pair.voice, pair.cost);
                }
                settled.push(index);
            }
        }
    }

    let placed = settled.len();
    let kept: Vec<Orphan> = pool
        .iter()
        .enumerate()
        .filter(|(i, _)| !settled.contains(i))
        .map(|(_, o)| *o)
        .collect();
    *pool = kept;

    Ok(placed)
}

/// Label an orphan and collapse extended SNUs sharing its voice
fn assign(
    chord: &mut ChordMatch,
    resolution: &mut OrphanResolution,
    num_voices: usize,
    orphan: Orphan,
    voice: usize,
    cost: u32,
) {
    if let Some(slot) = chord.labels.get_mut(orphan.position) {
        slot.get_or_insert_with(|| VoiceLabel::empty(num_voices)).set(voice);
    }
    for &position in &chord.extended_snu {
        if let Some(Some(label)) = chord.labels.get_mut(position) {
            if label.has(voice) && label.count() > 1 {
                label.clear(voice);
            }
        }
    }
    chord.mapped_voices.insert(voice);

    // Ficta is never checked for orphans: any distance counts as "other"
    let category = if cost == 0 {
        MismatchCategory::Repetition
    } else {
        MismatchCategory::Other
    };
    resolution.assignments.push(OrphanAssignment {
        position: orphan.position,
        pitch: orphan.pitch,
        voice,
        cost,
        category,
    });
}
