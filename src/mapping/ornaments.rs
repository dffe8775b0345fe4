//! Ornamentation handler: attach a run of ornamental notes to one voice
//!
//! Ornamental notes skip chord matching. Consecutive ones are buffered and,
//! once the next chord is resolved, the whole run is given the voice of the
//! closest pitch in the neighbouring chord:
//!
//! ```text
//!   forward:   preceding ... [o o o] ─→ following   (last run pitch decides)
//!   backward:  preceding ←─ [o o o] ... following   (first run pitch decides)
//! ```
//!
//! A tie in the deciding chord is broken by the other chord, using the
//! other end of the run.

use crate::config::OrnamentDirection;
use crate::mapping::context::ResolvedChord;

/// Voice chosen for a run, with the neighbouring pitch it was matched to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunResolution {
    pub voice: usize,
    pub neighbour: u8,
    /// Direction actually used
    pub direction: OrnamentDirection,
}

/// Voices of `chord` whose pitch is nearest to `pitch`, as `(voice, pitch)`
pub fn closest_voices(chord: &ResolvedChord, pitch: u8) -> Vec<(usize, u8)> {
    let Some(best) = chord.voiced.iter().map(|&(p, _)| p.abs_diff(pitch)).min() else {
        return Vec::new();
    };
    let mut closest: Vec<(usize, u8)> = Vec::new();
    for &(p, voice) in &chord.voiced {
        if p.abs_diff(pitch) == best && !closest.iter().any(|&(v, _)| v == voice) {
            closest.push((voice, p));
        }
    }
    closest
}

/// Pick the voice for a run of ornamental pitches
///
/// Without a preceding chord the run always looks forward; at the end of
/// the piece it looks backward. `None` when neither neighbour exists.
pub fn resolve_run(
    run: &[u8],
    preceding: Option<&ResolvedChord>,
    following: Option<&ResolvedChord>,
    direction: OrnamentDirection,
) -> Option<RunResolution> {
    let (&first, &last) = (run.first()?, run.last()?);

    let direction = match (preceding, following) {
        (None, None) => return None,
        (None, Some(_)) => OrnamentDirection::Forward,
        (Some(_), None) => OrnamentDirection::Backward,
        (Some(_), Some(_)) => direction,
    };

    let (primary_chord, primary_pitch, secondary_chord, secondary_pitch) = match direction {
        OrnamentDirection::Forward => (following?, last, preceding, first),
        OrnamentDirection::Backward => (preceding?, first, following, last),
    };

    let primary = closest_voices(primary_chord, primary_pitch);
    let &(first_voice, first_pitch) = primary.first()?;
    if primary.len() == 1 {
        return Some(RunResolution { voice: first_voice, neighbour: first_pitch, direction });
    }

    let tie_break = secondary_chord
        .map(|chord| closest_voices(chord, secondary_pitch))
        .unwrap_or_default()
        .into_iter()
        .find_map(|(voice, _)| primary.iter().find(|&&(v, _)| v == voice).copied());

    let (voice, neighbour) = tie_break.unwrap_or((first_voice, first_pitch));
    Some(RunResolution { voice, neighbour, direction })
}
