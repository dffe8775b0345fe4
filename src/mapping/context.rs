//! State carried from one chord to the next while a piece is mapped

use crate::mapping::types::{Assignment, MismatchRecord};
use crate::rational::Rational;

/// Onset distances at which an under-matched chord continues a tuplet group
const TUPLET_STEPS: [(i64, i64); 3] = [(1, 1), (1, 2), (1, 4)];

/// A fully resolved non-ornamental chord
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedChord {
    /// Grid row
    pub row: usize,
    pub onset: Rational,
    /// Number of tablature notes
    pub size: usize,
    /// Pitches that needed the orphan resolver
    pub orphan_count: usize,
    /// `(pitch, voice)` for every voice each tab pitch was given
    pub voiced: Vec<(u8, usize)>,
}

impl ResolvedChord {
    /// Voice a pitch was given in this chord (first occurrence)
    pub fn voice_of(&self, pitch: u8) -> Option<usize> {
        self.voiced.iter().find(|&&(p, _)| p == pitch).map(|&(_, v)| v)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionContext {
    /// One entry per tablature note
    pub assignments: Vec<Assignment>,
    pub mismatches: Vec<MismatchRecord>,
    /// Last non-ornamental chord
    pub last_chord: Option<ResolvedChord>,
    /// Last chord that still needed the orphan resolver
    pub pending_tuplet: Option<ResolvedChord>,
    /// Tablature indices of the ornamental notes seen since `last_chord`
    pub ornament_run: Vec<usize>,
}

impl ResolutionContext {
    pub fn new(note_count: usize) -> Self {
        Self {
            assignments: vec![Assignment::Unmatched; note_count],
            mismatches: Vec::new(),
            last_chord: None,
            pending_tuplet: None,
            ornament_run: Vec::new(),
        }
    }

    pub fn buffer_ornament(&mut self, tab_index: usize) {
        if let Some(slot) = self.assignments.get_mut(tab_index) {
            *slot = Assignment::Ornamental;
        }
        self.ornament_run.push(tab_index);
    }

    pub fn take_ornament_run(&mut self) -> Vec<usize> {
        std::mem::take(&mut self.ornament_run)
    }

    /// The previous chord, when the chord at `onset` continues its tuplet
    ///
    /// Requires the same chord size, an under-matched predecessor that is
    /// the immediately preceding chord, and an onset distance of 1, 1/2 or
    /// 1/4.
    pub fn tuplet_predecessor(&self, size: usize, onset: Rational) -> Option<&ResolvedChord> {
        let pending = self.pending_tuplet.as_ref()?;
        let last = self.last_chord.as_ref()?;
        if pending.row != last.row || pending.size != size {
            return None;
        }
        let distance = onset - pending.onset;
        TUPLET_STEPS
            .iter()
            .any(|&(n, d)| distance == Rational::new(n, d))
            .then_some(pending)
    }

    /// Make `chord` the reference for the chords that follow
    pub fn finish_chord(&mut self, chord: ResolvedChord) {
        self.pending_tuplet = (chord.orphan_count > 0).then(|| chord.clone());
        self.last_chord = Some(chord);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chord(row: usize, onset: Rational, orphan_count: usize) -> ResolvedChord {
        ResolvedChord { row, onset, size: 2, orphan_count, voiced: vec![(60, 1), (64, 0)] }
    }

    #[test]
    fn test_tuplet_predecessor_distances() {
        let mut ctx = ResolutionContext::new(0);
        ctx.finish_chord(chord(3, Rational::new(1, 2), 1));
        assert!(ctx.tuplet_predecessor(2, Rational::new(1, 1)).is_some());
        assert!(ctx.tuplet_predecessor(2, Rational::new(3, 4)).is_some());
        assert!(ctx.tuplet_predecessor(2, Rational::new(3, 2)).is_some());
        assert!(ctx.tuplet_predecessor(2, Rational::new(5, 6)).is_none());
        assert!(ctx.tuplet_predecessor(3, Rational::new(1, 1)).is_none());
    }

    #[test]
    fn test_fully_matched_chord_clears_pending_tuplet() {
        let mut ctx = ResolutionContext::new(0);
        ctx.finish_chord(chord(3, Rational::new(1, 2), 1));
        ctx.finish_chord(chord(4, Rational::new(1, 1), 0));
        assert!(ctx.pending_tuplet.is_none());
        assert!(ctx.tuplet_predecessor(2, Rational::new(3, 2)).is_none());
    }

    #[test]
    fn test_voice_of() {
        let c = chord(0, Rational::from_integer(0), 0);
        assert_eq!(c.voice_of(64), Some(0));
        assert_eq!(c.voice_of(62), None);
    }

    #[test]
    fn test_buffer_ornament_marks_note() {
        let mut ctx = ResolutionContext::new(3);
        ctx.buffer_ornament(1);
        assert_eq!(ctx.assignments[1], Assignment::Ornamental);
        assert_eq!(ctx.take_ornament_run(), vec![1]);
        assert!(ctx.ornament_run.is_empty());
    }
}
