//! Pitch spelling grids
//!
//! A spelling grid assigns every pitch class a letter name and accidental
//! for one key. Two MIDI pitches that spell to the same letter in the same
//! octave (G and G#, B and Bb) are ficta equivalents: the tablature and the
//! transcription may disagree on the inflection while meaning the same note.
//!
//! # Construction
//!
//! The 12 spellings are a window of 12 consecutive positions on the line of
//! fifths around the key: the 7 diatonic letters, the next sharps above and
//! the next flats below. In C major the window runs Eb Bb F C G D A E B F#
//! C# G#; minor keys shift the window one fifth sharpwards (D# over Eb in A
//! minor).

use crate::models::key::{KeyInfo, Mode};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Letter {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Letter {
    /// Pitch class of the natural letter
    pub fn pitch_class(self) -> i16 {
        match self {
            Letter::C => 0,
            Letter::D => 2,
            Letter::E => 4,
            Letter::F => 5,
            Letter::G => 7,
            Letter::A => 9,
            Letter::B => 11,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Letter::C => "C",
            Letter::D => "D",
            Letter::E => "E",
            Letter::F => "F",
            Letter::G => "G",
            Letter::A => "A",
            Letter::B => "B",
        }
    }
}

/// Letters in line-of-fifths order starting from F
const FIFTHS: [Letter; 7] = [
    Letter::F,
    Letter::C,
    Letter::G,
    Letter::D,
    Letter::A,
    Letter::E,
    Letter::B,
];

/// Letter name plus accidental (-2 to +2) of one pitch class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spelling {
    pub letter: Letter,
    pub accidental: i8,
}

/// A fully spelled pitch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpelledPitch {
    pub letter: Letter,
    pub accidental: i8,
    pub octave: i8,
}

impl std::fmt::Display for SpelledPitch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let accidental = match self.accidental {
            -2 => "bb",
            -1 => "b",
            1 => "#",
            2 => "##",
            _ => "",
        };
        write!(f, "{}{}{}", self.letter.as_str(), accidental, self.octave)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpellingGrid {
    classes: [Spelling; 12],
}

static GRIDS: Lazy<HashMap<(i8, Mode), SpellingGrid>> = Lazy::new(|| {
    let mut table = HashMap::new();
    for key_signature in -7..=7 {
        for mode in [Mode::Major, Mode::Minor] {
            table.insert((key_signature, mode), SpellingGrid::new(key_signature, mode));
        }
    }
    table
});

impl SpellingGrid {
    /// Build the grid for a key signature (-7..=7) and mode
    pub fn new(key_signature: i8, mode: Mode) -> Self {
        let shift = match mode {
            Mode::Major => 3,
            Mode::Minor => 2,
        };
        let mut classes = [Spelling { letter: Letter::C, accidental: 0 }; 12];
        let low = i16::from(key_signature) - shift;
        for position in low..low + 12 {
            // position 0 is C; F is -1
            let index = position + 1;
            let letter = FIFTHS[index.rem_euclid(7) as usize];
            let accidental = index.div_euclid(7) as i8;
            let pitch_class = (letter.pitch_class() + i16::from(accidental)).rem_euclid(12);
            classes[pitch_class as usize] = Spelling { letter, accidental };
        }
        Self { classes }
    }

    /// Cached grid for a key section
    pub fn for_key(key: &KeyInfo) -> SpellingGrid {
        GRIDS
            .get(&(key.key_signature, key.mode))
            .copied()
            .unwrap_or_else(|| SpellingGrid::new(key.key_signature.clamp(-7, 7), key.mode))
    }

    pub fn spelling(&self, pitch_class: u8) -> Spelling {
        self.classes[usize::from(pitch_class % 12)]
    }

    /// Spell a MIDI pitch (octave 4 holds middle C)
    pub fn spell(&self, pitch: u8) -> SpelledPitch {
        let Spelling { letter, accidental } = self.spelling(pitch);
        let natural = i16::from(pitch) - i16::from(accidental);
        SpelledPitch {
            letter,
            accidental,
            octave: (natural.div_euclid(12) - 1) as i8,
        }
    }

    /// Same letter and octave, different MIDI value
    pub fn is_ficta_equivalent(&self, a: u8, b: u8) -> bool {
        if a == b {
            return false;
        }
        let (sa, sb) = (self.spell(a), self.spell(b));
        sa.letter == sb.letter && sa.octave == sb.octave
    }
}
