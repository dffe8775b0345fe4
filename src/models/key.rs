//! Key sections
//!
//! Key signatures are counted on the circle of fifths: positive for
//! sharps, negative for flats (-7 to +7).

use crate::rational::Rational;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Major,
    Minor,
}

/// Key signature and mode starting at `onset`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyInfo {
    pub key_signature: i8,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default = "piece_start")]
    pub onset: Rational,
}

fn piece_start() -> Rational {
    Rational::from_integer(0)
}

impl Default for KeyInfo {
    fn default() -> Self {
        Self::new(0, Mode::Major, piece_start())
    }
}

impl KeyInfo {
    pub fn new(key_signature: i8, mode: Mode, onset: Rational) -> Self {
        Self { key_signature, mode, onset }
    }
}
