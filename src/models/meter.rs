//! Meter sections and metric-position lookup
//!
//! A piece is a sequence of meter sections, each covering a contiguous
//! range of bars. Onsets are whole-note fractions measured from the start
//! of bar `first_bar` of the first section.

use crate::rational::Rational;
use serde::{Deserialize, Serialize};

/// One meter section: `numerator/denominator` from `first_bar` to `last_bar`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeterInfo {
    pub numerator: u32,
    pub denominator: u32,
    pub first_bar: u32,
    pub last_bar: u32,
}

impl Default for MeterInfo {
    fn default() -> Self {
        Self {
            numerator: 4,
            denominator: 4,
            first_bar: 1,
            last_bar: u32::MAX,
        }
    }
}

impl MeterInfo {
    pub fn new(numerator: u32, denominator: u32, first_bar: u32, last_bar: u32) -> Self {
        Self { numerator, denominator, first_bar, last_bar }
    }

    /// Length of one bar as a whole-note fraction
    pub fn bar_length(&self) -> Rational {
        Rational::new(i64::from(self.numerator.max(1)), i64::from(self.denominator.max(1)))
    }

    fn bar_count(&self) -> i64 {
        i64::from(self.last_bar.saturating_sub(self.first_bar)) + 1
    }
}

/// Bar number and offset within the bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricPosition {
    pub bar: u32,
    pub position: Rational,
}

/// Locate the section an onset falls into, with that section's start onset
fn locate(meters: &[MeterInfo], onset: Rational) -> (MeterInfo, Rational) {
    let mut start = Rational::from_integer(0);
    for (i, meter) in meters.iter().enumerate() {
        let section_length = meter.bar_length() * meter.bar_count();
        if onset < start + section_length || i + 1 == meters.len() {
            return (*meter, start);
        }
        start += section_length;
    }
    (MeterInfo::default(), Rational::from_integer(0))
}

/// Meter active at `onset`
pub fn meter_at(meters: &[MeterInfo], onset: Rational) -> MeterInfo {
    locate(meters, onset).0
}

/// Bar and position within the bar for `onset`
pub fn metric_position(meters: &[MeterInfo], onset: Rational) -> MetricPosition {
    let (meter, start) = locate(meters, onset);
    let bar_length = meter.bar_length();
    let offset = onset - start;
    let bar_index = (offset / bar_length).floor().to_integer().max(0);

    MetricPosition {
        bar: meter.first_bar + bar_index as u32,
        position: offset - bar_length * bar_index,
    }
}
