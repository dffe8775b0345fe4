//! Human-readable and CSV mapping reports

use crate::mapping::{Assignment, MappingResult, MismatchCategory, MismatchRecord};
use std::collections::BTreeMap;
use std::fmt::Write;

fn describe(assignment: &Assignment) -> String {
    match assignment {
        Assignment::Assigned(label) => label
            .voices()
            .iter()
            .map(|v| format!("v{}", v))
            .collect::<Vec<_>>()
            .join("+"),
        Assignment::Ornamental => "orn".to_string(),
        Assignment::Unmatched => "?".to_string(),
    }
}

impl MappingResult {
    /// Per-chord report: bar, position, pitches with their voices and mismatch notes
    pub fn report(&self) -> String {
        let mut by_note: BTreeMap<usize, Vec<&MismatchRecord>> = BTreeMap::new();
        for record in &self.mismatches {
            by_note.entry(record.tab_index).or_default().push(record);
        }

        let mut out = String::new();
        let _ = writeln!(out, "Voice mapping: {} notes, {} voices", self.notes.len(), self.num_voices);

        let mut current_chord = None;
        for note in &self.notes {
            if !self.include_ornamentation && note.assignment == Assignment::Ornamental {
                continue;
            }
            if current_chord != Some(note.chord_index) {
                if current_chord.is_some() {
                    out.push('\n');
                }
                current_chord = Some(note.chord_index);
                let _ = write!(out, "bar {:>3} @ {:<6}", note.bar, note.position.to_string());
            }
            let _ = write!(out, " {}->{}", note.pitch, describe(&note.assignment));
            if let Some(records) = by_note.get(&note.index) {
                let notes: Vec<String> = records
                    .iter()
                    .map(|r| format!("{} {}", r.category.as_str(), r.cost))
                    .collect();
                let _ = write!(out, " [{}]", notes.join(", "));
            }
        }
        if current_chord.is_some() {
            out.push('\n');
        }

        let stats = &self.statistics;
        let counts: Vec<String> = MismatchCategory::ALL
            .iter()
            .map(|&c| format!("{} {}", c.as_str(), stats.count(c)))
            .collect();
        let _ = writeln!(out, "Mismatches: {} ({})", stats.mismatches, counts.join(", "));
        let _ = writeln!(
            out,
            "Strict {:.3}  Lenient-1 {:.3}  Lenient-2 {:.3}",
            stats.strict(),
            stats.lenient_1(),
            stats.lenient_2()
        );
        out
    }

    /// One line per mismatch record, with a header row
    pub fn to_csv(&self) -> String {
        let mut out = String::from("tab_index,pitch,chord_index,bar,position,voice,cost,category\n");
        for r in &self.mismatches {
            let _ = writeln!(
                out,
                "{},{},{},{},{},{},{},{}",
                r.tab_index,
                r.pitch,
                r.chord_index,
                r.bar,
                r.position,
                r.voice.map(|v| v.to_string()).unwrap_or_default(),
                r.cost,
                r.category.as_str()
            );
        }
        out
    }
}
