// End-to-end voice mapping scenarios

use tabmap_wasm::mapping::{build_grid, cheapest_mapping};
use tabmap_wasm::models::{KeyInfo, MeterInfo, Mode, TransNote};
use tabmap_wasm::rational::{default_grid_unit, find_closest_multiple, round_fraction};
use tabmap_wasm::{
    map_piece, Assignment, CorpusStatistics, MappingConfig, MappingResult, MismatchCategory, Rational, Tablature,
    Transcription,
};

fn r(n: i64, d: i64) -> Rational {
    Rational::new(n, d)
}

/// Voices given from the top, each as `(pitch, onset, duration)`
fn transcription(voices: &[&[(u8, Rational, Rational)]], keys: Vec<KeyInfo>) -> Transcription {
    Transcription::new(
        voices
            .iter()
            .map(|notes| notes.iter().map(|&(p, o, d)| TransNote::new(p, o, d)).collect())
            .collect(),
        keys,
    )
}

fn voices(result: &MappingResult) -> Vec<Option<Vec<usize>>> {
    result
        .notes
        .iter()
        .map(|n| n.assignment.label().map(|l| l.voices()))
        .collect()
}

/// Helper to map with the default configuration
fn map(tab: &Tablature, trans: &Transcription) -> MappingResult {
    map_piece(tab, trans, &MappingConfig::default()).unwrap()
}

#[test]
fn test_rational_helpers() {
    let unit = default_grid_unit();
    assert_eq!(find_closest_multiple(r(17, 192), unit), r(9, 96));
    assert_eq!(find_closest_multiple(r(9, 96), unit), r(9, 96));
    assert_eq!(round_fraction(r(17, 4)), r(4, 1));
}

#[test]
fn test_cheapest_mapping_examples() {
    let available = [(3, 48), (2, 56), (1, 60), (0, 64)];
    let best = cheapest_mapping(&available, &[Some(62), None, None, None]).unwrap();
    assert_eq!((best.pairs[0].voice, best.pairs[0].pitch, best.pairs[0].cost), (1, 62, 2));

    let best = cheapest_mapping(&available, &[Some(48), Some(56), Some(60), None]).unwrap();
    let assigned: Vec<(usize, u32)> = best.pairs.iter().map(|p| (p.voice, p.cost)).collect();
    assert_eq!(assigned, vec![(3, 0), (2, 0), (1, 0)]);
}

#[test]
fn test_chord_against_four_voices_with_empty_bass() {
    let tab = Tablature::from_chords(&[(r(0, 1), r(1, 2), vec![60, 64, 67])], vec![]);
    let whole = (r(0, 1), r(1, 2));
    let trans = transcription(
        &[&[(67, whole.0, whole.1)], &[(64, whole.0, whole.1)], &[(60, whole.0, whole.1)], &[]],
        vec![],
    );
    let result = map(&tab, &trans);

    for note in &result.notes {
        assert_eq!(note.assignment.label().unwrap().count(), 1);
    }
    assert_eq!(voices(&result), vec![Some(vec![2]), Some(vec![1]), Some(vec![0])]);
    assert_eq!(result.statistics.mismatches, 0);
}

#[test]
fn test_unison_pairs_in_order() {
    let tab = Tablature::from_chords(&[(r(0, 1), r(1, 2), vec![48, 60, 60])], vec![]);
    let (o, d) = (r(0, 1), r(1, 2));
    let trans = transcription(&[&[(60, o, d)], &[(60, o, d)], &[(48, o, d)]], vec![]);
    let result = map(&tab, &trans);
    // first tab 60 takes the lower unison voice, second the upper
    assert_eq!(voices(&result), vec![Some(vec![2]), Some(vec![1]), Some(vec![0])]);
}

#[test]
fn test_snu_with_spare_voice() {
    let tab = Tablature::from_chords(&[(r(0, 1), r(1, 2), vec![48, 60, 67])], vec![]);
    let (o, d) = (r(0, 1), r(1, 2));
    let trans = transcription(&[&[(67, o, d)], &[(60, o, d)], &[(60, o, d)], &[(48, o, d)]], vec![]);
    let result = map(&tab, &trans);
    assert_eq!(voices(&result)[1], Some(vec![1, 2]));
    assert!(result.mismatches.is_empty());
}

#[test]
fn test_single_ornament_before_chord() {
    let meters = vec![MeterInfo::new(2, 2, 1, 4)];
    let tab = Tablature::from_chords(
        &[
            (r(0, 1), r(1, 4), vec![48, 64]),
            (r(1, 4), r(1, 16), vec![62]),
            (r(5, 16), r(3, 16), vec![48, 60]),
        ],
        meters,
    );
    let trans = transcription(
        &[
            &[(64, r(0, 1), r(5, 16)), (60, r(5, 16), r(3, 16))],
            &[(48, r(0, 1), r(5, 16)), (48, r(5, 16), r(3, 16))],
        ],
        vec![],
    );
    let result = map(&tab, &trans);
    let ornament = &result.notes[2];
    assert_eq!(ornament.pitch, 62);
    assert_eq!(ornament.assignment.label().unwrap().voices(), vec![0]);
    assert_eq!(result.statistics.ornamentation, 1);
    assert_eq!(result.statistics.other, 0);
    assert_eq!(result.mismatch_index().ornamentation, vec![2]);
}

#[test]
fn test_ornament_run_at_end_looks_back() {
    let tab = Tablature::from_chords(
        &[
            (r(0, 1), r(1, 2), vec![48, 64]),
            (r(1, 2), r(1, 16), vec![65]),
            (r(9, 16), r(1, 16), vec![67]),
        ],
        vec![MeterInfo::new(2, 2, 1, 4)],
    );
    let trans = transcription(&[&[(64, r(0, 1), r(1, 2))], &[(48, r(0, 1), r(1, 2))]], vec![]);
    let result = map(&tab, &trans);
    // the run starts on 65, closest to 64 in the upper voice
    assert_eq!(voices(&result)[2], Some(vec![0]));
    assert_eq!(voices(&result)[3], Some(vec![0]));
    assert_eq!(result.statistics.ornamentation, 2);
}

#[test]
fn test_repeated_pitch_orphan() {
    let tab = Tablature::from_chords(
        &[(r(0, 1), r(1, 2), vec![48, 60, 64]), (r(1, 2), r(1, 2), vec![50, 60, 65])],
        vec![],
    );
    let trans = transcription(
        &[
            &[(64, r(0, 1), r(1, 2)), (65, r(1, 2), r(1, 2))],
            &[(60, r(0, 1), r(1, 2)), (59, r(1, 2), r(1, 2))],
            &[(48, r(0, 1), r(1, 2)), (50, r(1, 2), r(1, 2))],
        ],
        vec![],
    );
    let result = map(&tab, &trans);
    assert_eq!(voices(&result)[4], Some(vec![1]));
    assert_eq!(result.mismatches.len(), 1);
    assert_eq!(result.mismatches[0].category, MismatchCategory::Repetition);
    assert_eq!(result.mismatches[0].tab_index, 4);
    assert_eq!(result.statistics.lenient_1(), 1.0);
}

#[test]
fn test_ficta_in_local_key() {
    let tab = Tablature::from_chords(&[(r(0, 1), r(1, 2), vec![57, 63])], vec![]);
    let (o, d) = (r(0, 1), r(1, 2));
    let trans = transcription(
        &[&[(62, o, d)], &[(57, o, d)]],
        vec![KeyInfo::new(3, Mode::Major, r(0, 1))],
    );
    let result = map(&tab, &trans);
    assert_eq!(voices(&result)[1], Some(vec![0]));
    assert_eq!(result.statistics.ficta, 1);
    assert_eq!(result.mismatches[0].cost, 1);
}

#[test]
fn test_every_note_has_a_state_and_grid_covers_all_notes() {
    let tab = Tablature::from_chords(
        &[
            (r(0, 1), r(1, 4), vec![48, 55, 64]),
            (r(1, 4), r(1, 4), vec![50, 65]),
            (r(1, 2), r(1, 2), vec![43, 59, 62, 67]),
        ],
        vec![],
    );
    let trans = transcription(
        &[
            &[(64, r(0, 1), r(1, 4)), (65, r(1, 4), r(1, 4)), (67, r(1, 2), r(1, 2))],
            &[(55, r(0, 1), r(1, 2)), (59, r(1, 2), r(1, 2))],
            &[(48, r(0, 1), r(1, 4)), (50, r(1, 4), r(1, 4)), (43, r(1, 2), r(1, 2))],
        ],
        vec![],
    );
    let (grid, mask) = build_grid(&tab, &trans, default_grid_unit()).unwrap();
    assert_eq!(grid.len(), 3);
    assert_eq!(mask.rows.iter().map(|r| r.len()).sum::<usize>(), tab.notes.len());

    let result = map(&tab, &trans);
    assert_eq!(result.notes.len(), tab.notes.len());
    assert!(result.notes.iter().all(|n| n.assignment != Assignment::Unmatched));
    // 62 has no voice of its own in a three-voice texture
    assert_eq!(result.statistics.other, 1);
}

#[test]
fn test_mapping_is_idempotent() {
    let tab = Tablature::from_chords(
        &[
            (r(0, 1), r(1, 4), vec![48, 55, 64]),
            (r(1, 4), r(1, 8), vec![66]),
            (r(3, 8), r(1, 8), vec![50, 62, 65]),
        ],
        vec![MeterInfo::new(2, 2, 1, 4)],
    );
    let trans = transcription(
        &[
            &[(64, r(0, 1), r(3, 8)), (65, r(3, 8), r(1, 8))],
            &[(55, r(0, 1), r(1, 2))],
            &[(48, r(0, 1), r(3, 8)), (50, r(3, 8), r(1, 8))],
        ],
        vec![],
    );
    let first = map(&tab, &trans);
    let second = map(&tab, &trans);
    assert_eq!(first.voice_labels(), second.voice_labels());
    assert_eq!(first.statistics, second.statistics);
    assert_eq!(first, second);
}

#[test]
fn test_corpus_accumulates_pieces() {
    let tab = Tablature::from_chords(&[(r(0, 1), r(1, 2), vec![60])], vec![]);
    let good = transcription(&[&[(60, r(0, 1), r(1, 2))]], vec![]);
    let bad = transcription(&[&[(64, r(0, 1), r(1, 2))]], vec![]);

    let mut corpus = CorpusStatistics::new();
    corpus.add(&map(&tab, &good).statistics);
    corpus.add(&map(&tab, &bad).statistics);

    assert_eq!(corpus.pieces, 2);
    assert_eq!(corpus.pooled.total_notes, 2);
    assert_eq!(corpus.pooled.other, 1);
    assert!((corpus.mean_strict() - 0.5).abs() < 1e-9);
}

#[test]
fn test_tuplet_chord_keeps_previous_orphan_voice() {
    let tab = Tablature::from_chords(
        &[(r(0, 1), r(1, 2), vec![48, 62, 67]), (r(1, 2), r(1, 2), vec![50, 62, 64])],
        vec![],
    );
    let trans = transcription(
        &[
            &[(67, r(0, 1), r(1, 2)), (72, r(1, 2), r(1, 2))],
            &[(60, r(0, 1), r(1, 2)), (64, r(1, 2), r(1, 2))],
            &[(48, r(0, 1), r(1, 2)), (50, r(1, 2), r(1, 2))],
        ],
        vec![],
    );
    let result = map(&tab, &trans);
    // 62 took the middle voice in the first chord and keeps it in the
    // second, not the free upper voice
    assert_eq!(voices(&result)[1], Some(vec![1]));
    assert_eq!(voices(&result)[4], Some(vec![1]));
    assert_eq!(voices(&result)[5], Some(vec![1]));
    assert_eq!(result.mismatches.len(), 2);
    assert_eq!(result.mismatches[1].tab_index, 4);
    assert_eq!(result.mismatches[1].voice, Some(1));
    assert_eq!(result.mismatches[1].cost, 2);
    assert_eq!(result.mismatches[1].category, MismatchCategory::Other);
}
