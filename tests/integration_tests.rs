//! Integration tests for notehole
//!
//! Tests the full pipeline from LilyPond source through symmetry operations
//! to MIDI and LilyPond output.

use midly::{MidiMessage, Smf, TrackEventKind};
use notehole::operations::{flip, horizontal_fold, mobius_fold, reverse, rotate_180, vertical_fold};
use notehole::{
    compile_lilypond, compile_midi, duration_to_ticks, parse, quantize, to_lilypond, transform,
    transform_with, write_midi, Chord, Duration, Item, MidiOptions, Note, NoteholeError,
    Operation, Rational, Rest, Tone, DEFAULT_AXIS, TICKS_PER_QUARTER,
};

fn tone(text: &str) -> Tone {
    text.parse().unwrap()
}

fn items(tokens: &[&str]) -> Vec<Item> {
    tokens.iter().map(|t| t.parse().unwrap()).collect()
}

fn tokens(items: &[Item]) -> Vec<String> {
    items.iter().map(Item::to_string).collect()
}

fn sample() -> Vec<Item> {
    items(&["C4-4", "R-8", "<G4 E4 C4>-2", "F#3-8.", "Bb5-16", "EX2-1"])
}

#[test]
fn test_flip_is_an_involution() {
    for axis in ["B3", "C4", "F#4", "Eb2"] {
        let axis = tone(axis);
        let seq = sample();
        assert_eq!(flip(&flip(&seq, &axis), &axis), seq);
        assert_eq!(rotate_180(&rotate_180(&seq, &axis), &axis), seq);
    }
}

#[test]
fn test_reflection_mirrors_semitones() {
    let axis = tone("D4");
    for pitch in 0..70 {
        for accidental in -2..=2 {
            let t = Tone::new(pitch, accidental);
            let flipped = t.flip(&axis);
            assert_eq!(flipped.pitch, 2 * axis.pitch - t.pitch);
            assert_eq!(flipped.accidental, -accidental);
            // D is the symmetric degree of the major scale
            assert_eq!(flipped.semitone() - axis.semitone(), axis.semitone() - t.semitone());
        }
    }
}

#[test]
fn test_fold_on_axis_keeps_note() {
    let seq = items(&["B3-4"]);
    assert_eq!(horizontal_fold(&seq, &DEFAULT_AXIS), seq);
}

#[test]
fn test_fold_widens_notes() {
    let folded = horizontal_fold(&items(&["C4-4", "E4-2", "R-4"]), &DEFAULT_AXIS);
    assert_eq!(tokens(&folded), ["<C4 A3>-4", "<E4 F3>-2", "R-4"]);
}

#[test]
fn test_rotate_180_is_reverse_then_flip() {
    let seq = items(&["C4-4", "E4-8"]);
    assert_eq!(tokens(&rotate_180(&seq, &DEFAULT_AXIS)), ["F3-8", "A3-4"]);
    assert_eq!(rotate_180(&seq, &DEFAULT_AXIS), flip(&reverse(&seq), &DEFAULT_AXIS));
}

#[test]
fn test_vertical_and_mobius_fold_lengths() {
    let seq = sample();
    for repeats in 0..4 {
        assert_eq!(vertical_fold(&seq, repeats).len(), seq.len() * (repeats + 1));
        assert_eq!(mobius_fold(&seq, repeats, &DEFAULT_AXIS).len(), seq.len() * (repeats + 1));
    }
    let folded = vertical_fold(&items(&["C4-4", "D4-4"]), 2);
    assert_eq!(tokens(&folded), ["C4-4", "D4-4", "D4-4", "C4-4", "C4-4", "D4-4"]);
}

#[test]
fn test_empty_sequences() {
    let empty: Vec<Item> = Vec::new();
    assert!(reverse(&empty).is_empty());
    assert!(flip(&empty, &DEFAULT_AXIS).is_empty());
    assert!(rotate_180(&empty, &DEFAULT_AXIS).is_empty());
    assert!(horizontal_fold(&empty, &DEFAULT_AXIS).is_empty());
    assert!(vertical_fold(&empty, 3).is_empty());
    assert!(mobius_fold(&empty, 3, &DEFAULT_AXIS).is_empty());
}

#[test]
fn test_ticks_and_quantization() {
    assert_eq!(duration_to_ticks(&Duration::new(4, 0), TICKS_PER_QUARTER), 24);
    assert_eq!(duration_to_ticks(&Duration::new(4, 1), TICKS_PER_QUARTER), 36);
    assert_eq!(duration_to_ticks(&Duration::new(8, 0), TICKS_PER_QUARTER), 12);
    assert_eq!(quantize(Rational::new(3, 8)).unwrap(), Duration::new(4, 1));
}

#[test]
fn test_chord_rejects_empty_tone_set() {
    assert!(matches!(
        Chord::new(Vec::new(), Duration::QUARTER),
        Err(NoteholeError::EmptyChord)
    ));
}

#[test]
fn test_transform_applies_front_matter() {
    let source = r#"---
title: Crab Canon
tempo: 80
operations: [rotate-180, vertical-fold]
---
\version "2.18.2"
\relative c' { \time 3/4 c4 e8 r8 g4 }
"#;
    let score = transform(source).unwrap();
    assert_eq!(score.title.as_deref(), Some("Crab Canon"));
    assert_eq!(score.tempo, 80);
    assert_eq!(score.meter.beats, 3);
    assert_eq!(
        tokens(&score.items),
        ["D3-4", "R-8", "F3-8", "A3-4", "A3-4", "F3-8", "R-8", "D3-4"]
    );
}

#[test]
fn test_cli_operations_follow_front_matter() {
    let source = "---\naxis: C4\noperations: [flip]\n---\n\\relative c' { d e }";
    let score = transform_with(source, &["reverse".parse::<Operation>().unwrap()], None).unwrap();
    assert_eq!(tokens(&score.items), ["A3-4", "B3-4"]);

    let score = transform_with(source, &[Operation::Reverse], Some(tone("D4"))).unwrap();
    assert_eq!(tokens(&score.items), ["C4-4", "D4-4"]);
}

#[test]
fn test_compile_lilypond_round_trip() {
    let source = r"\relative c'' { \time 6/8 c8 d e f4. | <e c a>4 r8 g,,4. | bes'''16 ais gisis8 }";
    let text = compile_lilypond(source).unwrap();
    assert!(text.starts_with("\\version \"2.18.2\""));
    assert!(text.contains("\\time 6/8"));
    assert_eq!(parse(&text).unwrap().items, parse(source).unwrap().items);
}

#[test]
fn test_flipped_score_round_trips_through_lilypond() {
    let score = parse(r"\relative c' { c4 <e g c>2 r4 b,8. fis''16 }").unwrap();
    let flipped = score.with_items(rotate_180(&score.items, &DEFAULT_AXIS));
    let text = to_lilypond(&flipped, "").unwrap();
    assert_eq!(parse(&text).unwrap().items, flipped.items);
}

#[test]
fn test_compile_midi() {
    let bytes = compile_midi(r"{ c'4 <c' e'>2 }").unwrap();
    let smf = Smf::parse(&bytes).unwrap();
    let note_ons: Vec<u8> = smf.tracks[0]
        .iter()
        .filter_map(|event| match event.kind {
            TrackEventKind::Midi {
                message: MidiMessage::NoteOn { key, .. },
                ..
            } => Some(key.as_int()),
            _ => None,
        })
        .collect();
    assert_eq!(note_ons, vec![60, 64, 60]);
}

#[test]
fn test_write_midi_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scale.mid");
    let score = parse(r"\relative c' { c d e f }").unwrap();
    write_midi(&score, &MidiOptions::default(), &path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[0..4], b"MThd");
}

#[test]
fn test_write_lilypond_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mirror.ly");
    let score = notehole::Score::new(vec![
        Item::Note(Note::new(tone("C4"), Duration::QUARTER)),
        Item::Rest(Rest::new(Duration::HALF)),
    ]);
    notehole::lilypond::write_lilypond(&score, &path, "").unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("\\relative c' {"));
    assert!(text.contains("c4 r2"));
}

#[test]
fn test_error_cases() {
    assert!(matches!(parse("c d e"), Err(NoteholeError::ParseError { .. })));
    assert!(matches!(
        parse(r"{ c \times 2/3 { d e f } }"),
        Err(NoteholeError::UnsupportedItem(_))
    ));
    assert!(matches!(compile_lilypond("{ r4 r2 }"), Err(NoteholeError::NoMusic)));
    assert!(matches!(
        compile_midi("{ c''''''''4 }"),
        Err(NoteholeError::PitchOutOfRange(_))
    ));
    assert!(matches!(
        transform("---\noperations: [twist]\n---\n{ c }"),
        Err(NoteholeError::MetadataError(_))
    ));
}
