//! # MIDI Export
//!
//! Writes a [`Score`] as a single-track Standard MIDI File (format 0).
//!
//! The track starts with the tempo, the time signature and a program change,
//! then plays the events back to back on channel 0:
//!
//! - a rest only delays whatever comes next
//! - a note is a note-on followed, one duration later, by its note-off
//! - a chord switches all of its tones on together (highest first) and off
//!   together
//!
//! A rest at the very end is kept as the delay of the end-of-track event.

use std::path::Path;

use midly::num::{u15, u24, u28, u4, u7};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind};
use tracing::info;

use crate::error::NoteholeError;
use crate::music::{Item, Score, Tone, NB_SEMITONES};
use crate::quantize::{duration_to_ticks, TICKS_PER_QUARTER};

const CHANNEL: u8 = 0;

/// Largest value a MIDI data byte can hold.
const MAX_DATA: u8 = 127;

/// Performance settings for exported files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidiOptions {
    pub ticks_per_quarter: u16,
    /// General MIDI program, `0` is the acoustic grand piano.
    pub program: u8,
    pub velocity: u8,
}

impl Default for MidiOptions {
    fn default() -> Self {
        Self {
            ticks_per_quarter: TICKS_PER_QUARTER as u16,
            program: 0,
            velocity: 64,
        }
    }
}

/// MIDI key number of a tone (C4 = 60).
pub fn midi_key(tone: &Tone) -> Result<u7, NoteholeError> {
    let key = tone.semitone().saturating_add(NB_SEMITONES);
    u8::try_from(key)
        .ok()
        .filter(|&k| k <= MAX_DATA)
        .map(u7::new)
        .ok_or_else(|| NoteholeError::PitchOutOfRange(format!("{} (key {})", tone, key)))
}

fn data_byte(name: &str, value: u8) -> Result<u7, NoteholeError> {
    if value > MAX_DATA {
        return Err(NoteholeError::Midi(format!("{} {} is above 127", name, value)));
    }
    Ok(u7::new(value))
}

fn midi_event(delta: u32, message: MidiMessage) -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(delta),
        kind: TrackEventKind::Midi {
            channel: u4::new(CHANNEL),
            message,
        },
    }
}

fn meta_event(delta: u32, message: MetaMessage<'static>) -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(delta),
        kind: TrackEventKind::Meta(message),
    }
}

/// Build the in-memory MIDI file for a score.
pub fn to_smf(score: &Score, options: &MidiOptions) -> Result<Smf<'static>, NoteholeError> {
    if options.ticks_per_quarter == 0 || options.ticks_per_quarter > 0x7FFF {
        return Err(NoteholeError::Midi(format!(
            "invalid resolution: {} ticks per quarter",
            options.ticks_per_quarter
        )));
    }
    if score.tempo == 0 {
        return Err(NoteholeError::Midi("tempo must be positive".to_string()));
    }
    if !score.meter.bar.is_power_of_two() {
        return Err(NoteholeError::Midi(format!(
            "time signature {}/{} has no MIDI encoding",
            score.meter.beats, score.meter.bar
        )));
    }

    let program = data_byte("program", options.program)?;
    let vel = data_byte("velocity", options.velocity)?;
    let ticks_per_quarter = options.ticks_per_quarter as u32;

    let mut track: Track<'static> = Vec::new();

    // u24 cannot hold the period of a tempo below 4 bpm
    let microseconds_per_quarter = (60_000_000 / score.tempo as u32).min(0x00FF_FFFF);
    track.push(meta_event(0, MetaMessage::Tempo(u24::new(microseconds_per_quarter))));
    track.push(meta_event(
        0,
        MetaMessage::TimeSignature(
            score.meter.beats,
            score.meter.bar.trailing_zeros() as u8,
            24, // MIDI clocks per metronome click
            8,  // 32nd notes per quarter note
        ),
    ));
    track.push(midi_event(0, MidiMessage::ProgramChange { program }));

    let mut delay = 0u32;
    for item in score.iter() {
        let ticks = duration_to_ticks(&item.duration(), ticks_per_quarter);
        let keys = match item {
            Item::Rest(_) => {
                delay += ticks;
                continue;
            }
            Item::Note(note) => vec![midi_key(&note.tone)?],
            Item::Chord(chord) => chord
                .sorted_tones()
                .iter()
                .map(midi_key)
                .collect::<Result<Vec<_>, _>>()?,
        };

        for (i, &key) in keys.iter().enumerate() {
            let delta = if i == 0 { delay } else { 0 };
            track.push(midi_event(delta, MidiMessage::NoteOn { key, vel }));
        }
        for (i, &key) in keys.iter().enumerate() {
            let delta = if i == 0 { ticks } else { 0 };
            track.push(midi_event(delta, MidiMessage::NoteOff { key, vel: u7::new(0) }));
        }
        delay = 0;
    }
    track.push(meta_event(delay, MetaMessage::EndOfTrack));

    let mut smf = Smf::new(Header::new(
        Format::SingleTrack,
        Timing::Metrical(u15::new(options.ticks_per_quarter)),
    ));
    smf.tracks.push(track);
    Ok(smf)
}

/// Encode a score as the bytes of a `.mid` file.
pub fn to_bytes(score: &Score, options: &MidiOptions) -> Result<Vec<u8>, NoteholeError> {
    let smf = to_smf(score, options)?;
    let mut buf = Vec::new();
    smf.write(&mut buf)
        .map_err(|e| NoteholeError::Midi(format!("Failed to write MIDI: {}", e)))?;
    Ok(buf)
}

/// Encode a score and write it to `path`.
pub fn write_midi(score: &Score, options: &MidiOptions, path: &Path) -> Result<(), NoteholeError> {
    let bytes = to_bytes(score, options)?;
    std::fs::write(path, &bytes)?;
    info!(path = %path.display(), bytes = bytes.len(), "wrote MIDI file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::music::{Chord, Duration, Meter, Note, Rest};

    fn tone(text: &str) -> Tone {
        text.parse().unwrap()
    }

    /// Note on/off events as `(delta, key, is_on)`.
    fn note_events(smf: &Smf) -> Vec<(u32, u8, bool)> {
        smf.tracks[0]
            .iter()
            .filter_map(|event| match event.kind {
                TrackEventKind::Midi {
                    message: MidiMessage::NoteOn { key, .. },
                    ..
                } => Some((event.delta.as_int(), key.as_int(), true)),
                TrackEventKind::Midi {
                    message: MidiMessage::NoteOff { key, .. },
                    ..
                } => Some((event.delta.as_int(), key.as_int(), false)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_midi_keys() {
        assert_eq!(midi_key(&tone("C4")).unwrap().as_int(), 60);
        assert_eq!(midi_key(&tone("A4")).unwrap().as_int(), 69);
        assert_eq!(midi_key(&tone("Cb-1")).map(|k| k.as_int()).ok(), None);
        assert!(matches!(
            midi_key(&tone("C11")),
            Err(NoteholeError::PitchOutOfRange(_))
        ));
        assert!(midi_key(&Tone::new(i32::MAX, 2)).is_err());
        assert!(midi_key(&Tone::new(i32::MIN, -2)).is_err());
    }

    #[test]
    fn test_header_and_meta_events() {
        let mut score = Score::new(vec![Item::Note(Note::new(tone("C4"), Duration::QUARTER))]);
        score.tempo = 90;
        score.meter = Meter::new(6, 8);

        let bytes = to_bytes(&score, &MidiOptions::default()).unwrap();
        assert_eq!(&bytes[0..4], b"MThd");

        let smf = Smf::parse(&bytes).unwrap();
        assert_eq!(smf.header.format, Format::SingleTrack);
        assert_eq!(smf.header.timing, Timing::Metrical(u15::new(24)));
        assert_eq!(smf.tracks.len(), 1);

        let track = &smf.tracks[0];
        assert_eq!(
            track[0].kind,
            TrackEventKind::Meta(MetaMessage::Tempo(u24::new(666_666)))
        );
        assert_eq!(
            track[1].kind,
            TrackEventKind::Meta(MetaMessage::TimeSignature(6, 3, 24, 8))
        );
        assert!(matches!(
            track[2].kind,
            TrackEventKind::Midi {
                message: MidiMessage::ProgramChange { .. },
                ..
            }
        ));
        assert_eq!(
            track.last().map(|e| &e.kind),
            Some(&TrackEventKind::Meta(MetaMessage::EndOfTrack))
        );
    }

    #[test]
    fn test_rests_delay_the_next_event() {
        let score = Score::new(vec![
            Item::Note(Note::new(tone("C4"), Duration::QUARTER)),
            Item::Rest(Rest::new(Duration::EIGHTH)),
            Item::Rest(Rest::new(Duration::QUARTER)),
            Item::Note(Note::new(tone("D4"), Duration::new(4, 1))),
        ]);
        let smf = to_smf(&score, &MidiOptions::default()).unwrap();
        assert_eq!(
            note_events(&smf),
            vec![(0, 60, true), (24, 60, false), (36, 62, true), (36, 62, false)]
        );
    }

    #[test]
    fn test_chord_layout() {
        let chord = Chord::new([tone("C4"), tone("E4"), tone("G4")], Duration::HALF).unwrap();
        let score = Score::new(vec![
            Item::Rest(Rest::new(Duration::QUARTER)),
            Item::Chord(chord),
        ]);
        let smf = to_smf(&score, &MidiOptions::default()).unwrap();
        assert_eq!(
            note_events(&smf),
            vec![
                (24, 67, true),
                (0, 64, true),
                (0, 60, true),
                (48, 67, false),
                (0, 64, false),
                (0, 60, false),
            ]
        );
    }

    #[test]
    fn test_trailing_rest_is_kept() {
        let score = Score::new(vec![
            Item::Note(Note::new(tone("C4"), Duration::QUARTER)),
            Item::Rest(Rest::new(Duration::HALF)),
        ]);
        let smf = to_smf(&score, &MidiOptions::default()).unwrap();
        let end = smf.tracks[0].last().unwrap();
        assert_eq!(end.kind, TrackEventKind::Meta(MetaMessage::EndOfTrack));
        assert_eq!(end.delta.as_int(), 48);
    }

    #[test]
    fn test_custom_options() {
        let score = Score::new(vec![Item::Note(Note::new(tone("C4"), Duration::QUARTER))]);
        let options = MidiOptions {
            ticks_per_quarter: 480,
            program: 40,
            velocity: 100,
        };
        let smf = to_smf(&score, &options).unwrap();
        assert_eq!(note_events(&smf), vec![(0, 60, true), (480, 60, false)]);
        assert!(smf.tracks[0].iter().any(|e| matches!(
            e.kind,
            TrackEventKind::Midi {
                message: MidiMessage::NoteOn { vel, .. },
                ..
            } if vel.as_int() == 100
        )));

        let options = MidiOptions {
            velocity: 200,
            ..MidiOptions::default()
        };
        assert!(matches!(to_smf(&score, &options), Err(NoteholeError::Midi(_))));
    }

    #[test]
    fn test_out_of_range_pitch_fails_before_output() {
        let score = Score::new(vec![
            Item::Note(Note::new(tone("C4"), Duration::QUARTER)),
            Item::Note(Note::new(tone("G12"), Duration::QUARTER)),
        ]);
        assert!(matches!(
            to_bytes(&score, &MidiOptions::default()),
            Err(NoteholeError::PitchOutOfRange(_))
        ));
    }

    #[test]
    fn test_empty_score() {
        let smf = to_smf(&Score::default(), &MidiOptions::default()).unwrap();
        assert!(note_events(&smf).is_empty());
    }
}
