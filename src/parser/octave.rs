//! Octave resolution
//!
//! LilyPond writes a pitch as a note name plus octave marks (`'` up, `,`
//! down). How the marks are read depends on the mode:
//!
//! - **absolute**: marks count octaves from the octave of `c` (C3)
//! - **relative**: the unmarked name lands on the nearest pitch of that scale
//!   degree to the previous pitch (at most a fourth away), then marks shift it
//!
//! [`relative_marks`] is the inverse, used when writing relative music back out.

use crate::music::{Tone, NB_PITCHES};

/// Octave of an unmarked note name in absolute mode.
pub const BASE_OCTAVE: i32 = 3;

/// A pitch as written: scale degree, accidental, and net octave marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrittenPitch {
    pub position: i32,
    pub accidental: i8,
    pub marks: i32,
}

impl WrittenPitch {
    pub fn absolute(&self) -> Tone {
        Tone::with_octave(self.position, BASE_OCTAVE + self.marks, self.accidental)
    }

    /// Resolve against the previous pitch of relative music.
    pub fn relative_to(&self, last: &Tone) -> Tone {
        let step = nearest_step(last.position(), self.position);
        Tone::new(last.pitch + step + self.marks * NB_PITCHES, self.accidental)
    }
}

/// Signed diatonic distance from `from` to the closest `to`, in `-3..=3`.
///
/// A distance of exactly a fifth resolves downwards, as a fourth.
fn nearest_step(from: i32, to: i32) -> i32 {
    let up = (to - from).rem_euclid(NB_PITCHES);
    if up > 3 {
        up - NB_PITCHES
    } else {
        up
    }
}

/// Octave marks needed to write `current` after `previous` in relative mode.
///
/// ```
/// use notehole::parser::octave::relative_marks;
/// use notehole::Tone;
///
/// let c4: Tone = "C4".parse().unwrap();
/// assert_eq!(relative_marks(&c4, &"G4".parse().unwrap()), 1);
/// assert_eq!(relative_marks(&c4, &"F4".parse().unwrap()), 0);
/// assert_eq!(relative_marks(&c4, &"E3".parse().unwrap()), -1);
/// ```
pub fn relative_marks(previous: &Tone, current: &Tone) -> i32 {
    let delta = current.pitch - previous.pitch;
    let step = nearest_step(previous.position(), current.position());
    (delta - step) / NB_PITCHES
}

/// Tracks the octave mode while reading a music block.
#[derive(Debug, Clone)]
pub enum OctaveResolver {
    Absolute,
    Relative { last: Tone },
}

impl OctaveResolver {
    pub fn relative(start: Tone) -> Self {
        OctaveResolver::Relative { last: start }
    }

    pub fn note(&mut self, written: &WrittenPitch) -> Tone {
        match self {
            OctaveResolver::Absolute => written.absolute(),
            OctaveResolver::Relative { last } => {
                let tone = written.relative_to(last);
                *last = tone;
                tone
            }
        }
    }

    /// Resolve the pitches of a chord in written order.
    ///
    /// Each pitch is relative to the one before it; afterwards the cursor
    /// rests on the chord's first pitch.
    pub fn chord(&mut self, written: &[WrittenPitch]) -> Vec<Tone> {
        match self {
            OctaveResolver::Absolute => written.iter().map(WrittenPitch::absolute).collect(),
            OctaveResolver::Relative { last } => {
                let mut previous = *last;
                let tones: Vec<Tone> = written
                    .iter()
                    .map(|w| {
                        previous = w.relative_to(&previous);
                        previous
                    })
                    .collect();
                if let Some(first) = tones.first() {
                    *last = *first;
                }
                tones
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(position: i32, marks: i32) -> WrittenPitch {
        WrittenPitch {
            position,
            accidental: 0,
            marks,
        }
    }

    fn tone(text: &str) -> Tone {
        text.parse().unwrap()
    }

    #[test]
    fn test_absolute_octaves() {
        assert_eq!(written(0, 0).absolute(), tone("C3"));
        assert_eq!(written(0, 1).absolute(), tone("C4"));
        assert_eq!(written(6, -1).absolute(), tone("B2"));
    }

    #[test]
    fn test_relative_goes_to_nearest() {
        let c4 = tone("C4");
        assert_eq!(written(3, 0).relative_to(&c4), tone("F4")); // up a fourth
        assert_eq!(written(4, 0).relative_to(&c4), tone("G3")); // down a fourth
        assert_eq!(written(6, 0).relative_to(&c4), tone("B3"));
        assert_eq!(written(4, 1).relative_to(&c4), tone("G4"));
        assert_eq!(written(0, -2).relative_to(&c4), tone("C2"));
    }

    #[test]
    fn test_relative_ignores_accidentals_of_the_previous_pitch() {
        let f_sharp = tone("F#4");
        let b_flat = WrittenPitch {
            position: 6,
            accidental: -1,
            marks: 0,
        };
        assert_eq!(b_flat.relative_to(&f_sharp), tone("Bb4"));
    }

    #[test]
    fn test_relative_marks_inverts_relative_to() {
        let previous = tone("E4");
        for pitch in 0..60 {
            let current = Tone::new(pitch, 0);
            let marks = relative_marks(&previous, &current);
            assert_eq!(written(current.position(), marks).relative_to(&previous), current);
        }
    }

    #[test]
    fn test_resolver_tracks_last_pitch() {
        let mut resolver = OctaveResolver::relative(tone("C4"));
        // c' d e f g a b c: one octave scale up
        let scale: Vec<Tone> = (0..8)
            .map(|i| resolver.note(&written(i % 7, 0)))
            .collect();
        assert_eq!(scale.first(), Some(&tone("C4")));
        assert_eq!(scale.last(), Some(&tone("C5")));
    }

    #[test]
    fn test_resolver_chord_chains_then_returns_to_first() {
        let mut resolver = OctaveResolver::relative(tone("C4"));
        let chord = resolver.chord(&[written(0, 0), written(2, 0), written(4, 0), written(0, 0)]);
        assert_eq!(chord, vec![tone("C4"), tone("E4"), tone("G4"), tone("C5")]);
        // next note is read from the chord's first pitch, C4
        assert_eq!(resolver.note(&written(5, 0)), tone("A3"));
    }

    #[test]
    fn test_absolute_resolver_has_no_memory() {
        let mut resolver = OctaveResolver::Absolute;
        assert_eq!(resolver.note(&written(0, 2)), tone("C5"));
        assert_eq!(resolver.note(&written(1, 0)), tone("D3"));
    }
}
