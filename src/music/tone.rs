//! Diatonic tones
//!
//! A tone is a diatonic step (`octave * 7 + scale degree`) plus a chromatic
//! accidental. Spelling matters: `C#4` and `Db4` sound the same but are
//! different tones, and reflecting one yields a different tone than the other.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::NoteholeError;

/// Number of diatonic steps in an octave.
pub const NB_PITCHES: i32 = 7;

/// Number of semitones in an octave.
pub const NB_SEMITONES: i32 = 12;

/// Octave used when a tone is written without one.
pub const DEFAULT_OCTAVE: i32 = 3;

/// Semitone offset of each scale degree above C.
pub const DIATONIC_SEMITONES: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];

/// Octaves accepted when reading a tone, `-MAX_OCTAVE..=MAX_OCTAVE`.
pub const MAX_OCTAVE: i32 = 1000;

/// Letter names of the scale degrees.
pub const PITCH_NAMES: [char; 7] = ['C', 'D', 'E', 'F', 'G', 'A', 'B'];

/// A diatonic pitch with an accidental.
///
/// Equality, hashing and ordering all use `(pitch, accidental)`.
///
/// # Examples
/// ```
/// use notehole::Tone;
///
/// let b3 = Tone::with_octave(6, 3, 0);
/// assert_eq!(b3.pitch, 27);
/// assert_eq!(b3.to_string(), "B3");
/// assert_eq!("B3".parse::<Tone>().unwrap(), b3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Tone {
    /// Diatonic step, `octave * 7 + position`.
    pub pitch: i32,
    /// Semitone offset in `-2..=2` (double flat to double sharp).
    pub accidental: i8,
}

impl Tone {
    pub const fn new(pitch: i32, accidental: i8) -> Self {
        Self { pitch, accidental }
    }

    /// Build a tone from a scale degree (0 = C … 6 = B) and an octave.
    pub const fn with_octave(position: i32, octave: i32, accidental: i8) -> Self {
        Self::new(octave * NB_PITCHES + position, accidental)
    }

    pub fn octave(&self) -> i32 {
        self.pitch.div_euclid(NB_PITCHES)
    }

    /// Scale degree in `0..7`.
    pub fn position(&self) -> i32 {
        self.pitch.rem_euclid(NB_PITCHES)
    }

    /// Absolute chromatic pitch, `C0 = 0`.
    ///
    /// Saturates at the bounds of `i32` for pitches a few hundred million
    /// octaves out.
    pub fn semitone(&self) -> i32 {
        let semitone = self.octave() as i64 * NB_SEMITONES as i64
            + DIATONIC_SEMITONES[self.position() as usize] as i64
            + self.accidental as i64;
        semitone.clamp(i32::MIN as i64, i32::MAX as i64) as i32
    }

    /// Reflect this tone through `axis`.
    ///
    /// The diatonic step is mirrored around the axis step and the accidental
    /// is negated, so reflecting twice gives back the original tone.
    ///
    /// ```
    /// use notehole::Tone;
    ///
    /// let axis: Tone = "B3".parse().unwrap();
    /// let c_sharp: Tone = "C#4".parse().unwrap();
    /// assert_eq!(c_sharp.flip(&axis).to_string(), "Ab3");
    /// assert_eq!(c_sharp.flip(&axis).flip(&axis), c_sharp);
    /// ```
    ///
    /// Defined for every pair of tones: the step arithmetic wraps, which keeps
    /// the reflection an involution even at the ends of the `i32` range.
    pub fn flip(&self, axis: &Tone) -> Tone {
        Tone::new(
            axis.pitch.wrapping_mul(2).wrapping_sub(self.pitch),
            self.accidental.wrapping_neg(),
        )
    }

    pub fn name(&self) -> char {
        PITCH_NAMES[self.position() as usize]
    }
}

/// Written symbol of an accidental, `None` outside the double-flat..double-sharp range.
pub fn accidental_symbol(accidental: i8) -> Option<&'static str> {
    match accidental {
        -2 => Some("bb"),
        -1 => Some("b"),
        0 => Some(""),
        1 => Some("#"),
        2 => Some("X"),
        _ => None,
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())?;
        match accidental_symbol(self.accidental) {
            Some(symbol) => write!(f, "{}", symbol)?,
            None => write!(f, "({:+})", self.accidental)?,
        }
        write!(f, "{}", self.octave())
    }
}

impl FromStr for Tone {
    type Err = NoteholeError;

    /// Read `<letter>[accidental][octave]`, e.g. `c`, `F#4`, `Bbb2`, `gX-1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || NoteholeError::InvalidToken(format!("invalid tone '{}'", s));

        let mut chars = s.chars();
        let letter = chars.next().ok_or_else(invalid)?.to_ascii_uppercase();
        let position = PITCH_NAMES
            .iter()
            .position(|&name| name == letter)
            .ok_or_else(invalid)? as i32;

        let rest = chars.as_str();
        let (accidental, rest) = if let Some(r) = rest.strip_prefix("bb") {
            (-2, r)
        } else if let Some(r) = rest.strip_prefix('b') {
            (-1, r)
        } else if let Some(r) = rest.strip_prefix('#') {
            (1, r)
        } else if let Some(r) = rest.strip_prefix('X') {
            (2, r)
        } else {
            (0, rest)
        };

        let octave = if rest.is_empty() {
            DEFAULT_OCTAVE
        } else {
            rest.parse::<i32>().map_err(|_| invalid())?
        };
        if !(-MAX_OCTAVE..=MAX_OCTAVE).contains(&octave) {
            return Err(NoteholeError::InvalidToken(format!(
                "octave {} of '{}' is outside -{}..={}",
                octave, s, MAX_OCTAVE, MAX_OCTAVE
            )));
        }

        Ok(Tone::with_octave(position, octave, accidental))
    }
}
