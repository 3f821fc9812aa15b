//! Notes, chords and rests
//!
//! [`Item`] is the tagged union the rest of the crate works with. Reflection
//! (`flip`) keeps the shape of an event; folding may widen a note into a chord,
//! which is why both operations return an `Item` at the sequence level.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::duration::Duration;
use super::tone::Tone;
use crate::error::NoteholeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rest {
    pub duration: Duration,
}

impl Rest {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }

    /// A rest has no pitch: reflecting it is the identity.
    pub fn flip(&self, _axis: &Tone) -> Rest {
        *self
    }

    pub fn fold(&self, _axis: &Tone) -> Rest {
        *self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Note {
    pub tone: Tone,
    pub duration: Duration,
}

impl Note {
    pub fn new(tone: Tone, duration: Duration) -> Self {
        Self { tone, duration }
    }

    pub fn flip(&self, axis: &Tone) -> Note {
        Note::new(self.tone.flip(axis), self.duration)
    }

    /// Fold the note onto itself across `axis`.
    ///
    /// A note sitting on the axis is its own mirror image and comes back
    /// unchanged; any other note becomes the two-tone chord `{tone, mirror}`.
    pub fn fold(&self, axis: &Tone) -> Item {
        if self.tone == *axis {
            return Item::Note(*self);
        }
        let tones: BTreeSet<Tone> = [self.tone, self.tone.flip(axis)].into_iter().collect();
        Item::Chord(Chord {
            tones,
            duration: self.duration,
        })
    }
}

/// Simultaneous tones sharing one duration.
///
/// The tone set is never empty. Two tones with the same spelling cannot both
/// be present; reflections that land on the same tone collapse into one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Chord {
    tones: BTreeSet<Tone>,
    pub duration: Duration,
}

impl Chord {
    pub fn new<I>(tones: I, duration: Duration) -> Result<Self, NoteholeError>
    where
        I: IntoIterator<Item = Tone>,
    {
        let tones: BTreeSet<Tone> = tones.into_iter().collect();
        if tones.is_empty() {
            return Err(NoteholeError::EmptyChord);
        }
        Ok(Self { tones, duration })
    }

    pub fn tones(&self) -> &BTreeSet<Tone> {
        &self.tones
    }

    pub fn flip(&self, axis: &Tone) -> Chord {
        Chord {
            tones: self.tones.iter().map(|t| t.flip(axis)).collect(),
            duration: self.duration,
        }
    }

    /// Union of the chord with its own reflection.
    pub fn fold(&self, axis: &Tone) -> Chord {
        let mut tones = self.tones.clone();
        tones.extend(self.tones.iter().map(|t| t.flip(axis)));
        Chord {
            tones,
            duration: self.duration,
        }
    }

    /// Tones from highest to lowest `(pitch, accidental)`.
    pub fn sorted_tones(&self) -> Vec<Tone> {
        self.tones.iter().rev().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.tones.len()
    }
}

/// One event of a score.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Item {
    Rest(Rest),
    Note(Note),
    Chord(Chord),
}

impl Item {
    pub fn duration(&self) -> Duration {
        match self {
            Item::Rest(rest) => rest.duration,
            Item::Note(note) => note.duration,
            Item::Chord(chord) => chord.duration,
        }
    }

    pub fn flip(&self, axis: &Tone) -> Item {
        match self {
            Item::Rest(rest) => Item::Rest(rest.flip(axis)),
            Item::Note(note) => Item::Note(note.flip(axis)),
            Item::Chord(chord) => Item::Chord(chord.flip(axis)),
        }
    }

    pub fn fold(&self, axis: &Tone) -> Item {
        match self {
            Item::Rest(rest) => Item::Rest(rest.fold(axis)),
            Item::Note(note) => note.fold(axis),
            Item::Chord(chord) => Item::Chord(chord.fold(axis)),
        }
    }

    /// The tone a reader hears first: the note itself, or a chord's top tone.
    pub fn lead_tone(&self) -> Option<Tone> {
        match self {
            Item::Rest(_) => None,
            Item::Note(note) => Some(note.tone),
            Item::Chord(chord) => chord.tones.last().copied(),
        }
    }
}

impl From<Rest> for Item {
    fn from(rest: Rest) -> Self {
        Item::Rest(rest)
    }
}

impl From<Note> for Item {
    fn from(note: Note) -> Self {
        Item::Note(note)
    }
}

impl From<Chord> for Item {
    fn from(chord: Chord) -> Self {
        Item::Chord(chord)
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::Rest(rest) => write!(f, "R-{}", rest.duration),
            Item::Note(note) => write!(f, "{}-{}", note.tone, note.duration),
            Item::Chord(chord) => {
                let tones: Vec<String> = chord.sorted_tones().iter().map(Tone::to_string).collect();
                write!(f, "<{}>-{}", tones.join(" "), chord.duration)
            }
        }
    }
}

impl FromStr for Item {
    type Err = NoteholeError;

    /// Read one event: `C#4-8.`, `R-4` or `<G4 E4 C4>-2`.
    ///
    /// A note token must spell its octave, so `B-1` is rejected rather than
    /// read as a whole note at the default octave; write `B-1-1` or `B3-1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (head, duration) = s
            .rsplit_once('-')
            .ok_or_else(|| NoteholeError::InvalidToken(format!("missing duration in '{}'", s)))?;
        let duration: Duration = duration.parse()?;

        if head.eq_ignore_ascii_case("r") {
            return Ok(Item::Rest(Rest::new(duration)));
        }

        if let Some(inner) = head.strip_prefix('<').and_then(|h| h.strip_suffix('>')) {
            let tones = inner
                .split_whitespace()
                .map(str::parse)
                .collect::<Result<Vec<Tone>, _>>()?;
            return Ok(Item::Chord(Chord::new(tones, duration)?));
        }

        if !head.ends_with(|c: char| c.is_ascii_digit()) {
            return Err(NoteholeError::InvalidToken(format!(
                "missing octave or duration in '{}'",
                s
            )));
        }
        Ok(Item::Note(Note::new(head.parse()?, duration)))
    }
}
