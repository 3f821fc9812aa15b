//! # LilyPond Export
//!
//! Writes scores back out as relative-octave LilyPond text, in the same
//! subset [`crate::parser`] reads. Several scores can be appended to one
//! exporter; they share a single `\relative` block whose start pitch is the
//! first tone of the first score.
//!
//! ```rust
//! use notehole::{lilypond::to_lilypond, parse};
//!
//! let score = parse(r"\relative c' { c4 g' <c e>2 }").unwrap();
//! let text = to_lilypond(&score, "").unwrap();
//! assert!(text.contains(r"\relative c' {"));
//! assert!(text.contains("c4 g'4 <e' c>2"));
//! ```

use std::fmt::Write;
use std::path::Path;

use tracing::info;

use crate::error::NoteholeError;
use crate::music::{Duration, Item, Meter, Score, Tone};
use crate::parser::octave::{relative_marks, BASE_OCTAVE};

const LILYPOND_VERSION: &str = "2.18.2";

const NOTE_NAMES: [&str; 7] = ["c", "d", "e", "f", "g", "a", "b"];

fn accidental_suffix(accidental: i8) -> Option<&'static str> {
    match accidental {
        -2 => Some("eses"),
        -1 => Some("es"),
        0 => Some(""),
        1 => Some("is"),
        2 => Some("isis"),
        _ => None,
    }
}

fn octave_marks(marks: i32) -> String {
    let mark = if marks > 0 { "'" } else { "," };
    mark.repeat(marks.unsigned_abs() as usize)
}

/// Note name, accidental and octave marks, e.g. `fis''`.
fn format_tone(tone: &Tone, marks: i32) -> Result<String, NoteholeError> {
    let accidental = accidental_suffix(tone.accidental).ok_or_else(|| {
        NoteholeError::InvalidToken(format!("no LilyPond spelling for {}", tone))
    })?;
    Ok(format!(
        "{}{}{}",
        NOTE_NAMES[tone.position() as usize],
        accidental,
        octave_marks(marks)
    ))
}

fn format_duration(duration: &Duration) -> String {
    format!("{}{}", duration.value, ".".repeat(duration.dots as usize))
}

fn format_meter(meter: &Meter) -> String {
    format!("\\time {}/{}", meter.beats, meter.bar)
}

/// Accumulates scores into one LilyPond document.
#[derive(Debug, Default)]
pub struct LilypondExporter {
    tokens: Vec<String>,
    start_tone: Option<Tone>,
    last_tone: Option<Tone>,
    extra: String,
}

impl LilypondExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a score's meter and events, plus `extra` text placed after
    /// the music block (e.g. a `\layout` or `\midi` block).
    ///
    /// The first appended score must contain a pitched event; the exporter
    /// is left unchanged when this fails.
    pub fn append(&mut self, score: &Score, extra: &str) -> Result<(), NoteholeError> {
        let start = match self.start_tone {
            Some(tone) => tone,
            None => score.first_tone().ok_or(NoteholeError::NoMusic)?,
        };

        let mut last = self.last_tone.unwrap_or(start);
        let mut tokens = vec![format_meter(&score.meter)];
        for item in score.iter() {
            tokens.push(format_item(item, &mut last)?);
        }

        self.start_tone = Some(start);
        self.last_tone = Some(last);
        self.tokens.extend(tokens);
        self.extra.push_str(extra);
        Ok(())
    }

    /// The full document text.
    pub fn render(&self) -> Result<String, NoteholeError> {
        let start = self.start_tone.ok_or(NoteholeError::NoMusic)?;
        let start = format_tone(&start, start.octave() - BASE_OCTAVE)?;

        let mut out = String::new();
        let _ = writeln!(out, "\\version \"{}\"", LILYPOND_VERSION);
        let _ = writeln!(out);
        let _ = writeln!(out, "\\relative {} {{", start);
        let _ = writeln!(out, "    {}", self.tokens.join(" "));
        let _ = writeln!(out, "}}");
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", self.extra);
        Ok(out)
    }

    pub fn save(&self, path: &Path) -> Result<(), NoteholeError> {
        let text = self.render()?;
        std::fs::write(path, text)?;
        info!(path = %path.display(), "wrote LilyPond file");
        Ok(())
    }
}

/// Format one event, moving `last` to the pitch the next event is read from.
fn format_item(item: &Item, last: &mut Tone) -> Result<String, NoteholeError> {
    match item {
        Item::Rest(rest) => Ok(format!("r{}", format_duration(&rest.duration))),
        Item::Note(note) => {
            let tone = format_tone(&note.tone, relative_marks(last, &note.tone))?;
            *last = note.tone;
            Ok(format!("{}{}", tone, format_duration(&note.duration)))
        }
        Item::Chord(chord) => {
            let tones = chord.sorted_tones();
            let mut previous = *last;
            let mut written = Vec::with_capacity(tones.len());
            for tone in &tones {
                written.push(format_tone(tone, relative_marks(&previous, tone))?);
                previous = *tone;
            }
            // the parser reads the next event from the chord's first pitch
            if let Some(top) = tones.first() {
                *last = *top;
            }
            Ok(format!("<{}>{}", written.join(" "), format_duration(&chord.duration)))
        }
    }
}

/// Render a single score.
pub fn to_lilypond(score: &Score, extra: &str) -> Result<String, NoteholeError> {
    let mut exporter = LilypondExporter::new();
    exporter.append(score, extra)?;
    exporter.render()
}

/// Render a single score into `path`.
pub fn write_lilypond(score: &Score, path: &Path, extra: &str) -> Result<(), NoteholeError> {
    let mut exporter = LilypondExporter::new();
    exporter.append(score, extra)?;
    exporter.save(path)
}
