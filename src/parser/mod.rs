//! # Parser
//!
//! Reads optional YAML front matter followed by a LilyPond music block into a
//! [`Score`].
//!
//! ## Supported Input
//! ```text
//! \version "2.18.2"                  (ignored)
//! \relative c' { ... }               relative octaves from c'
//! \relative { ... }                  relative octaves, first note absolute
//! { ... }                            absolute octaves
//!
//! c d e f g a b                      note names
//! cis ees fisis beses as es          accidentals (is = #, es = b)
//! c' c,,                             octave marks
//! c4 c8. c2*2/3                      durations, dots, scaling
//! r4                                 rest
//! <c e g>2                           chord
//! \time 3/4  \tempo 4 = 96  |        meter, tempo, bar check
//! { ... }                            nested sequential blocks
//! ```
//!
//! A note without a duration repeats the previous one (a quarter at first).
//! Written lengths go through [`quantize`], so scaled durations such as
//! tuplets come back as the nearest dotted value. Anything else inside the
//! music block fails with [`NoteholeError::UnsupportedItem`]; text after the
//! block is ignored.
//!
//! ## Entry Points
//! - [`parse()`] - front matter + music into a `Score`
//! - [`parse_document()`] - the same, keeping axis and operations from the front matter

pub mod metadata;
pub mod octave;

use tracing::debug;

use crate::error::NoteholeError;
use crate::lexer::{Lexer, LocatedToken, Token};
use crate::music::{
    Chord, Duration, Item, Meter, Note, Rational, Rest, Score, DEFAULT_TEMPO, SHORTEST_VALUE,
};
use crate::quantize::quantize;
use metadata::{parse_metadata, split_front_matter, Metadata};
use octave::{OctaveResolver, WrittenPitch};

/// Largest numerator or denominator accepted in `*n/m`.
const MAX_FACTOR: u32 = 1024;

/// A parsed source: the music plus what the front matter asks for.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub score: Score,
    pub metadata: Metadata,
}

/// Parse a source into a score.
///
/// Front matter `title` and `tempo` are applied to the score; a front matter
/// tempo wins over `\tempo` in the music.
///
/// ```rust
/// use notehole::parse;
///
/// let score = parse(r"\relative c' { \time 3/4 c4 e g }").unwrap();
/// assert_eq!(score.meter.beats, 3);
/// assert_eq!(score.items[2].to_string(), "G4-4");
/// ```
pub fn parse(source: &str) -> Result<Score, NoteholeError> {
    parse_document(source).map(|document| document.score)
}

pub fn parse_document(source: &str) -> Result<Document, NoteholeError> {
    let sections = split_front_matter(source)?;
    let metadata = match sections.front_matter {
        Some(content) => parse_metadata(content)?,
        None => Metadata::default(),
    };

    let tokens = Lexer::new(sections.body)
        .starting_at_line(sections.body_line)
        .tokenize()?;
    let mut score = Parser::new(tokens).parse_score()?;

    if metadata.title.is_some() {
        score.title = metadata.title.clone();
    }
    if let Some(tempo) = metadata.tempo {
        score.tempo = tempo;
    }

    debug!(items = score.items.len(), "parsed score");
    Ok(Document { score, metadata })
}

/// Parser for the token stream of one source
pub struct Parser {
    tokens: Vec<LocatedToken>,
    position: usize,
    /// Length of the previous event, reused when a duration is omitted.
    last_length: Rational,
    meter: Option<Meter>,
    tempo: Option<u16>,
}

impl Parser {
    pub fn new(tokens: Vec<LocatedToken>) -> Self {
        Self {
            tokens,
            position: 0,
            last_length: Duration::QUARTER.length(),
            meter: None,
            tempo: None,
        }
    }

    fn current(&self) -> Option<&LocatedToken> {
        self.tokens.get(self.position)
    }

    fn peek_token(&self) -> Option<&Token> {
        self.current().map(|t| &t.token)
    }

    fn advance(&mut self) -> Option<LocatedToken> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn error(&self, message: impl Into<String>) -> NoteholeError {
        let (line, column) = match self.current().or_else(|| self.tokens.last()) {
            Some(t) => (t.line, t.column),
            None => (1, 1),
        };
        NoteholeError::ParseError {
            line,
            column,
            message: message.into(),
        }
    }

    fn expect(&mut self, expected: Token, what: &str) -> Result<(), NoteholeError> {
        match self.peek_token() {
            Some(token) if *token == expected => {
                self.advance();
                Ok(())
            }
            _ => Err(self.error(format!("expected {}", what))),
        }
    }

    fn expect_number(&mut self, what: &str) -> Result<u32, NoteholeError> {
        match self.peek_token() {
            Some(Token::Number(n)) => {
                let n = *n;
                self.advance();
                Ok(n)
            }
            _ => Err(self.error(format!("expected {}", what))),
        }
    }

    /// Parse the whole token stream into a score.
    pub fn parse_score(&mut self) -> Result<Score, NoteholeError> {
        self.skip_version();

        let mut resolver = match self.peek_token() {
            Some(Token::Command(name)) if name == "relative" => {
                self.advance();
                let start = if let Some(Token::Word(_)) = self.peek_token() {
                    self.parse_written_pitch()?.absolute()
                } else {
                    self.first_written_pitch()
                        .ok_or(NoteholeError::NoMusic)?
                        .absolute()
                };
                OctaveResolver::relative(start)
            }
            _ => OctaveResolver::Absolute,
        };

        match self.peek_token() {
            Some(Token::LeftBrace) => {
                self.advance();
            }
            Some(token @ Token::Command(_)) => {
                return Err(NoteholeError::UnsupportedItem(token.to_string()));
            }
            _ => return Err(self.error("could not find any music block")),
        }

        let mut items = Vec::new();
        self.parse_music_list(&mut resolver, &mut items)?;

        Ok(Score {
            title: None,
            meter: self.meter.unwrap_or_default(),
            tempo: self.tempo.unwrap_or(DEFAULT_TEMPO),
            items,
        })
    }

    fn skip_version(&mut self) {
        if let Some(Token::Command(name)) = self.peek_token() {
            if name == "version" {
                self.advance();
                if let Some(Token::Text(_)) = self.peek_token() {
                    self.advance();
                }
            }
        }
    }

    /// The first pitch written after the current position, without its marks.
    fn first_written_pitch(&self) -> Option<WrittenPitch> {
        self.tokens[self.position..].iter().find_map(|t| match &t.token {
            Token::Word(word) if word != "r" => written_name(word),
            _ => None,
        })
    }

    /// Parse events up to and including the closing brace of the current block.
    fn parse_music_list(
        &mut self,
        resolver: &mut OctaveResolver,
        items: &mut Vec<Item>,
    ) -> Result<(), NoteholeError> {
        loop {
            let Some(token) = self.peek_token().cloned() else {
                return Err(self.error("music block is not closed with '}'"));
            };

            match token {
                Token::RightBrace => {
                    self.advance();
                    return Ok(());
                }
                Token::LeftBrace => {
                    self.advance();
                    self.parse_music_list(resolver, items)?;
                }
                Token::BarCheck => {
                    self.advance();
                }
                Token::Word(word) if word == "r" => {
                    self.advance();
                    let duration = self.parse_duration()?;
                    items.push(Item::Rest(Rest::new(duration)));
                }
                Token::Word(_) => {
                    let written = self.parse_written_pitch()?;
                    let tone = resolver.note(&written);
                    let duration = self.parse_duration()?;
                    items.push(Item::Note(Note::new(tone, duration)));
                }
                Token::ChordStart => {
                    self.advance();
                    let chord = self.parse_chord(resolver)?;
                    items.push(Item::Chord(chord));
                }
                Token::Command(name) if name == "time" => {
                    self.advance();
                    self.parse_time_signature()?;
                }
                Token::Command(name) if name == "tempo" => {
                    self.advance();
                    self.parse_tempo()?;
                }
                other => return Err(NoteholeError::UnsupportedItem(other.to_string())),
            }
        }
    }

    /// Note name followed by octave marks.
    fn parse_written_pitch(&mut self) -> Result<WrittenPitch, NoteholeError> {
        let mut written = match self.peek_token() {
            Some(Token::Word(word)) => written_name(word)
                .ok_or_else(|| self.error(format!("unknown note name '{}'", word)))?,
            _ => return Err(self.error("expected a note name")),
        };
        self.advance();

        loop {
            match self.peek_token() {
                Some(Token::Apostrophe) => written.marks += 1,
                Some(Token::Comma) => written.marks -= 1,
                _ => break,
            }
            self.advance();
        }
        Ok(written)
    }

    fn parse_chord(&mut self, resolver: &mut OctaveResolver) -> Result<Chord, NoteholeError> {
        let mut pitches = Vec::new();
        loop {
            match self.peek_token() {
                Some(Token::ChordEnd) => {
                    self.advance();
                    break;
                }
                Some(Token::Word(_)) => pitches.push(self.parse_written_pitch()?),
                _ => return Err(self.error("expected a note name or '>' in chord")),
            }
        }
        if pitches.is_empty() {
            return Err(self.error("empty chord"));
        }
        let tones = resolver.chord(&pitches);
        let duration = self.parse_duration()?;
        Chord::new(tones, duration)
    }

    /// Optional `value[dots][*n[/m]]`; without one the previous length is reused.
    fn parse_duration(&mut self) -> Result<Duration, NoteholeError> {
        if let Some(Token::Number(value)) = self.peek_token() {
            let value = *value;
            if !Duration::is_valid_value(value) {
                return Err(self.error(format!("invalid duration {}", value)));
            }
            self.advance();

            let dots = self.parse_dots(value)?;
            let mut length = Duration::new(value, dots).length();
            if let Some(Token::Star) = self.peek_token() {
                self.advance();
                let numerator = self.expect_number("a duration factor")?;
                let denominator = if let Some(Token::Slash) = self.peek_token() {
                    self.advance();
                    self.expect_number("a duration factor denominator")?
                } else {
                    1
                };
                if numerator == 0 || denominator == 0 {
                    return Err(self.error("duration factor must be positive"));
                }
                if numerator > MAX_FACTOR || denominator > MAX_FACTOR {
                    return Err(self.error("duration factor is too large"));
                }
                length *= Rational::new(numerator as i32, denominator as i32);
            }
            self.last_length = length;
        }

        quantize(self.last_length).map_err(|e| self.error(e.to_string()))
    }

    /// Dots after a note value; the last dot may be no shorter than a 128th.
    fn parse_dots(&mut self, value: u32) -> Result<u32, NoteholeError> {
        let mut dots = 0;
        while let Some(Token::Dot) = self.peek_token() {
            if value << (dots + 1) > SHORTEST_VALUE {
                return Err(self.error(format!("too many dots after {}", value)));
            }
            dots += 1;
            self.advance();
        }
        Ok(dots)
    }

    fn parse_time_signature(&mut self) -> Result<(), NoteholeError> {
        let beats = self.expect_number("time signature beats")?;
        self.expect(Token::Slash, "'/' in time signature")?;
        let bar = self.expect_number("time signature beat type")?;

        let (Ok(beats), Ok(bar)) = (u8::try_from(beats), u8::try_from(bar)) else {
            return Err(self.error("time signature out of range"));
        };
        if beats == 0 || !bar.is_power_of_two() {
            return Err(self.error(format!("invalid time signature {}/{}", beats, bar)));
        }

        match self.meter {
            None => self.meter = Some(Meter::new(beats, bar)),
            Some(meter) => debug!(beats, bar, ?meter, "ignoring meter change"),
        }
        Ok(())
    }

    /// `\tempo ["text"] value[dots] = bpm`, stored as quarter notes per minute.
    fn parse_tempo(&mut self) -> Result<(), NoteholeError> {
        if let Some(Token::Text(_)) = self.peek_token() {
            self.advance();
        }
        let value = self.expect_number("tempo note value")?;
        if !Duration::is_valid_value(value) {
            return Err(self.error(format!("invalid tempo note value {}", value)));
        }
        let dots = self.parse_dots(value)?;
        self.expect(Token::Equals, "'=' in tempo")?;
        let bpm = self.expect_number("beats per minute")?;
        if bpm == 0 || bpm > u16::MAX as u32 {
            return Err(self.error(format!("tempo out of range: {}", bpm)));
        }

        let quarters = Duration::new(value, dots).length() * Rational::from_integer(4);
        let quarter_bpm = (Rational::from_integer(bpm as i32) * quarters).round().to_integer();
        let tempo = u16::try_from(quarter_bpm)
            .ok()
            .filter(|&t| t > 0)
            .ok_or_else(|| self.error(format!("tempo out of range: {}", quarter_bpm)))?;

        self.tempo.get_or_insert(tempo);
        Ok(())
    }
}

/// Read a Dutch note name (`c`, `fis`, `bes`, `as`, `eeses`, ...).
fn written_name(word: &str) -> Option<WrittenPitch> {
    let mut chars = word.chars();
    let position = match chars.next()? {
        'c' => 0,
        'd' => 1,
        'e' => 2,
        'f' => 3,
        'g' => 4,
        'a' => 5,
        'b' => 6,
        _ => return None,
    };
    let accidental = match (position, chars.as_str()) {
        (_, "") => 0,
        (_, "is") => 1,
        (_, "isis") => 2,
        (_, "es") => -1,
        (_, "eses") => -2,
        // as, es, ases, eses
        (2 | 5, "s") => -1,
        (2 | 5, "ses") => -2,
        _ => return None,
    };
    Some(WrittenPitch {
        position,
        accidental,
        marks: 0,
    })
}
