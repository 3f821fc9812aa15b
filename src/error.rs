//! # Error Types
//!
//! All errors raised while reading, transforming or exporting music.
//!
//! Errors are local to a single call: nothing is retried and nothing that was
//! already returned is touched. Parsing fails fast on the first malformed or
//! unsupported token; exporters fail before producing any output.
//!
//! ## Usage
//! ```rust
//! use notehole::{parse, NoteholeError};
//!
//! match parse(r"{ c4 \clef bass }") {
//!     Ok(score) => println!("{} items", score.items.len()),
//!     Err(NoteholeError::UnsupportedItem(item)) => eprintln!("cannot read {}", item),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NoteholeError {
    /// Lexer/parser error with location information.
    ///
    /// # Example
    /// ```
    /// # use notehole::NoteholeError;
    /// let err = NoteholeError::ParseError {
    ///     line: 2,
    ///     column: 7,
    ///     message: "unexpected character '%'".to_string(),
    /// };
    /// assert_eq!(err.to_string(), "Parse error at line 2, column 7: unexpected character '%'");
    /// ```
    #[error("Parse error at line {line}, column {column}: {message}")]
    ParseError {
        line: usize,
        column: usize,
        message: String,
    },

    /// A single event, tone or duration token could not be read.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// The source contains something other than a note, chord or rest.
    #[error("{0} is not supported")]
    UnsupportedItem(String),

    /// A reference pitch was required but the input has no pitched event.
    #[error("no music found")]
    NoMusic,

    /// A chord was built from an empty tone set.
    #[error("a chord needs at least one tone")]
    EmptyChord,

    /// A length that no base value and dot count can approximate.
    #[error("Unrepresentable duration: {0}")]
    UnrepresentableDuration(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Invalid YAML front matter.
    ///
    /// # Example
    /// ```
    /// # use notehole::NoteholeError;
    /// let err = NoteholeError::MetadataError("tempo must be positive".to_string());
    /// assert_eq!(err.to_string(), "Invalid metadata: tempo must be positive");
    /// ```
    #[error("Invalid metadata: {0}")]
    MetadataError(String),

    /// The tone has no MIDI key number.
    #[error("Pitch out of MIDI range: {0}")]
    PitchOutOfRange(String),

    #[error("MIDI error: {0}")]
    Midi(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
