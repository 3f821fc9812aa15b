//! # Public API
//!
//! Entry points that run a whole source through the pipeline: parse, apply
//! the front matter's symmetry operations, then export.
//!
//! ## Pipeline Functions
//!
//! - [`transform()`] - parse and apply the front matter operations
//! - [`transform_with()`] - the same, with extra operations and an axis override
//! - [`compile_midi()`] - transformed score as `.mid` bytes
//! - [`compile_lilypond()`] - transformed score as LilyPond text
//!
//! ## Typical Usage
//!
//! ```rust
//! use notehole::compile_lilypond;
//!
//! let source = r"---
//! title: Mirror
//! axis: C4
//! operations: [flip]
//! ---
//! \relative c' { e4 d c }
//! ";
//!
//! let text = compile_lilypond(source)?;
//! assert!(text.contains("\\relative a {"));
//! # Ok::<(), notehole::NoteholeError>(())
//! ```

use tracing::debug;

use crate::error::NoteholeError;
use crate::lilypond::to_lilypond;
use crate::midi::{to_bytes, MidiOptions};
use crate::music::{Score, Tone};
use crate::operations::{apply_all, Operation, DEFAULT_AXIS};
use crate::parser::parse_document;

/// Parse a source and apply the operations listed in its front matter.
///
/// Operations that do not name an axis use the front matter `axis`, or B3.
///
/// # Errors
/// Returns [`NoteholeError`] if the front matter or the music cannot be read.
pub fn transform(source: &str) -> Result<Score, NoteholeError> {
    transform_with(source, &[], None)
}

/// Parse a source, then apply its front matter operations followed by
/// `extra` operations.
///
/// `axis` replaces the front matter axis as the default for operations that
/// do not name one.
///
/// ```rust
/// use notehole::{transform_with, Operation};
///
/// let score = transform_with(r"\relative c' { c d e }", &[Operation::Reverse], None)?;
/// assert_eq!(score.items[0].to_string(), "E4-4");
/// # Ok::<(), notehole::NoteholeError>(())
/// ```
pub fn transform_with(
    source: &str,
    extra: &[Operation],
    axis: Option<Tone>,
) -> Result<Score, NoteholeError> {
    let document = parse_document(source)?;
    let axis = axis.or(document.metadata.axis).unwrap_or(DEFAULT_AXIS);

    let operations: Vec<Operation> = document
        .metadata
        .operations
        .iter()
        .chain(extra)
        .cloned()
        .collect();
    debug!(count = operations.len(), %axis, "applying operations");

    Ok(apply_all(&document.score, &operations, &axis))
}

/// Compile a source to a Standard MIDI File with default options.
///
/// # Errors
/// Returns [`NoteholeError`] if parsing fails or a pitch has no MIDI key.
pub fn compile_midi(source: &str) -> Result<Vec<u8>, NoteholeError> {
    let score = transform(source)?;
    to_bytes(&score, &MidiOptions::default())
}

/// Compile a source to LilyPond text.
///
/// # Errors
/// Returns [`NoteholeError`] if parsing fails or the result has no pitched
/// event.
pub fn compile_lilypond(source: &str) -> Result<String, NoteholeError> {
    let score = transform(source)?;
    to_lilypond(&score, "")
}
