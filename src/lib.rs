pub mod api;
pub mod error;
pub mod lexer;
pub mod lilypond;
pub mod midi;
pub mod music;
pub mod operations;
pub mod parser;
pub mod quantize;

pub use api::{compile_lilypond, compile_midi, transform, transform_with};
pub use error::*;
pub use lilypond::{to_lilypond, LilypondExporter};
pub use midi::{to_bytes, to_smf, write_midi, MidiOptions};
pub use music::*;
pub use operations::{apply_all, Operation, DEFAULT_AXIS};
pub use parser::{parse, parse_document, Document};
pub use quantize::{duration_to_ticks, quantize, TICKS_PER_QUARTER};
