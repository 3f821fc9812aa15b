//! # Music Model
//!
//! The in-memory representation every other module reads and writes.
//!
//! ## Type Hierarchy
//! ```text
//! Score
//!   ├── title: Option<String>
//!   ├── meter: Meter (beats / bar)
//!   ├── tempo: u16 (quarter notes per minute)
//!   └── Vec<Item>
//!
//! Item (enum)
//!   ├── Note  { tone: Tone, duration: Duration }
//!   ├── Chord { tones: BTreeSet<Tone>, duration: Duration }
//!   └── Rest  { duration: Duration }
//!
//! Tone     { pitch: diatonic step, accidental: -2..=2 }
//! Duration { value: 1 | 2 | 4 | … | 128, dots }
//! ```
//!
//! ## Key Concepts
//!
//! ### Diatonic pitch
//! `pitch = octave * 7 + position`, with positions `0..7` naming C to B.
//! Middle C is `C4`, pitch 28. Octave and position use floored division so
//! negative pitches behave like any other.
//!
//! ### Reflection
//! Every pitched value can be flipped through an axis tone. Flipping is an
//! involution: diatonic distance to the axis changes sign and so does the
//! accidental, so a major third above becomes a major third below.
//!
//! ### Immutability
//! Nothing here is mutated after construction. Every transformation builds a
//! new value; sharing a score between threads needs no synchronisation.
//!
//! ## Token Syntax
//! Items print and parse as compact tokens, handy for tests and the CLI:
//! ```rust
//! use notehole::Item;
//!
//! let chord: Item = "<C4 G4 E4>-2.".parse().unwrap();
//! assert_eq!(chord.to_string(), "<G4 E4 C4>-2.");
//! assert_eq!("R-8".parse::<Item>().unwrap().to_string(), "R-8");
//! ```

mod duration;
mod event;
mod score;
mod tone;


pub use duration::{Duration, Rational, SHORTEST_VALUE};
pub use event::{Chord, Item, Note, Rest};
pub use score::{Meter, Score, DEFAULT_TEMPO};
pub use tone::{
    accidental_symbol, Tone, DEFAULT_OCTAVE, DIATONIC_SEMITONES, MAX_OCTAVE, NB_PITCHES,
    NB_SEMITONES, PITCH_NAMES,
};
