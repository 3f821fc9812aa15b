//! # Duration Quantization
//!
//! The two numeric bridges between [`Duration`] and the outside world:
//!
//! - [`duration_to_ticks`] - notated duration to MIDI ticks, for performance export
//! - [`quantize`] - exact length (a fraction of a whole note) to the closest
//!   writable duration, for notation import
//!
//! ## Tick Rounding
//! Each dot contributes its own truncated tick count, so at coarse
//! resolutions a heavily dotted note loses a tick or two. The result is
//! reproducible and matches what the exporter has always written.
//!
//! ```rust
//! use notehole::{duration_to_ticks, Duration, TICKS_PER_QUARTER};
//!
//! assert_eq!(duration_to_ticks(&Duration::new(4, 0), TICKS_PER_QUARTER), 24);
//! assert_eq!(duration_to_ticks(&Duration::new(4, 1), TICKS_PER_QUARTER), 36);
//! // 6 + 3 + 1 (the 64th note's 1.5 ticks truncate to 1)
//! assert_eq!(duration_to_ticks(&Duration::new(16, 2), TICKS_PER_QUARTER), 10);
//! ```
//!
//! ## Lossy Lengths
//! Lengths that need more precision than a 128th-note dot are rounded to the
//! nearest writable value rather than rejected. The loss is logged at debug
//! level.

use tracing::debug;

use crate::error::NoteholeError;
use crate::music::{Duration, Rational, SHORTEST_VALUE};

/// Resolution of exported performances, in ticks per quarter note.
pub const TICKS_PER_QUARTER: u32 = 24;

/// Base note values tried by [`quantize`], longest first.
const BASE_VALUES: [u32; 8] = [1, 2, 4, 8, 16, 32, 64, 128];

/// Number of ticks a duration lasts at the given resolution.
pub fn duration_to_ticks(duration: &Duration, ticks_per_quarter: u32) -> u32 {
    if duration.value == 0 {
        return 0;
    }
    let whole = ticks_per_quarter as u64 * 4;
    let mut value = duration.value as u64;
    let mut total = 0u64;
    for _ in 0..=duration.dots {
        // every later term truncates to zero
        if value > whole {
            break;
        }
        total += whole / value;
        value *= 2;
    }
    total as u32
}

/// Convert an exact length, in whole notes, into a base value plus dots.
///
/// The base is the longest value `v` with `floor(length * v) == 1`; dots are
/// added while the remainder is positive and the next dot is no shorter than
/// a 128th note.
///
/// # Errors
/// Returns [`NoteholeError::UnrepresentableDuration`] for lengths that are not
/// positive or that reach a breve (two whole notes).
///
/// ```
/// use notehole::{quantize, Duration, Rational};
///
/// assert_eq!(quantize(Rational::new(3, 8)).unwrap(), Duration::new(4, 1));
/// assert_eq!(quantize(Rational::new(1, 6)).unwrap(), Duration::new(8, 1));
/// ```
pub fn quantize(length: Rational) -> Result<Duration, NoteholeError> {
    let zero = Rational::from_integer(0);
    if length <= zero || length >= Rational::from_integer(2) {
        return Err(NoteholeError::UnrepresentableDuration(format!(
            "{} of a whole note",
            length
        )));
    }

    let Some(&value) = BASE_VALUES
        .iter()
        .find(|&&v| (length * Rational::from_integer(v as i32)).to_integer() == 1)
    else {
        debug!(%length, "shorter than a {}th note, rounding up", SHORTEST_VALUE);
        return Ok(Duration::new(SHORTEST_VALUE, 0));
    };

    let base = Rational::new(1, value as i32);
    let smallest_dot = Rational::new(1, SHORTEST_VALUE as i32);
    let mut remainder = length % base;
    let mut factor = base / 2;
    let mut dots = 0;
    while remainder > zero && factor >= smallest_dot {
        remainder -= factor;
        dots += 1;
        factor /= 2;
    }

    if remainder != zero {
        debug!(%length, %remainder, value, dots, "length quantized with loss");
    }
    Ok(Duration::new(value, dots))
}
