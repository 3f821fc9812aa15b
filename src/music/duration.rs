//! Notated durations
//!
//! A duration is a power-of-two note value (`4` = quarter) plus a number of
//! augmentation dots. Each dot adds half of the previous added value, so the
//! length is `(1 / value) * (2 - 2^-dots)` of a whole note.

use std::fmt;
use std::str::FromStr;

use num_rational::Rational32;
use serde::Serialize;

use crate::error::NoteholeError;

/// Exact lengths, in whole notes.
pub type Rational = Rational32;

/// Largest note value the model can write (a 128th note).
pub const SHORTEST_VALUE: u32 = 128;

/// Finest term of `Duration::length`, as a power of two.
const MAX_TERM_SHIFT: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Duration {
    /// Note value as the denominator of a whole note: 1, 2, 4, … 128.
    pub value: u32,
    pub dots: u32,
}

impl Duration {
    pub const WHOLE: Duration = Duration::new(1, 0);
    pub const HALF: Duration = Duration::new(2, 0);
    pub const QUARTER: Duration = Duration::new(4, 0);
    pub const EIGHTH: Duration = Duration::new(8, 0);

    pub const fn new(value: u32, dots: u32) -> Self {
        Self { value, dots }
    }

    /// Whether `value` is a writable note value (a power of two up to 128).
    pub fn is_valid_value(value: u32) -> bool {
        value.is_power_of_two() && value <= SHORTEST_VALUE
    }

    /// Exact length as a fraction of a whole note.
    ///
    /// Terms finer than `1 / 2^30` of a whole note are dropped, so any
    /// number of dots gives a finite, representable length.
    ///
    /// ```
    /// use notehole::{Duration, Rational};
    ///
    /// assert_eq!(Duration::new(4, 1).length(), Rational::new(3, 8));
    /// assert_eq!(Duration::new(2, 2).length(), Rational::new(7, 8));
    /// ```
    pub fn length(&self) -> Rational {
        (0..=self.dots.min(MAX_TERM_SHIFT))
            .map(|i| (self.value as u64) << i)
            .take_while(|&denominator| denominator > 0 && denominator <= 1 << MAX_TERM_SHIFT)
            .map(|denominator| Rational::new(1, denominator as i32))
            .sum()
    }

    /// Most dots a value can carry before the last dot is shorter than a
    /// 128th note.
    pub fn max_dots(value: u32) -> u32 {
        SHORTEST_VALUE
            .trailing_zeros()
            .saturating_sub(value.trailing_zeros())
    }
}

impl Default for Duration {
    fn default() -> Self {
        Duration::QUARTER
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, ".".repeat(self.dots as usize))
    }
}

impl FromStr for Duration {
    type Err = NoteholeError;

    /// Read `<value><dots>`, e.g. `4`, `8.`, `2..`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim_end_matches('.');
        let dots = (s.len() - digits.len()) as u32;
        let value: u32 = digits
            .parse()
            .map_err(|_| NoteholeError::InvalidToken(format!("invalid duration '{}'", s)))?;
        if !Duration::is_valid_value(value) {
            return Err(NoteholeError::InvalidToken(format!(
                "duration value {} is not a power of two up to {}",
                value, SHORTEST_VALUE
            )));
        }
        if dots > Duration::max_dots(value) {
            return Err(NoteholeError::InvalidToken(format!(
                "'{}' has more dots than a {}th note allows",
                s, SHORTEST_VALUE
            )));
        }
        Ok(Duration::new(value, dots))
    }
}
