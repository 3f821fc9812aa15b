//! # Symmetry Operations
//!
//! Geometric transformations of an event sequence. Time runs left to right
//! and pitch bottom to top, so:
//!
//! - [`reverse`] mirrors the sequence in time
//! - [`flip`] mirrors every pitch through an axis tone
//! - [`rotate_180`] does both
//! - [`horizontal_fold`] overlays each event with its own pitch mirror
//! - [`vertical_fold`] appends the sequence alternately backwards and forwards
//! - [`mobius_fold`] appends the sequence alternately flipped and upright
//!
//! All functions are pure and return a new vector; empty input gives empty
//! output. When no axis is given the caller uses [`DEFAULT_AXIS`].
//!
//! ## Example
//! ```rust
//! use notehole::operations::{rotate_180, DEFAULT_AXIS};
//! use notehole::Item;
//!
//! let items: Vec<Item> = ["C4-4", "E4-8"].iter().map(|t| t.parse().unwrap()).collect();
//! let rotated = rotate_180(&items, &DEFAULT_AXIS);
//! let tokens: Vec<String> = rotated.iter().map(Item::to_string).collect();
//! assert_eq!(tokens, ["F3-8", "A3-4"]);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use tracing::debug;

use crate::error::NoteholeError;
use crate::music::{Item, Score, Tone};

/// Largest repeat count accepted when reading an operation from text.
pub const MAX_REPEATS: usize = 1024;

/// B below middle C, the axis used when none is given.
pub const DEFAULT_AXIS: Tone = Tone::with_octave(6, 3, 0);

pub fn reverse(items: &[Item]) -> Vec<Item> {
    items.iter().rev().cloned().collect()
}

pub fn flip(items: &[Item], axis: &Tone) -> Vec<Item> {
    items.iter().map(|item| item.flip(axis)).collect()
}

/// Reverse the sequence and flip every event.
pub fn rotate_180(items: &[Item], axis: &Tone) -> Vec<Item> {
    flip(&reverse(items), axis)
}

/// Fold every event across `axis`; notes off the axis become two-tone chords.
pub fn horizontal_fold(items: &[Item], axis: &Tone) -> Vec<Item> {
    items.iter().map(|item| item.fold(axis)).collect()
}

/// The sequence followed by `repeats` more copies, alternately reversed and upright.
pub fn vertical_fold(items: &[Item], repeats: usize) -> Vec<Item> {
    let reversed = reverse(items);
    repeat_fold(items, &reversed, repeats)
}

/// The sequence followed by `repeats` more copies, alternately flipped and upright.
pub fn mobius_fold(items: &[Item], repeats: usize, axis: &Tone) -> Vec<Item> {
    let flipped = flip(items, axis);
    repeat_fold(items, &flipped, repeats)
}

/// Cycle 0 is `upright`, odd cycles are `mirrored`, even cycles `upright` again.
fn repeat_fold(upright: &[Item], mirrored: &[Item], repeats: usize) -> Vec<Item> {
    if upright.is_empty() {
        return Vec::new();
    }
    let capacity = repeats
        .checked_add(1)
        .and_then(|cycles| cycles.checked_mul(upright.len()))
        .unwrap_or(0);
    let mut result = Vec::with_capacity(capacity);
    for cycle in 0..=repeats {
        let part = if cycle % 2 == 0 { upright } else { mirrored };
        result.extend_from_slice(part);
    }
    result
}

/// One configured step of a transformation pipeline.
///
/// Operations without an explicit axis use the axis handed to
/// [`Operation::apply`].
///
/// # Syntax
/// `name[:argument]`, as accepted on the command line and in front matter:
///
/// | Text                   | Operation                                   |
/// |------------------------|---------------------------------------------|
/// | `reverse`              | [`Operation::Reverse`]                      |
/// | `flip`, `flip:C4`      | [`Operation::Flip`]                         |
/// | `rotate-180[:axis]`    | [`Operation::Rotate180`]                    |
/// | `horizontal-fold[:axis]` | [`Operation::HorizontalFold`]             |
/// | `vertical-fold[:n]`    | [`Operation::VerticalFold`], `n` defaults to 1 |
/// | `mobius-fold[:n]`      | [`Operation::MobiusFold`], `n` defaults to 1 |
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum Operation {
    Reverse,
    Flip { axis: Option<Tone> },
    Rotate180 { axis: Option<Tone> },
    HorizontalFold { axis: Option<Tone> },
    VerticalFold { repeats: usize },
    MobiusFold { repeats: usize, axis: Option<Tone> },
}

impl Operation {
    pub fn apply(&self, items: &[Item], default_axis: &Tone) -> Vec<Item> {
        let axis = |axis: &Option<Tone>| axis.unwrap_or(*default_axis);
        match self {
            Operation::Reverse => reverse(items),
            Operation::Flip { axis: a } => flip(items, &axis(a)),
            Operation::Rotate180 { axis: a } => rotate_180(items, &axis(a)),
            Operation::HorizontalFold { axis: a } => horizontal_fold(items, &axis(a)),
            Operation::VerticalFold { repeats } => vertical_fold(items, *repeats),
            Operation::MobiusFold { repeats, axis: a } => mobius_fold(items, *repeats, &axis(a)),
        }
    }
}

/// Run `operations` in order over the score's events.
///
/// Title, meter and tempo are carried over unchanged.
pub fn apply_all(score: &Score, operations: &[Operation], default_axis: &Tone) -> Score {
    let items = operations.iter().fold(score.items.clone(), |items, op| {
        let result = op.apply(&items, default_axis);
        debug!(operation = %op, before = items.len(), after = result.len(), "applied operation");
        result
    });
    score.with_items(items)
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let with_axis = |f: &mut fmt::Formatter<'_>, name: &str, axis: &Option<Tone>| match axis {
            Some(axis) => write!(f, "{}:{}", name, axis),
            None => write!(f, "{}", name),
        };
        match self {
            Operation::Reverse => write!(f, "reverse"),
            Operation::Flip { axis } => with_axis(f, "flip", axis),
            Operation::Rotate180 { axis } => with_axis(f, "rotate-180", axis),
            Operation::HorizontalFold { axis } => with_axis(f, "horizontal-fold", axis),
            Operation::VerticalFold { repeats } => write!(f, "vertical-fold:{}", repeats),
            Operation::MobiusFold { repeats, axis: None } => write!(f, "mobius-fold:{}", repeats),
            Operation::MobiusFold {
                repeats,
                axis: Some(axis),
            } => write!(f, "mobius-fold:{}:{}", repeats, axis),
        }
    }
}

impl FromStr for Operation {
    type Err = NoteholeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split(':');
        let name = parts.next().unwrap_or_default().to_ascii_lowercase();
        let args: Vec<&str> = parts.collect();

        let invalid = |reason: &str| NoteholeError::InvalidOperation(format!("'{}': {}", s, reason));
        let axis_at = |index: usize| -> Result<Option<Tone>, NoteholeError> {
            args.get(index)
                .map(|text| text.parse::<Tone>().map_err(|_| invalid("invalid axis tone")))
                .transpose()
        };
        let repeats = || -> Result<usize, NoteholeError> {
            args.first()
                .map(|text| text.parse::<usize>().map_err(|_| invalid("invalid repeat count")))
                .transpose()?
                .map_or(Ok(1), |n| {
                    if n > MAX_REPEATS {
                        Err(invalid("repeat count is too large"))
                    } else {
                        Ok(n)
                    }
                })
        };
        let max_args = |n: usize| {
            if args.len() > n {
                Err(invalid("too many arguments"))
            } else {
                Ok(())
            }
        };

        let op = match name.as_str() {
            "reverse" => {
                max_args(0)?;
                Operation::Reverse
            }
            "flip" => {
                max_args(1)?;
                Operation::Flip { axis: axis_at(0)? }
            }
            "rotate-180" | "rotate" => {
                max_args(1)?;
                Operation::Rotate180 { axis: axis_at(0)? }
            }
            "horizontal-fold" => {
                max_args(1)?;
                Operation::HorizontalFold { axis: axis_at(0)? }
            }
            "vertical-fold" => {
                max_args(1)?;
                Operation::VerticalFold { repeats: repeats()? }
            }
            "mobius-fold" => {
                max_args(2)?;
                Operation::MobiusFold {
                    repeats: repeats()?,
                    axis: axis_at(1)?,
                }
            }
            _ => return Err(invalid("unknown operation")),
        };
        Ok(op)
    }
}

impl TryFrom<String> for Operation {
    type Error = NoteholeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
