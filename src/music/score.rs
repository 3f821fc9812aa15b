use serde::Serialize;

use super::event::Item;
use super::tone::Tone;

/// Time signature: `beats` per bar, each worth `1/bar` of a whole note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Meter {
    pub beats: u8,
    pub bar: u8,
}

impl Meter {
    pub const fn new(beats: u8, bar: u8) -> Self {
        Self { beats, bar }
    }
}

impl Default for Meter {
    fn default() -> Self {
        Self { beats: 4, bar: 4 }
    }
}

/// Tempo used when the source does not give one, in quarter notes per minute.
pub const DEFAULT_TEMPO: u16 = 120;

/// An ordered sequence of events with its header.
///
/// Built once by the parser; the symmetry operations and exporters only read
/// it and produce new sequences.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Score {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub meter: Meter,
    pub tempo: u16,
    pub items: Vec<Item>,
}

impl Default for Score {
    fn default() -> Self {
        Self {
            title: None,
            meter: Meter::default(),
            tempo: DEFAULT_TEMPO,
            items: Vec::new(),
        }
    }
}

impl Score {
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    /// A score with the same title, meter and tempo but different events.
    pub fn with_items(&self, items: Vec<Item>) -> Score {
        Score {
            title: self.title.clone(),
            meter: self.meter,
            tempo: self.tempo,
            items,
        }
    }

    /// The first tone that sounds, if any.
    pub fn first_tone(&self) -> Option<Tone> {
        self.items.iter().find_map(Item::lead_tone)
    }
}

impl<'a> IntoIterator for &'a Score {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
