//! YAML front matter
//!
//! A source may start with a block between two `---` lines:
//!
//! ```text
//! ---
//! title: Canon
//! tempo: 96
//! axis: B3
//! operations: [rotate-180, "vertical-fold:1"]
//! ---
//! ```

use serde::Deserialize;

use crate::error::NoteholeError;
use crate::music::Tone;
use crate::operations::Operation;

/// Raw metadata for YAML deserialization
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case")]
pub struct RawMetadata {
    pub title: Option<String>,
    pub tempo: Option<u16>,
    pub axis: Option<String>,
    pub operations: Option<Vec<Operation>>,
}

/// Document metadata from the front matter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    pub title: Option<String>,
    pub tempo: Option<u16>,
    /// Axis for operations that do not name their own.
    pub axis: Option<Tone>,
    pub operations: Vec<Operation>,
}

/// Front matter split off a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sections<'a> {
    pub front_matter: Option<&'a str>,
    pub body: &'a str,
    /// Line number (1-based) where `body` starts in the original source.
    pub body_line: usize,
}

/// Separate the front matter block, if any, from the music.
pub fn split_front_matter(source: &str) -> Result<Sections<'_>, NoteholeError> {
    let mut lines = source.split_inclusive('\n');
    let first = lines.next().unwrap_or_default();
    if first.trim_end() != "---" {
        return Ok(Sections {
            front_matter: None,
            body: source,
            body_line: 1,
        });
    }

    let start = first.len();
    let mut offset = start;
    for (index, line) in lines.enumerate() {
        if line.trim_end() == "---" {
            return Ok(Sections {
                front_matter: Some(&source[start..offset]),
                body: &source[offset + line.len()..],
                // opening marker, `index` content lines, closing marker
                body_line: index + 3,
            });
        }
        offset += line.len();
    }

    Err(NoteholeError::MetadataError(
        "front matter is not closed with ---".to_string(),
    ))
}

pub fn parse_metadata(content: &str) -> Result<Metadata, NoteholeError> {
    if content.trim().is_empty() {
        return Ok(Metadata::default());
    }

    let raw: RawMetadata =
        serde_yaml::from_str(content).map_err(|e| NoteholeError::MetadataError(e.to_string()))?;

    if raw.tempo == Some(0) {
        return Err(NoteholeError::MetadataError(
            "tempo must be positive".to_string(),
        ));
    }

    let axis = raw
        .axis
        .as_deref()
        .map(|text| {
            text.parse::<Tone>()
                .map_err(|_| NoteholeError::MetadataError(format!("Invalid axis: {}", text)))
        })
        .transpose()?;

    Ok(Metadata {
        title: raw.title,
        tempo: raw.tempo,
        axis,
        operations: raw.operations.unwrap_or_default(),
    })
}
