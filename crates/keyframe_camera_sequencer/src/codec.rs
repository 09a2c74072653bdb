// SPDX-License-Identifier: MIT OR Apache-2.0
//! Line-oriented text format for persisted sequences.
//!
//! ```text
//! anchorX,anchorZ,preserve
//! timestamp,focalX,focalY,focalZ,pitch,yaw,scale,EASE
//! ...
//! ```
//!
//! The header line is optional so files written before location
//! preservation existed still load. Floats are written with the shortest
//! representation that parses back to the same value.

use crate::keyframe::{EaseType, Keyframe, Pose, UnknownEaseType};
use crate::sequence::{LocationAnchor, Sequence};
use std::fmt::Write as _;
use std::str::FromStr;
use thiserror::Error;

const HEADER_FIELDS: usize = 3;
const KEYFRAME_FIELDS: usize = 8;

/// Errors raised while reading a persisted sequence
#[derive(Debug, Error)]
pub enum CodecError {
    /// Wrong number of comma-separated fields
    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        /// 1-based line number
        line: usize,
        /// Fields required
        expected: usize,
        /// Fields present
        found: usize,
    },

    /// A field did not parse
    #[error("line {line}: invalid {field}: {value:?}")]
    InvalidField {
        /// 1-based line number
        line: usize,
        /// Field name
        field: &'static str,
        /// Raw text
        value: String,
    },

    /// Ease type name not recognised
    #[error("line {line}: {source}")]
    UnknownEase {
        /// 1-based line number
        line: usize,
        /// Underlying error
        #[source]
        source: UnknownEaseType,
    },

    /// Timestamps must start at zero and never decrease
    #[error("line {line}: timestamp {timestamp}ms is out of order")]
    TimestampOrder {
        /// 1-based line number
        line: usize,
        /// Offending timestamp
        timestamp: u64,
    },
}

/// Serialize a sequence to text
pub fn serialize(sequence: &Sequence) -> String {
    let mut out = String::new();
    let anchor = &sequence.anchor;
    let _ = writeln!(out, "{},{},{}", anchor.tile_x, anchor.tile_z, anchor.preserve);

    for (timestamp, keyframe) in sequence.entries() {
        let pose = keyframe.pose();
        let _ = writeln!(
            out,
            "{},{},{},{},{},{},{},{}",
            timestamp,
            pose.focal_x,
            pose.focal_y,
            pose.focal_z,
            pose.pitch,
            pose.yaw,
            pose.zoom,
            keyframe.ease.name(),
        );
    }

    out
}

/// Parse a sequence from text
///
/// Either the whole text parses into a valid sequence or an error is
/// returned; nothing partial escapes.
pub fn deserialize(text: &str, default_duration: u64) -> Result<Sequence, CodecError> {
    let mut sequence = Sequence::new(default_duration);
    let mut first_record = true;

    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }

        let fields: Vec<&str> = raw.split(',').map(str::trim).collect();

        if first_record && fields.len() == HEADER_FIELDS {
            sequence.anchor = parse_header(&fields, line)?;
            first_record = false;
            continue;
        }
        first_record = false;

        if fields.len() != KEYFRAME_FIELDS {
            return Err(CodecError::FieldCount {
                line,
                expected: KEYFRAME_FIELDS,
                found: fields.len(),
            });
        }

        let timestamp: u64 = parse_field(fields[0], "timestamp", line)?;
        let pose = Pose {
            focal_x: parse_field(fields[1], "focal x", line)?,
            focal_y: parse_field(fields[2], "focal y", line)?,
            focal_z: parse_field(fields[3], "focal z", line)?,
            pitch: parse_field(fields[4], "pitch", line)?,
            yaw: parse_field(fields[5], "yaw", line)?,
            zoom: parse_field(fields[6], "scale", line)?,
        };
        let ease = EaseType::from_str(fields[7])
            .map_err(|source| CodecError::UnknownEase { line, source })?;

        if sequence.add_at(Keyframe::new(pose, ease), timestamp).is_none() {
            return Err(CodecError::TimestampOrder { line, timestamp });
        }
    }

    Ok(sequence)
}

fn parse_header(fields: &[&str], line: usize) -> Result<LocationAnchor, CodecError> {
    Ok(LocationAnchor {
        tile_x: parse_field(fields[0], "anchor x", line)?,
        tile_z: parse_field(fields[1], "anchor z", line)?,
        preserve: parse_field(fields[2], "preserve flag", line)?,
    })
}

fn parse_field<T: FromStr>(value: &str, field: &'static str, line: usize) -> Result<T, CodecError> {
    value.parse().map_err(|_| CodecError::InvalidField {
        line,
        field,
        value: value.to_string(),
    })
}
