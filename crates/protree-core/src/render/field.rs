//! Per-field decisions: default-value clause and attribute marker.

use crate::descriptor::{DefaultValue, FieldDescriptor, FieldKind};
use std::fmt;

/// Single-character summary of a field's cardinality and packing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// No explicit modifier (`*`)
    Implicit,
    /// Declared with the `optional` keyword (`o`)
    Optional,
    /// Packed repeated encoding (`+`)
    Packed,
}

impl Marker {
    /// Selects the marker for a field.
    ///
    /// Packed overrides optional when both apply.
    pub fn for_field(field: &FieldDescriptor) -> Self {
        let mut marker = Marker::Implicit;
        if field.optional_keyword {
            marker = Marker::Optional;
        }
        if field.packed {
            marker = Marker::Packed;
        }
        marker
    }

    /// Returns the marker character
    pub fn as_char(self) -> char {
        match self {
            Marker::Implicit => '*',
            Marker::Optional => 'o',
            Marker::Packed => '+',
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Returns the marker character for a field
pub fn marker(field: &FieldDescriptor) -> char {
    Marker::for_field(field).as_char()
}

/// Formats the default-value clause of a field, without the ` = ` prefix.
///
/// Message fields never get one. String defaults are always quoted, even
/// when empty; enum defaults use the value's symbolic name.
pub fn format_default(field: &FieldDescriptor) -> Option<String> {
    match field.kind {
        FieldKind::Message => None,
        FieldKind::String => {
            let value = match &field.default {
                DefaultValue::String(s) => escape_string(s),
                DefaultValue::Absent => String::new(),
                other => escape_string(&other.to_string()),
            };
            Some(format!("\"{}\"", value))
        }
        FieldKind::Enum => match &field.default {
            DefaultValue::Enum { name, .. } => Some(name.clone()),
            other => natural(other),
        },
        FieldKind::Double
        | FieldKind::Float
        | FieldKind::Int32
        | FieldKind::Int64
        | FieldKind::Uint32
        | FieldKind::Uint64
        | FieldKind::Sint32
        | FieldKind::Sint64
        | FieldKind::Fixed32
        | FieldKind::Fixed64
        | FieldKind::Sfixed32
        | FieldKind::Sfixed64
        | FieldKind::Bool
        | FieldKind::Bytes
        | FieldKind::Unknown => natural(&field.default),
    }
}

fn natural(value: &DefaultValue) -> Option<String> {
    if value.is_absent() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Escape a string for display inside double quotes
pub(crate) fn escape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            _ if c.is_ascii_control() => {
                result.push_str(&format!("\\x{:02x}", c as u8));
            }
            _ => result.push(c),
        }
    }
    result
}
