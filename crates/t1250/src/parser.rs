//! Fixed-width record parsing.
//!
//! Offsets count characters, not bytes. A field that runs past the end of a
//! short record comes back empty and is listed in [`ParsedRecord::short_fields`].

use std::collections::HashMap;

use tracing::debug;

use crate::config::schema::{FieldSpec, Trim};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRecord {
    values: HashMap<String, String>,
    short_fields: Vec<String>,
}

impl ParsedRecord {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Value of `name`, or an empty string when the field is unknown.
    pub fn value(&self, name: &str) -> &str {
        self.get(name).unwrap_or("")
    }

    /// Fields the record was too short to contain.
    pub fn short_fields(&self) -> &[String] {
        &self.short_fields
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Length a record needs to hold every field of the layout.
pub fn required_length(fields: &[FieldSpec]) -> usize {
    fields.iter().map(FieldSpec::end).max().unwrap_or(0)
}

pub fn parse(record: &str, fields: &[FieldSpec]) -> ParsedRecord {
    let chars: Vec<char> = record.chars().collect();
    let mut parsed = ParsedRecord::default();

    for spec in fields {
        let value = match chars.get(spec.offset..spec.end()) {
            Some(slice) => {
                let raw: String = slice.iter().collect();
                apply_trim(raw, spec.trim)
            }
            None => {
                debug!(
                    "Record length {} too short for field '{}' ({}..{})",
                    chars.len(),
                    spec.name,
                    spec.offset,
                    spec.end()
                );
                parsed.short_fields.push(spec.name.clone());
                String::new()
            }
        };
        parsed.values.insert(spec.name.clone(), value);
    }

    parsed
}

fn apply_trim(raw: String, trim: Trim) -> String {
    match trim {
        Trim::Both => raw.trim().to_string(),
        Trim::Trailing => raw.trim_end().to_string(),
        Trim::None => raw,
    }
}
