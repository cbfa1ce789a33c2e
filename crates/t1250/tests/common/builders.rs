//! Builders for fixed-width T1250 records.

#![allow(dead_code)]

use std::collections::HashMap;

use t1250::config::FieldSpec;
use t1250::parser::required_length;
use t1250::pipeline::TERMINATOR;

/// Minimum length of a T1250 record.
pub const RECORD_LENGTH: usize = 1248;

/// Builds one record by placing named values at their layout offsets.
#[derive(Clone)]
pub struct RecordBuilder {
    fields: Vec<FieldSpec>,
    values: HashMap<String, String>,
}

impl RecordBuilder {
    /// A valid TNQ record delivered to agent `A100`.
    pub fn new(fields: &[FieldSpec]) -> Self {
        let defaults = [
            ("Conn Note", "CN0000000001"),
            ("Identifier", "0000TNQ000000000001"),
            ("Consumer Name", "JANE CITIZEN"),
            ("Address 1", "1 ESPLANADE"),
            ("Suburb", "CAIRNS"),
            ("Post code", "4870"),
            ("Bar code", "BC00000001"),
            ("Agent Id", "A100"),
            ("Pieces", "00001"),
            ("Email Address", "Jane@Example.com"),
            ("Mobile Number", "0412345678"),
            ("Item Number", "IT01"),
        ];
        Self {
            fields: fields.to_vec(),
            values: defaults
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    pub fn set(mut self, field: &str, value: &str) -> Self {
        self.values.insert(field.to_string(), value.to_string());
        self
    }

    pub fn connote(self, value: &str) -> Self {
        self.set("Conn Note", value)
    }

    pub fn barcode(self, value: &str) -> Self {
        self.set("Bar code", value)
    }

    pub fn item_number(self, value: &str) -> Self {
        self.set("Item Number", value)
    }

    pub fn agent(self, value: &str) -> Self {
        self.set("Agent Id", value)
    }

    pub fn service_code(self, value: &str) -> Self {
        self.set("Service Code", value)
    }

    pub fn build(&self) -> String {
        let length = RECORD_LENGTH.max(required_length(&self.fields));
        let mut chars = vec![' '; length];
        for field in &self.fields {
            if let Some(value) = self.values.get(&field.name) {
                for (i, c) in value.chars().take(field.length).enumerate() {
                    chars[field.offset + i] = c;
                }
            }
        }
        chars.into_iter().collect()
    }
}

/// Records followed by the terminator line.
pub fn file_lines(records: &[RecordBuilder]) -> Vec<String> {
    records
        .iter()
        .map(RecordBuilder::build)
        .chain(std::iter::once(TERMINATOR.to_string()))
        .collect()
}
