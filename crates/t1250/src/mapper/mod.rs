//! Field mapping: turns a parsed record into job and item column maps.
//!
//! Passes run in a fixed order over a rule table: callbacks, static
//! defaults, `default_equal_to` substitution, required-field checks, then
//! projection onto target columns.

pub mod callbacks;
pub mod value;

use thiserror::Error;
use tracing::debug;

use crate::config::schema::MappingRule;
use crate::config::{ConditionMap, Profile};
use crate::parser::ParsedRecord;
use crate::store::columns;

pub use callbacks::{BusinessUnitCodes, CallbackTables};
pub use value::{column_text, ColumnMap, FieldValue};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error("Field '{field}' is required (column '{column}')")]
    FieldRequired { field: String, column: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedRecord {
    pub job: ColumnMap,
    pub item: ColumnMap,
}

pub struct Mapper {
    job_rules: Vec<MappingRule>,
    item_rules: Vec<MappingRule>,
    tables: CallbackTables,
}

impl Mapper {
    pub fn new(
        job_rules: Vec<MappingRule>,
        item_rules: Vec<MappingRule>,
        tables: CallbackTables,
    ) -> Self {
        Self {
            job_rules,
            item_rules,
            tables,
        }
    }

    pub fn from_profile(profile: &Profile) -> Self {
        Self::new(
            profile.job_rules.clone(),
            profile.item_rules.clone(),
            profile.callback_tables(),
        )
    }

    /// Maps both rule tables. The job table is evaluated first, so a record
    /// failing both reports the job-level field.
    pub fn map_record(
        &self,
        parsed: &ParsedRecord,
        conditions: &ConditionMap,
    ) -> Result<MappedRecord, MappingError> {
        let job = self.map_fields(parsed, &self.job_rules, conditions)?;
        let item = self.map_fields(parsed, &self.item_rules, conditions)?;
        Ok(MappedRecord { job, item })
    }

    pub fn map_fields(
        &self,
        parsed: &ParsedRecord,
        rules: &[MappingRule],
        conditions: &ConditionMap,
    ) -> Result<ColumnMap, MappingError> {
        let mut values: Vec<FieldValue> = rules
            .iter()
            .map(|rule| FieldValue::text(parsed.value(&rule.source_field)))
            .collect();

        // Callbacks
        for (rule, value) in rules.iter().zip(values.iter_mut()) {
            if let Some(callback) = rule.callback {
                let current = value.as_str().unwrap_or_default().to_string();
                *value = self.tables.apply(callback, &current);
            }
        }

        // Static defaults, also replacing a callback's Null
        for (rule, value) in rules.iter().zip(values.iter_mut()) {
            if value.is_missing() {
                if let Some(default) = &rule.default {
                    *value = FieldValue::text(default.clone());
                }
            }
        }

        // Defaults copied from another field. A rule is a source only once
        // its own value is final: earlier in the table, or without a
        // default_equal_to of its own.
        for i in 0..rules.len() {
            let rule = &rules[i];
            let Some(other) = &rule.default_equal_to else {
                continue;
            };
            if !values[i].is_missing() {
                continue;
            }
            if rule.target_column == columns::ITEM_NBR && conditions.item_nbr_exception_required {
                debug!(
                    "Item number exception required, not copying '{}' into '{}'",
                    other, rule.source_field
                );
                continue;
            }
            let source = rules.iter().enumerate().position(|(j, r)| {
                &r.source_field == other && (j < i || r.default_equal_to.is_none())
            });
            values[i] = match source {
                Some(j) => values[j].clone(),
                None => FieldValue::text(parsed.value(other)),
            };
        }

        // Requirements
        for (rule, value) in rules.iter().zip(values.iter()) {
            if rule.required && value.is_missing() {
                return Err(MappingError::FieldRequired {
                    field: rule.source_field.clone(),
                    column: rule.target_column.clone(),
                });
            }
        }

        Ok(rules
            .iter()
            .zip(values)
            .map(|(rule, value)| (rule.target_column.clone(), value))
            .collect())
    }
}
