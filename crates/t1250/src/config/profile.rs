//! A configuration resolved for one business unit.

use super::conditions::ConditionMap;
use super::schema::{BusinessUnit, Config, FieldSpec, MappingRule};
use crate::error::ConfigError;
use crate::mapper::{BusinessUnitCodes, CallbackTables};
use crate::postcode::PostcodeTable;
use crate::store::columns;

/// Everything needed to ingest files for a single business unit. Built once
/// per run and never mutated.
#[derive(Debug, Clone)]
pub struct Profile {
    pub business_unit: String,
    pub bu_id: i64,
    pub fields: Vec<FieldSpec>,
    pub job_rules: Vec<MappingRule>,
    pub item_rules: Vec<MappingRule>,
    pub conditions: ConditionMap,
    pub business_units: BusinessUnitCodes,
    pub postcodes: PostcodeTable,
}

impl Profile {
    pub fn callback_tables(&self) -> CallbackTables {
        CallbackTables {
            business_units: self.business_units.clone(),
            postcodes: self.postcodes.clone(),
        }
    }

    /// Source field feeding the item's `connote_nbr`, used to label alerts.
    pub fn reference_field(&self) -> Option<&str> {
        self.item_rules
            .iter()
            .find(|rule| rule.target_column == columns::CONNOTE_NBR)
            .map(|rule| rule.source_field.as_str())
    }
}

impl Config {
    pub fn business_unit(&self, code: &str) -> Option<&BusinessUnit> {
        self.business_units
            .iter()
            .find(|bu| bu.code.eq_ignore_ascii_case(code))
    }

    /// Layout and rule tables for a business unit, with its overrides
    /// applied.
    pub fn tables_for<'a>(
        &'a self,
        bu: &'a BusinessUnit,
    ) -> (&'a [FieldSpec], &'a [MappingRule], &'a [MappingRule]) {
        (
            bu.fields.as_deref().unwrap_or(&self.fields),
            bu.job_rules.as_deref().unwrap_or(&self.job_rules),
            bu.item_rules.as_deref().unwrap_or(&self.item_rules),
        )
    }

    pub fn resolve(&self, code: &str) -> Result<Profile, ConfigError> {
        let bu = self
            .business_unit(code)
            .ok_or_else(|| ConfigError::UnknownBusinessUnit(code.to_string()))?;
        let (fields, job_rules, item_rules) = self.tables_for(bu);

        Ok(Profile {
            business_unit: bu.code.clone(),
            bu_id: bu.id,
            fields: fields.to_vec(),
            job_rules: job_rules.to_vec(),
            item_rules: item_rules.to_vec(),
            conditions: ConditionMap::from_flags(&bu.conditions, &self.flag_positions),
            business_units: BusinessUnitCodes::new(
                self.business_units
                    .iter()
                    .map(|bu| (bu.code.clone(), bu.id))
                    .collect(),
            ),
            postcodes: self
                .postcodes
                .clone()
                .map(PostcodeTable::new)
                .unwrap_or_default(),
        })
    }
}
