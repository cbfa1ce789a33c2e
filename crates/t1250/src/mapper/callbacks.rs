//! Value transforms referenced by mapping rules.

use tracing::debug;

use super::value::FieldValue;
use crate::config::schema::Callback;
use crate::postcode::PostcodeTable;

/// Carrier codes and the numeric business-unit ids they translate to, in
/// lookup order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusinessUnitCodes {
    codes: Vec<(String, i64)>,
}

impl BusinessUnitCodes {
    pub fn new(codes: Vec<(String, i64)>) -> Self {
        Self { codes }
    }

    /// Id of the first code contained in `identifier`.
    pub fn lookup(&self, identifier: &str) -> Option<i64> {
        let identifier = identifier.to_uppercase();
        self.codes
            .iter()
            .find(|(code, _)| !code.is_empty() && identifier.contains(&code.to_uppercase()))
            .map(|(_, id)| *id)
    }
}

/// Lookup tables callbacks translate against.
#[derive(Debug, Clone, Default)]
pub struct CallbackTables {
    pub business_units: BusinessUnitCodes,
    pub postcodes: PostcodeTable,
}

impl CallbackTables {
    pub fn apply(&self, callback: Callback, value: &str) -> FieldValue {
        match callback {
            Callback::BusinessUnit => match self.business_units.lookup(value) {
                Some(id) => FieldValue::text(id.to_string()),
                None => {
                    debug!("No business unit code found in identifier '{}'", value.trim());
                    FieldValue::empty()
                }
            },
            Callback::PostcodeState => FieldValue::Text(self.postcodes.translate(value)),
            Callback::ServiceCode => service_code(value),
            Callback::Number => number(value),
            Callback::Mobile => FieldValue::Text(mobile(value)),
            Callback::Uppercase => FieldValue::text(value.to_uppercase()),
            Callback::Lowercase => FieldValue::text(value.to_lowercase()),
            Callback::Trim => FieldValue::text(value.trim()),
        }
    }
}

fn service_code(value: &str) -> FieldValue {
    let trimmed = value.trim();
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next()) {
        (Some(c @ '1'..='9'), None) => FieldValue::text(c.to_string()),
        _ => FieldValue::Null,
    }
}

fn number(value: &str) -> FieldValue {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return FieldValue::empty();
    }
    if !trimmed.chars().all(|c| c.is_ascii_digit()) {
        debug!("Value '{}' is not a number", trimmed);
        return FieldValue::Null;
    }
    let stripped = trimmed.trim_start_matches('0');
    if stripped.is_empty() {
        FieldValue::text("0")
    } else {
        FieldValue::text(stripped)
    }
}

fn mobile(value: &str) -> String {
    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    match digits.strip_prefix("61") {
        Some(local) if digits.len() == 11 => format!("0{}", local),
        _ => digits,
    }
}
