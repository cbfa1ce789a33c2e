use std::collections::HashSet;
use std::path::Path;

use regex::Regex;

use crate::config::schema::{BusinessUnit, Config, FieldSpec, MappingRule};
use crate::error::ConfigError;
use crate::store::columns::{ITEM_COLUMNS, JOB_COLUMNS};

const SCHEMA_JSON: &str = include_str!("../../../../schema/config-v1.json");

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: Config = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    let mut positions = HashSet::new();
    for (name, position) in config.flag_positions.named() {
        if !positions.insert(position) {
            return Err(ConfigError::Validation {
                message: format!("Flag '{}' reuses position {}", name, position),
            });
        }
    }

    let mut codes = HashSet::new();
    for bu in &config.business_units {
        if !codes.insert(bu.code.to_uppercase()) {
            return Err(ConfigError::Validation {
                message: format!("Duplicate business unit code '{}'", bu.code),
            });
        }
        validate_conditions(bu)?;

        let (fields, job_rules, item_rules) = config.tables_for(bu);
        validate_fields(fields)?;
        validate_rules(job_rules, fields, JOB_COLUMNS)?;
        validate_rules(item_rules, fields, ITEM_COLUMNS)?;
    }

    // Base tables are checked even when every unit overrides them.
    validate_fields(&config.fields)?;
    validate_rules(&config.job_rules, &config.fields, JOB_COLUMNS)?;
    validate_rules(&config.item_rules, &config.fields, ITEM_COLUMNS)?;

    Ok(())
}

fn validate_conditions(bu: &BusinessUnit) -> Result<(), ConfigError> {
    if let Some(c) = bu
        .conditions
        .chars()
        .find(|c| !matches!(c, '0' | '1' | 'Y' | 'N' | 'y' | 'n' | ' '))
    {
        return Err(ConfigError::Validation {
            message: format!(
                "Business unit '{}' has invalid condition flag '{}'",
                bu.code, c
            ),
        });
    }
    Ok(())
}

fn validate_fields(fields: &[FieldSpec]) -> Result<(), ConfigError> {
    let mut names = HashSet::new();
    for field in fields {
        if field.length == 0 {
            return Err(ConfigError::InvalidField {
                name: field.name.clone(),
                reason: "Length must be at least 1".to_string(),
            });
        }
        if !names.insert(field.name.as_str()) {
            return Err(ConfigError::InvalidField {
                name: field.name.clone(),
                reason: "Duplicate field name".to_string(),
            });
        }
    }
    Ok(())
}

fn validate_rules(
    rules: &[MappingRule],
    fields: &[FieldSpec],
    allowed: &[&str],
) -> Result<(), ConfigError> {
    let identifier = Regex::new(r"^[a-z_][a-z0-9_]*$").map_err(|e| ConfigError::Validation {
        message: format!("Invalid identifier pattern: {}", e),
    })?;
    let known = |name: &str| fields.iter().any(|f| f.name == name);

    let mut targets = HashSet::new();
    for rule in rules {
        let invalid = |reason: String| ConfigError::InvalidRule {
            column: rule.target_column.clone(),
            reason,
        };

        if !identifier.is_match(&rule.target_column) {
            return Err(invalid("Not a valid column identifier".to_string()));
        }
        if !allowed.contains(&rule.target_column.as_str()) {
            return Err(invalid("Unknown column".to_string()));
        }
        if !targets.insert(rule.target_column.as_str()) {
            return Err(invalid("Column is targeted twice".to_string()));
        }
        if !known(&rule.source_field) {
            return Err(invalid(format!(
                "Source field '{}' is not defined",
                rule.source_field
            )));
        }
        if let Some(other) = &rule.default_equal_to {
            if !known(other) {
                return Err(invalid(format!(
                    "default_equal_to field '{}' is not defined",
                    other
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
    {
        "version": "1.0",
        "fields": [
            { "name": "Conn Note", "offset": 0, "length": 20, "trim": "trailing" },
            { "name": "Identifier", "offset": 22, "length": 19 },
            { "name": "Bar code", "offset": 438, "length": 15 },
            { "name": "Item Number", "offset": 887, "length": 32 }
        ],
        "job_rules": [
            { "source_field": "Identifier", "target_column": "bu_id", "required": true, "callback": "business_unit" },
            { "source_field": "Bar code", "target_column": "card_ref_nbr", "required": true }
        ],
        "item_rules": [
            { "source_field": "Conn Note", "target_column": "connote_nbr", "required": true },
            { "source_field": "Item Number", "target_column": "item_nbr", "required": true, "default_equal_to": "Conn Note" }
        ],
        "business_units": [
            { "code": "TNQ", "id": 1, "conditions": "01100000" },
            { "code": "TCS", "id": 2, "conditions": "0110 0Y0" }
        ]
    }
    "#;

    fn with(patch: impl FnOnce(&mut serde_json::Value)) -> String {
        let mut value: serde_json::Value = serde_json::from_str(VALID).unwrap();
        patch(&mut value);
        value.to_string()
    }

    #[test]
    fn test_load_valid_config() {
        let config = load_config_from_str(VALID).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.fields.len(), 4);
        assert_eq!(config.job_rules.len(), 2);
        assert_eq!(config.business_units[1].code, "TCS");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t1250.json");
        std::fs::write(&path, VALID).unwrap();
        assert!(load_config(&path).is_ok());

        let missing = load_config(dir.path().join("missing.json"));
        assert!(matches!(missing, Err(ConfigError::ReadFile { .. })));
    }

    #[test]
    fn test_invalid_version() {
        let json = with(|v| v["version"] = "2.0".into());
        assert!(matches!(
            load_config_from_str(&json),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn test_schema_rejects_unknown_key() {
        let json = with(|v| v["input_directory"] = "/input".into());
        assert!(matches!(
            load_config_from_str(&json),
            Err(ConfigError::SchemaValidation { .. })
        ));
    }

    #[test]
    fn test_schema_rejects_unknown_callback() {
        let json = with(|v| v["job_rules"][0]["callback"] = "geocode".into());
        assert!(matches!(
            load_config_from_str(&json),
            Err(ConfigError::SchemaValidation { .. })
        ));
    }

    #[test]
    fn test_duplicate_field_names() {
        let json = with(|v| v["fields"][1]["name"] = "Conn Note".into());
        assert!(matches!(
            load_config_from_str(&json),
            Err(ConfigError::InvalidField { .. })
        ));
    }

    #[test]
    fn test_undefined_source_field() {
        let json = with(|v| v["item_rules"][0]["source_field"] = "Consignment".into());
        assert!(matches!(
            load_config_from_str(&json),
            Err(ConfigError::InvalidRule { .. })
        ));
    }

    #[test]
    fn test_undefined_default_equal_to() {
        let json = with(|v| v["item_rules"][1]["default_equal_to"] = "Nope".into());
        assert!(matches!(
            load_config_from_str(&json),
            Err(ConfigError::InvalidRule { .. })
        ));
    }

    #[test]
    fn test_unknown_target_column() {
        let json = with(|v| v["job_rules"][1]["target_column"] = "barcode".into());
        assert!(matches!(
            load_config_from_str(&json),
            Err(ConfigError::InvalidRule { column, .. }) if column == "barcode"
        ));
    }

    #[test]
    fn test_item_column_in_job_table() {
        let json = with(|v| v["job_rules"][1]["target_column"] = "connote_nbr".into());
        assert!(load_config_from_str(&json).is_err());
    }

    #[test]
    fn test_injection_in_target_column() {
        let json = with(|v| v["job_rules"][1]["target_column"] = "card_ref_nbr; DROP".into());
        assert!(matches!(
            load_config_from_str(&json),
            Err(ConfigError::InvalidRule { .. })
        ));
    }

    #[test]
    fn test_duplicate_target_column() {
        let json = with(|v| v["job_rules"][1]["target_column"] = "bu_id".into());
        assert!(load_config_from_str(&json).is_err());
    }

    #[test]
    fn test_duplicate_flag_positions() {
        let json = with(|v| v["flag_positions"] = serde_json::json!({ "send_sms": 1 }));
        assert!(matches!(
            load_config_from_str(&json),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn test_duplicate_business_unit_codes() {
        let json = with(|v| v["business_units"][1]["code"] = "tnq".into());
        assert!(matches!(
            load_config_from_str(&json),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn test_invalid_condition_character() {
        let json = with(|v| v["business_units"][0]["conditions"] = "01X00000".into());
        assert!(matches!(
            load_config_from_str(&json),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn test_override_tables_are_validated() {
        let json = with(|v| {
            v["business_units"][1]["fields"] =
                serde_json::json!([{ "name": "Conn Note", "offset": 0, "length": 10 }]);
        });
        // Base rules read fields the override layout does not define.
        assert!(matches!(
            load_config_from_str(&json),
            Err(ConfigError::InvalidRule { .. })
        ));
    }

    #[test]
    fn test_shipped_config_is_valid() {
        let content = include_str!("../../../../config/t1250.json");
        let config = load_config_from_str(content).unwrap();
        for bu in &config.business_units {
            assert!(config.resolve(&bu.code).is_ok());
        }
    }
}
