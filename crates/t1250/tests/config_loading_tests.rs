//! Table-driven tests for configuration loading and validation.

mod common;

use t1250::config::{load_config, load_config_from_str};
use t1250::ConfigError;

/// Represents a single config loading test case.
struct ConfigTestCase {
    /// Test case name for identification.
    name: &'static str,
    /// The config JSON content to test.
    config_json: &'static str,
    /// Whether loading should succeed.
    should_succeed: bool,
    /// Expected error substring (if should_succeed is false).
    expected_error: Option<&'static str>,
}

const JSON_CONFIG_TESTS: &[ConfigTestCase] = &[
    ConfigTestCase {
        name: "valid_minimal",
        config_json: r#"{
            "version": "1.0",
            "fields": [{ "name": "Conn Note", "offset": 0, "length": 20 }],
            "job_rules": [],
            "item_rules": [{ "source_field": "Conn Note", "target_column": "connote_nbr" }],
            "business_units": [{ "code": "TNQ", "id": 1 }]
        }"#,
        should_succeed: true,
        expected_error: None,
    },
    ConfigTestCase {
        name: "valid_override_tables",
        config_json: r#"{
            "version": "1.0",
            "fields": [
                { "name": "Conn Note", "offset": 0, "length": 20, "trim": "trailing" },
                { "name": "Mobile Number", "offset": 20, "length": 10 }
            ],
            "job_rules": [],
            "item_rules": [{ "source_field": "Conn Note", "target_column": "connote_nbr" }],
            "business_units": [
                { "code": "TNQ", "id": 1, "conditions": "01100000" },
                {
                    "code": "TCS",
                    "id": 2,
                    "conditions": "11100001",
                    "item_rules": [
                        { "source_field": "Conn Note", "target_column": "connote_nbr", "required": true },
                        { "source_field": "Mobile Number", "target_column": "mobile", "callback": "mobile" }
                    ]
                }
            ]
        }"#,
        should_succeed: true,
        expected_error: None,
    },
    ConfigTestCase {
        name: "invalid_version",
        config_json: r#"{
            "version": "2.0",
            "fields": [{ "name": "Conn Note", "offset": 0, "length": 20 }],
            "job_rules": [],
            "item_rules": [],
            "business_units": [{ "code": "TNQ", "id": 1 }]
        }"#,
        should_succeed: false,
        expected_error: Some("Unsupported config version"),
    },
    ConfigTestCase {
        name: "missing_business_units",
        config_json: r#"{
            "version": "1.0",
            "fields": [{ "name": "Conn Note", "offset": 0, "length": 20 }],
            "job_rules": [],
            "item_rules": []
        }"#,
        should_succeed: false,
        expected_error: Some("Schema validation failed"),
    },
    ConfigTestCase {
        name: "unknown_callback",
        config_json: r#"{
            "version": "1.0",
            "fields": [{ "name": "Conn Note", "offset": 0, "length": 20 }],
            "job_rules": [],
            "item_rules": [{ "source_field": "Conn Note", "target_column": "connote_nbr", "callback": "reverse" }],
            "business_units": [{ "code": "TNQ", "id": 1 }]
        }"#,
        should_succeed: false,
        expected_error: Some("Schema validation failed"),
    },
    ConfigTestCase {
        name: "duplicate_field_name",
        config_json: r#"{
            "version": "1.0",
            "fields": [
                { "name": "Conn Note", "offset": 0, "length": 20 },
                { "name": "Conn Note", "offset": 20, "length": 5 }
            ],
            "job_rules": [],
            "item_rules": [],
            "business_units": [{ "code": "TNQ", "id": 1 }]
        }"#,
        should_succeed: false,
        expected_error: Some("Duplicate field name"),
    },
    ConfigTestCase {
        name: "unknown_target_column",
        config_json: r#"{
            "version": "1.0",
            "fields": [{ "name": "Conn Note", "offset": 0, "length": 20 }],
            "job_rules": [{ "source_field": "Conn Note", "target_column": "secret" }],
            "item_rules": [],
            "business_units": [{ "code": "TNQ", "id": 1 }]
        }"#,
        should_succeed: false,
        expected_error: Some("Unknown column"),
    },
    ConfigTestCase {
        name: "undefined_source_field",
        config_json: r#"{
            "version": "1.0",
            "fields": [{ "name": "Conn Note", "offset": 0, "length": 20 }],
            "job_rules": [],
            "item_rules": [{ "source_field": "Bar code", "target_column": "connote_nbr" }],
            "business_units": [{ "code": "TNQ", "id": 1 }]
        }"#,
        should_succeed: false,
        expected_error: Some("Source field 'Bar code' is not defined"),
    },
    ConfigTestCase {
        name: "duplicate_business_unit",
        config_json: r#"{
            "version": "1.0",
            "fields": [{ "name": "Conn Note", "offset": 0, "length": 20 }],
            "job_rules": [],
            "item_rules": [],
            "business_units": [{ "code": "TNQ", "id": 1 }, { "code": "tnq", "id": 2 }]
        }"#,
        should_succeed: false,
        expected_error: Some("Duplicate business unit code"),
    },
    ConfigTestCase {
        name: "invalid_condition_flag",
        config_json: r#"{
            "version": "1.0",
            "fields": [{ "name": "Conn Note", "offset": 0, "length": 20 }],
            "job_rules": [],
            "item_rules": [],
            "business_units": [{ "code": "TNQ", "id": 1, "conditions": "01X00000" }]
        }"#,
        should_succeed: false,
        expected_error: Some("invalid condition flag"),
    },
];

#[test]
fn test_json_config_loading() {
    for case in JSON_CONFIG_TESTS {
        let result = load_config_from_str(case.config_json);

        if case.should_succeed {
            assert!(
                result.is_ok(),
                "{}: expected success, got {:?}",
                case.name,
                result.err()
            );
        } else {
            let err = match result {
                Ok(_) => panic!("{}: expected failure", case.name),
                Err(e) => e.to_string(),
            };
            if let Some(expected) = case.expected_error {
                assert!(
                    err.contains(expected),
                    "{}: expected error containing '{}', got '{}'",
                    case.name,
                    expected,
                    err
                );
            }
        }
    }
}

#[test]
fn test_business_unit_override_resolves() {
    let config = load_config_from_str(JSON_CONFIG_TESTS[1].config_json).expect("valid config");

    let tnq = config.resolve("tnq").expect("TNQ resolves");
    assert_eq!(tnq.bu_id, 1);
    assert_eq!(tnq.item_rules.len(), 1);
    assert!(tnq.conditions.send_email);
    assert!(!tnq.conditions.item_nbr_exception_required);

    let tcs = config.resolve("TCS").expect("TCS resolves");
    assert_eq!(tcs.bu_id, 2);
    assert_eq!(tcs.item_rules.len(), 2);
    assert_eq!(tcs.fields.len(), 2);
    assert!(tcs.conditions.item_nbr_exception_required);
    assert!(tcs.conditions.delay_template_sc_4);
}

#[test]
fn test_load_config_from_disk() {
    let harness = common::TestHarness::new();
    let path = harness.temp_path().join("t1250.json");
    std::fs::write(&path, JSON_CONFIG_TESTS[0].config_json).expect("write config");

    let config = load_config(&path).expect("config loads");
    assert_eq!(config.business_units.len(), 1);
}

#[test]
fn test_missing_config_file() {
    let result = load_config(std::path::Path::new("/nonexistent/t1250.json"));
    assert!(matches!(result, Err(ConfigError::ReadFile { .. })));
}
