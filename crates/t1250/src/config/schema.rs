use serde::{Deserialize, Serialize};

use crate::postcode::StateRanges;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: String,
    /// Positional layout of the upstream record.
    pub fields: Vec<FieldSpec>,
    pub job_rules: Vec<MappingRule>,
    pub item_rules: Vec<MappingRule>,
    #[serde(default)]
    pub flag_positions: FlagPositions,
    pub business_units: Vec<BusinessUnit>,
    /// Replaces the built-in postcode table when present.
    #[serde(default)]
    pub postcodes: Option<Vec<StateRanges>>,
    #[serde(default)]
    pub database_path: Option<String>,
    #[serde(default)]
    pub flags_directory: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub offset: usize,
    pub length: usize,
    #[serde(default)]
    pub trim: Trim,
}

impl FieldSpec {
    pub fn new(name: &str, offset: usize, length: usize) -> Self {
        Self {
            name: name.to_string(),
            offset,
            length,
            trim: Trim::Both,
        }
    }

    pub fn with_trim(mut self, trim: Trim) -> Self {
        self.trim = trim;
        self
    }

    /// First character position past the end of this field.
    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

/// Whitespace convention applied to an extracted field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trim {
    #[default]
    Both,
    Trailing,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRule {
    pub source_field: String,
    pub target_column: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub default_equal_to: Option<String>,
    #[serde(default)]
    pub callback: Option<Callback>,
}

impl MappingRule {
    pub fn new(source_field: &str, target_column: &str) -> Self {
        Self {
            source_field: source_field.to_string(),
            target_column: target_column.to_string(),
            required: false,
            default: None,
            default_equal_to: None,
            callback: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: &str) -> Self {
        self.default = Some(value.to_string());
        self
    }

    pub fn default_equal_to(mut self, field: &str) -> Self {
        self.default_equal_to = Some(field.to_string());
        self
    }

    pub fn callback(mut self, callback: Callback) -> Self {
        self.callback = Some(callback);
        self
    }
}

/// Named value transforms a mapping rule can apply. Unknown names are
/// rejected when the configuration is deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Callback {
    BusinessUnit,
    PostcodeState,
    ServiceCode,
    Number,
    Mobile,
    Uppercase,
    Lowercase,
    Trim,
}

/// Character positions of each condition flag inside a business unit's
/// condition string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagPositions {
    #[serde(default = "pos_item_nbr_exception")]
    pub item_nbr_exception_required: usize,
    #[serde(default = "pos_send_email")]
    pub send_email: usize,
    #[serde(default = "pos_send_sms")]
    pub send_sms: usize,
    #[serde(default = "pos_send_sc_1")]
    pub send_sc_1: usize,
    #[serde(default = "pos_send_sc_2")]
    pub send_sc_2: usize,
    #[serde(default = "pos_send_sc_4")]
    pub send_sc_4: usize,
    #[serde(default = "pos_delay_sc_2")]
    pub delay_template_sc_2: usize,
    #[serde(default = "pos_delay_sc_4")]
    pub delay_template_sc_4: usize,
}

fn pos_item_nbr_exception() -> usize {
    0
}

fn pos_send_email() -> usize {
    1
}

fn pos_send_sms() -> usize {
    2
}

fn pos_send_sc_1() -> usize {
    3
}

fn pos_send_sc_2() -> usize {
    4
}

fn pos_send_sc_4() -> usize {
    5
}

fn pos_delay_sc_2() -> usize {
    6
}

fn pos_delay_sc_4() -> usize {
    7
}

impl Default for FlagPositions {
    fn default() -> Self {
        Self {
            item_nbr_exception_required: pos_item_nbr_exception(),
            send_email: pos_send_email(),
            send_sms: pos_send_sms(),
            send_sc_1: pos_send_sc_1(),
            send_sc_2: pos_send_sc_2(),
            send_sc_4: pos_send_sc_4(),
            delay_template_sc_2: pos_delay_sc_2(),
            delay_template_sc_4: pos_delay_sc_4(),
        }
    }
}

impl FlagPositions {
    pub fn named(&self) -> [(&'static str, usize); 8] {
        [
            ("item_nbr_exception_required", self.item_nbr_exception_required),
            ("send_email", self.send_email),
            ("send_sms", self.send_sms),
            ("send_sc_1", self.send_sc_1),
            ("send_sc_2", self.send_sc_2),
            ("send_sc_4", self.send_sc_4),
            ("delay_template_sc_2", self.delay_template_sc_2),
            ("delay_template_sc_4", self.delay_template_sc_4),
        ]
    }
}

/// A business unit: its carrier code, numeric id, condition flags and any
/// layout or rule-table overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessUnit {
    pub code: String,
    pub id: i64,
    #[serde(default)]
    pub conditions: String,
    #[serde(default)]
    pub fields: Option<Vec<FieldSpec>>,
    #[serde(default)]
    pub job_rules: Option<Vec<MappingRule>>,
    #[serde(default)]
    pub item_rules: Option<Vec<MappingRule>>,
}
