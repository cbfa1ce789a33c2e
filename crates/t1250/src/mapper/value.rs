use std::collections::BTreeMap;
use std::fmt;

/// A mapped column value. `Null` is the explicit "no value" marker some
/// callbacks produce; a declared default replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Null,
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn empty() -> Self {
        Self::Text(String::new())
    }

    /// True only for an empty `Text`.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Text(s) if s.is_empty())
    }

    /// True for an empty `Text` or `Null`.
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Null => true,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Null => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Null => f.write_str("NULL"),
        }
    }
}

/// Column name to value, ordered by column name.
pub type ColumnMap = BTreeMap<String, FieldValue>;

/// Non-empty text of `column`, if any.
pub fn column_text<'a>(columns: &'a ColumnMap, column: &str) -> Option<&'a str> {
    columns
        .get(column)
        .and_then(FieldValue::as_str)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_versus_missing() {
        assert!(FieldValue::empty().is_empty());
        assert!(FieldValue::empty().is_missing());
        assert!(!FieldValue::Null.is_empty());
        assert!(FieldValue::Null.is_missing());
        assert!(!FieldValue::text("x").is_missing());
    }

    #[test]
    fn test_column_text_skips_empty_and_null() {
        let mut columns = ColumnMap::new();
        columns.insert("a".to_string(), FieldValue::text("1"));
        columns.insert("b".to_string(), FieldValue::empty());
        columns.insert("c".to_string(), FieldValue::Null);

        assert_eq!(column_text(&columns, "a"), Some("1"));
        assert_eq!(column_text(&columns, "b"), None);
        assert_eq!(column_text(&columns, "c"), None);
        assert_eq!(column_text(&columns, "d"), None);
    }
}
