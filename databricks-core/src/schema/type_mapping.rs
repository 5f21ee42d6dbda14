//! Portable to Databricks-native type conversion, and back.
//!
//! `from_native_type` is lossy by design: it is metadata introspection for
//! the portable vocabulary, not a full type system. Anything it cannot
//! classify conservatively reads as a string.

use crate::models::{ColumnDescriptor, DefaultValue};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Backend-agnostic column type tags shared with the host framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortableType {
    /// Auto-incrementing primary key
    Id,
    /// Foreign-key reference
    Reference,
    /// Bounded character data
    String,
    /// Unbounded character data
    Text,
    /// Integral numeric
    Integer,
    /// Double-precision floating point
    Double,
    /// Single-precision floating point
    Float,
    /// Fixed-point numeric
    Decimal,
    /// Boolean
    Boolean,
    /// Calendar date
    Date,
    /// Time of day
    Time,
    /// Point in time
    Timestamp,
    /// Timestamp defaulting to creation time
    TimestampOnCreate,
    /// Timestamp refreshed on update
    TimestampOnUpdate,
    /// Raw bytes
    Binary,
}

impl std::fmt::Display for PortableType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            Self::Id => "id",
            Self::Reference => "reference",
            Self::String => "string",
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Double => "double",
            Self::Float => "float",
            Self::Decimal => "decimal",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Time => "time",
            Self::Timestamp => "timestamp",
            Self::TimestampOnCreate => "timestamp_on_create",
            Self::TimestampOnUpdate => "timestamp_on_update",
            Self::Binary => "binary",
        };
        f.write_str(tag)
    }
}

/// Classification result of a native type name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeTypeInfo {
    /// Portable tag the native type maps to
    pub portable: PortableType,
    /// Character length parsed from a trailing `(n)` group
    pub size: Option<u32>,
    /// Numeric precision parsed from a trailing `(p,s)` group
    pub precision: Option<u32>,
    /// Numeric scale parsed from a trailing `(p,s)` group
    pub scale: Option<u32>,
}

/// Renders the native DDL type expression for a column descriptor.
///
/// Reproduces the fixed dialect table: `id` becomes
/// `INTEGER IDENTITY(1,1) PRIMARY KEY` (Databricks has identity columns, not
/// sequences), strings default to length 255, decimals to precision 18 and
/// scale 0, and the on-create/on-update timestamp variants pick up a
/// `CURRENT_TIMESTAMP` default expression when none was supplied.
/// `NOT NULL` renders only when nullability is explicitly disallowed.
pub fn to_native_type(column: &ColumnDescriptor) -> String {
    let mut definition = match column.portable_type {
        PortableType::Id => "INTEGER IDENTITY(1,1) PRIMARY KEY".to_string(),
        PortableType::Reference => "INTEGER".to_string(),
        PortableType::String => {
            format!("VARCHAR({})", column.size.unwrap_or(255))
        }
        PortableType::Text => "TEXT".to_string(),
        PortableType::Integer => "INTEGER".to_string(),
        PortableType::Double => "DOUBLE".to_string(),
        PortableType::Float => "FLOAT".to_string(),
        PortableType::Decimal => format!(
            "DECIMAL({},{})",
            column.precision.unwrap_or(18),
            column.scale.unwrap_or(0)
        ),
        PortableType::Boolean => "BOOLEAN".to_string(),
        PortableType::Date => "DATE".to_string(),
        PortableType::Time => "TIME".to_string(),
        PortableType::Timestamp
        | PortableType::TimestampOnCreate
        | PortableType::TimestampOnUpdate => "TIMESTAMP".to_string(),
        PortableType::Binary => "BINARY".to_string(),
    };

    if !column.allow_null {
        definition.push_str(" NOT NULL");
    }

    let default = column.default.clone().or_else(|| {
        // On-create/on-update timestamps default to now unless overridden
        matches!(
            column.portable_type,
            PortableType::TimestampOnCreate | PortableType::TimestampOnUpdate
        )
        .then(|| DefaultValue::Expression("CURRENT_TIMESTAMP".to_string()))
    });

    match default {
        Some(DefaultValue::Expression(expr)) => {
            definition.push_str(" DEFAULT ");
            definition.push_str(&expr);
        }
        Some(DefaultValue::Literal(literal)) => {
            definition.push_str(" DEFAULT ");
            definition.push_str(&quote_literal(&literal));
        }
        None => {}
    }

    definition
}

/// Classifies a native type name into the portable vocabulary.
///
/// Case-insensitive substring classification in fixed priority order:
/// `int`, then `char`/`text`, then `float`/`double`/`decimal`, then `bool`,
/// then the date/time family (passed through to the matching portable tag),
/// then `binary`; anything else is a string. A trailing parenthesised
/// numeric group supplies size (one number) or precision and scale (two).
pub fn from_native_type(db_type: &str) -> NativeTypeInfo {
    let lowered = db_type.to_ascii_lowercase();

    let portable = if lowered.contains("int") {
        PortableType::Integer
    } else if lowered.contains("char") || lowered.contains("text") {
        PortableType::String
    } else if lowered.contains("float") || lowered.contains("double") || lowered.contains("decimal")
    {
        PortableType::Double
    } else if lowered.contains("bool") {
        PortableType::Boolean
    } else if lowered.contains("timestamp") {
        PortableType::Timestamp
    } else if lowered.contains("date") {
        PortableType::Date
    } else if lowered.contains("time") {
        PortableType::Time
    } else if lowered.contains("binary") {
        PortableType::Binary
    } else {
        PortableType::String
    };

    let (size, precision, scale) = parse_size_info(&lowered);

    NativeTypeInfo {
        portable,
        size,
        precision,
        scale,
    }
}

/// Parses `name(n)` or `name(p,s)` size information.
#[allow(clippy::unwrap_used)] // the pattern is a compile-time constant
fn parse_size_info(db_type: &str) -> (Option<u32>, Option<u32>, Option<u32>) {
    static SIZE_RE: OnceLock<Regex> = OnceLock::new();
    let re = SIZE_RE.get_or_init(|| Regex::new(r"^[^(]+\((\d+)(?:\s*,\s*(\d+))?\)").unwrap());

    let Some(captures) = re.captures(db_type) else {
        return (None, None, None);
    };

    let first: Option<u32> = captures.get(1).and_then(|m| m.as_str().parse().ok());
    let second: Option<u32> = captures.get(2).and_then(|m| m.as_str().parse().ok());

    match (first, second) {
        (Some(p), Some(s)) => (Some(p), Some(p), Some(s)),
        (Some(n), None) => (Some(n), None, None),
        _ => (None, None, None),
    }
}

/// Quotes a default literal for DDL, doubling embedded single quotes.
fn quote_literal(literal: &str) -> String {
    format!("'{}'", literal.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ColumnDescriptor;

    #[test]
    fn test_id_definition() {
        let column = ColumnDescriptor::new("id", PortableType::Id).not_null();
        assert_eq!(
            to_native_type(&column),
            "INTEGER IDENTITY(1,1) PRIMARY KEY NOT NULL"
        );
    }

    #[test]
    fn test_string_defaults_to_255() {
        let column = ColumnDescriptor::new("name", PortableType::String);
        assert_eq!(to_native_type(&column), "VARCHAR(255)");

        let column = ColumnDescriptor::new("name", PortableType::String).with_size(64);
        assert_eq!(to_native_type(&column), "VARCHAR(64)");
    }

    #[test]
    fn test_decimal_defaults() {
        let column = ColumnDescriptor::new("amount", PortableType::Decimal);
        assert_eq!(to_native_type(&column), "DECIMAL(18,0)");

        let column =
            ColumnDescriptor::new("amount", PortableType::Decimal).with_precision(10, 2);
        assert_eq!(to_native_type(&column), "DECIMAL(10,2)");
    }

    #[test]
    fn test_timestamp_on_create_gets_current_timestamp() {
        let column = ColumnDescriptor::new("created_at", PortableType::TimestampOnCreate);
        assert_eq!(
            to_native_type(&column),
            "TIMESTAMP DEFAULT CURRENT_TIMESTAMP"
        );

        // An explicit default wins over the implicit expression
        let column = ColumnDescriptor::new("created_at", PortableType::TimestampOnUpdate)
            .with_default(DefaultValue::Expression("now()".to_string()));
        assert_eq!(to_native_type(&column), "TIMESTAMP DEFAULT now()");
    }

    #[test]
    fn test_literal_default_is_quoted() {
        let column = ColumnDescriptor::new("status", PortableType::String)
            .with_default(DefaultValue::Literal("new".to_string()));
        assert_eq!(to_native_type(&column), "VARCHAR(255) DEFAULT 'new'");

        let column = ColumnDescriptor::new("note", PortableType::String)
            .with_default(DefaultValue::Literal("it's".to_string()));
        assert!(to_native_type(&column).ends_with("DEFAULT 'it''s'"));
    }

    #[test]
    fn test_from_native_classification_priority() {
        assert_eq!(from_native_type("BIGINT").portable, PortableType::Integer);
        assert_eq!(from_native_type("varchar").portable, PortableType::String);
        assert_eq!(from_native_type("TEXT").portable, PortableType::String);
        assert_eq!(from_native_type("DOUBLE").portable, PortableType::Double);
        assert_eq!(from_native_type("decimal").portable, PortableType::Double);
        assert_eq!(from_native_type("BOOLEAN").portable, PortableType::Boolean);
        assert_eq!(from_native_type("DATE").portable, PortableType::Date);
        assert_eq!(from_native_type("TIME").portable, PortableType::Time);
        assert_eq!(
            from_native_type("TIMESTAMP").portable,
            PortableType::Timestamp
        );
        assert_eq!(from_native_type("BINARY").portable, PortableType::Binary);
        // Conservative fallback
        assert_eq!(from_native_type("STRUCT").portable, PortableType::String);
    }

    #[test]
    fn test_varchar_size_parsed() {
        let info = from_native_type("VARCHAR(128)");
        assert_eq!(info.portable, PortableType::String);
        assert_eq!(info.size, Some(128));
        assert_eq!(info.precision, None);
    }

    #[test]
    fn test_decimal_precision_and_scale_parsed() {
        let info = from_native_type("DECIMAL(18,2)");
        assert_eq!(info.portable, PortableType::Double);
        assert_eq!(info.precision, Some(18));
        assert_eq!(info.scale, Some(2));
    }

    #[test]
    fn test_round_trip_lossless_subset() {
        for portable in [
            PortableType::Integer,
            PortableType::String,
            PortableType::Boolean,
            PortableType::Date,
            PortableType::Time,
            PortableType::Timestamp,
        ] {
            let column = ColumnDescriptor::new("c", portable);
            let native = to_native_type(&column);
            let info = from_native_type(&native);

            let mut rebuilt = ColumnDescriptor::new("c", info.portable);
            rebuilt.size = info.size;
            rebuilt.precision = info.precision;
            rebuilt.scale = info.scale;
            assert_eq!(to_native_type(&rebuilt), native, "{portable} did not survive");
        }
    }
}
