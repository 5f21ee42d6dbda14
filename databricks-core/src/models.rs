//! Data models: statement values, result sets, and schema descriptors.
//!
//! Descriptors are built fresh on every introspection call; this crate never
//! caches them. A `TableDescriptor` owns its columns and a
//! `RoutineDescriptor` owns its parameters.

use crate::schema::type_mapping::PortableType;
use serde::{Deserialize, Serialize};

/// A value bound to a statement placeholder or read from a result row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// SQL NULL
    Null,
    /// BOOLEAN
    Bool(bool),
    /// Integral types
    Int(i64),
    /// FLOAT / DOUBLE / DECIMAL
    Double(f64),
    /// Character data
    Text(String),
    /// BINARY
    Bytes(Vec<u8>),
}

impl Value {
    /// Text content, when this value carries character data
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this value is SQL NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Result of one executed statement: ordered column names plus rows.
///
/// Column lookup is case-insensitive because the dialect treats unquoted
/// identifiers as case-insensitive and drivers differ in the case they
/// report catalog columns with.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RowSet {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl RowSet {
    /// Creates a row set from column names and rows
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    /// An empty result (statements that return no rows)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Ordered column names
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the result carries no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterator over rows
    pub fn iter(&self) -> impl Iterator<Item = &[Value]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Position of a column by case-insensitive name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
    }

    /// Value at `(row, column-name)`, when both exist
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }

    /// Text value at `(row, column-name)`; NULL and missing both yield None
    pub fn get_text(&self, row: usize, column: &str) -> Option<&str> {
        self.get(row, column).and_then(Value::as_text)
    }
}

/// How a column default was supplied.
///
/// Literals are quoted when rendered into DDL; expressions (for example
/// `CURRENT_TIMESTAMP`) are emitted unquoted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultValue {
    /// Quoted as a literal in DDL
    Literal(String),
    /// Emitted verbatim in DDL
    Expression(String),
}

/// Database column description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name
    pub name: String,
    /// Portable type tag
    pub portable_type: PortableType,
    /// Native type name as reported by the warehouse, when introspected
    pub db_type: Option<String>,
    /// Whether NULL is allowed (absence of a constraint means nullable)
    pub allow_null: bool,
    /// Character length for string types
    pub size: Option<u32>,
    /// Numeric precision
    pub precision: Option<u32>,
    /// Numeric scale
    pub scale: Option<u32>,
    /// Column default
    pub default: Option<DefaultValue>,
    /// Identity column flag
    pub auto_increment: bool,
    /// Primary-key membership
    pub is_primary_key: bool,
    /// Foreign-key membership
    pub is_foreign_key: bool,
    /// 1-based position within the table
    pub ordinal_position: u32,
}

impl ColumnDescriptor {
    /// Creates a nullable column of the given portable type
    pub fn new(name: impl Into<String>, portable_type: PortableType) -> Self {
        Self {
            name: name.into(),
            portable_type,
            db_type: None,
            allow_null: true,
            size: None,
            precision: None,
            scale: None,
            default: None,
            auto_increment: false,
            is_primary_key: false,
            is_foreign_key: false,
            ordinal_position: 0,
        }
    }

    /// Marks the column NOT NULL
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.allow_null = false;
        self
    }

    /// Sets the character length
    #[must_use]
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    /// Sets precision and scale
    #[must_use]
    pub fn with_precision(mut self, precision: u32, scale: u32) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }

    /// Sets the default
    #[must_use]
    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }
}

/// Kinds of table constraints surfaced by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    /// PRIMARY KEY
    PrimaryKey,
    /// FOREIGN KEY
    ForeignKey,
    /// UNIQUE
    Unique,
    /// Anything else the catalog reports
    Other,
}

impl ConstraintKind {
    /// Parses the catalog's `CONSTRAINT_TYPE` column
    pub fn from_catalog(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "PRIMARY KEY" => Self::PrimaryKey,
            "FOREIGN KEY" => Self::ForeignKey,
            "UNIQUE" => Self::Unique,
            _ => Self::Other,
        }
    }
}

/// Table constraint description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstraintDescriptor {
    /// Constraint name
    pub name: String,
    /// Table the constraint belongs to
    pub table_name: String,
    /// Owning schema
    pub schema_name: String,
    /// Constraint kind
    pub kind: ConstraintKind,
}

/// Database table description, owning its columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableDescriptor {
    /// Table name
    pub name: String,
    /// Owning schema
    pub schema_name: String,
    /// Ordered columns
    pub columns: Vec<ColumnDescriptor>,
    /// Constraints declared on the table
    pub constraints: Vec<ConstraintDescriptor>,
}

/// Parameter direction as reported by `PARAMETER_MODE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ParameterDirection {
    /// Input parameter
    In,
    /// Output parameter
    Out,
    /// Bidirectional parameter
    InOut,
}

impl ParameterDirection {
    /// Parses the catalog's `PARAMETER_MODE` column; unknown modes read as IN
    pub fn from_catalog(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "OUT" => Self::Out,
            "INOUT" => Self::InOut,
            _ => Self::In,
        }
    }
}

/// Stored routine parameter description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    /// Parameter name
    pub name: String,
    /// 1-based ordinal position
    pub position: u32,
    /// Direction (in/out/inout)
    pub direction: ParameterDirection,
    /// Portable type tag
    pub portable_type: PortableType,
    /// Native type name
    pub db_type: Option<String>,
    /// Character length
    pub length: Option<u32>,
    /// Numeric precision
    pub precision: Option<u32>,
    /// Numeric scale
    pub scale: Option<u32>,
}

/// Kind of stored routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RoutineKind {
    /// Stored procedure
    Procedure,
    /// Stored function
    Function,
}

impl RoutineKind {
    /// `ROUTINE_TYPE` filter value for catalog queries
    pub fn catalog_filter(self) -> &'static str {
        match self {
            Self::Procedure => "PROCEDURE",
            Self::Function => "FUNCTION",
        }
    }
}

/// Stored routine description, owning its parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutineDescriptor {
    /// Routine name
    pub name: String,
    /// Owning schema
    pub schema_name: String,
    /// Procedure or function
    pub kind: RoutineKind,
    /// Parameters ordered by ordinal position
    pub parameters: Vec<ParameterDescriptor>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rowset_case_insensitive_lookup() {
        let rows = RowSet::new(
            vec!["tableName".to_string(), "isTemporary".to_string()],
            vec![vec![Value::Text("orders".to_string()), Value::Bool(false)]],
        );

        assert_eq!(rows.get_text(0, "TABLENAME"), Some("orders"));
        assert_eq!(rows.get_text(0, "tablename"), Some("orders"));
        assert!(rows.get(0, "missing").is_none());

        let first_cells: Vec<&Value> = rows.iter().flatten().collect();
        assert_eq!(first_cells.len(), 2);
    }

    #[test]
    fn test_rowset_empty() {
        let rows = RowSet::empty();
        assert!(rows.is_empty());
        assert_eq!(rows.len(), 0);
        assert!(rows.column_index("anything").is_none());
    }

    #[test]
    fn test_constraint_kind_parsing() {
        assert_eq!(
            ConstraintKind::from_catalog("primary key"),
            ConstraintKind::PrimaryKey
        );
        assert_eq!(ConstraintKind::from_catalog("UNIQUE"), ConstraintKind::Unique);
        assert_eq!(ConstraintKind::from_catalog("CHECK"), ConstraintKind::Other);
    }

    #[test]
    fn test_parameter_direction_parsing() {
        assert_eq!(ParameterDirection::from_catalog("IN"), ParameterDirection::In);
        assert_eq!(ParameterDirection::from_catalog("out"), ParameterDirection::Out);
        assert_eq!(
            ParameterDirection::from_catalog("INOUT"),
            ParameterDirection::InOut
        );
        assert_eq!(ParameterDirection::from_catalog(""), ParameterDirection::In);
    }
}
