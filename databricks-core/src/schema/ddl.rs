//! Dialect translation: identifier quoting and DDL rendering.
//!
//! The quote character is the double quote on both sides. Identifier
//! equality is case-insensitive and uses a locale-independent ASCII
//! case-fold, never locale-aware collation.

use crate::error::{DatabricksError, Result};
use crate::models::{ColumnDescriptor, RoutineDescriptor, TableDescriptor};
use crate::schema::type_mapping::to_native_type;

/// Quotes an identifier with double quotes, doubling embedded quotes.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quotes a possibly schema-qualified table name part by part.
pub fn quote_table_name(name: &str) -> String {
    name.split('.')
        .map(quote_identifier)
        .collect::<Vec<_>>()
        .join(".")
}

/// Case-insensitive identifier comparison (ASCII case-fold).
pub fn names_equal(left: &str, right: &str) -> bool {
    left.eq_ignore_ascii_case(right)
}

/// Renders the full definition fragment for one column: quoted name, native
/// type, nullability, and default.
pub fn column_definition(column: &ColumnDescriptor) -> String {
    format!(
        "{} {}",
        quote_identifier(&column.name),
        to_native_type(column)
    )
}

/// Renders `CREATE TABLE` for a descriptor and its columns.
pub fn create_table(table: &TableDescriptor) -> String {
    let columns = table
        .columns
        .iter()
        .map(column_definition)
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "CREATE TABLE {}.{} ({columns})",
        quote_identifier(&table.schema_name),
        quote_identifier(&table.name)
    )
}

/// Renders `ALTER TABLE ... ADD COLUMN` for one new column.
pub fn add_column(table: &str, column: &ColumnDescriptor) -> String {
    format!(
        "ALTER TABLE {} ADD COLUMN {}",
        quote_table_name(table),
        column_definition(column)
    )
}

/// Renders `ALTER TABLE ... ALTER COLUMN` with a full new definition.
pub fn alter_column(table: &str, column: &ColumnDescriptor) -> String {
    format!(
        "ALTER TABLE {} ALTER COLUMN {} {}",
        quote_table_name(table),
        quote_identifier(&column.name),
        to_native_type(column)
    )
}

/// Renders `ALTER TABLE ... RENAME TO`.
pub fn rename_table(table: &str, new_name: &str) -> String {
    format!(
        "ALTER TABLE {} RENAME TO {}",
        quote_table_name(table),
        quote_table_name(new_name)
    )
}

/// Renders `ALTER TABLE ... RENAME COLUMN ... TO ...`.
pub fn rename_column(table: &str, name: &str, new_name: &str) -> String {
    format!(
        "ALTER TABLE {} RENAME COLUMN {} TO {}",
        quote_table_name(table),
        quote_identifier(name),
        quote_identifier(new_name)
    )
}

/// Renders the fixed-arity invocation statement for a stored routine: one
/// `?` placeholder per declared parameter, bound by ordinal position.
pub fn call_statement(routine: &RoutineDescriptor) -> String {
    let placeholders = vec!["?"; routine.parameters.len()].join(",");
    format!(
        "CALL {}({placeholders})",
        quote_identifier(&routine.name)
    )
}

/// Sequence reset has no Databricks equivalent (identity columns, no
/// sequence objects), so this always reports an explicit unsupported
/// operation instead of silently succeeding.
///
/// # Errors
/// Always `Unsupported`.
pub fn reset_sequence(table: &str) -> Result<()> {
    Err(DatabricksError::unsupported(format!(
        "resetSequence on '{table}': Databricks has no sequence objects"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ParameterDescriptor, ParameterDirection, RoutineKind};
    use crate::schema::type_mapping::PortableType;

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("orders"), "\"orders\"");
        assert_eq!(quote_identifier("od\"d"), "\"od\"\"d\"");
        assert_eq!(quote_table_name("analytics.orders"), "\"analytics\".\"orders\"");
    }

    #[test]
    fn test_names_equal_is_ascii_case_fold() {
        assert!(names_equal("Orders", "ORDERS"));
        assert!(names_equal("orders", "orders"));
        assert!(!names_equal("orders", "order"));
    }

    #[test]
    fn test_rename_statements() {
        assert_eq!(
            rename_table("orders", "orders_v2"),
            "ALTER TABLE \"orders\" RENAME TO \"orders_v2\""
        );
        assert_eq!(
            rename_column("orders", "qty", "quantity"),
            "ALTER TABLE \"orders\" RENAME COLUMN \"qty\" TO \"quantity\""
        );
    }

    #[test]
    fn test_alter_and_add_column() {
        let column = ColumnDescriptor::new("name", PortableType::String)
            .with_size(64)
            .not_null();
        assert_eq!(
            alter_column("orders", &column),
            "ALTER TABLE \"orders\" ALTER COLUMN \"name\" VARCHAR(64) NOT NULL"
        );
        assert_eq!(
            add_column("orders", &column),
            "ALTER TABLE \"orders\" ADD COLUMN \"name\" VARCHAR(64) NOT NULL"
        );
    }

    #[test]
    fn test_create_table() {
        let table = TableDescriptor {
            name: "orders".to_string(),
            schema_name: "analytics".to_string(),
            columns: vec![
                ColumnDescriptor::new("id", PortableType::Id).not_null(),
                ColumnDescriptor::new("total", PortableType::Decimal),
            ],
            constraints: Vec::new(),
        };
        assert_eq!(
            create_table(&table),
            "CREATE TABLE \"analytics\".\"orders\" (\"id\" INTEGER IDENTITY(1,1) PRIMARY KEY NOT NULL, \"total\" DECIMAL(18,0))"
        );
    }

    #[test]
    fn test_call_statement_one_placeholder_per_parameter() {
        let parameter = |name: &str, position| ParameterDescriptor {
            name: name.to_string(),
            position,
            direction: ParameterDirection::In,
            portable_type: PortableType::Integer,
            db_type: None,
            length: None,
            precision: None,
            scale: None,
        };
        let routine = RoutineDescriptor {
            name: "refresh_orders".to_string(),
            schema_name: "analytics".to_string(),
            kind: RoutineKind::Procedure,
            parameters: vec![parameter("a", 1), parameter("b", 2)],
        };
        assert_eq!(call_statement(&routine), "CALL \"refresh_orders\"(?,?)");

        let no_params = RoutineDescriptor {
            parameters: Vec::new(),
            ..routine
        };
        assert_eq!(call_statement(&no_params), "CALL \"refresh_orders\"()");
    }

    #[test]
    fn test_reset_sequence_is_always_unsupported() {
        match reset_sequence("orders") {
            Err(DatabricksError::Unsupported { operation }) => {
                assert!(operation.contains("resetSequence"));
            }
            other => panic!("expected unsupported, got {other:?}"),
        }
    }
}
