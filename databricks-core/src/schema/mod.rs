//! Schema introspection for Databricks SQL warehouses.
//!
//! Table listing goes through the native `SHOW TABLES` command (cheaper and
//! more reliable than the catalog view for plain enumeration); everything
//! else reads `INFORMATION_SCHEMA`. Descriptors are rebuilt on every call —
//! caching is the host's business, not this crate's.

pub mod ddl;
pub mod type_mapping;

use crate::connection::Connection;
use crate::error::{DatabricksError, Result};
use crate::models::{
    ColumnDescriptor, ConstraintDescriptor, ConstraintKind, DefaultValue, ParameterDescriptor,
    ParameterDirection, RoutineDescriptor, RoutineKind, RowSet, TableDescriptor, Value,
};
use type_mapping::{from_native_type, PortableType};

/// Introspector over one connected handle.
///
/// Stateless beyond the borrowed connection; the only session state involved
/// is the current schema, which lives on the connection itself.
pub struct SchemaIntrospector<'c> {
    connection: &'c mut Connection,
}

impl<'c> SchemaIntrospector<'c> {
    /// Wraps a connected handle
    pub fn new(connection: &'c mut Connection) -> Self {
        Self { connection }
    }

    /// Lists all schemas visible to the session.
    ///
    /// # Errors
    /// Propagates statement/transport failures.
    pub async fn list_schemas(&mut self) -> Result<Vec<String>> {
        let rows = self
            .connection
            .execute("SELECT SCHEMA_NAME FROM INFORMATION_SCHEMA.SCHEMATA", &[])
            .await?;
        Ok(text_column(&rows, "SCHEMA_NAME"))
    }

    /// Lists table names through the native `SHOW TABLES` command.
    ///
    /// A warehouse with zero tables yields an empty sequence; only
    /// connection or statement failures raise.
    ///
    /// # Errors
    /// Propagates statement/transport failures.
    pub async fn list_tables(&mut self, schema: &str) -> Result<Vec<String>> {
        let sql = if schema.is_empty() {
            "SHOW TABLES".to_string()
        } else {
            format!("SHOW TABLES IN {}", ddl::quote_identifier(schema))
        };
        tracing::debug!(schema, "listing tables");

        let rows = self.connection.execute(&sql, &[]).await?;
        let tables = text_column(&rows, "tableName");
        tracing::debug!(count = tables.len(), "tables found");
        Ok(tables)
    }

    /// Loads column descriptors for one table from
    /// `INFORMATION_SCHEMA.COLUMNS`.
    ///
    /// # Errors
    /// Propagates statement/transport failures.
    pub async fn load_columns(
        &mut self,
        schema: &str,
        table: &str,
    ) -> Result<Vec<ColumnDescriptor>> {
        let sql = "SELECT COLUMN_NAME, DATA_TYPE, IS_NULLABLE, COLUMN_DEFAULT, \
                   CHARACTER_MAXIMUM_LENGTH, NUMERIC_PRECISION, NUMERIC_SCALE, ORDINAL_POSITION \
                   FROM INFORMATION_SCHEMA.COLUMNS \
                   WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ? \
                   ORDER BY ORDINAL_POSITION";
        let rows = self
            .connection
            .execute(sql, &[Value::from(schema), Value::from(table)])
            .await?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in 0..rows.len() {
            let Some(name) = rows.get_text(row, "COLUMN_NAME") else {
                continue;
            };
            let db_type = rows.get_text(row, "DATA_TYPE").unwrap_or_default();
            let info = from_native_type(db_type);

            let mut column = ColumnDescriptor::new(name, info.portable);
            column.db_type = Some(db_type.to_string());
            column.allow_null = rows
                .get_text(row, "IS_NULLABLE")
                .map_or(true, |n| n.eq_ignore_ascii_case("YES"));
            column.size = get_u32(&rows, row, "CHARACTER_MAXIMUM_LENGTH").or(info.size);
            column.precision = get_u32(&rows, row, "NUMERIC_PRECISION").or(info.precision);
            column.scale = get_u32(&rows, row, "NUMERIC_SCALE").or(info.scale);
            column.default = rows
                .get_text(row, "COLUMN_DEFAULT")
                .map(parse_catalog_default);
            column.ordinal_position =
                get_u32(&rows, row, "ORDINAL_POSITION").unwrap_or(columns.len() as u32 + 1);

            columns.push(column);
        }
        Ok(columns)
    }

    /// Assembles a full table descriptor: columns plus the table's share of
    /// the schema-level constraints.
    ///
    /// # Errors
    /// Propagates statement/transport failures.
    pub async fn load_table(&mut self, schema: &str, table: &str) -> Result<TableDescriptor> {
        let columns = self.load_columns(schema, table).await?;
        let constraints = self
            .load_constraints(schema)
            .await?
            .into_iter()
            .filter(|c| ddl::names_equal(&c.table_name, table))
            .collect();

        Ok(TableDescriptor {
            name: table.to_string(),
            schema_name: schema.to_string(),
            columns,
            constraints,
        })
    }

    /// Loads every table constraint declared in a schema.
    ///
    /// # Errors
    /// Propagates statement/transport failures.
    pub async fn load_constraints(&mut self, schema: &str) -> Result<Vec<ConstraintDescriptor>> {
        let sql = "SELECT CONSTRAINT_NAME, TABLE_NAME, TABLE_SCHEMA, CONSTRAINT_TYPE \
                   FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS \
                   WHERE TABLE_SCHEMA = ?";
        let rows = self
            .connection
            .execute(sql, &[Value::from(schema)])
            .await?;

        let mut constraints = Vec::with_capacity(rows.len());
        for row in 0..rows.len() {
            let Some(name) = rows.get_text(row, "CONSTRAINT_NAME") else {
                continue;
            };
            constraints.push(ConstraintDescriptor {
                name: name.to_string(),
                table_name: rows
                    .get_text(row, "TABLE_NAME")
                    .unwrap_or_default()
                    .to_string(),
                schema_name: rows
                    .get_text(row, "TABLE_SCHEMA")
                    .unwrap_or(schema)
                    .to_string(),
                kind: rows
                    .get_text(row, "CONSTRAINT_TYPE")
                    .map_or(ConstraintKind::Other, ConstraintKind::from_catalog),
            });
        }
        Ok(constraints)
    }

    /// Lists view names in a schema.
    ///
    /// # Errors
    /// Propagates statement/transport failures.
    pub async fn list_views(&mut self, schema: &str) -> Result<Vec<String>> {
        let sql = "SELECT TABLE_NAME FROM INFORMATION_SCHEMA.TABLES \
                   WHERE TABLE_SCHEMA = ? AND TABLE_TYPE = 'VIEW'";
        let rows = self
            .connection
            .execute(sql, &[Value::from(schema)])
            .await?;
        Ok(text_column(&rows, "TABLE_NAME"))
    }

    /// Lists stored procedure names in a schema.
    ///
    /// # Errors
    /// Propagates statement/transport failures.
    pub async fn list_procedures(&mut self, schema: &str) -> Result<Vec<String>> {
        self.list_routines(schema, RoutineKind::Procedure).await
    }

    /// Lists stored function names in a schema.
    ///
    /// # Errors
    /// Propagates statement/transport failures.
    pub async fn list_functions(&mut self, schema: &str) -> Result<Vec<String>> {
        self.list_routines(schema, RoutineKind::Function).await
    }

    async fn list_routines(&mut self, schema: &str, kind: RoutineKind) -> Result<Vec<String>> {
        let sql = "SELECT ROUTINE_NAME FROM INFORMATION_SCHEMA.ROUTINES \
                   WHERE ROUTINE_SCHEMA = ? AND ROUTINE_TYPE = ?";
        let rows = self
            .connection
            .execute(
                sql,
                &[Value::from(schema), Value::from(kind.catalog_filter())],
            )
            .await?;
        Ok(text_column(&rows, "ROUTINE_NAME"))
    }

    /// Loads the ordered parameters of one routine from
    /// `INFORMATION_SCHEMA.PARAMETERS`.
    ///
    /// # Errors
    /// Propagates statement/transport failures.
    pub async fn load_parameters(
        &mut self,
        schema: &str,
        routine: &str,
    ) -> Result<Vec<ParameterDescriptor>> {
        let sql = "SELECT PARAMETER_NAME, ORDINAL_POSITION, PARAMETER_MODE, DATA_TYPE, \
                   CHARACTER_MAXIMUM_LENGTH, NUMERIC_PRECISION, NUMERIC_SCALE \
                   FROM INFORMATION_SCHEMA.PARAMETERS \
                   WHERE SPECIFIC_SCHEMA = ? AND SPECIFIC_NAME = ? \
                   ORDER BY ORDINAL_POSITION";
        let rows = self
            .connection
            .execute(sql, &[Value::from(schema), Value::from(routine)])
            .await?;

        let mut parameters = Vec::with_capacity(rows.len());
        for row in 0..rows.len() {
            let db_type = rows.get_text(row, "DATA_TYPE").unwrap_or_default();
            let info = from_native_type(db_type);

            parameters.push(ParameterDescriptor {
                name: rows
                    .get_text(row, "PARAMETER_NAME")
                    .unwrap_or_default()
                    .to_string(),
                position: get_u32(&rows, row, "ORDINAL_POSITION")
                    .unwrap_or(parameters.len() as u32 + 1),
                direction: rows
                    .get_text(row, "PARAMETER_MODE")
                    .map_or(ParameterDirection::In, ParameterDirection::from_catalog),
                portable_type: info.portable,
                db_type: Some(db_type.to_string()),
                length: get_u32(&rows, row, "CHARACTER_MAXIMUM_LENGTH").or(info.size),
                precision: get_u32(&rows, row, "NUMERIC_PRECISION").or(info.precision),
                scale: get_u32(&rows, row, "NUMERIC_SCALE").or(info.scale),
            });
        }
        Ok(parameters)
    }

    /// Assembles a routine descriptor (name, kind, ordered parameters).
    ///
    /// # Errors
    /// Propagates statement/transport failures.
    pub async fn load_routine(
        &mut self,
        schema: &str,
        name: &str,
        kind: RoutineKind,
    ) -> Result<RoutineDescriptor> {
        let parameters = self.load_parameters(schema, name).await?;
        Ok(RoutineDescriptor {
            name: name.to_string(),
            schema_name: schema.to_string(),
            kind,
            parameters,
        })
    }

    /// Invokes a stored routine through a fixed-arity `CALL` statement.
    ///
    /// Values are bound strictly by ordinal position, coerced to the
    /// parameter's declared portable type first.
    ///
    /// # Errors
    /// - `Statement` when the value count does not match the declared arity;
    /// - otherwise propagates statement/transport failures.
    pub async fn call_routine(
        &mut self,
        routine: &RoutineDescriptor,
        values: &[Value],
    ) -> Result<RowSet> {
        if values.len() != routine.parameters.len() {
            return Err(DatabricksError::statement(
                None,
                format!(
                    "routine '{}' declares {} parameter(s), got {} value(s)",
                    routine.name,
                    routine.parameters.len(),
                    values.len()
                ),
            ));
        }

        let bindings: Vec<Value> = routine
            .parameters
            .iter()
            .zip(values)
            .map(|(parameter, value)| coerce_value(value, parameter.portable_type))
            .collect();

        let sql = ddl::call_statement(routine);
        self.connection.execute(&sql, &bindings).await
    }

    /// Executes a rendered `ALTER TABLE ... ALTER COLUMN` statement.
    ///
    /// # Errors
    /// Propagates statement/transport failures.
    pub async fn alter_column(&mut self, table: &str, column: &ColumnDescriptor) -> Result<()> {
        let sql = ddl::alter_column(table, column);
        self.connection.execute(&sql, &[]).await.map(|_| ())
    }

    /// Executes a rendered `ALTER TABLE ... RENAME TO` statement.
    ///
    /// # Errors
    /// Propagates statement/transport failures.
    pub async fn rename_table(&mut self, table: &str, new_name: &str) -> Result<()> {
        let sql = ddl::rename_table(table, new_name);
        self.connection.execute(&sql, &[]).await.map(|_| ())
    }

    /// Executes a rendered `ALTER TABLE ... RENAME COLUMN` statement.
    ///
    /// # Errors
    /// Propagates statement/transport failures.
    pub async fn rename_column(&mut self, table: &str, name: &str, new_name: &str) -> Result<()> {
        let sql = ddl::rename_column(table, name, new_name);
        self.connection.execute(&sql, &[]).await.map(|_| ())
    }

    /// Sequence reset is not a valid operation on this warehouse.
    ///
    /// # Errors
    /// Always `Unsupported`; never a silent no-op, so callers can tell "no
    /// sequence to reset" apart from "reset does not exist here".
    pub fn reset_sequence(&self, table: &str) -> Result<()> {
        ddl::reset_sequence(table)
    }
}

/// Extracts one text column from every row, skipping NULLs.
fn text_column(rows: &RowSet, column: &str) -> Vec<String> {
    let Some(index) = rows.column_index(column) else {
        return Vec::new();
    };
    rows.iter()
        .filter_map(|row| row.get(index).and_then(Value::as_text).map(str::to_string))
        .collect()
}

/// Reads an integral catalog cell that drivers may report as text or int.
fn get_u32(rows: &RowSet, row: usize, column: &str) -> Option<u32> {
    match rows.get(row, column)? {
        Value::Int(i) => u32::try_from(*i).ok(),
        Value::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Classifies a catalog-reported default: single-quoted text is a literal,
/// anything else is an expression (`CURRENT_TIMESTAMP` and friends).
fn parse_catalog_default(raw: &str) -> DefaultValue {
    let trimmed = raw.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('\'') && trimmed.ends_with('\'') {
        DefaultValue::Literal(trimmed[1..trimmed.len() - 1].replace("''", "'"))
    } else {
        DefaultValue::Expression(trimmed.to_string())
    }
}

/// Coerces a value to a parameter's declared portable type before binding.
fn coerce_value(value: &Value, portable: PortableType) -> Value {
    if value.is_null() {
        return Value::Null;
    }
    match portable {
        PortableType::Id | PortableType::Reference | PortableType::Integer => match value {
            Value::Int(_) => value.clone(),
            Value::Text(s) => s.trim().parse().map_or_else(|_| value.clone(), Value::Int),
            Value::Bool(b) => Value::Int(i64::from(*b)),
            Value::Double(d) => Value::Int(*d as i64),
            other => other.clone(),
        },
        PortableType::Double | PortableType::Float | PortableType::Decimal => match value {
            Value::Double(_) => value.clone(),
            Value::Int(i) => Value::Double(*i as f64),
            Value::Text(s) => s
                .trim()
                .parse()
                .map_or_else(|_| value.clone(), Value::Double),
            other => other.clone(),
        },
        PortableType::Boolean => match value {
            Value::Bool(_) => value.clone(),
            Value::Int(i) => Value::Bool(*i != 0),
            Value::Text(s) => Value::Bool(s.eq_ignore_ascii_case("true") || s.trim() == "1"),
            other => other.clone(),
        },
        PortableType::Binary => match value {
            Value::Bytes(_) => value.clone(),
            Value::Text(s) => Value::Bytes(s.clone().into_bytes()),
            other => other.clone(),
        },
        _ => match value {
            Value::Text(_) => value.clone(),
            Value::Int(i) => Value::Text(i.to_string()),
            Value::Double(d) => Value::Text(d.to_string()),
            Value::Bool(b) => Value::Text(b.to_string()),
            other => other.clone(),
        },
    }
}
