//! ODBC transport backed by the platform driver manager.
//!
//! Requires the Databricks (Simba Spark) ODBC driver shared library on the
//! local filesystem; the DSN builder has already verified the artifact by the
//! time a session is opened here. Round-trips are blocking ODBC calls made
//! inline from the async trait methods. The configured timeout bounds both
//! the login handshake and every executed statement.

use super::transport::{SqlSession, SqlTransport};
use crate::config::ConnectionConfig;
use crate::dsn::Dsn;
use crate::error::{DatabricksError, Result};
use crate::models::{RowSet, Value};
use async_trait::async_trait;
use odbc_api::buffers::TextRowSet;
use odbc_api::{Bit, ConnectionOptions, Cursor, InputParameter, IntoParameter, Nullable, ResultSetMetadata};
use regex::Regex;
use std::sync::OnceLock;

/// Rows fetched per ODBC batch
const BATCH_SIZE: usize = 1024;
/// Upper bound, in bytes, for one text cell in the fetch buffer
const MAX_CELL_BYTES: usize = 4096;

/// Transport opening sessions through the process-wide ODBC environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct OdbcTransport;

impl OdbcTransport {
    /// Creates the transport
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SqlTransport for OdbcTransport {
    async fn open(&self, dsn: &Dsn, config: &ConnectionConfig) -> Result<Box<dyn SqlSession>> {
        let environment = odbc_api::environment().map_err(|e| {
            DatabricksError::connect_failed(
                dsn.redacted(),
                format!("ODBC environment unavailable: {e}"),
            )
        })?;

        // The scheme prefix is ours, not the driver manager's
        let connection_string = dsn
            .as_str()
            .strip_prefix("odbc:")
            .unwrap_or_else(|| dsn.as_str());

        let login_timeout = u32::try_from(config.timeout).unwrap_or(u32::MAX);
        let mut options = ConnectionOptions::default();
        options.login_timeout_sec = Some(login_timeout);

        let connection = environment
            .connect_with_connection_string(connection_string, options)
            .map_err(|e| DatabricksError::connect_failed(dsn.redacted(), e.to_string()))?;

        Ok(Box::new(OdbcSession {
            connection,
            query_timeout: query_timeout(config.timeout),
        }))
    }
}

/// One live ODBC connection.
pub struct OdbcSession {
    connection: odbc_api::Connection<'static>,
    query_timeout: Option<usize>,
}

/// Statement timeout handed to the driver on each execute; zero means
/// unbounded.
fn query_timeout(timeout_secs: u64) -> Option<usize> {
    if timeout_secs == 0 {
        None
    } else {
        Some(usize::try_from(timeout_secs).unwrap_or(usize::MAX))
    }
}

#[async_trait]
impl SqlSession for OdbcSession {
    async fn execute(&mut self, sql: &str, bindings: &[Value]) -> Result<RowSet> {
        let parameters = to_parameters(bindings);

        let maybe_cursor = self
            .connection
            .execute(sql, parameters.as_slice(), self.query_timeout)
            .map_err(|e| classify_odbc_error(&e, "execute"))?;

        let Some(mut cursor) = maybe_cursor else {
            // DDL and session statements produce no result set
            return Ok(RowSet::empty());
        };

        let column_count = cursor
            .num_result_cols()
            .map_err(|e| classify_odbc_error(&e, "column count"))?;
        let column_count = usize::try_from(column_count).unwrap_or(0);

        let mut columns = Vec::with_capacity(column_count);
        for index in 1..=column_count {
            let name = cursor
                .col_name(index as u16)
                .map_err(|e| classify_odbc_error(&e, "column name"))?;
            columns.push(name);
        }

        let mut buffers = TextRowSet::for_cursor(BATCH_SIZE, &mut cursor, Some(MAX_CELL_BYTES))
            .map_err(|e| classify_odbc_error(&e, "row buffer"))?;
        let mut row_cursor = cursor
            .bind_buffer(&mut buffers)
            .map_err(|e| classify_odbc_error(&e, "bind buffer"))?;

        let mut rows = Vec::new();
        while let Some(batch) = row_cursor
            .fetch()
            .map_err(|e| classify_odbc_error(&e, "fetch"))?
        {
            for row_index in 0..batch.num_rows() {
                let mut row = Vec::with_capacity(column_count);
                for column_index in 0..column_count {
                    let value = batch.at(column_index, row_index).map_or(Value::Null, |bytes| {
                        Value::Text(String::from_utf8_lossy(bytes).into_owned())
                    });
                    row.push(value);
                }
                rows.push(row);
            }
        }

        Ok(RowSet::new(columns, rows))
    }

    async fn close(&mut self) -> Result<()> {
        // The driver tears the session down when the connection drops
        Ok(())
    }
}

/// Converts positional values into dynamically typed ODBC parameters.
fn to_parameters(bindings: &[Value]) -> Vec<Box<dyn InputParameter>> {
    bindings
        .iter()
        .map(|value| -> Box<dyn InputParameter> {
            match value {
                Value::Null => Box::new(Nullable::<i32>::null()),
                Value::Bool(b) => Box::new(Bit(u8::from(*b))),
                Value::Int(i) => Box::new(*i),
                Value::Double(d) => Box::new(*d),
                Value::Text(s) => Box::new(s.clone().into_parameter()),
                Value::Bytes(b) => Box::new(b.clone().into_parameter()),
            }
        })
        .collect()
}

/// SQLSTATE classes that indicate the link, not the statement, failed
const LINK_FAILURE_STATES: &[&str] = &[
    "08001", "08003", "08004", "08007", "08s01", "hyt00", "hyt01",
];

/// Splits driver errors into `ConnectionLost` (retry-eligible) and
/// `Statement` (not) based on SQLSTATE and message text.
fn classify_odbc_error(error: &odbc_api::Error, operation: &str) -> DatabricksError {
    classify_error_text(&error.to_string(), operation)
}

fn classify_error_text(text: &str, operation: &str) -> DatabricksError {
    let lowered = text.to_ascii_lowercase();

    let link_failure = LINK_FAILURE_STATES.iter().any(|s| lowered.contains(s))
        || lowered.contains("timeout")
        || lowered.contains("communication link");

    if link_failure {
        DatabricksError::connection_lost(format!("{operation}: {text}"))
    } else {
        DatabricksError::statement(find_sqlstate(text), text)
    }
}

/// Pulls a SQLSTATE out of a driver diagnostic message, when present.
#[allow(clippy::unwrap_used)] // the pattern is a compile-time constant
fn find_sqlstate(text: &str) -> Option<String> {
    static STATE_RE: OnceLock<Regex> = OnceLock::new();
    let re = STATE_RE.get_or_init(|| Regex::new(r"(?i)state:?\s*\[?([0-9A-Z]{5})\]?").unwrap());
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::{classify_error_text, find_sqlstate, query_timeout};
    use crate::error::DatabricksError;

    #[test]
    fn test_find_sqlstate() {
        assert_eq!(
            find_sqlstate("ODBC diagnostics. State: 42000, message: syntax error"),
            Some("42000".to_string())
        );
        assert_eq!(find_sqlstate("no state in here"), None);
    }

    #[test]
    fn test_link_failures_classify_as_connection_lost() {
        let cases = [
            "ODBC diagnostics. State: 08S01, message: communication link failure",
            "State: HYT00, message: query timeout expired",
            "no SQLSTATE here, just a statement timeout expired message",
        ];
        for text in cases {
            let error = classify_error_text(text, "execute");
            assert!(
                matches!(error, DatabricksError::ConnectionLost { .. }),
                "{text} should classify as connection-lost, got {error:?}"
            );
            assert!(error.is_retryable());
        }
    }

    #[test]
    fn test_backend_rejections_classify_as_statement() {
        let error =
            classify_error_text("ODBC diagnostics. State: 42000, message: syntax error", "execute");
        match error {
            DatabricksError::Statement { code, message } => {
                assert_eq!(code.as_deref(), Some("42000"));
                assert!(message.contains("syntax error"));
            }
            other => panic!("expected statement error, got {other:?}"),
        }
        assert!(!classify_error_text("State: 42000, message: bad", "execute").is_retryable());
    }

    #[test]
    fn test_query_timeout_zero_means_unbounded() {
        assert_eq!(query_timeout(0), None);
        assert_eq!(query_timeout(30), Some(30));
    }
}
