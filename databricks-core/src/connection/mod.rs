//! Connection lifecycle: open, probe, execute, session schema, close.
//!
//! One [`Connection`] owns exactly one live session for its whole lifetime;
//! there is no pooling and no internal locking. Hosts that want parallelism
//! run independent connections, each with its own handle.

pub mod transport;

#[cfg(feature = "odbc")]
pub mod odbc;

use crate::config::ConnectionConfig;
use crate::dsn::{self, Dsn, Transport};
use crate::error::{DatabricksError, Result};
use crate::models::{RowSet, Value};
use crate::observer::{default_observer, ObserverRef};
use crate::schema::ddl::quote_identifier;
use transport::{SqlSession, SqlTransport};

/// Handle owning one live connection to a Databricks SQL warehouse.
///
/// Created through [`Connection::connect`]; the handle is returned only
/// after a successful `SELECT 1` probe. Closed exactly once, on teardown.
pub struct Connection {
    session: Box<dyn SqlSession>,
    dsn: Dsn,
    default_schema: Option<String>,
    current_schema: Option<String>,
    observer: ObserverRef,
    closed: bool,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("dsn", &self.dsn)
            .field("default_schema", &self.default_schema)
            .field("current_schema", &self.current_schema)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl Connection {
    /// Connects with the default `tracing`-backed observer.
    ///
    /// # Errors
    /// See [`Connection::connect_with_observer`].
    pub async fn connect(transport: &dyn SqlTransport, config: &ConnectionConfig) -> Result<Self> {
        Self::connect_with_observer(transport, config, default_observer()).await
    }

    /// Builds the DSN, opens the transport, probes the session, and pins the
    /// configured schema.
    ///
    /// The probe (`SELECT 1`) runs before the handle is handed out, so a
    /// returned connection has completed at least one round-trip. Any probe
    /// failure is classified as a connect-time error, whatever the transport
    /// reported mid-probe.
    ///
    /// # Errors
    /// - `Configuration` / `DriverUnavailable` from DSN construction;
    /// - `Connect` for transport or auth failures, carrying the redacted DSN.
    pub async fn connect_with_observer(
        transport: &dyn SqlTransport,
        config: &ConnectionConfig,
        observer: ObserverRef,
    ) -> Result<Self> {
        let dsn = dsn::build(config, Transport::from_config(config))?;
        observer.connect_attempt(&dsn.redacted());

        let session = match transport.open(&dsn, config).await {
            Ok(session) => session,
            Err(error) => {
                observer.error_classified(error.kind(), &error.to_string());
                return Err(error);
            }
        };

        let mut connection = Self {
            session,
            dsn,
            default_schema: None,
            current_schema: None,
            observer,
            closed: false,
        };

        if let Err(error) = connection.execute("SELECT 1", &[]).await {
            return Err(DatabricksError::connect_failed(
                connection.dsn.redacted(),
                format!("liveness probe failed: {error}"),
            ));
        }

        if let Some(schema) = config.schema.clone() {
            connection.set_current_schema(&schema).await.map_err(|e| {
                DatabricksError::connect_failed(
                    connection.dsn.redacted(),
                    format!("failed to pin schema '{schema}': {e}"),
                )
            })?;
            connection.default_schema = connection.current_schema.clone();
        }

        tracing::info!(dsn = %connection.dsn, "connection established");
        Ok(connection)
    }

    /// Executes one statement with values bound by position.
    ///
    /// User-supplied values are never interpolated into SQL text; identifiers
    /// are the one exception and are quoted, not escaped, by the callers that
    /// render DDL.
    ///
    /// # Errors
    /// - `Statement` when the backend returned an error payload;
    /// - `ConnectionLost` on transport drop or timeout (retry-eligible).
    pub async fn execute(&mut self, sql: &str, bindings: &[Value]) -> Result<RowSet> {
        if self.closed {
            return Err(DatabricksError::connection_lost("handle already closed"));
        }

        self.observer.statement_issued(sql);
        match self.session.execute(sql, bindings).await {
            Ok(rows) => Ok(rows),
            Err(error) => {
                self.observer.error_classified(error.kind(), &error.to_string());
                Err(error)
            }
        }
    }

    /// Switches the session schema.
    ///
    /// The name is canonicalized to upper case (unquoted identifiers are
    /// case-insensitive in this dialect) and quoted. Session state only; not
    /// atomic with surrounding statements.
    ///
    /// # Errors
    /// Propagates statement/transport failures from the `SET SCHEMA` call.
    pub async fn set_current_schema(&mut self, schema: &str) -> Result<()> {
        let canonical = schema.to_ascii_uppercase();
        let sql = format!("SET SCHEMA {}", quote_identifier(&canonical));
        self.execute(&sql, &[]).await?;
        self.current_schema = Some(canonical);
        Ok(())
    }

    /// Restores the schema recorded at connect time.
    ///
    /// No-op when no schema was configured.
    ///
    /// # Errors
    /// Propagates statement/transport failures from the `SET SCHEMA` call.
    pub async fn reset_current_schema(&mut self) -> Result<()> {
        match self.default_schema.clone() {
            Some(schema) => self.set_current_schema(&schema).await,
            None => Ok(()),
        }
    }

    /// Schema pinned at connect time, when one was configured
    pub fn default_schema(&self) -> Option<&str> {
        self.default_schema.as_deref()
    }

    /// Schema the session currently points at
    pub fn current_schema(&self) -> Option<&str> {
        self.current_schema.as_deref()
    }

    /// The DSN this connection was opened with (redacts on display)
    pub fn dsn(&self) -> &Dsn {
        &self.dsn
    }

    /// Whether `close` has run
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Releases the underlying session. Idempotent.
    ///
    /// # Errors
    /// Propagates transport teardown failures from the first call only.
    pub async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.session.close().await
    }
}
