//! Transport seam between the connection manager and wire drivers.
//!
//! The connection manager is written against these object-safe traits so the
//! same lifecycle, probing, and error-classification logic drives the ODBC
//! transport, an embedded native client, or a test double.

use crate::config::ConnectionConfig;
use crate::dsn::Dsn;
use crate::error::Result;
use crate::models::{RowSet, Value};
use async_trait::async_trait;

/// Factory for live SQL sessions.
#[async_trait]
pub trait SqlTransport: Send + Sync {
    /// Opens one session against the endpoint the DSN describes.
    ///
    /// # Errors
    /// Returns `Connect` for transport/auth failures; the DSN surfaced in the
    /// error is redacted.
    async fn open(&self, dsn: &Dsn, config: &ConnectionConfig) -> Result<Box<dyn SqlSession>>;
}

/// One live, exclusively owned session.
///
/// All methods take `&mut self`: statements on a session are sequential by
/// construction, matching the one-logical-caller precondition.
#[async_trait]
pub trait SqlSession: Send {
    /// Executes a statement with values bound by position.
    ///
    /// # Errors
    /// - `Statement` when the backend rejected the statement;
    /// - `ConnectionLost` on transport failure or timeout.
    async fn execute(&mut self, sql: &str, bindings: &[Value]) -> Result<RowSet>;

    /// Releases the underlying transport resources.
    async fn close(&mut self) -> Result<()>;
}
