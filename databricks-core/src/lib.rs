//! Connector for Databricks SQL warehouses.
//!
//! Builds driver-ready DSNs from declarative configuration, manages single
//! live connections over ODBC (Thrift over HTTPS underneath), translates
//! between portable column types and native Databricks SQL types, and
//! introspects warehouse catalogs through `INFORMATION_SCHEMA`.
//!
//! # Layout
//!
//! - [`config`] — declarative connection settings with secret-holding token
//! - [`dsn`] — deterministic DSN rendering and driver artifact validation
//! - [`connection`] — connection lifecycle over a pluggable transport seam
//! - [`schema`] — catalog introspection, type mapping, and DDL rendering
//! - [`error`] — the error taxonomy shared by every operation
//! - [`observer`] — connection event hooks, `tracing`-backed by default
//!
//! # Example
//!
//! ```no_run
//! use databricks_core::{Connection, ConnectionConfig, SchemaIntrospector};
//! # async fn run(transport: &dyn databricks_core::SqlTransport) -> databricks_core::Result<()> {
//! let config = ConnectionConfig::new(
//!     "dbc-a1b2c3d4-e5f6.cloud.databricks.com",
//!     "/sql/1.0/warehouses/abc123",
//!     "dapi-secret-token",
//! )
//! .with_driver_path("/opt/simba/spark/lib/64/libsparkodbc_sb64.so")
//! .with_schema("analytics");
//!
//! let mut connection = Connection::connect(transport, &config).await?;
//! let tables = SchemaIntrospector::new(&mut connection)
//!     .list_tables("analytics")
//!     .await?;
//! connection.close().await?;
//! # Ok(())
//! # }
//! ```
//!
//! Credentials never surface: DSNs embed the token but every rendered or
//! logged form is redacted first.

pub mod config;
pub mod connection;
pub mod dsn;
pub mod error;
pub mod logging;
pub mod models;
pub mod observer;
pub mod schema;

pub use config::{ConnectionConfig, SecretToken};
pub use connection::transport::{SqlSession, SqlTransport};
pub use connection::Connection;
pub use dsn::{Dsn, Transport};
pub use error::{DatabricksError, Result};
pub use models::{
    ColumnDescriptor, ConstraintDescriptor, ConstraintKind, DefaultValue, ParameterDescriptor,
    ParameterDirection, RoutineDescriptor, RoutineKind, RowSet, TableDescriptor, Value,
};
pub use observer::{Observer, ObserverRef};
pub use schema::type_mapping::PortableType;
pub use schema::SchemaIntrospector;

#[cfg(feature = "odbc")]
pub use connection::odbc::OdbcTransport;
