//! Connection configuration and boundary normalization.
//!
//! Host frameworks hand this connector a loosely typed mapping, sometimes
//! with the connection fields at the root and sometimes nested under an
//! `options` key. [`ConnectionConfig::from_value`] normalizes both shapes
//! once, at the boundary, into one strongly typed struct; everything
//! downstream works with that struct only.

use crate::error::{DatabricksError, Result};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::time::Duration;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Bearer/API token for a Databricks SQL endpoint.
///
/// The wrapped string is zeroized on drop and masked in `Debug` and
/// `Serialize` output. The cleartext is only reachable through
/// [`SecretToken::expose`], which the DSN builder uses when rendering the
/// `PWD`/`token` attribute.
#[derive(Clone, Default, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct SecretToken(String);

impl SecretToken {
    /// Wraps a raw token string
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the cleartext token
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Whether the token is empty (i.e. not configured)
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for SecretToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretToken(****)")
    }
}

impl Serialize for SecretToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str("****")
    }
}

impl From<&str> for SecretToken {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

/// Configuration for one Databricks SQL warehouse connection.
///
/// `host`, `http_path`, and `token` must be non-empty before any connection
/// attempt; [`ConnectionConfig::validate`] enforces this and reports the
/// offending field. All other fields carry protocol-appropriate defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Databricks workspace host, e.g. `dbc-1234.cloud.databricks.com`
    pub host: String,
    /// HTTP path of the SQL warehouse, e.g. `/sql/1.0/warehouses/abc`
    pub http_path: String,
    /// Bearer/API token used as the `PWD` (ODBC) or `token` (native) attribute
    pub token: SecretToken,
    /// Application-layer port; Databricks SQL endpoints listen on 443
    pub port: u16,
    /// Local path to the ODBC driver shared library (ODBC transport only)
    pub driver_path: Option<String>,
    /// Use the embedded native protocol client instead of the ODBC driver
    pub use_native_protocol: bool,
    /// Schema to pin at connect time (session-scoped `SET SCHEMA`)
    pub schema: Option<String>,
    /// Wall-clock bound, in seconds, for connect and statement execution
    pub timeout: u64,
    /// Service-scoped metadata the host may attach (label, description, ...)
    #[serde(flatten)]
    pub extra_options: BTreeMap<String, serde_json::Value>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            http_path: String::new(),
            token: SecretToken::default(),
            port: 443,
            driver_path: None,
            use_native_protocol: false,
            schema: None,
            timeout: 30,
            extra_options: BTreeMap::new(),
        }
    }
}

impl std::fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Credentials intentionally omitted
        write!(
            f,
            "ConnectionConfig({}:{}{})",
            self.host,
            self.port,
            self.schema
                .as_ref()
                .map_or_else(String::new, |s| format!("/{s}"))
        )
    }
}

impl ConnectionConfig {
    /// Creates a configuration from the three required fields
    pub fn new(
        host: impl Into<String>,
        http_path: impl Into<String>,
        token: impl Into<SecretToken>,
    ) -> Self {
        Self {
            host: host.into(),
            http_path: http_path.into(),
            token: token.into(),
            ..Self::default()
        }
    }

    /// Sets the ODBC driver library path
    #[must_use]
    pub fn with_driver_path(mut self, path: impl Into<String>) -> Self {
        self.driver_path = Some(path.into());
        self
    }

    /// Sets the schema pinned at connect time
    #[must_use]
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Sets the port
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the connect/statement timeout in seconds
    #[must_use]
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Selects the native protocol client over the ODBC driver
    #[must_use]
    pub fn with_native_protocol(mut self, native: bool) -> Self {
        self.use_native_protocol = native;
        self
    }

    /// Normalizes a loosely typed configuration mapping.
    ///
    /// Connection fields may sit at the root of the mapping or nested under
    /// an `options` key; nested entries win over root-level duplicates.
    /// Unknown keys are preserved in `extra_options`.
    ///
    /// # Errors
    /// Returns a configuration error naming the mapping when the value is not
    /// a JSON object, or the field when one has the wrong shape.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let serde_json::Value::Object(mut map) = value else {
            return Err(DatabricksError::missing_field("configuration object"));
        };

        if let Some(serde_json::Value::Object(options)) = map.remove("options") {
            for (key, value) in options {
                map.insert(key, value);
            }
        }

        serde_json::from_value(serde_json::Value::Object(map)).map_err(|e| {
            DatabricksError::Configuration {
                field: e.to_string(),
            }
        })
    }

    /// Validates that every required field is present before a connection
    /// attempt.
    ///
    /// # Errors
    /// Returns `Configuration` naming the first missing field. Never
    /// performs network I/O.
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(DatabricksError::missing_field("host"));
        }
        if self.http_path.is_empty() {
            return Err(DatabricksError::missing_field("http_path"));
        }
        if self.token.is_empty() {
            return Err(DatabricksError::missing_field("token"));
        }
        if self.port == 0 {
            return Err(DatabricksError::missing_field("port"));
        }
        Ok(())
    }

    /// Connect/statement timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}
