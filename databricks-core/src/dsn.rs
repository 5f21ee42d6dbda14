//! DSN construction for Databricks SQL endpoints.
//!
//! Two renderings of the same configuration: the ODBC form consumed by the
//! Simba/Spark ODBC driver, and a scheme-qualified native form for embedded
//! protocol clients. `SSL=1`, `ThriftTransport=2`, and `AuthMech=3` are
//! protocol constants for token-authenticated endpoints, not configuration.

use crate::config::ConnectionConfig;
use crate::error::{redact_dsn, DatabricksError, Result};
use std::path::Path;

/// Transport selector for [`build`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Locally installed ODBC driver library
    Odbc,
    /// Protocol client embedded in the adapter
    Native,
}

impl Transport {
    /// Transport implied by a configuration
    pub fn from_config(config: &ConnectionConfig) -> Self {
        if config.use_native_protocol {
            Self::Native
        } else {
            Self::Odbc
        }
    }
}

impl std::fmt::Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Odbc => f.write_str("odbc"),
            Self::Native => f.write_str("native"),
        }
    }
}

/// A fully rendered, immutable connection string.
///
/// The raw form embeds the bearer token and is only reachable through
/// [`Dsn::as_str`]; `Display` and `Debug` emit the redacted form so a DSN
/// can never leak a token through logging.
#[derive(Clone, PartialEq, Eq)]
pub struct Dsn {
    rendered: String,
    transport: Transport,
}

impl Dsn {
    /// Raw connection string, token included. Hand this to the driver only.
    pub fn as_str(&self) -> &str {
        &self.rendered
    }

    /// Connection string with the token fragment masked
    pub fn redacted(&self) -> String {
        redact_dsn(&self.rendered)
    }

    /// Transport this DSN was rendered for
    pub fn transport(&self) -> Transport {
        self.transport
    }
}

impl std::fmt::Display for Dsn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.redacted())
    }
}

impl std::fmt::Debug for Dsn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dsn")
            .field("rendered", &self.redacted())
            .field("transport", &self.transport)
            .finish()
    }
}

/// Builds a DSN from validated configuration.
///
/// Deterministic: the same configuration always renders the same string.
/// The only I/O performed is the driver artifact check for the ODBC
/// transport.
///
/// # Errors
/// - `Configuration` when `host`, `http_path`, or `token` is missing, or
///   when the ODBC transport is selected without a `driver_path`;
/// - `DriverUnavailable` when the driver library path does not exist, is not
///   a file, or is not readable — a distinct kind, because the same
///   configuration may be valid on a host that has the driver installed.
pub fn build(config: &ConnectionConfig, transport: Transport) -> Result<Dsn> {
    config.validate()?;

    let rendered = match transport {
        Transport::Odbc => {
            let driver_path = config
                .driver_path
                .as_deref()
                .ok_or_else(|| DatabricksError::missing_field("driver_path"))?;
            check_driver_artifact(driver_path)?;

            format!(
                "odbc:Driver={driver_path};Host={host};HTTPPath={http_path};UID=token;PWD={token};Port=443;SSL=1;ThriftTransport=2;AuthMech=3",
                host = config.host,
                http_path = config.http_path,
                token = config.token.expose(),
            )
        }
        Transport::Native => {
            let host_port = if config.port == 443 {
                config.host.clone()
            } else {
                format!("{}:{}", config.host, config.port)
            };
            format!(
                "databricks:host={host_port};http_path={http_path};token={token};thrift_transport=2;ssl=1;auth_mech=3",
                http_path = config.http_path,
                token = config.token.expose(),
            )
        }
    };

    Ok(Dsn {
        rendered,
        transport,
    })
}

/// Verifies the ODBC driver shared library exists and is readable.
fn check_driver_artifact(path: &str) -> Result<()> {
    let metadata = std::fs::metadata(Path::new(path)).map_err(|e| {
        DatabricksError::driver_unavailable(path, format!("not found: {e}"))
    })?;

    if !metadata.is_file() {
        return Err(DatabricksError::driver_unavailable(
            path,
            "not a regular file",
        ));
    }

    std::fs::File::open(path)
        .map(|_| ())
        .map_err(|e| DatabricksError::driver_unavailable(path, format!("not readable: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> ConnectionConfig {
        ConnectionConfig::new(
            "h.cloud.databricks.com",
            "/sql/1.0/warehouses/abc",
            "tok",
        )
    }

    /// Creates a readable stand-in for the driver shared library.
    fn fake_driver() -> (tempdir::TempDirGuard, String) {
        tempdir::create_driver_stub()
    }

    mod tempdir {
        use std::path::PathBuf;

        pub struct TempDirGuard(PathBuf);

        impl Drop for TempDirGuard {
            fn drop(&mut self) {
                let _ = std::fs::remove_file(&self.0);
            }
        }

        pub fn create_driver_stub() -> (TempDirGuard, String) {
            let path = std::env::temp_dir().join(format!(
                "libsparkodbc-test-{}.so",
                std::process::id()
            ));
            std::fs::write(&path, b"stub").unwrap();
            let rendered = path.to_string_lossy().into_owned();
            (TempDirGuard(path), rendered)
        }
    }

    #[test]
    fn test_odbc_dsn_canonical_layout() {
        let (_guard, driver) = fake_driver();
        let config = valid_config().with_driver_path(&driver);

        let dsn = build(&config, Transport::Odbc).unwrap();
        let expected = format!(
            "odbc:Driver={driver};Host=h.cloud.databricks.com;HTTPPath=/sql/1.0/warehouses/abc;UID=token;PWD=tok;Port=443;SSL=1;ThriftTransport=2;AuthMech=3"
        );
        assert_eq!(dsn.as_str(), expected);

        // Determinism
        let again = build(&config, Transport::Odbc).unwrap();
        assert_eq!(dsn.as_str(), again.as_str());
    }

    #[test]
    fn test_native_dsn_layout() {
        let dsn = build(&valid_config(), Transport::Native).unwrap();
        assert_eq!(
            dsn.as_str(),
            "databricks:host=h.cloud.databricks.com;http_path=/sql/1.0/warehouses/abc;token=tok;thrift_transport=2;ssl=1;auth_mech=3"
        );

        let dsn = build(&valid_config().with_port(8443), Transport::Native).unwrap();
        assert!(dsn.as_str().contains("host=h.cloud.databricks.com:8443;"));
    }

    #[test]
    fn test_missing_fields_fail_before_any_io() {
        let config = ConnectionConfig::new("", "/sql/1.0/warehouses/abc", "tok")
            .with_driver_path("/definitely/not/present.so");
        match build(&config, Transport::Odbc) {
            Err(DatabricksError::Configuration { field }) => assert_eq!(field, "host"),
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_driver_artifact_is_distinct_kind() {
        let config = valid_config().with_driver_path("/definitely/not/present.so");
        match build(&config, Transport::Odbc) {
            Err(DatabricksError::DriverUnavailable { path, .. }) => {
                assert_eq!(path, "/definitely/not/present.so");
            }
            other => panic!("expected driver-unavailable error, got {other:?}"),
        }
    }

    #[test]
    fn test_display_and_debug_redact_token() {
        let config = ConnectionConfig::new(
            "h.cloud.databricks.com",
            "/sql/1.0/warehouses/abc",
            "sekret123",
        );
        let dsn = build(&config, Transport::Native).unwrap();
        assert!(!dsn.to_string().contains("sekret123"));
        assert!(!format!("{dsn:?}").contains("sekret123"));
        assert!(dsn.redacted().contains("token=****"));
        // The raw form is still intact for the driver
        assert!(dsn.as_str().contains("token=sekret123"));
    }
}
