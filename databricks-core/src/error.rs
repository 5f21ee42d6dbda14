//! Error types with credential redaction.
//!
//! Every failure in this crate is classified into one of the kinds below and
//! re-raised with enough context (operation, redacted DSN, backend message)
//! for the caller to decide between retry and abort. Connection strings and
//! tokens are never exposed in error messages or logs.

use thiserror::Error;

/// Main error type for Databricks connector operations.
///
/// `ConnectionLost` is the only kind for which a caller-initiated retry with
/// a fresh connect can succeed; everything else is either a configuration,
/// operator, or statement problem that retrying cannot fix.
#[derive(Debug, Error)]
pub enum DatabricksError {
    /// Required configuration field missing, empty, or malformed
    #[error("Configuration error: missing or invalid '{field}'")]
    Configuration {
        /// Name of the offending field or mapping
        field: String,
    },

    /// ODBC driver artifact missing or unreadable on the local filesystem
    #[error("ODBC driver unavailable at '{path}': {reason}")]
    DriverUnavailable {
        /// Configured driver library path
        path: String,
        /// Why the artifact check failed
        reason: String,
    },

    /// Transport or auth failure while opening the connection
    #[error("Connection failed ({dsn}): {context}")]
    Connect {
        /// Redacted DSN for diagnosis
        dsn: String,
        /// Underlying transport error text
        context: String,
    },

    /// Backend rejected a statement (syntax, constraint, unsupported DDL)
    #[error("Statement failed [{}]: {message}", .code.as_deref().unwrap_or("-"))]
    Statement {
        /// Backend error code (SQLSTATE or native), when available
        code: Option<String>,
        /// Backend error message
        message: String,
    },

    /// Mid-session transport failure or timeout; eligible for caller retry
    #[error("Connection lost: {context}")]
    ConnectionLost {
        /// What was in flight when the transport dropped
        context: String,
    },

    /// Operation has no Databricks equivalent (e.g. sequence reset)
    #[error("Unsupported operation: {operation}")]
    Unsupported {
        /// Name of the unsupported operation
        operation: String,
    },

    /// Local I/O failure outside the transport (driver artifact checks)
    #[error("I/O operation failed: {context}")]
    Io {
        /// What was being accessed
        context: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for Results with `DatabricksError`
pub type Result<T> = std::result::Result<T, DatabricksError>;

impl DatabricksError {
    /// Creates a configuration error naming the missing field
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::Configuration {
            field: field.into(),
        }
    }

    /// Creates a driver-unavailable error
    pub fn driver_unavailable(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DriverUnavailable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a connect-time error carrying the redacted DSN
    pub fn connect_failed(redacted_dsn: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Connect {
            dsn: redacted_dsn.into(),
            context: context.into(),
        }
    }

    /// Creates a statement error from a backend error descriptor
    pub fn statement(code: Option<String>, message: impl Into<String>) -> Self {
        Self::Statement {
            code,
            message: message.into(),
        }
    }

    /// Creates a connection-lost error
    pub fn connection_lost(context: impl Into<String>) -> Self {
        Self::ConnectionLost {
            context: context.into(),
        }
    }

    /// Creates an unsupported-operation error
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }

    /// Short kind label used for observer events and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration",
            Self::DriverUnavailable { .. } => "driver-unavailable",
            Self::Connect { .. } => "connect",
            Self::Statement { .. } => "statement",
            Self::ConnectionLost { .. } => "connection-lost",
            Self::Unsupported { .. } => "unsupported",
            Self::Io { .. } => "io",
        }
    }

    /// Whether a caller-initiated retry with a fresh connect may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConnectionLost { .. })
    }
}

/// Masks the secret fragment of a rendered connection string.
///
/// Both DSN renderings carry the bearer token as one `key=value` attribute
/// (`PWD` for ODBC, `token` for the native scheme); the value is replaced
/// with `****` while every other attribute is preserved for diagnosis.
///
/// # Example
///
/// ```rust
/// use databricks_core::error::redact_dsn;
///
/// let redacted = redact_dsn("odbc:Driver=/d.so;Host=h;PWD=secret;SSL=1");
/// assert_eq!(redacted, "odbc:Driver=/d.so;Host=h;PWD=****;SSL=1");
/// assert!(!redacted.contains("secret"));
/// ```
pub fn redact_dsn(dsn: &str) -> String {
    dsn.split(';')
        .map(|attr| {
            let key = attr.split('=').next().unwrap_or("");
            // The ODBC scheme prefix can ride on the first attribute
            let bare = key.rsplit(':').next().unwrap_or(key);
            if bare.eq_ignore_ascii_case("pwd") || bare.eq_ignore_ascii_case("token") {
                format!("{key}=****")
            } else {
                attr.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(";")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_odbc_dsn() {
        let dsn = "odbc:Driver=/opt/d.so;Host=h;HTTPPath=/sql;UID=token;PWD=tok123;Port=443;SSL=1";
        let redacted = redact_dsn(dsn);

        assert!(!redacted.contains("tok123"));
        assert!(redacted.contains("PWD=****"));
        assert!(redacted.contains("UID=token"));
        assert!(redacted.contains("Host=h"));
    }

    #[test]
    fn test_redact_native_dsn() {
        let dsn = "databricks:host=h;http_path=/sql;token=tok123;ssl=1";
        let redacted = redact_dsn(dsn);

        assert!(!redacted.contains("tok123"));
        assert!(redacted.contains("token=****"));
    }

    #[test]
    fn test_error_kinds() {
        let error = DatabricksError::missing_field("host");
        assert_eq!(error.kind(), "configuration");
        assert!(error.to_string().contains("host"));
        assert!(!error.is_retryable());

        let error = DatabricksError::connection_lost("statement timed out");
        assert!(error.is_retryable());

        let error = DatabricksError::statement(Some("42000".to_string()), "syntax error");
        assert!(error.to_string().contains("[42000]"));
        assert!(!error.is_retryable());
    }
}
