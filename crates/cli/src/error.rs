//! CLI error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised before or after the probe itself; probe failures are outcomes, not errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// The CA certificate file could not be read.
    #[error("failed to read CA certificate {}: {source}", .path.display())]
    CaCertificate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The report could not be serialized.
    #[error("failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience type alias for CLI results.
pub type Result<T> = std::result::Result<T, CliError>;
