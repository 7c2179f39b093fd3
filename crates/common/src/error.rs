use thiserror::Error;

/// Errors produced when parsing an endpoint address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointError {
    /// The address was empty.
    #[error("endpoint address is empty")]
    Empty,

    /// The address has no `:port` suffix.
    #[error("endpoint '{0}' is missing a port (expected host:port)")]
    MissingPort(String),

    /// The host part was empty.
    #[error("endpoint '{0}' has an empty host")]
    EmptyHost(String),

    /// The port was not a number in 1..=65535.
    #[error("endpoint '{address}' has an invalid port '{port}'")]
    InvalidPort { address: String, port: String },

    /// An IPv6 literal was opened with `[` but never closed, or was not bracketed at all.
    #[error("endpoint '{0}' has a malformed IPv6 host (use [addr]:port)")]
    MalformedIpv6(String),
}
