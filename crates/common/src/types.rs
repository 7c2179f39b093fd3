use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EndpointError;

/// Network address of a remote gRPC server.
///
/// Holds a non-empty host and a non-zero port. IPv6 literals are stored
/// without brackets and get them back when displayed, so `Endpoint` always
/// round-trips through its `host:port` string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    /// Creates an endpoint from a host and port.
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self, EndpointError> {
        let host = host.into();
        if host.is_empty() {
            return Err(EndpointError::EmptyHost(format!(":{port}")));
        }
        if port == 0 {
            return Err(EndpointError::InvalidPort {
                address: format!("{host}:0"),
                port: "0".to_string(),
            });
        }
        Ok(Self { host, port })
    }

    /// Returns the host name or address literal.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns true if the host is an IPv6 literal.
    pub fn is_ipv6(&self) -> bool {
        self.host.contains(':')
    }

    /// Builds a URI for this endpoint with the given scheme, e.g. `https://host:port`.
    pub fn uri(&self, scheme: &str) -> String {
        format!("{scheme}://{self}")
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_ipv6() {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

impl FromStr for Endpoint {
    type Err = EndpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(EndpointError::Empty);
        }

        let (host, port) = if let Some(rest) = s.strip_prefix('[') {
            let (host, after) = rest
                .split_once(']')
                .ok_or_else(|| EndpointError::MalformedIpv6(s.to_string()))?;
            if !host.contains(':') {
                return Err(EndpointError::MalformedIpv6(s.to_string()));
            }
            let port = after
                .strip_prefix(':')
                .ok_or_else(|| EndpointError::MissingPort(s.to_string()))?;
            (host, port)
        } else {
            let (host, port) = s
                .rsplit_once(':')
                .ok_or_else(|| EndpointError::MissingPort(s.to_string()))?;
            if host.contains(':') {
                return Err(EndpointError::MalformedIpv6(s.to_string()));
            }
            (host, port)
        };

        if host.is_empty() {
            return Err(EndpointError::EmptyHost(s.to_string()));
        }

        let port = match port.parse::<u16>() {
            Ok(p) if p != 0 => p,
            _ => {
                return Err(EndpointError::InvalidPort {
                    address: s.to_string(),
                    port: port.to_string(),
                });
            }
        };

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}

impl TryFrom<String> for Endpoint {
    type Error = EndpointError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Endpoint> for String {
    fn from(endpoint: Endpoint) -> Self {
        endpoint.to_string()
    }
}
