use std::time::Duration;

use async_trait::async_trait;
use common::Endpoint;
use tonic_health::pb::HealthCheckRequest;

use crate::error::Result;
use crate::status::ServingStatus;

/// An open connection to a health-checking server.
///
/// The connection is released when the value is dropped.
#[async_trait]
pub trait HealthConnection: Send {
    /// Issues one `Check` call.
    async fn check(&mut self, request: HealthCheckRequest) -> Result<ServingStatus>;
}

/// Opens connections to health-checking servers.
///
/// Implementations must be thread-safe (Send + Sync) and must not cache
/// connections: every `open` yields a fresh one.
#[async_trait]
pub trait Connector: Send + Sync {
    type Connection: HealthConnection;

    /// Connects to the endpoint.
    async fn open(&self, endpoint: &Endpoint) -> Result<Self::Connection>;
}

/// TLS material used to verify the server.
///
/// The platform's native roots are always trusted; `ca_certificate` adds one
/// more PEM-encoded authority and `domain_name` overrides the name checked
/// against the server certificate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsSettings {
    pub ca_certificate: Option<Vec<u8>>,
    pub domain_name: Option<String>,
}

impl TlsSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ca_certificate(mut self, pem: impl Into<Vec<u8>>) -> Self {
        self.ca_certificate = Some(pem.into());
        self
    }

    pub fn with_domain_name(mut self, domain_name: impl Into<String>) -> Self {
        self.domain_name = Some(domain_name.into());
        self
    }
}

/// How the channel is secured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportSecurity {
    /// gRPC over TLS (`https`).
    Tls(TlsSettings),
    /// Unencrypted HTTP/2 (`http`).
    Plaintext,
}

impl TransportSecurity {
    /// Returns the URI scheme for this security mode.
    pub fn scheme(&self) -> &'static str {
        match self {
            TransportSecurity::Tls(_) => "https",
            TransportSecurity::Plaintext => "http",
        }
    }
}

impl Default for TransportSecurity {
    fn default() -> Self {
        TransportSecurity::Tls(TlsSettings::default())
    }
}

/// Connection options for a probe.
///
/// Timeouts default to `None`, leaving the transport's own defaults in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeOptions {
    pub security: TransportSecurity,
    pub connect_timeout: Option<Duration>,
    pub rpc_timeout: Option<Duration>,
}

impl ProbeOptions {
    /// Options for a TLS connection with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for an unencrypted connection.
    pub fn plaintext() -> Self {
        Self {
            security: TransportSecurity::Plaintext,
            ..Self::default()
        }
    }

    pub fn with_security(mut self, security: TransportSecurity) -> Self {
        self.security = security;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn with_rpc_timeout(mut self, timeout: Duration) -> Self {
        self.rpc_timeout = Some(timeout);
        self
    }
}
