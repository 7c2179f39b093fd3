//! tonic-backed connector speaking `grpc.health.v1`.

use std::time::Duration;

use async_trait::async_trait;
use common::Endpoint;
use tonic::transport::{Certificate, Channel, ClientTlsConfig};
use tonic_health::pb::HealthCheckRequest;
use tonic_health::pb::health_client::HealthClient;

use crate::error::{ProbeError, Result};
use crate::status::ServingStatus;
use crate::transport::{Connector, HealthConnection, ProbeOptions, TlsSettings, TransportSecurity};

/// Connects to real servers over HTTP/2, with or without TLS.
///
/// Connects eagerly, so DNS, TCP and TLS failures surface from `open`
/// rather than from the first call.
#[derive(Debug, Clone, Default)]
pub struct GrpcConnector {
    options: ProbeOptions,
}

impl GrpcConnector {
    /// Creates a connector with the given options.
    pub fn new(options: ProbeOptions) -> Self {
        Self { options }
    }

    /// Returns the connector's options.
    pub fn options(&self) -> &ProbeOptions {
        &self.options
    }

    fn target(&self, endpoint: &Endpoint) -> Result<tonic::transport::Endpoint> {
        let uri = endpoint.uri(self.options.security.scheme());
        let mut target = tonic::transport::Endpoint::from_shared(uri.clone()).map_err(|err| {
            ProbeError::InvalidEndpoint {
                uri,
                reason: err.to_string(),
            }
        })?;

        if let TransportSecurity::Tls(tls) = &self.options.security {
            target = target
                .tls_config(client_tls_config(tls))
                .map_err(|err| ProbeError::transport(&err))?;
        }
        // rpc_timeout is enforced per call so expiry reports DEADLINE_EXCEEDED
        if let Some(timeout) = self.options.connect_timeout {
            target = target.connect_timeout(timeout);
        }

        Ok(target)
    }
}

fn client_tls_config(tls: &TlsSettings) -> ClientTlsConfig {
    let mut config = ClientTlsConfig::new().with_native_roots();
    if let Some(pem) = &tls.ca_certificate {
        config = config.ca_certificate(Certificate::from_pem(pem));
    }
    if let Some(domain_name) = &tls.domain_name {
        config = config.domain_name(domain_name.clone());
    }
    config
}

#[async_trait]
impl Connector for GrpcConnector {
    type Connection = GrpcConnection;

    async fn open(&self, endpoint: &Endpoint) -> Result<GrpcConnection> {
        let target = self.target(endpoint)?;
        tracing::debug!(
            %endpoint,
            scheme = self.options.security.scheme(),
            "opening channel"
        );

        let channel = target
            .connect()
            .await
            .map_err(|err| ProbeError::transport(&err))?;

        Ok(GrpcConnection {
            endpoint: endpoint.clone(),
            client: HealthClient::new(channel),
            rpc_timeout: self.options.rpc_timeout,
        })
    }
}

/// An open health-checking channel. Dropping it closes the channel.
#[derive(Debug)]
pub struct GrpcConnection {
    endpoint: Endpoint,
    client: HealthClient<Channel>,
    rpc_timeout: Option<Duration>,
}

#[async_trait]
impl HealthConnection for GrpcConnection {
    async fn check(&mut self, request: HealthCheckRequest) -> Result<ServingStatus> {
        let call = self.client.check(request);
        let response = match self.rpc_timeout {
            Some(timeout) => tokio::time::timeout(timeout, call)
                .await
                .map_err(|_| ProbeError::DeadlineExceeded(timeout))??,
            None => call.await?,
        };
        Ok(ServingStatus::decode(response.into_inner().status))
    }
}

impl Drop for GrpcConnection {
    fn drop(&mut self) {
        tracing::debug!(endpoint = %self.endpoint, "closing channel");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plaintext_target_uses_http() {
        let connector = GrpcConnector::new(ProbeOptions::plaintext());
        let endpoint: Endpoint = "127.0.0.1:50051".parse().unwrap();
        let target = connector.target(&endpoint).unwrap();
        assert_eq!(target.uri().scheme_str(), Some("http"));
        assert_eq!(target.uri().port_u16(), Some(50051));
    }

    #[test]
    fn test_invalid_host_is_rejected() {
        let connector = GrpcConnector::new(ProbeOptions::plaintext());
        let endpoint = Endpoint::new("bad host", 50051).unwrap();
        assert!(matches!(
            connector.target(&endpoint),
            Err(ProbeError::InvalidEndpoint { .. })
        ));
    }
}
