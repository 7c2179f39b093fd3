//! The health probe client.

use common::Endpoint;
use tonic_health::pb::HealthCheckRequest;

use crate::error::Result;
use crate::grpc::GrpcConnector;
use crate::outcome::ProbeOutcome;
use crate::state::ProbeAttempt;
use crate::status::ServingStatus;
use crate::transport::{Connector, HealthConnection, ProbeOptions};

/// Performs single health checks against an endpoint.
///
/// Each call to [`probe`](Self::probe) opens its own connection, sends one
/// `Check` request and releases the connection before returning. Nothing is
/// retried and no state is carried between calls.
#[derive(Debug, Clone)]
pub struct HealthProbeClient<C> {
    connector: C,
}

impl HealthProbeClient<GrpcConnector> {
    /// Creates a client that talks to real servers.
    pub fn grpc(options: ProbeOptions) -> Self {
        Self::new(GrpcConnector::new(options))
    }
}

impl<C: Connector> HealthProbeClient<C> {
    /// Creates a client over the given connector.
    pub fn new(connector: C) -> Self {
        Self { connector }
    }

    /// Returns the underlying connector.
    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Checks the health of `service` at `endpoint`. An empty service name
    /// asks for the health of the server as a whole.
    ///
    /// Failures are reported in the returned outcome, never as a panic.
    #[tracing::instrument(skip(self, endpoint), fields(endpoint = %endpoint))]
    pub async fn probe(&self, endpoint: &Endpoint, service: &str) -> ProbeOutcome {
        let mut attempt = ProbeAttempt::new();
        if let Err(err) = attempt.begin() {
            return ProbeOutcome::Failure(err.into_failure());
        }

        let result = self.check_once(endpoint, service).await;
        match &result {
            Ok(status) => tracing::info!(%status, "health check answered"),
            Err(err) => tracing::warn!(error = %err, "health check failed"),
        }

        if let Err(err) = attempt.complete(result) {
            tracing::error!(error = %err, "failed to record probe result");
        }
        tracing::debug!(state = %attempt.state(), "probe finished");
        attempt.into_outcome()
    }

    async fn check_once(&self, endpoint: &Endpoint, service: &str) -> Result<ServingStatus> {
        let mut connection = self.connector.open(endpoint).await?;
        let request = HealthCheckRequest {
            service: service.to_string(),
        };
        let result = connection.check(request).await;
        drop(connection);
        result
    }
}
