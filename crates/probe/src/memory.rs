//! In-memory connector for testing.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use common::Endpoint;
use tonic::Code;
use tonic_health::pb::HealthCheckRequest;

use crate::error::{ProbeError, Result};
use crate::status::ServingStatus;
use crate::transport::{Connector, HealthConnection};

#[derive(Debug, Default)]
struct InMemoryHealthState {
    statuses: HashMap<String, ServingStatus>,
    connect_error: Option<String>,
    rpc_error: Option<(Code, String)>,
    panic_on_check: bool,
    connect_attempts: usize,
    opened: usize,
    released: usize,
    requests: Vec<(Endpoint, String)>,
}

/// In-memory health server and connector for testing.
///
/// Answers `Check` from a table of per-service statuses; services missing
/// from the table get `SERVICE_UNKNOWN`. Tracks every connection it hands
/// out so tests can assert that each open is paired with a release.
#[derive(Debug, Clone, Default)]
pub struct InMemoryConnector {
    state: Arc<RwLock<InMemoryHealthState>>,
}

impl InMemoryConnector {
    /// Creates a connector that knows no services.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a connector reporting the whole server (`""`) as serving.
    pub fn serving() -> Self {
        let connector = Self::new();
        connector.set_status("", ServingStatus::Serving);
        connector
    }

    /// Sets the status reported for a service.
    pub fn set_status(&self, service: &str, status: ServingStatus) {
        self.write().statuses.insert(service.to_string(), status);
    }

    /// Makes `open` fail with a transport error carrying `message`.
    pub fn set_fail_on_connect(&self, message: Option<&str>) {
        self.write().connect_error = message.map(str::to_string);
    }

    /// Makes `check` fail with the given RPC status.
    pub fn set_rpc_error(&self, error: Option<(Code, &str)>) {
        self.write().rpc_error = error.map(|(code, message)| (code, message.to_string()));
    }

    /// Makes `check` panic, to exercise release on unwinding.
    pub fn set_panic_on_check(&self, panic: bool) {
        self.write().panic_on_check = panic;
    }

    /// Number of times `open` was called.
    pub fn connect_attempts(&self) -> usize {
        self.read().connect_attempts
    }

    /// Number of connections successfully opened.
    pub fn opened_connections(&self) -> usize {
        self.read().opened
    }

    /// Number of connections released.
    pub fn released_connections(&self) -> usize {
        self.read().released
    }

    /// Number of connections opened but not yet released.
    pub fn open_connections(&self) -> usize {
        let state = self.read();
        state.opened - state.released
    }

    /// Service names received by `check`, in call order.
    pub fn requested_services(&self) -> Vec<String> {
        self.read()
            .requests
            .iter()
            .map(|(_, service)| service.clone())
            .collect()
    }

    /// Endpoints that received a `check`, in call order.
    pub fn requested_endpoints(&self) -> Vec<Endpoint> {
        self.read()
            .requests
            .iter()
            .map(|(endpoint, _)| endpoint.clone())
            .collect()
    }

    // A panicking check must not leave the lock poisoned for the release in `Drop`.
    fn read(&self) -> std::sync::RwLockReadGuard<'_, InMemoryHealthState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, InMemoryHealthState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Connector for InMemoryConnector {
    type Connection = InMemoryConnection;

    async fn open(&self, endpoint: &Endpoint) -> Result<InMemoryConnection> {
        let mut state = self.write();
        state.connect_attempts += 1;

        if let Some(message) = &state.connect_error {
            return Err(ProbeError::Transport(message.clone()));
        }

        state.opened += 1;
        Ok(InMemoryConnection {
            endpoint: endpoint.clone(),
            connector: self.clone(),
        })
    }
}

/// Connection handed out by [`InMemoryConnector`]; counts as released on drop.
#[derive(Debug)]
pub struct InMemoryConnection {
    endpoint: Endpoint,
    connector: InMemoryConnector,
}

#[async_trait]
impl HealthConnection for InMemoryConnection {
    async fn check(&mut self, request: HealthCheckRequest) -> Result<ServingStatus> {
        let panic_on_check = {
            let mut state = self.connector.write();
            state
                .requests
                .push((self.endpoint.clone(), request.service.clone()));

            if let Some((code, message)) = &state.rpc_error {
                return Err(ProbeError::Rpc {
                    code: *code,
                    message: message.clone(),
                });
            }
            state.panic_on_check
        };

        if panic_on_check {
            panic!("health check panicked for service '{}'", request.service);
        }

        let state = self.connector.read();
        Ok(state
            .statuses
            .get(&request.service)
            .copied()
            .unwrap_or(ServingStatus::ServiceUnknown))
    }
}

impl Drop for InMemoryConnection {
    fn drop(&mut self) {
        self.connector.write().released += 1;
    }
}
