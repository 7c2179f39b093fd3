//! One-shot gRPC health-check client.
//!
//! Opens a connection to a single endpoint, issues one
//! `grpc.health.v1.Health/Check` call and turns whatever happens into a
//! [`ProbeOutcome`]. The connection is owned by the probe call and released
//! before it returns, on every path.
//!
//! The transport sits behind the [`Connector`] / [`HealthConnection`] traits:
//! [`GrpcConnector`] talks to real servers over tonic, [`InMemoryConnector`]
//! scripts responses and counts connection lifecycles for tests.

pub mod client;
pub mod error;
pub mod grpc;
pub mod memory;
pub mod outcome;
pub mod state;
pub mod status;
pub mod transport;

pub use client::HealthProbeClient;
pub use common::Endpoint;
pub use error::{ProbeError, Result};
pub use grpc::{GrpcConnection, GrpcConnector};
pub use memory::{InMemoryConnection, InMemoryConnector};
pub use outcome::{FailureKind, ProbeFailure, ProbeOutcome, code_name};
pub use state::{ProbeAttempt, ProbeState};
pub use status::ServingStatus;
pub use tonic::Code;
pub use tonic_health::pb::HealthCheckRequest;
pub use transport::{Connector, HealthConnection, ProbeOptions, TlsSettings, TransportSecurity};
