//! Integration tests against an in-process `grpc.health.v1` server.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use probe::{
    Code, Endpoint, FailureKind, HealthProbeClient, ProbeOptions, ProbeOutcome, ServingStatus,
    TlsSettings, TransportSecurity,
};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tonic::{Request, Response, Status};
use tonic_health::pb::health_server::{Health, HealthServer};
use tonic_health::pb::{HealthCheckRequest, HealthCheckResponse, health_check_response};
use tonic_health::server::HealthReporter;

struct TestServer {
    endpoint: Endpoint,
    reporter: HealthReporter,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (reporter, service) = tonic_health::server::health_reporter();
        let (tx, rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            Server::builder()
                .add_service(service)
                .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async {
                    let _ = rx.await;
                })
                .await
                .unwrap();
        });

        Self {
            endpoint: endpoint_for(addr),
            reporter,
            shutdown: Some(tx),
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Health service that answers SERVING after a fixed delay.
struct SlowHealth {
    delay: Duration,
}

#[tonic::async_trait]
impl Health for SlowHealth {
    async fn check(
        &self,
        _request: Request<HealthCheckRequest>,
    ) -> Result<Response<HealthCheckResponse>, Status> {
        tokio::time::sleep(self.delay).await;
        Ok(Response::new(HealthCheckResponse {
            status: health_check_response::ServingStatus::Serving as i32,
        }))
    }

    type WatchStream = tokio_stream::Empty<Result<HealthCheckResponse, Status>>;

    async fn watch(
        &self,
        _request: Request<HealthCheckRequest>,
    ) -> Result<Response<Self::WatchStream>, Status> {
        Err(Status::unimplemented("watch is not served"))
    }
}

async fn spawn_slow_server(delay: Duration) -> Endpoint {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        Server::builder()
            .add_service(HealthServer::new(SlowHealth { delay }))
            .serve_with_incoming(TcpListenerStream::new(listener))
            .await
            .unwrap();
    });

    endpoint_for(addr)
}

fn endpoint_for(addr: SocketAddr) -> Endpoint {
    Endpoint::new(addr.ip().to_string(), addr.port()).unwrap()
}

fn plaintext_client() -> HealthProbeClient<probe::GrpcConnector> {
    HealthProbeClient::grpc(ProbeOptions::plaintext().with_connect_timeout(Duration::from_secs(5)))
}

#[tokio::test]
async fn test_whole_server_is_serving() {
    let server = TestServer::start().await;
    let client = plaintext_client();

    let outcome = client.probe(&server.endpoint, "").await;

    assert_eq!(outcome, ProbeOutcome::Status(ServingStatus::Serving));
    assert_eq!(outcome.to_string(), "SERVING");
}

#[tokio::test]
async fn test_named_service_status_changes() {
    let mut server = TestServer::start().await;
    server
        .reporter
        .set_service_status("orders", tonic_health::ServingStatus::Serving)
        .await;
    let client = plaintext_client();

    let outcome = client.probe(&server.endpoint, "orders").await;
    assert_eq!(outcome.status(), Some(ServingStatus::Serving));

    server
        .reporter
        .set_service_status("orders", tonic_health::ServingStatus::NotServing)
        .await;

    let outcome = client.probe(&server.endpoint, "orders").await;
    assert_eq!(outcome.status(), Some(ServingStatus::NotServing));
}

#[tokio::test]
async fn test_unregistered_service_is_an_rpc_failure() {
    let server = TestServer::start().await;
    let client = plaintext_client();

    let outcome = client.probe(&server.endpoint, "nonexistent-service").await;

    let failure = outcome.failure().expect("expected a failure");
    assert_eq!(failure.kind, FailureKind::Rpc);
    assert_eq!(failure.code, Code::NotFound);
    assert!(outcome.to_string().starts_with("NOT_FOUND: "));
}

#[tokio::test]
async fn test_repeated_probes_are_independent() {
    let server = TestServer::start().await;
    let client = plaintext_client();

    let first = client.probe(&server.endpoint, "").await;
    let second = client.probe(&server.endpoint, "").await;

    assert_eq!(first, ProbeOutcome::Status(ServingStatus::Serving));
    assert_eq!(second, first);
}

#[tokio::test]
async fn test_refused_connection_is_a_transport_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = endpoint_for(listener.local_addr().unwrap());
    drop(listener);
    let client = plaintext_client();

    let outcome = client.probe(&endpoint, "").await;

    let failure = outcome.failure().expect("expected a failure");
    assert_eq!(failure.kind, FailureKind::Transport);
    assert_eq!(failure.code, Code::Unavailable);
    assert!(outcome.to_string().starts_with("UNAVAILABLE: "));
}

#[tokio::test]
async fn test_tls_against_plaintext_server_is_a_transport_failure() {
    let server = TestServer::start().await;
    let client = HealthProbeClient::grpc(
        ProbeOptions::new()
            .with_connect_timeout(Duration::from_secs(5))
            .with_rpc_timeout(Duration::from_secs(5)),
    );

    let outcome = client.probe(&server.endpoint, "").await;

    let failure = outcome.failure().expect("expected a failure");
    assert_eq!(failure.kind, FailureKind::Transport);
}

#[tokio::test]
async fn test_rpc_deadline_reports_deadline_exceeded() {
    let endpoint = spawn_slow_server(Duration::from_secs(3)).await;
    let client = HealthProbeClient::grpc(
        ProbeOptions::plaintext()
            .with_connect_timeout(Duration::from_secs(5))
            .with_rpc_timeout(Duration::from_millis(200)),
    );

    let started = Instant::now();
    let outcome = client.probe(&endpoint, "").await;

    assert!(started.elapsed() < Duration::from_secs(3));
    let failure = outcome.failure().expect("expected a failure");
    assert_eq!(failure.kind, FailureKind::Rpc);
    assert_eq!(failure.code, Code::DeadlineExceeded);
    assert!(outcome.to_string().starts_with("DEADLINE_EXCEEDED: "));
}

#[tokio::test]
async fn test_no_rpc_deadline_by_default() {
    let endpoint = spawn_slow_server(Duration::from_millis(500)).await;
    let client = plaintext_client();
    assert!(client.connector().options().rpc_timeout.is_none());

    let outcome = client.probe(&endpoint, "").await;

    assert_eq!(outcome, ProbeOutcome::Status(ServingStatus::Serving));
}

#[tokio::test]
async fn test_invalid_ca_certificate_is_a_transport_failure() {
    let server = TestServer::start().await;
    let pem = b"-----BEGIN CERTIFICATE-----\nnot a certificate\n-----END CERTIFICATE-----\n";
    let tls = TlsSettings::new()
        .with_ca_certificate(pem.to_vec())
        .with_domain_name("health.internal");
    let options = ProbeOptions {
        security: TransportSecurity::Tls(tls),
        connect_timeout: Some(Duration::from_secs(5)),
        rpc_timeout: Some(Duration::from_secs(5)),
    };
    let client = HealthProbeClient::grpc(options);

    let outcome = client.probe(&server.endpoint, "").await;

    let failure = outcome.failure().expect("expected a failure");
    assert_eq!(failure.kind, FailureKind::Transport);
}
