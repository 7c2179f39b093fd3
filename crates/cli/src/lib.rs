//! Command-line gRPC health probe.
//!
//! Reads its configuration from flags and environment variables, runs a
//! single health check and renders the result as text or JSON.

pub mod config;
pub mod error;
pub mod report;

use probe::{Connector, HealthProbeClient};

pub use config::{Config, OutputFormat};
pub use error::CliError;
pub use report::{Report, SEPARATOR};

/// Runs one probe against a real server as described by `config`.
pub async fn run(config: &Config) -> error::Result<Report> {
    let client = HealthProbeClient::grpc(config.probe_options()?);
    Ok(probe_with(&client, config).await)
}

/// Runs one probe through an existing client.
pub async fn probe_with<C: Connector>(client: &HealthProbeClient<C>, config: &Config) -> Report {
    let outcome = client.probe(&config.endpoint, &config.service).await;
    Report::new(config.endpoint.clone(), config.service.clone(), outcome)
}

/// Renders the report in the configured format.
pub fn render(report: &Report, format: OutputFormat) -> error::Result<String> {
    match format {
        OutputFormat::Text => Ok(report.render_text()),
        OutputFormat::Json => Ok(report.render_json()?),
    }
}
