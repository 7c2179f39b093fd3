//! Probe configuration loaded from flags and environment variables.

use std::path::PathBuf;
use std::time::Duration;

use clap::builder::BoolishValueParser;
use clap::{Parser, ValueEnum};
use common::Endpoint;
use probe::{ProbeOptions, TlsSettings, TransportSecurity};

use crate::error::{CliError, Result};

/// How the report is written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// A separator line followed by the status or error.
    #[default]
    Text,
    /// A single JSON object.
    Json,
}

/// Probe configuration.
///
/// Every flag falls back to an environment variable:
/// - `PROBE_ENDPOINT` — `host:port` of the server (required)
/// - `PROBE_SERVICE` — service name to check (default: `""`, the whole server)
/// - `PROBE_PLAINTEXT` — skip TLS (default: `false`)
/// - `PROBE_CA_CERT` — extra PEM CA certificate to trust
/// - `PROBE_TLS_DOMAIN` — name to verify the server certificate against
/// - `PROBE_CONNECT_TIMEOUT` / `PROBE_RPC_TIMEOUT` — seconds (default: transport default)
/// - `PROBE_OUTPUT` — `text` or `json` (default: `text`)
/// - `PROBE_STRICT` — exit non-zero unless `SERVING` (default: `false`)
/// - `RUST_LOG` — tracing filter directive (default: `"warn"`)
/// - `PROBE_LOG_JSON` — emit logs as JSON (default: `false`)
///
/// Boolean variables accept `1`/`0`, `true`/`false`, `yes`/`no` and `on`/`off`.
#[derive(Debug, Clone, Parser)]
#[command(name = "health-probe", version, about = "Run one gRPC health check")]
pub struct Config {
    /// Server address as host:port
    #[arg(long, short = 'e', env = "PROBE_ENDPOINT")]
    pub endpoint: Endpoint,

    /// Service to check; empty checks the whole server
    #[arg(long, short = 's', env = "PROBE_SERVICE", default_value = "")]
    pub service: String,

    /// Connect without TLS
    #[arg(
        long,
        env = "PROBE_PLAINTEXT",
        value_parser = BoolishValueParser::new(),
        conflicts_with_all = ["ca_cert", "tls_domain"]
    )]
    pub plaintext: bool,

    /// Additional CA certificate (PEM) to trust
    #[arg(long, env = "PROBE_CA_CERT")]
    pub ca_cert: Option<PathBuf>,

    /// Override the name verified against the server certificate
    #[arg(long, env = "PROBE_TLS_DOMAIN")]
    pub tls_domain: Option<String>,

    /// Connect timeout in seconds
    #[arg(long, env = "PROBE_CONNECT_TIMEOUT", value_parser = parse_seconds)]
    pub connect_timeout: Option<Duration>,

    /// Deadline for the health check RPC in seconds
    #[arg(long, env = "PROBE_RPC_TIMEOUT", value_parser = parse_seconds)]
    pub rpc_timeout: Option<Duration>,

    /// Report format
    #[arg(long, value_enum, env = "PROBE_OUTPUT", default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Exit with status 1 unless the server reports SERVING
    #[arg(long, env = "PROBE_STRICT", value_parser = BoolishValueParser::new())]
    pub strict: bool,

    /// Tracing filter directive
    #[arg(long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Emit logs as JSON
    #[arg(long, env = "PROBE_LOG_JSON", value_parser = BoolishValueParser::new())]
    pub log_json: bool,
}

impl Config {
    /// Creates a configuration for `endpoint` with every other setting at its default.
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            service: String::new(),
            plaintext: false,
            ca_cert: None,
            tls_domain: None,
            connect_timeout: None,
            rpc_timeout: None,
            output: OutputFormat::default(),
            strict: false,
            log_level: "warn".to_string(),
            log_json: false,
        }
    }

    /// Builds the transport options, reading the CA certificate if one is configured.
    pub fn probe_options(&self) -> Result<ProbeOptions> {
        let security = if self.plaintext {
            TransportSecurity::Plaintext
        } else {
            let mut tls = TlsSettings::new();
            if let Some(path) = &self.ca_cert {
                let pem = std::fs::read(path).map_err(|source| CliError::CaCertificate {
                    path: path.clone(),
                    source,
                })?;
                tls = tls.with_ca_certificate(pem);
            }
            if let Some(domain_name) = &self.tls_domain {
                tls = tls.with_domain_name(domain_name.clone());
            }
            TransportSecurity::Tls(tls)
        };

        Ok(ProbeOptions {
            security,
            connect_timeout: self.connect_timeout,
            rpc_timeout: self.rpc_timeout,
        })
    }
}

fn parse_seconds(value: &str) -> std::result::Result<Duration, String> {
    let seconds: f64 = value
        .parse()
        .map_err(|_| format!("'{value}' is not a number of seconds"))?;
    if seconds <= 0.0 {
        return Err(format!("timeout must be positive, got {value}"));
    }
    Duration::try_from_secs_f64(seconds).map_err(|err| err.to_string())
}
