//! Health probe entry point.

use std::process::ExitCode;

use clap::Parser;
use cli::Config;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);

    // stdout carries the report
    if config.log_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let config = Config::parse();
    init_tracing(&config);

    let report = match cli::run(&config).await {
        Ok(report) => report,
        Err(err) => {
            tracing::error!(error = %err, "invalid configuration");
            eprintln!("health-probe: {err}");
            return ExitCode::from(2);
        }
    };

    match cli::render(&report, config.output) {
        Ok(rendered) => println!("{rendered}"),
        Err(err) => {
            eprintln!("health-probe: {err}");
            return ExitCode::from(2);
        }
    }

    ExitCode::from(report.exit_status(config.strict))
}
