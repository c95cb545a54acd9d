//! NestSite server entry point.

use std::process::ExitCode;

use nestsite_server::{ServerConfig, start_server};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

#[tokio::main]
async fn main() -> ExitCode {
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = "nestsite=info".parse::<Directive>() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt().with_env_filter(filter).json().init();

    info!("Starting NestSite server");

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    match start_server(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}
