use clap::Parser;
use std::process::ExitCode;
use tibber::cli::Args;
use tibber::config::Config;
use tibber::logging::setup_logging;
use tibber::tibber::{ClientError, TibberApiError, TibberClient};
use tracing::{error, info};

/// Exit code for rejected credentials, distinct from generic failure.
const EXIT_INVALID_LOGIN: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Logging depends on config, so a config failure can only go to stderr
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e:#}");
            return ExitCode::FAILURE;
        }
    };
    setup_logging(&config, args.tracing);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        commit = env!("GIT_COMMIT_SHORT"),
        api_url = %config.api_url,
        "starting tibber"
    );

    let client = match TibberClient::from_config(&config) {
        Ok(client) => client,
        Err(e) => {
            error!(error = ?e, "Failed to create Tibber client");
            return ExitCode::FAILURE;
        }
    };

    let variables = args
        .variables
        .unwrap_or_else(|| serde_json::Value::Object(Default::default()));

    match client.execute(&args.query, variables).await {
        Ok(data) => match serde_json::to_string_pretty(&data) {
            Ok(text) => {
                println!("{text}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!(error = ?e, "Failed to render response data");
                ExitCode::FAILURE
            }
        },
        Err(ClientError::Api(TibberApiError::InvalidLogin { .. })) => {
            error!("Access token was rejected; check TIBBER_ACCESS_TOKEN");
            ExitCode::from(EXIT_INVALID_LOGIN)
        }
        Err(e) => {
            error!(error = %e, retryable = e.is_retryable(), "Tibber request failed");
            ExitCode::FAILURE
        }
    }
}
