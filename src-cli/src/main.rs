use clap::Parser;
use incident_tracker::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    // ITR_LOG_FORMAT=json switches to machine-parseable logs. Logs go to stderr so stdout stays
    // usable for `--json` output.
    let log_format = std::env::var("ITR_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "incident_tracker=info,itr_api=info".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if let Err(e) = cli::execute(cli) {
        tracing::error!(code = %e.code, details = ?e.details, retryable = e.retryable, "{}", e.message);
        std::process::exit(1);
    }
}
