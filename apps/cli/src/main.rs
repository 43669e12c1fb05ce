use std::process::ExitCode;

use clap::Parser;
use dotenv::dotenv;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::Cli;
use shared_config::AppConfig;

fn main() -> ExitCode {
    // Loading Env Vars
    dotenv().ok();

    // Logs go to stderr so listings and export summaries stay pipeable
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    debug!("Parsed arguments: {:?}", cli);

    let config = AppConfig::from_env();

    let mut stdout = std::io::stdout().lock();
    match commands::run(cli, &config, &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let app_error = commands::into_app_error(err);
            app_error.report();
            ExitCode::from(app_error.exit_code())
        }
    }
}
