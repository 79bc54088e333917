mod api;
mod cli;
mod router;
mod startup;
mod state;

use clap::Parser;

fn load_config() -> issuescan_core::Config {
    issuescan_core::config::load_dotenv();
    issuescan_core::Config::from_env()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = cli::Cli::parse();
    let config = load_config();
    config.log_summary();

    cli::dispatch(&config, args).await
}
