use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use mealcard_client::{DEFAULT_BASE_URL, DEFAULT_CARD_ID, Session};

mod config;

#[derive(Parser, Debug)]
#[command(
    name = "mealcard",
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("MEALCARD_BUILD_SHA"), ")"),
    about = "Print a meal card's movements and available balance",
    after_help = "Credentials are read from the USER and PASS environment variables."
)]
struct Cli {
    /// Provider API root
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Card whose movements are fetched
    #[arg(long, default_value = DEFAULT_CARD_ID)]
    card_id: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_logging();
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        log::error!("error processing balance: {err:#}");
        std::process::exit(1);
    }
}

fn init_logging() {
    let filters = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    pretty_env_logger::formatted_builder()
        .parse_filters(&filters)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    log::info!("starting");

    let config = config::load_config(&cli.base_url, &cli.card_id)?;
    let session = Session::new(config.session)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    session
        .report(&config.credentials, &mut out)
        .await
        .with_context(|| format!("checking card {}", session.config().card_id))?;

    Ok(())
}
