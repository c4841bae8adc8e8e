//! AQ CLI - serve the air quality API or query a provider from the shell.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "aq-cli",
    version,
    about = "Air quality index service and toolkit"
)]
struct Cli {
    #[command(subcommand)]
    command: aq_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    let dotenv_loaded = dotenv::dotenv().is_ok();
    env_logger::init();
    if dotenv_loaded {
        log::debug!("[AQ Debug] loaded .env");
    }
    let cli = Cli::parse();
    aq_cmd::run(cli.command).await
}
