use clap::Parser;

mod cli;
mod commands;
mod prompt;

use cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    utils::logging::init_tracing(if cli.verbose { "debug" } else { "info" });

    commands::run(cli).await
}
