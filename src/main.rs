use anyhow::Result;
use clap::Parser;
use daybook::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.init_logging();
    cli.run().await
}
