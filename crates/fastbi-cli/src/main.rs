// FastBI console CLI entry point

use clap::Parser;
use fastbi_cli::{init_logging, output, Cli, CommandRouter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = CommandRouter::route(cli).await {
        output::print_error(&e.user_message());
        tracing::debug!("{}", e.technical_details());
        std::process::exit(1);
    }

    Ok(())
}
