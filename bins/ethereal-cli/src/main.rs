//! ethereal-cli: a thin demonstration binary over the ethereal toolkit
mod command;
mod handlers;
mod utils;

use anyhow::Result;
use clap::Parser;
use command::{Cli, Commands};
use utils::init_logger;

#[tokio::main]
async fn main() -> Result<()> {
    init_logger();

    let cli = Cli::parse();

    match cli.command {
        Commands::ChainId(args) => handlers::chain_id(&args).await?,
        Commands::Balance(args) => handlers::balance(&args).await?,
        Commands::Block(args) => handlers::block(&args).await?,
        Commands::Call(args) => handlers::call(&args).await?,
        Commands::Send(args) => handlers::send(&args).await?,
    }

    Ok(())
}
