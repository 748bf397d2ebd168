mod cmds;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "celowatch")]
#[command(version)]
#[command(about = "Watch a Celo validator and its chain, alert on Discord when either stalls", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Poll the explorer forever and send alerts on status changes")]
    Run(cmds::run::Opts),

    #[command(about = "Fetch both signals once and show the status they imply")]
    Probe(cmds::probe::Opts),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    match &cli.command {
        Commands::Run(opts) => cmds::run::run(opts).await?,
        Commands::Probe(opts) => cmds::probe::run(opts).await?,
    }

    Ok(())
}
