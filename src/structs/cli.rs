use clap::Parser;
use crate::enums::commands::Commands;

#[derive(Parser)]
#[clap(name = "approval-client")]
#[clap(about = "Approval workflow client for the change Engine", long_about = None)]
pub struct Cli {
    /// Debug-level logging (RUST_LOG still wins when set)
    #[clap(short, long, global = true)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Commands,
}
