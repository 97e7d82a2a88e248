use clap::Parser;
use approval_client::structs::cli::Cli;
use approval_client::workers::command_runner::CommandRunner;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    let mut runner = CommandRunner::new();
    if let Err(e) = runner.run_command(cli.command).await {
        approval_client::errors::log_error("command failed", &e);
        anyhow::bail!(e.user_message());
    }
    Ok(())
}
