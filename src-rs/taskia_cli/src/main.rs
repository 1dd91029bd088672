mod cli;
mod commands;
mod render;
mod repl;

use clap::Parser;

use repl::Repl;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("taskia error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let args = cli::Args::parse();
    init_tracing(args.verbose)?;

    let config = args.config()?;
    let mut repl = Repl::new(config)?;
    repl.run().await
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_env("TASKIA_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
