use args::Args;
use clap::Parser;

mod args;
mod commands;
mod logger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = args.config()?;

    logger::init(&args);

    if let Err(e) = commands::run(args.command, config).await {
        log::error!("{e:#}");
        std::process::exit(1);
    }

    Ok(())
}
