use anyhow::Result;
use clap::Parser;
use storybot::Config;
use storybot::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_env_overrides();

    storybot::observability::init_tracing(&config.observability)?;

    storybot::app::dispatch(cli, config).await
}
