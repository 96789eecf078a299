use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// `storybot` - scripted, multi-language story conversations over Telegram.
#[derive(Parser, Debug)]
#[command(name = "storybot")]
#[command(version = "0.1.0")]
#[command(about = "Run a scripted story bot over Telegram.", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.storybot/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Receive updates through the webhook gateway
    Serve {
        /// Port to listen on (use 0 for random available port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
    },

    /// Receive updates by long-polling getUpdates
    Poll,

    /// Load and validate the story, then print a summary
    Check {
        /// Story file (overrides story.path)
        #[arg(long)]
        story: Option<PathBuf>,

        /// Translation table (overrides story.i18n_path)
        #[arg(long)]
        i18n: Option<PathBuf>,
    },
}
