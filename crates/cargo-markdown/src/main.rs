//! cargo-markdown - rapid readme development for crates.io.
//!
//! Installed as a cargo subcommand:
//! - `cargo markdown <README>`: preview the README in a hot reloading
//!   crates.io mockup page
//! - `cargo markdown follow`: run the hot reload client against a running
//!   preview server and execute a command on every reload

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{FollowArgs, PreviewArgs};
use error::CliError;
use output::Output;

/// Cargo invokes subcommands as `cargo-markdown markdown ...`.
#[derive(Parser)]
#[command(name = "cargo", bin_name = "cargo")]
enum Cargo {
    /// Preview your crate readme in a hot reloading mockup of the crates.io
    /// crate page before publishing.
    #[command(
        version,
        args_conflicts_with_subcommands = true,
        subcommand_negates_reqs = true
    )]
    Markdown(MarkdownCli),
}

#[derive(clap::Args)]
struct MarkdownCli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    preview: PreviewArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Follow a running preview server and react to every reload.
    Follow(FollowArgs),
}

impl MarkdownCli {
    fn verbose(&self) -> bool {
        match &self.command {
            Some(Commands::Follow(args)) => args.verbose,
            None => self.preview.verbose,
        }
    }

    async fn execute(self) -> Result<(), CliError> {
        match self.command {
            Some(Commands::Follow(args)) => args.execute().await,
            None => self.preview.execute().await,
        }
    }
}

fn main() {
    let Cargo::Markdown(cli) = Cargo::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose() {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt.block_on(cli.execute()),
        Err(err) => Err(CliError::Io(err)),
    };

    if let Err(err) = result {
        output.error(&err.to_string());
        std::process::exit(1);
    }
}
