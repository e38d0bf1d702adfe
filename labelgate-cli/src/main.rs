//! Labelgate CLI - require labels on pull requests that touch critical files

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{CheckArgs, ConfigArgs};

/// Labelgate: require a label before critical changes can merge
#[derive(Parser, Debug)]
#[command(name = "labelgate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Check a pull request against the label policy
    #[command(visible_alias = "c")]
    Check(CheckArgs),

    /// Show the effective configuration
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Some(Commands::Version) => {
            println!("labelgate {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Check(args)) => {
            args.execute(cli.verbose).await?;
        }
        Some(Commands::Config(args)) => {
            args.execute()?;
        }
        None => {
            println!("Labelgate - require labels on pull requests that touch critical files");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}
