mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stackflow")]
#[command(about = "Declarative OpenStack environments for integration testing", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a stack template and its parameters without contacting the platform
    Validate {
        /// Template file (YAML or JSON)
        template: PathBuf,
        /// Environment file whose `parameters` section supplies values
        #[arg(short, long)]
        env: Option<PathBuf>,
        /// Parameter override, repeatable
        #[arg(short = 'p', long = "parameter", value_name = "KEY=VALUE")]
        parameters: Vec<String>,
    },
    /// Print the version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so command output stays clean
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Commands::Validate {
            template,
            env,
            parameters,
        } => commands::validate::handle(&template, env.as_deref(), &parameters).await,
        Commands::Version => {
            println!("stackflow {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
