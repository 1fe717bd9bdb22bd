mod commands;
mod context;
mod iac;
mod output;
mod provider;
mod traits;
mod wizard;

use clap::{Parser, Subcommand};
use commands::GkeCommand;
use context::Context;
use std::path::PathBuf;
use std::process::ExitCode;
use wizard::ClusterFlags;

#[derive(Parser)]
#[command(name = "kubewiz")]
#[command(about = "Kubewiz - An interactive wizard for creating Kubernetes clusters", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a YAML file with wizard defaults (defaults to ~/.kubewiz/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new Kubernetes cluster on Google Kubernetes Engine
    Gke(ClusterFlags),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let ctx = Context::new();

    let result = match &cli.command {
        Commands::Gke(flags) => GkeCommand::execute(&ctx, flags, cli.config.as_deref()),
    };

    // Commands report their own errors
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
