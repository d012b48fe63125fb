//! `ksail`: scaffold, create, update, and tear down local Kubernetes
//! clusters across four distribution drivers, each wired to a pool of
//! pull-through mirror registries.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};

mod annotations;
mod commands;
mod config;
mod docker_client;
mod installer;
mod labels;
mod network;
mod orchestrator;
mod ui;

use commands::{down::DownCommand, init::InitCommand, list::ListCommand, start::StartCommand, stop::StopCommand, tools::ToolsCommand, up::UpCommand};

/// KSail - local Kubernetes clusters with pull-through mirror registries.
#[derive(Parser)]
#[command(
    name = "ksail",
    version,
    about = "Scaffold, create, update, and tear down local Kubernetes clusters",
    long_about = "ksail scaffolds, creates, updates, and tears down local Kubernetes \
                  clusters across four distribution drivers (Vanilla/Kind-style, K3s/K3d, \
                  Talos, vCluster), each wired to a pool of content-addressed pull-through \
                  mirror registries so image pulls are transparently redirected through \
                  local proxies."
)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scaffold cluster config on disk without creating anything.
    Init(InitCommand),
    /// Bring up a cluster: scaffold, registries, cluster, mirror injection.
    Up(UpCommand),
    /// Tear down a cluster and its mirror registries.
    Down(DownCommand),
    /// Start a stopped cluster's node containers.
    Start(StartCommand),
    /// Stop a running cluster's node containers.
    Stop(StopCommand),
    /// List clusters for the configured distribution.
    List(ListCommand),
    /// Emit the AI tool-reflection catalogue for this command tree.
    Tools(ToolsCommand),
}

/// Build this binary's own `clap::Command` tree, for
/// [`ksail_reflect::generate_tools`] to walk (`ksail tools`). Lives here
/// rather than in `commands::tools` because `Cli` is private to this
/// module.
#[must_use]
pub(crate) fn cli_command() -> clap::Command {
    Cli::command()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init(cmd) => cmd.run().await,
        Commands::Up(cmd) => cmd.run().await,
        Commands::Down(cmd) => cmd.run().await,
        Commands::Start(cmd) => cmd.run().await,
        Commands::Stop(cmd) => cmd.run().await,
        Commands::List(cmd) => cmd.run().await,
        Commands::Tools(cmd) => cmd.run(),
    }
}
