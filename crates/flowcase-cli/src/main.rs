//! Flowcase CLI Application
//!
//! Command-line interface and MCP server for the flowcase test management
//! tool.

mod args;
mod cli;
mod mcp;
mod renderer;

use anyhow::{Context, Result};
use args::{Args, Commands, ListRunsArgs};
use clap::Parser;
use cli::Cli;
use flowcase_core::TrackerBuilder;
use log::info;
use mcp::{run_stdio_server, FlowcaseMcpServer};
use renderer::TerminalRenderer;
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        database_file,
        no_color,
        command,
    } = Args::parse();

    let tracker = TrackerBuilder::new()
        .with_database_path(database_file)
        .build()
        .await
        .context("Failed to initialize tracker")?;

    info!("Flowcase started");

    // Rich output only on a terminal
    let rich = !no_color && std::io::IsTerminal::is_terminal(&std::io::stdout());
    let renderer = TerminalRenderer::new(rich);

    match command {
        Some(Case { command }) => {
            Cli::new(tracker, renderer)
                .handle_case_command(command)
                .await
        }
        Some(Suite { command }) => {
            Cli::new(tracker, renderer)
                .handle_suite_command(command)
                .await
        }
        Some(Run { command }) => Cli::new(tracker, renderer).handle_run_command(command).await,
        Some(Labels) => Cli::new(tracker, renderer).list_labels().await,
        Some(Serve) => {
            info!("Starting Flowcase MCP server");
            run_stdio_server(FlowcaseMcpServer::new(tracker))
                .await
                .context("MCP server failed")
        }
        None => {
            Cli::new(tracker, renderer)
                .list_flow_runs(&ListRunsArgs::default().into())
                .await
        }
    }
}
