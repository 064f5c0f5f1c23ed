#![allow(unused)]

use crate::prelude::*;
use clap::Parser;
use std::sync::Arc;

mod atlassian;
mod cli;
mod mcp;
mod prelude;
#[cfg(test)]
mod testing;
mod tools;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Jira and Confluence operations, from the terminal or as MCP tools"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Whether to display additional information.
    #[clap(long, env = "ATLASMCP_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Model Context Protocol server
    MCP(crate::mcp::App),

    /// Jira operations
    #[clap(subcommand)]
    Jira(crate::cli::jira::Commands),

    /// Confluence operations
    #[clap(subcommand)]
    Confluence(crate::cli::confluence::Commands),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();
    let services = Arc::new(crate::tools::Services::from_env());

    match app.command {
        SubCommands::MCP(sub_app) => crate::mcp::run(sub_app, app.global, services).await,
        SubCommands::Jira(command) => crate::cli::jira::run(command, app.global, &services).await,
        SubCommands::Confluence(command) => {
            crate::cli::confluence::run(command, app.global, &services).await
        }
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
