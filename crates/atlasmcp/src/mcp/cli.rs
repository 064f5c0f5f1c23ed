#[derive(Debug, clap::Parser)]
#[command(name = "mcp")]
#[command(about = "Serve the Jira and Confluence tools over the Model Context Protocol")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Read JSON-RPC requests from stdin, one per line
    #[clap(name = "stdio")]
    Stdio,

    /// Listen for JSON-RPC over HTTP with a Server-Sent Events stream
    #[clap(name = "sse")]
    Sse(SseOptions),
}

#[derive(Debug, clap::Args)]
pub struct SseOptions {
    /// Port to listen on
    #[arg(short, long, env = "ATLASMCP_PORT", default_value = "3000")]
    pub port: u16,

    /// Address to bind to
    #[arg(long, env = "ATLASMCP_HOST", default_value = "127.0.0.1")]
    pub host: String,
}
