use clap::Parser;
use doxysearch_mcp::cli::{Cli, run};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for the MCP protocol and command output
    doxysearch_mcp::tracing::init(cli.log_format);

    run(cli).await
}
