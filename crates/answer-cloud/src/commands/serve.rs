//! Serve command: run the MCP server on stdio.

use anyhow::Context;
use answer_cloud_core::config::Config;
use clap::Args;
use rmcp::ServiceExt;
use rmcp::transport::stdio;
use tracing::{info, instrument};

use crate::server::WordCloudServer;

/// Arguments for the `serve` subcommand.
#[derive(Args, Debug, Default)]
pub struct ServeArgs {}

/// Serve word-cloud tools over stdio until the client disconnects.
#[instrument(name = "cmd_serve", skip_all)]
pub async fn cmd_serve(
    _args: ServeArgs,
    max_input: Option<usize>,
    config: Config,
) -> anyhow::Result<()> {
    info!(
        segmenter = %config.segmenter,
        max_input = ?max_input,
        "starting MCP server on stdio"
    );

    let service = WordCloudServer::new(&config, max_input)
        .serve(stdio())
        .await
        .context("failed to start MCP server")?;
    service
        .waiting()
        .await
        .context("MCP server terminated abnormally")?;

    info!("MCP server stopped");
    Ok(())
}
