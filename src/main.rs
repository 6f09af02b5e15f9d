//! WebSearch + Sheets MCP Server
//!
//! Exposes `web_search` (Tavily) and `append_to_sheet` (Google Sheets) as
//! MCP tools over stdio.
//!
//! # Configuration
//! Set `TAVILY_API_KEY` for search, and `GOOGLE_APPLICATION_CREDENTIALS` or
//! `SERVICE_ACCOUNT_FILE` (path to a service account JSON) for Sheets.

use rmcp::{transport::stdio, ServiceExt};

use websearch_sheets_mcp::logging;
use websearch_sheets_mcp::server::WebSearchSheetsServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the MCP protocol; logs must only ever go to stderr.
    logging::init_tracing("websearch_sheets_mcp")?;

    tracing::info!("Starting WebSearch+Sheets MCP Server");

    let server = WebSearchSheetsServer::new();
    let service = server.serve(stdio()).await?;

    tracing::info!("Server running, waiting for requests...");
    service.waiting().await?;

    tracing::info!("Server shutting down");
    Ok(())
}
