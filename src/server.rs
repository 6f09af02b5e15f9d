//! MCP server wiring for the two tools
//!
//! Registers `web_search` and `append_to_sheet` with schema-described
//! parameters and routes invocations to the backends. Handler failures are
//! converted to structured protocol errors; nothing here writes to stdout.

use std::sync::Arc;

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use crate::backends::sheets::SheetsClient;
use crate::backends::tavily::{SearchDepth, TavilySearch};
use crate::error::ToolError;

/// The MCP server exposing `web_search` and `append_to_sheet`.
#[derive(Clone)]
pub struct WebSearchSheetsServer {
    /// Lazily built, process-lifetime Sheets client.
    sheets: Arc<OnceCell<SheetsClient>>,
    tool_router: ToolRouter<Self>,
}

// ============================================================================
// Parameter Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct WebSearchParams {
    /// The search query
    #[schemars(description = "The search query string")]
    pub query: String,
    /// How thorough the search should be
    #[schemars(description = "Search depth: basic or advanced (default: basic)")]
    pub search_depth: Option<SearchDepth>,
    /// Requested result count; values outside 1-20 are clamped
    #[schemars(description = "Maximum number of results to return, 1-20 (default: 5)")]
    pub max_results: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct AppendToSheetParams {
    /// Target spreadsheet
    #[schemars(description = "The spreadsheet ID")]
    pub spreadsheet_id: String,
    /// Where to append, A1 notation
    #[schemars(description = "A1-notation range to append after, e.g. \"Sheet1!A2:D\"")]
    pub range_name: String,
    /// Rows to append
    #[schemars(description = "Rows to append, each a list of cell strings")]
    pub rows: Vec<Vec<String>>,
}

// ============================================================================
// Tool Router Implementation
// ============================================================================

#[tool_router]
impl WebSearchSheetsServer {
    pub fn new() -> Self {
        Self {
            sheets: Arc::new(OnceCell::new()),
            tool_router: Self::tool_router(),
        }
    }

    /// Single-flight access to the cached Sheets client. Concurrent first
    /// calls construct exactly once; a failed construction leaves the slot
    /// empty so the next call can try again.
    async fn sheets_client(&self) -> Result<&SheetsClient, ToolError> {
        self.sheets
            .get_or_try_init(|| async { SheetsClient::from_env() })
            .await
    }

    #[tool(
        description = "Perform a web search via Tavily. Returns titles, URLs, and content snippets."
    )]
    async fn web_search(
        &self,
        Parameters(params): Parameters<WebSearchParams>,
    ) -> Result<CallToolResult, McpError> {
        if params.query.is_empty() {
            return Err(
                ToolError::InvalidArgument("query must be a non-empty string".into()).into(),
            );
        }
        let depth = params.search_depth.unwrap_or_default();
        let max_results = params.max_results.unwrap_or(5);

        // The key is checked here, per call, before anything goes out.
        let backend = TavilySearch::from_env()?;
        let response = backend.search(&params.query, depth, max_results).await?;

        tracing::info!(
            query = %response.query,
            results = response.results.len(),
            "web_search complete"
        );

        let json = serde_json::to_string_pretty(&response)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(
        description = "Append rows to a Google Sheet using values.append. Returns the number of updated rows."
    )]
    async fn append_to_sheet(
        &self,
        Parameters(params): Parameters<AppendToSheetParams>,
    ) -> Result<CallToolResult, McpError> {
        if params.spreadsheet_id.is_empty() {
            return Err(ToolError::InvalidArgument("spreadsheet_id is required".into()).into());
        }
        if params.range_name.is_empty() {
            return Err(ToolError::InvalidArgument("range_name is required".into()).into());
        }

        let client = self.sheets_client().await?;
        let outcome = client
            .values_append(&params.spreadsheet_id, &params.range_name, &params.rows)
            .await?;

        let json = serde_json::to_string_pretty(&outcome)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

impl Default for WebSearchSheetsServer {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Server Handler Implementation
// ============================================================================

#[tool_handler]
impl rmcp::ServerHandler for WebSearchSheetsServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Web search and Google Sheets MCP server. `web_search` queries the \
                 Tavily Search API (requires TAVILY_API_KEY); `append_to_sheet` \
                 appends rows to a Google Sheet via a service account (requires \
                 GOOGLE_APPLICATION_CREDENTIALS or SERVICE_ACCOUNT_FILE)."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
