//! WebSearch + Sheets MCP Library
//!
//! Two tools over the MCP stdio transport:
//!
//! - `web_search`: Tavily Search API, bearer-key authenticated, normalized
//!   to `{"query", "results": [{"title", "url", "content"}]}`.
//! - `append_to_sheet`: Google Sheets `values.append` via a service-account
//!   authenticated client, returning `{"updatedRows"}`.
//!
//! # Configuration
//! Environment-driven: `TAVILY_API_KEY`, `GOOGLE_APPLICATION_CREDENTIALS` /
//! `SERVICE_ACCOUNT_FILE`, and the usual proxy variables (`HTTPS_PROXY`,
//! `HTTP_PROXY`, lowercase variants, `NO_PROXY`).

pub mod backends;
pub mod config;
pub mod error;
pub mod logging;
pub mod server;
pub mod types;

// Re-export main server type
pub use server::WebSearchSheetsServer;

// Re-export parameter types for direct API usage
pub use server::{AppendToSheetParams, WebSearchParams};
