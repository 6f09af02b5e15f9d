//! Wire types for tool results
//!
//! These are the structured payloads serialized back to the protocol
//! caller. Fields that the backend omits are defaulted to empty strings so
//! the output shape is always complete.

use serde::{Deserialize, Serialize};

/// Title fields are trimmed to this many characters.
pub const MAX_TITLE_CHARS: usize = 300;
/// Content snippets are trimmed to this many characters to keep payloads lean.
pub const MAX_CONTENT_CHARS: usize = 2000;

/// A single normalized search hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResultItem {
    /// The title of the result
    pub title: String,
    /// The URL of the result
    pub url: String,
    /// A content snippet for the result
    pub content: String,
}

/// The structured result of a `web_search` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// The search query that was executed
    pub query: String,
    /// The search results, in backend order
    pub results: Vec<SearchResultItem>,
}

/// The structured result of an `append_to_sheet` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppendOutcome {
    /// Number of rows the append wrote
    #[serde(rename = "updatedRows")]
    pub updated_rows: u64,
}

/// Truncate to at most `max` characters, counting chars rather than bytes.
/// Input already within the limit is returned unchanged.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
