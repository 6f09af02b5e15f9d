//! Tavily search backend
//!
//! One short-lived HTTP client per call: reqwest's system-proxy support
//! picks up the proxy environment on each call, and there is no connection
//! state worth keeping between searches.
//! See: https://docs.tavily.com/docs/rest-api/api-reference

use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config;
use crate::error::ToolError;
use crate::types::{
    truncate_chars, SearchResponse, SearchResultItem, MAX_CONTENT_CHARS, MAX_TITLE_CHARS,
};

pub const TAVILY_ENDPOINT: &str = "https://api.tavily.com/search";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Search depth accepted by the Tavily API.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SearchDepth {
    #[default]
    Basic,
    Advanced,
}

/// Clamp the requested result count into the API's accepted window.
/// Out-of-range values are clamped, not rejected.
pub fn effective_max_results(requested: i64) -> usize {
    requested.clamp(1, 20) as usize
}

/// Bearer-authenticated Tavily search.
#[derive(Debug)]
pub struct TavilySearch {
    api_key: String,
    endpoint: String,
}

impl TavilySearch {
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Build from the environment. A missing key is a configuration error,
    /// raised before any request goes out.
    pub fn from_env() -> Result<Self, ToolError> {
        let api_key = config::tavily_api_key_from_env()
            .ok_or_else(|| ToolError::Configuration("TAVILY_API_KEY is not set".to_string()))?;
        Ok(Self::new(api_key, TAVILY_ENDPOINT))
    }

    /// Run one search and normalize the response.
    pub async fn search(
        &self,
        query: &str,
        depth: SearchDepth,
        max_results: i64,
    ) -> Result<SearchResponse, ToolError> {
        let limit = effective_max_results(max_results);
        let body = json!({
            "query": query,
            "search_depth": depth,
            "max_results": limit,
        });

        tracing::info!(%query, depth = ?depth, limit, "Tavily request");

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let response = client
            .post(&self.endpoint)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", self.api_key),
            )
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ToolError::Upstream(format!(
                "Tavily error {}: {}",
                status, text
            )));
        }

        let parsed: TavilyResponse = response.json().await?;

        // The API is asked to respect `limit` already; re-slice anyway.
        let results: Vec<SearchResultItem> = parsed
            .results
            .into_iter()
            .take(limit)
            .map(|r| SearchResultItem {
                title: truncate_chars(&r.title.unwrap_or_default(), MAX_TITLE_CHARS),
                url: r.url.unwrap_or_default(),
                content: truncate_chars(&r.content.unwrap_or_default(), MAX_CONTENT_CHARS),
            })
            .collect();

        Ok(SearchResponse {
            query: query.to_string(),
            results,
        })
    }
}

// Tavily API response types
#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    title: Option<String>,
    url: Option<String>,
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn item(title: &str, url: &str, content: &str) -> Value {
        json!({"title": title, "url": url, "content": content})
    }

    fn backend_for(server: &MockServer) -> TavilySearch {
        TavilySearch::new("test-key", format!("{}/search", server.uri()))
    }

    #[test]
    fn max_results_is_clamped_into_window() {
        assert_eq!(effective_max_results(0), 1);
        assert_eq!(effective_max_results(-3), 1);
        assert_eq!(effective_max_results(1), 1);
        assert_eq!(effective_max_results(5), 5);
        assert_eq!(effective_max_results(20), 20);
        assert_eq!(effective_max_results(50), 20);
    }

    #[test]
    fn search_depth_serializes_lowercase() {
        assert_eq!(json!(SearchDepth::Basic), json!("basic"));
        assert_eq!(json!(SearchDepth::Advanced), json!("advanced"));
    }

    #[test]
    fn missing_api_key_is_a_configuration_error() {
        let _guard = crate::config::ENV_MUTEX
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        std::env::remove_var("TAVILY_API_KEY");

        let err = TavilySearch::from_env().unwrap_err();
        assert!(matches!(err, ToolError::Configuration(_)));
    }

    #[tokio::test]
    async fn search_takes_at_most_max_results_in_backend_order() {
        let server = MockServer::start().await;
        let results: Vec<Value> = (0..5)
            .map(|i| item(&format!("t{i}"), &format!("https://example.com/{i}"), "c"))
            .collect();

        Mock::given(method("POST"))
            .and(path("/search"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({
                "query": "rust ownership",
                "search_depth": "basic",
                "max_results": 3,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": results})))
            .expect(1)
            .mount(&server)
            .await;

        let response = backend_for(&server)
            .search("rust ownership", SearchDepth::Basic, 3)
            .await
            .unwrap();

        assert_eq!(response.query, "rust ownership");
        assert_eq!(response.results.len(), 3);
        assert_eq!(response.results[0].title, "t0");
        assert_eq!(response.results[1].title, "t1");
        assert_eq!(response.results[2].url, "https://example.com/2");
    }

    #[tokio::test]
    async fn missing_fields_default_to_empty_strings() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{"url": "https://example.com"}, {"title": "only title"}],
            })))
            .mount(&server)
            .await;

        let response = backend_for(&server)
            .search("q", SearchDepth::Basic, 5)
            .await
            .unwrap();

        assert_eq!(response.results.len(), 2);
        assert_eq!(response.results[0].title, "");
        assert_eq!(response.results[0].content, "");
        assert_eq!(response.results[0].url, "https://example.com");
        assert_eq!(response.results[1].url, "");
    }

    #[tokio::test]
    async fn long_fields_are_truncated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [item(&"t".repeat(400), "https://example.com", &"c".repeat(3000))],
            })))
            .mount(&server)
            .await;

        let response = backend_for(&server)
            .search("q", SearchDepth::Advanced, 1)
            .await
            .unwrap();

        assert_eq!(response.results[0].title.chars().count(), 300);
        assert_eq!(response.results[0].content.chars().count(), 2000);
    }

    #[tokio::test]
    async fn non_success_status_is_an_upstream_error_with_no_retry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let err = backend_for(&server)
            .search("q", SearchDepth::Basic, 5)
            .await
            .unwrap_err();

        assert!(matches!(err, ToolError::Upstream(_)));
        assert!(err.to_string().contains("502"));
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn empty_result_list_is_a_valid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
            .mount(&server)
            .await;

        let response = backend_for(&server)
            .search("nothing", SearchDepth::Basic, 5)
            .await
            .unwrap();
        assert!(response.results.is_empty());
    }
}
