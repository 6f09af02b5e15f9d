//! Error taxonomy for tool handlers
//!
//! Every handler failure is one of these variants; the conversion to
//! `rmcp::ErrorData` at the dispatch boundary keeps raw errors off the
//! protocol stream.

use rmcp::ErrorData as McpError;
use thiserror::Error;

/// Failures a tool call can surface to the protocol caller.
#[derive(Debug, Error)]
pub enum ToolError {
    /// A caller-supplied parameter violates a stated constraint.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Required environment or credentials are missing.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A referenced local file does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The backend call failed or returned a non-success status.
    #[error("upstream error: {0}")]
    Upstream(String),
}

impl From<ToolError> for McpError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::InvalidArgument(_) => McpError::invalid_params(err.to_string(), None),
            _ => McpError::internal_error(err.to_string(), None),
        }
    }
}

impl From<reqwest::Error> for ToolError {
    fn from(err: reqwest::Error) -> Self {
        ToolError::Upstream(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::ErrorCode;

    #[test]
    fn invalid_argument_maps_to_invalid_params() {
        let err: McpError = ToolError::InvalidArgument("query must be non-empty".into()).into();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert!(err.message.contains("invalid argument"));
    }

    #[test]
    fn other_kinds_map_to_internal_error_with_kind_name() {
        let err: McpError = ToolError::Configuration("TAVILY_API_KEY is not set".into()).into();
        assert_eq!(err.code, ErrorCode::INTERNAL_ERROR);
        assert!(err.message.contains("configuration error"));

        let err: McpError = ToolError::Upstream("Tavily error 502".into()).into();
        assert!(err.message.contains("upstream error"));
    }
}
