//! API error responses.
//!
//! Every failure leaves the server as an [`ErrorResponse`] JSON body with
//! a machine-readable code and, where one was assigned, the request id.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use lumen_agent::AgentError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

use crate::conversations::ConversationBusy;

/// Structured error response for HTTP APIs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub error: String,
    /// Human-readable error message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("Dashboard '{0}' not found")]
    DashboardNotFound(String),

    #[error("Dashboard '{0}' is not enabled for this site")]
    DashboardDisabled(String),

    #[error(transparent)]
    ConversationBusy(#[from] ConversationBusy),

    #[error("Request timed out after {secs}s")]
    Timeout { request_id: String, secs: u64 },

    #[error("{error}")]
    AgentFailed {
        request_id: String,
        #[source]
        error: AgentError,
    },

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::DashboardNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::DashboardDisabled(_) => StatusCode::FORBIDDEN,
            ApiError::ConversationBusy(_) => StatusCode::CONFLICT,
            ApiError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            ApiError::AgentFailed {
                error: AgentError::Transport(_),
                ..
            } => StatusCode::BAD_GATEWAY,
            ApiError::AgentFailed { .. } | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::InvalidRequest(_) => "invalid_request",
            ApiError::DashboardNotFound(_) => "dashboard_not_found",
            ApiError::DashboardDisabled(_) => "dashboard_disabled",
            ApiError::ConversationBusy(_) => "conversation_busy",
            ApiError::Timeout { .. } => "timeout",
            ApiError::AgentFailed { error, .. } => match error {
                AgentError::Transport(_) => "model_unavailable",
                _ => "agent_failed",
            },
            ApiError::Internal(_) => "internal_error",
        }
    }

    pub fn request_id(&self) -> Option<&str> {
        match self {
            ApiError::Timeout { request_id, .. } | ApiError::AgentFailed { request_id, .. } => {
                Some(request_id)
            }
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(
                code = self.error_code(),
                request_id = self.request_id().unwrap_or("-"),
                error = %self,
                "Request failed"
            );
        } else {
            warn!(code = self.error_code(), error = %self, "Request rejected");
        }

        let body = ErrorResponse {
            error: self.error_code().to_string(),
            message: self.to_string(),
            request_id: self.request_id().map(str::to_string),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_agent::ModelError;

    #[test]
    fn test_status_mapping() {
        let transport = ApiError::AgentFailed {
            request_id: "r1".to_string(),
            error: AgentError::Transport(ModelError::EmptyResponse),
        };
        assert_eq!(transport.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(transport.request_id(), Some("r1"));

        let bound = ApiError::AgentFailed {
            request_id: "r2".to_string(),
            error: AgentError::IterationBoundExceeded { limit: 10 },
        };
        assert_eq!(bound.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(bound.to_string(), "Max iterations (10) exceeded");

        assert_eq!(
            ApiError::DashboardDisabled("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::ConversationBusy(ConversationBusy("c".into())).status_code(),
            StatusCode::CONFLICT
        );
    }
}
