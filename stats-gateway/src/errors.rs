use crate::config::Environment;
use http_body_util::combinators::BoxBody;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use shared::http::make_error_response;
use thiserror::Error;

/// Result type alias for gateway operations
pub type Result<T, E = GatewayError> = std::result::Result<T, E>;

/// Failure of a single backend call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UpstreamError {
    #[error("{endpoint} returned {status}: {message}")]
    Status {
        endpoint: String,
        status: StatusCode,
        message: String,
    },

    #[error("Upstream timeout for {0}")]
    Timeout(String),

    #[error("Upstream request failed for {0}: {1}")]
    Request(String, String),

    #[error("Failed to decode response from {0}: {1}")]
    Decode(String, String),

    #[error("Invalid upstream URL: {0}")]
    InvalidUrl(String),
}

impl UpstreamError {
    /// Network failures, timeouts, 408, 429 and 5xx are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            UpstreamError::Status { status, .. } => {
                *status == StatusCode::REQUEST_TIMEOUT
                    || *status == StatusCode::TOO_MANY_REQUESTS
                    || status.is_server_error()
            }
            UpstreamError::Timeout(_) | UpstreamError::Request(..) => true,
            UpstreamError::Decode(..) | UpstreamError::InvalidUrl(_) => false,
        }
    }

    /// Status code surfaced to the client when this error is fatal.
    pub fn status(&self) -> StatusCode {
        match self {
            UpstreamError::Status { status, .. } => *status,
            UpstreamError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            UpstreamError::Request(..) | UpstreamError::Decode(..) => StatusCode::BAD_GATEWAY,
            UpstreamError::InvalidUrl(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short human readable reason, without the endpoint prefix.
    pub fn reason(&self) -> String {
        match self {
            UpstreamError::Status { message, .. } => message.clone(),
            UpstreamError::Timeout(_) => "request timed out".to_string(),
            UpstreamError::Request(_, e) | UpstreamError::Decode(_, e) => e.clone(),
            UpstreamError::InvalidUrl(e) => e.clone(),
        }
    }
}

/// Errors returned by gateway handlers and rendered as JSON error envelopes.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Account not found: {}", .0.reason())]
    AccountNotFound(UpstreamError),

    #[error("{0}")]
    Upstream(UpstreamError),

    #[error("Backend URL is not configured")]
    BackendNotConfigured,

    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Not found")]
    NotFound,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Invalid payload from upstream: {0}")]
    InvalidPayload(String),

    #[error("Failed to read request body: {0}")]
    RequestBody(String),

    #[error("Response serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Response stream error: {0}")]
    Stream(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::AccountNotFound(e) | GatewayError::Upstream(e) => e.status(),
            GatewayError::MissingParameter(_)
            | GatewayError::InvalidParameter { .. }
            | GatewayError::RequestBody(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound => StatusCode::NOT_FOUND,
            GatewayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            GatewayError::InvalidPayload(_) => StatusCode::BAD_GATEWAY,
            GatewayError::BackendNotConfigured
            | GatewayError::Serialization(_)
            | GatewayError::Stream(_)
            | GatewayError::Io(_)
            | GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Renders the `{message, details?}` envelope.
    ///
    /// `details` carries the debug representation of the error and is only
    /// attached to server errors in development.
    pub fn into_response(self, environment: Environment) -> Response<BoxBody<Bytes, GatewayError>> {
        let status = self.status();
        let message = self.to_string();
        let details = (environment.is_development() && status.is_server_error())
            .then(|| format!("{self:?}"));
        make_error_response(status, &message, details.as_deref())
    }
}
