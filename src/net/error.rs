//! Failures surfaced to callers of the API client.

/// Errors from issuing a request through [`super::api::ApiClient`].
///
/// `Clone` so a shared in-flight token refresh can hand the same outcome to
/// every waiter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, CORS, offline, ...).
    #[error("request failed: {0}")]
    Network(String),

    /// No response within the configured budget.
    #[error("request timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// The server answered with a non-success status.
    #[error("request rejected: status {status}")]
    Status { status: u16, body: String },

    /// The response body did not match the expected shape.
    #[error("response parse failed: {0}")]
    Decode(String),

    /// The request body could not be serialized.
    #[error("request encode failed: {0}")]
    Encode(String),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401, .. })
    }
}
