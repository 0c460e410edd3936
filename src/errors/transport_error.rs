use thiserror::Error;

/// Failure below the HTTP layer: nothing usable came back from the server.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("request timed out after {0} ms")]
    Timeout(u64),
    #[error("request was canceled")]
    Canceled,
    #[error("failed to read response body: {0}")]
    Body(String),
}

impl TransportError {
    pub fn code(&self) -> &'static str {
        match self {
            TransportError::Request(_) => "TRANSPORT_REQUEST",
            TransportError::Timeout(_) => "TRANSPORT_TIMEOUT",
            TransportError::Canceled => "TRANSPORT_CANCELED",
            TransportError::Body(_) => "TRANSPORT_BODY",
        }
    }
}

impl TransportError {
    /// Classifies a reqwest failure raised while sending or awaiting headers.
    /// `timeout_ms` is the budget the caller configured on the client.
    pub fn from_reqwest(err: reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            return TransportError::Timeout(timeout_ms);
        }
        if err.is_body() || err.is_decode() {
            return TransportError::Body(err.to_string());
        }
        TransportError::Request(err.to_string())
    }

    /// Same as [`TransportError::from_reqwest`] for failures while reading
    /// the body, where anything but a timeout counts as a body error.
    pub fn from_reqwest_body(err: reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            return TransportError::Timeout(timeout_ms);
        }
        TransportError::Body(err.to_string())
    }
}
