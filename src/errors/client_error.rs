use crate::constants::limits::BODY_SNIPPET_BYTES;
use crate::errors::TransportError;
use crate::models::HttpResponse;
use crate::utils::redact::redact_text;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Config,
    Denied,
    Transport,
    Malformed,
    Rejected,
    Internal,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("no credentials configured for profile '{profile}'")]
    MissingCredentials { profile: String },

    #[error("invalid api endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("access token exchange failed for profile '{profile}': {message}")]
    AuthExchangeFailed {
        profile: String,
        status: Option<u16>,
        message: String,
    },

    #[error(
        "authorization failed after token refresh for profile '{profile}' (status {})",
        .response.status
    )]
    AuthorizationFailedAfterRetry {
        profile: String,
        response: Box<HttpResponse>,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("malformed response: {message}")]
    MalformedResponse { message: String, body: String },

    #[error("request rejected with status {status}: {body}")]
    RequestRejected { status: u16, body: String },

    #[error("failed to sign request: {0}")]
    Signing(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl ClientError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        ClientError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        ClientError::Config(message.into())
    }

    /// The body is masked and truncated the same way rejected responses are.
    pub fn malformed(message: impl Into<String>, body: impl AsRef<str>) -> Self {
        ClientError::MalformedResponse {
            message: message.into(),
            body: redact_text(body.as_ref(), BODY_SNIPPET_BYTES, None),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::MissingCredentials { .. }
            | ClientError::InvalidEndpoint { .. }
            | ClientError::Config(_) => ErrorKind::Config,
            ClientError::AuthExchangeFailed { .. }
            | ClientError::AuthorizationFailedAfterRetry { .. } => ErrorKind::Denied,
            ClientError::Transport(_) => ErrorKind::Transport,
            ClientError::MalformedResponse { .. } => ErrorKind::Malformed,
            ClientError::RequestRejected { .. } => ErrorKind::Rejected,
            ClientError::Signing(_) | ClientError::Io { .. } => ErrorKind::Internal,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ClientError::MissingCredentials { .. } => "MISSING_CREDENTIALS",
            ClientError::InvalidEndpoint { .. } => "INVALID_ENDPOINT",
            ClientError::AuthExchangeFailed { .. } => "AUTH_EXCHANGE_FAILED",
            ClientError::AuthorizationFailedAfterRetry { .. } => {
                "AUTHORIZATION_FAILED_AFTER_RETRY"
            }
            ClientError::Transport(err) => err.code(),
            ClientError::MalformedResponse { .. } => "MALFORMED_RESPONSE",
            ClientError::RequestRejected { .. } => "REQUEST_REJECTED",
            ClientError::Signing(_) => "SIGNING_FAILED",
            ClientError::Config(_) => "CONFIG",
            ClientError::Io { .. } => "IO",
        }
    }

    /// Remediation shown under the error message by the CLI.
    pub fn hint(&self) -> Option<String> {
        match self {
            ClientError::MissingCredentials { profile } => Some(format!(
                "Run: commons-client configure --profile {} --cred <credentials.json> --apiendpoint <url>",
                profile
            )),
            ClientError::InvalidEndpoint { .. } => Some(
                "Re-run configure with --apiendpoint set to an http(s) URL, e.g. \"https://data.example.org\"."
                    .to_string(),
            ),
            ClientError::AuthExchangeFailed { .. } => Some(
                "The api key may be expired or revoked. Download a fresh credentials file and re-run configure."
                    .to_string(),
            ),
            ClientError::AuthorizationFailedAfterRetry { .. } => Some(
                "A freshly issued token was also rejected. Check that this profile has access to the resource."
                    .to_string(),
            ),
            ClientError::Transport(TransportError::Timeout(_)) => {
                Some("Increase --timeout-ms or check network connectivity.".to_string())
            }
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let mut details = serde_json::json!({
            "kind": self.kind(),
            "code": self.code(),
            "message": self.to_string(),
        });
        if let Some(hint) = self.hint() {
            details["hint"] = serde_json::Value::String(hint);
        }
        match self {
            ClientError::AuthExchangeFailed { status, .. } => {
                details["status"] = serde_json::json!(status);
            }
            ClientError::AuthorizationFailedAfterRetry { response, .. } => {
                details["status"] = serde_json::json!(response.status);
                details["body"] = serde_json::Value::String(response.body_snippet());
            }
            ClientError::MalformedResponse { body, .. } | ClientError::RequestRejected { body, .. } => {
                details["body"] = serde_json::Value::String(body.clone());
            }
            _ => {}
        }
        details
    }
}
