use crate::constants::{content_types::JSON, endpoints::ACCESS_TOKEN_PATH, limits::BODY_SNIPPET_BYTES};
use crate::errors::ClientError;
use crate::models::{Credential, HttpRequest};
use crate::services::logger::Logger;
use crate::services::transport::Transport;
use crate::stores::ConfigStore;
use crate::utils::redact::redact_text;
use crate::utils::url_join::join_endpoint;
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Serialize)]
struct TokenRequest<'a> {
    api_key: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    key_id: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: String,
}

/// Keeps the access token of a profile usable.
///
/// A stored token is trusted as-is; staleness is only learned from a 401.
/// Every exchange writes the new token back to the store before returning.
#[derive(Clone)]
pub struct TokenManager {
    logger: Logger,
    store: Arc<dyn ConfigStore>,
    transport: Arc<dyn Transport>,
}

impl TokenManager {
    pub fn new(logger: Logger, store: Arc<dyn ConfigStore>, transport: Arc<dyn Transport>) -> Self {
        Self {
            logger: logger.child("token"),
            store,
            transport,
        }
    }

    pub async fn ensure_token(
        &self,
        profile: &str,
        credential: Credential,
        force_refresh: bool,
    ) -> Result<Credential, ClientError> {
        if !force_refresh && credential.has_access_key() {
            return Ok(credential);
        }
        self.refresh(profile, credential, force_refresh).await
    }

    async fn refresh(
        &self,
        profile: &str,
        credential: Credential,
        forced: bool,
    ) -> Result<Credential, ClientError> {
        self.logger.info(
            "requesting new access token",
            Some(&serde_json::json!({ "profile": profile, "forced": forced })),
        );
        let raw = self.store.read_raw()?;
        let token = self.exchange(profile, &credential).await?;
        let refreshed = credential.with_access_key(token);
        self.store.persist(&refreshed, profile, &raw)?;
        Ok(refreshed)
    }

    async fn exchange(&self, profile: &str, credential: &Credential) -> Result<String, ClientError> {
        let failed = |status: Option<u16>, message: String| ClientError::AuthExchangeFailed {
            profile: profile.to_string(),
            status,
            message,
        };

        let url = join_endpoint(&credential.api_endpoint, ACCESS_TOKEN_PATH)?;
        let body = serde_json::to_vec(&TokenRequest {
            api_key: credential.api_key.trim(),
            key_id: credential.key_id.trim(),
        })
        .map_err(|err| failed(None, format!("failed to encode token request: {}", err)))?;

        let mut request = HttpRequest::new(Method::POST, url);
        request
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
        request
            .headers
            .insert(ACCEPT, HeaderValue::from_static(JSON));
        request.body = Some(body.into());

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|err| failed(None, err.to_string()))?;
        if !response.is_success() {
            self.logger.warn(
                "token exchange rejected",
                Some(&serde_json::json!({ "profile": profile, "status": response.status })),
            );
            return Err(failed(
                Some(response.status),
                format!("status {}: {}", response.status, response.body_snippet()),
            ));
        }
        let parsed: TokenResponse = response.json().map_err(|err| {
            failed(
                Some(response.status),
                format!(
                    "malformed token response ({}): {}",
                    err,
                    redact_text(&response.text(), BODY_SNIPPET_BYTES, None)
                ),
            )
        })?;
        let token = parsed.access_token.trim().to_string();
        if token.is_empty() {
            return Err(failed(
                Some(response.status),
                "token response did not contain access_token".to_string(),
            ));
        }
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TransportError;
    use crate::models::HttpResponse;
    use crate::services::logger::LogLevel;
    use crate::stores::MemoryConfigStore;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct OneShot {
        response: Mutex<Option<Result<HttpResponse, TransportError>>>,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl OneShot {
        fn new(response: Result<HttpResponse, TransportError>) -> Arc<Self> {
            Arc::new(Self {
                response: Mutex::new(Some(response)),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Transport for OneShot {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.seen.lock().expect("lock").push(request);
            self.response
                .lock()
                .expect("lock")
                .take()
                .unwrap_or(Err(TransportError::Request("unexpected call".to_string())))
        }
    }

    fn manager(store: &MemoryConfigStore, transport: Arc<OneShot>) -> TokenManager {
        TokenManager::new(
            Logger::with_level("test", LogLevel::Error),
            Arc::new(store.clone()),
            transport,
        )
    }

    fn cred(access_key: &str) -> Credential {
        Credential::new("kid", "api-secret", access_key, "http://www.test.com")
    }

    #[tokio::test]
    async fn existing_token_is_used_without_exchange() {
        let store = MemoryConfigStore::new();
        let transport = OneShot::new(Err(TransportError::Canceled));
        let out = manager(&store, transport.clone())
            .ensure_token("default", cred("cached"), false)
            .await
            .expect("ensure");
        assert_eq!(out.access_key, "cached");
        assert!(transport.seen.lock().expect("lock").is_empty());
        assert!(store.persisted().is_empty());
    }

    #[tokio::test]
    async fn exchange_posts_key_material_and_persists() {
        let store = MemoryConfigStore::new();
        let transport = OneShot::new(Ok(HttpResponse::new(200, r#"{"access_token":"fresh"}"#)));
        let out = manager(&store, transport.clone())
            .ensure_token("user1", cred(""), false)
            .await
            .expect("ensure");
        assert_eq!(out.access_key, "fresh");

        let seen = transport.seen.lock().expect("lock");
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].method, Method::POST);
        assert_eq!(
            seen[0].url.as_str(),
            "http://www.test.com/user/credentials/api/access_token"
        );
        let body: serde_json::Value =
            serde_json::from_slice(seen[0].body.as_ref().expect("body")).expect("json");
        assert_eq!(body, serde_json::json!({"api_key": "api-secret", "key_id": "kid"}));

        assert_eq!(store.raw_reads(), 1);
        assert_eq!(store.persisted(), vec![("user1".to_string(), out)]);
    }

    #[tokio::test]
    async fn forced_refresh_ignores_cached_token() {
        let store = MemoryConfigStore::new();
        let transport = OneShot::new(Ok(HttpResponse::new(200, r#"{"access_token":"new"}"#)));
        let out = manager(&store, transport)
            .ensure_token("default", cred("old"), true)
            .await
            .expect("ensure");
        assert_eq!(out.access_key, "new");
    }

    #[tokio::test]
    async fn rejected_exchange_is_terminal_and_not_persisted() {
        let store = MemoryConfigStore::new();
        let transport = OneShot::new(Ok(HttpResponse::new(403, "key revoked")));
        let err = manager(&store, transport)
            .ensure_token("default", cred(""), false)
            .await
            .expect_err("must fail");
        match err {
            ClientError::AuthExchangeFailed { status, message, .. } => {
                assert_eq!(status, Some(403));
                assert!(message.contains("key revoked"));
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(store.persisted().is_empty());
    }

    #[tokio::test]
    async fn malformed_or_empty_token_body_fails() {
        for body in ["not json", r#"{"access_token": ""}"#, r#"{"other": 1}"#] {
            let store = MemoryConfigStore::new();
            let transport = OneShot::new(Ok(HttpResponse::new(200, body)));
            let err = manager(&store, transport)
                .ensure_token("default", cred(""), false)
                .await
                .expect_err(body);
            assert_eq!(err.code(), "AUTH_EXCHANGE_FAILED", "{}", body);
        }
    }

    #[tokio::test]
    async fn transport_failure_during_exchange_is_auth_failure() {
        let store = MemoryConfigStore::new();
        let transport = OneShot::new(Err(TransportError::Request("connection refused".to_string())));
        let err = manager(&store, transport)
            .ensure_token("default", cred(""), false)
            .await
            .expect_err("must fail");
        assert_eq!(err.code(), "AUTH_EXCHANGE_FAILED");
        assert!(err.to_string().contains("connection refused"));
    }
}
