use crate::constants::{retry::MAX_REQUEST_ATTEMPTS, signing::DATE_HEADER};
use crate::errors::ClientError;
use crate::models::{Credential, HttpRequest, HttpResponse, RequestSpec};
use crate::services::logger::Logger;
use crate::services::signer::{Signer, SigningInput};
use crate::services::token_manager::TokenManager;
use crate::services::transport::Transport;
use crate::stores::ConfigStore;
use crate::utils::url_join::join_endpoint;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE, HOST};
use std::sync::Arc;
use url::Url;

/// Result of a signed call: the response plus the credential that produced
/// it, which may carry a token minted during the call.
#[derive(Debug, Clone)]
pub struct Execution {
    pub credential: Credential,
    pub response: HttpResponse,
}

/// Sends signed requests on behalf of a profile.
///
/// A 401 triggers exactly one forced token refresh and one resend. Any other
/// status, including 403, goes back to the caller untouched.
#[derive(Clone)]
pub struct RequestExecutor {
    logger: Logger,
    store: Arc<dyn ConfigStore>,
    signer: Arc<dyn Signer>,
    transport: Arc<dyn Transport>,
    tokens: TokenManager,
}

impl RequestExecutor {
    pub fn new(
        logger: Logger,
        store: Arc<dyn ConfigStore>,
        signer: Arc<dyn Signer>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let tokens = TokenManager::new(logger.clone(), store.clone(), transport.clone());
        Self {
            logger: logger.child("request"),
            store,
            signer,
            transport,
            tokens,
        }
    }

    pub fn transport(&self) -> Arc<dyn Transport> {
        self.transport.clone()
    }

    pub fn store(&self) -> Arc<dyn ConfigStore> {
        self.store.clone()
    }

    pub async fn execute(&self, profile: &str, spec: &RequestSpec) -> Result<Execution, ClientError> {
        let credential = self.store.resolve(profile)?;
        if !credential.has_api_key() {
            return Err(ClientError::MissingCredentials {
                profile: profile.to_string(),
            });
        }
        let url = join_endpoint(&credential.api_endpoint, &spec.path)?;
        let extra_headers = caller_headers(spec)?;
        let mut credential = self.tokens.ensure_token(profile, credential, false).await?;

        let mut attempt = 1;
        loop {
            let request = self.build(&credential, &url, spec, &extra_headers)?;
            let response = self.transport.send(request).await?;
            self.logger.debug(
                "response",
                Some(&serde_json::json!({
                    "profile": profile,
                    "method": spec.method.as_str(),
                    "path": url.path(),
                    "status": response.status,
                    "attempt": attempt,
                })),
            );
            if !response.is_unauthorized() {
                return Ok(Execution {
                    credential,
                    response,
                });
            }
            if attempt >= MAX_REQUEST_ATTEMPTS {
                self.logger.warn(
                    "refreshed token rejected",
                    Some(&serde_json::json!({ "profile": profile, "path": url.path() })),
                );
                return Err(ClientError::AuthorizationFailedAfterRetry {
                    profile: profile.to_string(),
                    response: Box::new(response),
                });
            }
            self.logger.info(
                "access token rejected, refreshing",
                Some(&serde_json::json!({ "profile": profile })),
            );
            credential = self.tokens.ensure_token(profile, credential, true).await?;
            attempt += 1;
        }
    }

    fn build(
        &self,
        credential: &Credential,
        url: &Url,
        spec: &RequestSpec,
        extra_headers: &HeaderMap,
    ) -> Result<HttpRequest, ClientError> {
        let mut request = self.signer.sign(SigningInput {
            method: &spec.method,
            url: url.as_str(),
            body: spec.body.as_ref(),
            content_type: spec.content_type.as_deref(),
            service: &spec.service,
            key_id: &credential.key_id,
            secret: &credential.access_key,
        })?;
        for (name, value) in extra_headers {
            request.headers.insert(name.clone(), value.clone());
        }
        Ok(request)
    }
}

/// Parses the caller's extra headers. Headers the signer owns are refused so
/// they can never replace what was signed.
fn caller_headers(spec: &RequestSpec) -> Result<HeaderMap, ClientError> {
    let mut headers = HeaderMap::new();
    for (name, value) in &spec.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ClientError::Signing(format!("invalid header name '{}'", name)))?;
        if name == AUTHORIZATION || name == CONTENT_TYPE || name == HOST || name.as_str() == DATE_HEADER {
            return Err(ClientError::Signing(format!(
                "header '{}' is set by the signer and cannot be overridden",
                name
            )));
        }
        let value = HeaderValue::from_str(value)
            .map_err(|_| ClientError::Signing(format!("invalid value for header '{}'", name)))?;
        headers.insert(name, value);
    }
    Ok(headers)
}
