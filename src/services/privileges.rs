use crate::constants::endpoints::USER_INFO_PATH;
use crate::errors::ClientError;
use crate::models::{AccessGrantMap, Credential, RequestSpec};
use crate::services::logger::Logger;
use crate::services::request_executor::RequestExecutor;
use std::sync::Arc;

#[derive(Clone)]
pub struct PrivilegeResolver {
    logger: Logger,
    executor: Arc<RequestExecutor>,
}

impl PrivilegeResolver {
    pub fn new(logger: Logger, executor: Arc<RequestExecutor>) -> Self {
        Self {
            logger: logger.child("privileges"),
            executor,
        }
    }

    /// Fetches the caller's user record and returns its project grants along
    /// with the credential used, which may hold a freshly minted token.
    pub async fn check_privileges(
        &self,
        profile: &str,
    ) -> Result<(Credential, AccessGrantMap), ClientError> {
        let execution = self
            .executor
            .execute(profile, &RequestSpec::get(USER_INFO_PATH))
            .await?;
        let response = execution.response;
        if !response.is_success() {
            return Err(ClientError::RequestRejected {
                status: response.status,
                body: response.body_snippet(),
            });
        }
        let grants = AccessGrantMap::from_body(&response.body)?;
        self.logger.debug(
            "privileges resolved",
            Some(&serde_json::json!({ "profile": profile, "projects": grants.len() })),
        );
        Ok((execution.credential, grants))
    }
}
