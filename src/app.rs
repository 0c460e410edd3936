use crate::cli::{AuthScheme, Cli};
use crate::errors::ClientError;
use crate::services::logger::{LogLevel, Logger};
use crate::services::privileges::PrivilegeResolver;
use crate::services::request_executor::RequestExecutor;
use crate::services::signer::{BearerSigner, HmacSigner, Signer};
use crate::services::transport::{ReqwestTransport, Transport};
use crate::stores::{ConfigStore, FileConfigStore};
use std::sync::Arc;

/// Wiring for one CLI invocation.
#[derive(Clone)]
pub struct App {
    pub logger: Logger,
    pub store: Arc<dyn ConfigStore>,
    pub executor: Arc<RequestExecutor>,
    pub privileges: Arc<PrivilegeResolver>,
}

impl App {
    pub fn initialize(cli: &Cli) -> Result<Self, ClientError> {
        let mut logger = Logger::new("commons-client");
        if cli.verbose {
            logger.set_level(LogLevel::Debug);
        }
        let store: Arc<dyn ConfigStore> = Arc::new(FileConfigStore::new(logger.clone()));
        let signer: Arc<dyn Signer> = match cli.auth_scheme {
            AuthScheme::Hmac => Arc::new(HmacSigner::new()),
            AuthScheme::Bearer => Arc::new(BearerSigner),
        };
        let transport: Arc<dyn Transport> =
            Arc::new(ReqwestTransport::new(logger.clone(), cli.timeout_ms)?);
        logger.debug(
            "initialized",
            Some(&serde_json::json!({
                "config": store.describe(),
                "auth_scheme": format!("{:?}", cli.auth_scheme).to_lowercase(),
                "timeout_ms": cli.timeout_ms,
            })),
        );
        Ok(Self::from_parts(logger, store, signer, transport))
    }

    pub fn from_parts(
        logger: Logger,
        store: Arc<dyn ConfigStore>,
        signer: Arc<dyn Signer>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let executor = Arc::new(RequestExecutor::new(
            logger.clone(),
            store.clone(),
            signer,
            transport,
        ));
        let privileges = Arc::new(PrivilegeResolver::new(logger.clone(), executor.clone()));
        Self {
            logger,
            store,
            executor,
            privileges,
        }
    }
}
