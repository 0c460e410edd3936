#![allow(dead_code)]

use async_trait::async_trait;
use chrono::TimeZone;
use commons_client::app::App;
use commons_client::errors::{ClientError, TransportError};
use commons_client::models::{Credential, HttpRequest, HttpResponse};
use commons_client::services::logger::{LogLevel, Logger};
use commons_client::services::signer::{BearerSigner, HmacSigner, Signer};
use commons_client::services::transport::Transport;
use commons_client::stores::{ConfigStore, MemoryConfigStore, RawConfig};
use once_cell::sync::Lazy;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Mutex as AsyncMutex;

pub static ENV_LOCK: Lazy<AsyncMutex<()>> = Lazy::new(|| AsyncMutex::new(()));

pub const ENDPOINT: &str = "http://www.test.com";
pub const TOKEN_PATH: &str = "/user/credentials/api/access_token";

pub fn tmp_dir(prefix: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("{}-{}", prefix, uuid::Uuid::new_v4()))
}

pub fn quiet_logger() -> Logger {
    Logger::with_level("test", LogLevel::Error)
}

/// Ordered record of store and transport calls shared by the fakes.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().expect("journal lock").push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().expect("journal lock").clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.entries()
            .iter()
            .filter(|entry| entry.starts_with(prefix))
            .count()
    }
}

/// `MemoryConfigStore` that also writes each call into a journal.
#[derive(Clone)]
pub struct JournalStore {
    pub inner: MemoryConfigStore,
    pub journal: Journal,
}

impl JournalStore {
    pub fn new(journal: &Journal) -> Self {
        Self {
            inner: MemoryConfigStore::new(),
            journal: journal.clone(),
        }
    }

    pub fn with_profile(self, profile: &str, credential: Credential) -> Self {
        self.inner.insert(profile, credential);
        self
    }
}

impl ConfigStore for JournalStore {
    fn resolve(&self, profile: &str) -> Result<Credential, ClientError> {
        self.journal.push(format!("resolve {}", profile));
        self.inner.resolve(profile)
    }

    fn read_raw(&self) -> Result<RawConfig, ClientError> {
        self.journal.push("read_raw");
        self.inner.read_raw()
    }

    fn persist(
        &self,
        credential: &Credential,
        profile: &str,
        prior: &RawConfig,
    ) -> Result<(), ClientError> {
        self.journal
            .push(format!("persist {} {}", profile, credential.access_key));
        self.inner.persist(credential, profile, prior)
    }

    fn describe(&self) -> String {
        "journal".to_string()
    }
}

/// Transport that replays canned results in order and records each request.
#[derive(Clone)]
pub struct ScriptedTransport {
    script: Arc<Mutex<VecDeque<Result<HttpResponse, TransportError>>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
    journal: Journal,
}

impl ScriptedTransport {
    pub fn new(journal: &Journal) -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            journal: journal.clone(),
        }
    }

    pub fn respond(self, status: u16, body: &str) -> Self {
        self.script
            .lock()
            .expect("script lock")
            .push_back(Ok(HttpResponse::new(status, body.to_string())));
        self
    }

    pub fn token(self, token: &str) -> Self {
        let body = serde_json::json!({ "access_token": token }).to_string();
        self.respond(200, &body)
    }

    pub fn fail(self, err: TransportError) -> Self {
        self.script.lock().expect("script lock").push_back(Err(err));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().expect("script lock").len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.journal
            .push(format!("send {} {}", request.method, request.url.path()));
        self.requests
            .lock()
            .expect("requests lock")
            .push(request);
        self.script
            .lock()
            .expect("script lock")
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Request("script exhausted".to_string())))
    }
}

pub fn credential(access_key: &str) -> Credential {
    Credential::new("kid", "api-secret", access_key, ENDPOINT)
}

pub fn fixed_hmac() -> Arc<dyn Signer> {
    let at = chrono::Utc
        .with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
        .single()
        .expect("fixed time");
    Arc::new(HmacSigner::at(at))
}

pub fn bearer() -> Arc<dyn Signer> {
    Arc::new(BearerSigner)
}

pub fn app(
    store: impl ConfigStore + 'static,
    signer: Arc<dyn Signer>,
    transport: &ScriptedTransport,
) -> App {
    App::from_parts(
        quiet_logger(),
        Arc::new(store),
        signer,
        Arc::new(transport.clone()),
    )
}

pub fn authorization(request: &HttpRequest) -> String {
    request
        .headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
