pub mod file_config_store;
pub mod memory_config_store;

use crate::errors::ClientError;
use crate::models::Credential;
use std::path::PathBuf;

pub use file_config_store::FileConfigStore;
pub use memory_config_store::MemoryConfigStore;

/// Persisted content captured at read time. A later `persist` rewrites the
/// store relative to this snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawConfig {
    pub path: Option<PathBuf>,
    pub content: String,
}

/// Profile name -> credential lookup and write-back.
pub trait ConfigStore: Send + Sync {
    /// Returns an all-empty credential for an unknown profile.
    fn resolve(&self, profile: &str) -> Result<Credential, ClientError>;

    fn read_raw(&self) -> Result<RawConfig, ClientError>;

    /// Rewrites the fields of `profile` and leaves every other profile intact.
    fn persist(
        &self,
        credential: &Credential,
        profile: &str,
        prior: &RawConfig,
    ) -> Result<(), ClientError>;

    fn describe(&self) -> String;
}
