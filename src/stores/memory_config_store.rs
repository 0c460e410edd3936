use crate::errors::ClientError;
use crate::models::Credential;
use crate::stores::{ConfigStore, RawConfig};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// In-process store used by tests and dry runs. Records every persist so
/// callers can assert on the write-back sequence.
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigStore {
    profiles: Arc<RwLock<BTreeMap<String, Credential>>>,
    persisted: Arc<RwLock<Vec<(String, Credential)>>>,
    raw_reads: Arc<RwLock<usize>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(self, profile: &str, credential: Credential) -> Self {
        self.insert(profile, credential);
        self
    }

    pub fn insert(&self, profile: &str, credential: Credential) {
        self.profiles
            .write()
            .unwrap_or_else(|err| err.into_inner())
            .insert(profile.to_string(), credential);
    }

    pub fn get(&self, profile: &str) -> Option<Credential> {
        self.profiles
            .read()
            .unwrap_or_else(|err| err.into_inner())
            .get(profile)
            .cloned()
    }

    pub fn persisted(&self) -> Vec<(String, Credential)> {
        self.persisted
            .read()
            .unwrap_or_else(|err| err.into_inner())
            .clone()
    }

    pub fn raw_reads(&self) -> usize {
        *self.raw_reads.read().unwrap_or_else(|err| err.into_inner())
    }

    fn snapshot(&self) -> String {
        let guard = self.profiles.read().unwrap_or_else(|err| err.into_inner());
        serde_json::to_string(&*guard).unwrap_or_default()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn resolve(&self, profile: &str) -> Result<Credential, ClientError> {
        Ok(self.get(profile).unwrap_or_default())
    }

    fn read_raw(&self) -> Result<RawConfig, ClientError> {
        *self.raw_reads.write().unwrap_or_else(|err| err.into_inner()) += 1;
        Ok(RawConfig {
            path: None,
            content: self.snapshot(),
        })
    }

    fn persist(
        &self,
        credential: &Credential,
        profile: &str,
        _prior: &RawConfig,
    ) -> Result<(), ClientError> {
        self.insert(profile, credential.clone());
        self.persisted
            .write()
            .unwrap_or_else(|err| err.into_inner())
            .push((profile.to_string(), credential.clone()));
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
