use crate::errors::ClientError;
use crate::models::Credential;
use crate::services::logger::Logger;
use crate::stores::{ConfigStore, RawConfig};
use crate::utils::fs_atomic::atomic_write_text_file;
use crate::utils::paths::resolve_config_path;
use std::path::{Path, PathBuf};
use toml_edit::{DocumentMut, Item};

const FIELD_KEY_ID: &str = "key_id";
const FIELD_API_KEY: &str = "api_key";
const FIELD_ACCESS_KEY: &str = "access_key";
const FIELD_API_ENDPOINT: &str = "api_endpoint";

/// Profiles stored as TOML tables, one per profile:
///
/// ```toml
/// [default]
/// key_id = "..."
/// api_key = "..."
/// access_key = "..."
/// api_endpoint = "https://data.example.org"
/// ```
///
/// Edits go through `toml_edit`, so tables other than the one being written
/// keep their exact bytes, comments included.
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    logger: Logger,
    file_path: PathBuf,
}

impl FileConfigStore {
    pub fn new(logger: Logger) -> Self {
        Self::with_path(logger, resolve_config_path())
    }

    pub fn with_path(logger: Logger, file_path: impl Into<PathBuf>) -> Self {
        Self {
            logger: logger.child("config"),
            file_path: file_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn read_content(&self) -> Result<String, ClientError> {
        match std::fs::read_to_string(&self.file_path) {
            Ok(content) => Ok(content),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(err) => Err(ClientError::io(
                format!("Failed to read config file {}", self.file_path.display()),
                err,
            )),
        }
    }

    fn parse(&self, content: &str) -> Result<DocumentMut, ClientError> {
        content.parse::<DocumentMut>().map_err(|err| {
            ClientError::config(format!(
                "Failed to parse config file {}: {}",
                self.file_path.display(),
                err
            ))
        })
    }
}

fn field(table: &dyn toml_edit::TableLike, key: &str) -> String {
    table
        .get(key)
        .and_then(Item::as_str)
        .map(|value| value.trim().to_string())
        .unwrap_or_default()
}

impl ConfigStore for FileConfigStore {
    fn resolve(&self, profile: &str) -> Result<Credential, ClientError> {
        let content = self.read_content()?;
        let document = self.parse(&content)?;
        let Some(table) = document.get(profile).and_then(Item::as_table_like) else {
            self.logger.debug(
                "profile not found",
                Some(&serde_json::json!({ "profile": profile })),
            );
            return Ok(Credential::default());
        };
        Ok(Credential {
            key_id: field(table, FIELD_KEY_ID),
            api_key: field(table, FIELD_API_KEY),
            access_key: field(table, FIELD_ACCESS_KEY),
            api_endpoint: field(table, FIELD_API_ENDPOINT),
        })
    }

    fn read_raw(&self) -> Result<RawConfig, ClientError> {
        Ok(RawConfig {
            path: Some(self.file_path.clone()),
            content: self.read_content()?,
        })
    }

    fn persist(
        &self,
        credential: &Credential,
        profile: &str,
        prior: &RawConfig,
    ) -> Result<(), ClientError> {
        if profile.trim().is_empty() {
            return Err(ClientError::config("Profile name must be a non-empty string"));
        }
        let mut document = self.parse(&prior.content)?;
        let table = document
            .entry(profile)
            .or_insert(toml_edit::table())
            .as_table_mut()
            .ok_or_else(|| {
                ClientError::config(format!(
                    "Profile '{}' in {} is not a table",
                    profile,
                    self.file_path.display()
                ))
            })?;
        table[FIELD_KEY_ID] = toml_edit::value(credential.key_id.as_str());
        table[FIELD_API_KEY] = toml_edit::value(credential.api_key.as_str());
        table[FIELD_ACCESS_KEY] = toml_edit::value(credential.access_key.as_str());
        table[FIELD_API_ENDPOINT] = toml_edit::value(credential.api_endpoint.as_str());

        atomic_write_text_file(&self.file_path, &document.to_string(), 0o600).map_err(|err| {
            ClientError::io(
                format!("Failed to save config file {}", self.file_path.display()),
                err,
            )
        })?;
        self.logger.debug(
            "profile saved",
            Some(&serde_json::json!({
                "profile": profile,
                "path": self.file_path.display().to_string(),
            })),
        );
        Ok(())
    }

    fn describe(&self) -> String {
        self.file_path.display().to_string()
    }
}
