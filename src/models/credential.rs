use serde::{Deserialize, Serialize};
use std::fmt;

/// Key material bound to one profile.
///
/// `access_key` is the short-lived token; an empty value is normal and means a
/// token exchange is needed before the first request.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    #[serde(default)]
    pub key_id: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub access_key: String,
    #[serde(default)]
    pub api_endpoint: String,
}

impl Credential {
    pub fn new(
        key_id: impl Into<String>,
        api_key: impl Into<String>,
        access_key: impl Into<String>,
        api_endpoint: impl Into<String>,
    ) -> Self {
        Self {
            key_id: key_id.into(),
            api_key: api_key.into(),
            access_key: access_key.into(),
            api_endpoint: api_endpoint.into(),
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub fn has_access_key(&self) -> bool {
        !self.access_key.trim().is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.key_id.is_empty()
            && self.api_key.is_empty()
            && self.access_key.is_empty()
            && self.api_endpoint.is_empty()
    }

    pub fn with_access_key(&self, access_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            ..self.clone()
        }
    }

    /// Overlays non-empty incoming fields onto `self`.
    ///
    /// A changed `api_key` invalidates the stored access token.
    pub fn merged_with(&self, incoming: &Credential) -> Self {
        let pick = |new: &str, old: &str| {
            let trimmed = new.trim();
            if trimmed.is_empty() {
                old.to_string()
            } else {
                trimmed.to_string()
            }
        };
        let api_key = pick(&incoming.api_key, &self.api_key);
        let access_key = if !incoming.access_key.trim().is_empty() {
            incoming.access_key.trim().to_string()
        } else if api_key != self.api_key {
            String::new()
        } else {
            self.access_key.clone()
        };
        Self {
            key_id: pick(&incoming.key_id, &self.key_id),
            api_key,
            access_key,
            api_endpoint: pick(&incoming.api_endpoint, &self.api_endpoint),
        }
    }
}

fn mask(value: &str) -> &'static str {
    if value.is_empty() {
        ""
    } else {
        "[REDACTED]"
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("key_id", &self.key_id)
            .field("api_key", &mask(&self.api_key))
            .field("access_key", &mask(&self.access_key))
            .field("api_endpoint", &self.api_endpoint)
            .finish()
    }
}
