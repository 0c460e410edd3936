use crate::errors::ClientError;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Permission labels for one project, keyed the way the server sent them.
/// The keys are opaque; they carry no ordering meaning.
pub type PermissionSet = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AccessGrantMap(BTreeMap<String, PermissionSet>);

impl AccessGrantMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the `project_access` field of a user-info document.
    ///
    /// A missing field, `null`, or `{}` means no access was granted.
    pub fn from_user_info(document: &Value) -> Result<Self, String> {
        let Some(object) = document.as_object() else {
            return Err("user info must be a JSON object".to_string());
        };
        let access = match object.get("project_access") {
            None | Some(Value::Null) => return Ok(Self::new()),
            Some(Value::Object(map)) => map,
            Some(_) => return Err("project_access must be an object".to_string()),
        };
        let mut grants = BTreeMap::new();
        for (project, permissions) in access {
            grants.insert(project.clone(), parse_permissions(project, permissions)?);
        }
        Ok(Self(grants))
    }

    pub fn from_body(body: &[u8]) -> Result<Self, ClientError> {
        let raw = String::from_utf8_lossy(body);
        let document: Value = serde_json::from_slice(body).map_err(|err| {
            ClientError::malformed(format!("user info is not valid JSON: {}", err), &raw)
        })?;
        Self::from_user_info(&document).map_err(|message| ClientError::malformed(message, &raw))
    }

    pub fn insert(&mut self, project: impl Into<String>, permissions: PermissionSet) {
        self.0.insert(project.into(), permissions);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn projects(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn permissions(&self, project: &str) -> Option<&PermissionSet> {
        self.0.get(project)
    }

    pub fn has_permission(&self, project: &str, label: &str) -> bool {
        self.0
            .get(project)
            .map(|set| set.values().any(|value| value == label))
            .unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PermissionSet)> {
        self.0.iter()
    }
}

fn parse_permissions(project: &str, value: &Value) -> Result<PermissionSet, String> {
    let label = |item: &Value| {
        item.as_str().map(str::to_string).ok_or_else(|| {
            format!(
                "permission for project '{}' must be a string, got {}",
                project, item
            )
        })
    };
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(key, item)| -> Result<(String, String), String> {
                Ok((key.clone(), label(item)?))
            })
            .collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| -> Result<(String, String), String> {
                Ok((index.to_string(), label(item)?))
            })
            .collect(),
        other => Err(format!(
            "permissions for project '{}' must be an object, got {}",
            project, other
        )),
    }
}
