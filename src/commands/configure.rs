use crate::app::App;
use crate::cli::ConfigureArgs;
use crate::errors::ClientError;
use crate::models::Credential;
use crate::utils::paths::expand_home_path;
use crate::utils::url_join::normalize_endpoint;
use serde::Deserialize;
use std::path::Path;

#[derive(Deserialize)]
struct CredentialFile {
    #[serde(default)]
    key_id: String,
    #[serde(default)]
    api_key: String,
}

fn read_credential_file(path: &Path) -> Result<CredentialFile, ClientError> {
    let path = expand_home_path(path);
    let content = std::fs::read_to_string(&path).map_err(|err| {
        ClientError::io(
            format!("Failed to read credentials file {}", path.display()),
            err,
        )
    })?;
    serde_json::from_str(&content).map_err(|err| {
        ClientError::config(format!(
            "Credentials file {} is not valid JSON: {}",
            path.display(),
            err
        ))
    })
}

/// Writes key material and endpoint for `profile`. Fields left empty in the
/// input keep their stored value. No network traffic happens here.
pub fn run(app: &App, profile: &str, args: &ConfigureArgs) -> Result<String, ClientError> {
    let Some(cred_path) = args.cred.as_deref() else {
        return Err(ClientError::config(
            "--cred is required: pass the credentials JSON file downloaded from the commons",
        ));
    };
    let file = read_credential_file(cred_path)?;
    let existing = app.store.resolve(profile)?;

    let endpoint = match args.api_endpoint.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => normalize_endpoint(raw)?,
        _ => normalize_endpoint(&existing.api_endpoint)?,
    };
    let merged = existing.merged_with(&Credential::new(file.key_id, file.api_key, "", endpoint));
    if !merged.has_api_key() {
        return Err(ClientError::config(format!(
            "Credentials file {} does not contain an api_key",
            cred_path.display()
        )));
    }

    let raw = app.store.read_raw()?;
    app.store.persist(&merged, profile, &raw)?;
    app.logger.info(
        "profile configured",
        Some(&serde_json::json!({ "profile": profile, "endpoint": merged.api_endpoint })),
    );
    Ok(format!(
        "Profile '{}' saved to {}",
        profile,
        app.store.describe()
    ))
}
