use crate::app::App;
use crate::cli::DownloadArgs;
use crate::constants::endpoints::DATA_DOWNLOAD_PATH;
use crate::errors::ClientError;
use crate::models::RequestSpec;
use crate::utils::paths::expand_home_path;
use serde::Deserialize;
use url::Url;

#[derive(Deserialize)]
struct PresignedUrl {
    url: String,
}

/// Resolves a GUID to a presigned URL through the signed api, then fetches
/// that URL without signing it.
pub async fn run(app: &App, profile: &str, args: &DownloadArgs) -> Result<String, ClientError> {
    let guid = args.guid.trim().trim_matches('/');
    if guid.is_empty() {
        return Err(ClientError::config("--guid must not be empty"));
    }
    let spec = RequestSpec::get(format!("{}/{}", DATA_DOWNLOAD_PATH, guid));
    let response = app.executor.execute(profile, &spec).await?.response;
    if !response.is_success() {
        return Err(ClientError::RequestRejected {
            status: response.status,
            body: response.body_snippet(),
        });
    }
    let presigned: PresignedUrl = response.json().map_err(|err| {
        ClientError::malformed(
            format!("download response has no url: {}", err),
            response.text(),
        )
    })?;
    let url = Url::parse(presigned.url.trim()).map_err(|err| {
        ClientError::malformed(format!("download url is invalid: {}", err), response.text())
    })?;

    let destination = expand_home_path(&args.file);
    let written = app
        .executor
        .transport()
        .download(url, &destination)
        .await?;
    Ok(format!(
        "Downloaded {} bytes to {}",
        written,
        destination.display()
    ))
}
