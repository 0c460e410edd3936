use super::submission_path;
use crate::app::App;
use crate::cli::{SubmitArgs, SubmitMethod};
use crate::constants::{content_types::JSON, signing::SUBMISSION_SERVICE};
use crate::errors::ClientError;
use crate::models::RequestSpec;
use crate::utils::paths::expand_home_path;
use reqwest::Method;

pub async fn run(app: &App, profile: &str, args: &SubmitArgs) -> Result<String, ClientError> {
    let path = expand_home_path(&args.file);
    let body = std::fs::read(&path)
        .map_err(|err| ClientError::io(format!("Failed to read {}", path.display()), err))?;
    serde_json::from_slice::<serde_json::Value>(&body).map_err(|err| {
        ClientError::config(format!("{} is not valid JSON: {}", path.display(), err))
    })?;

    let method = match args.method {
        SubmitMethod::Put => Method::PUT,
        SubmitMethod::Post => Method::POST,
    };
    let spec = RequestSpec::new(method, submission_path(&args.uri))
        .with_service(SUBMISSION_SERVICE)
        .with_content_type(JSON)
        .with_body(body);
    let execution = app.executor.execute(profile, &spec).await?;
    if !execution.response.is_success() {
        app.logger.warn(
            "submission returned an error status",
            Some(&serde_json::json!({ "status": execution.response.status })),
        );
    }
    Ok(execution.response.text())
}
