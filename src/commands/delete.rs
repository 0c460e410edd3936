use super::submission_path;
use crate::app::App;
use crate::cli::DeleteArgs;
use crate::constants::signing::SUBMISSION_SERVICE;
use crate::errors::ClientError;
use crate::models::RequestSpec;
use reqwest::Method;

pub async fn run(app: &App, profile: &str, args: &DeleteArgs) -> Result<String, ClientError> {
    let spec = RequestSpec::new(Method::DELETE, submission_path(&args.uri))
        .with_service(SUBMISSION_SERVICE);
    let execution = app.executor.execute(profile, &spec).await?;
    if !execution.response.is_success() {
        app.logger.warn(
            "delete returned an error status",
            Some(&serde_json::json!({ "status": execution.response.status })),
        );
    }
    Ok(execution.response.text())
}
