pub mod configure;
pub mod delete;
pub mod download;
pub mod privileges;
pub mod submit;

use crate::app::App;
use crate::cli::{Cli, Command};
use crate::constants::endpoints::SUBMISSION_API_PREFIX;
use crate::errors::ClientError;

/// Runs the parsed command and returns what should go to stdout.
pub async fn run(app: &App, cli: &Cli) -> Result<String, ClientError> {
    let profile = cli.profile.as_str();
    match &cli.command {
        Command::Configure(args) => configure::run(app, profile, args),
        Command::Delete(args) => delete::run(app, profile, args).await,
        Command::Download(args) => download::run(app, profile, args).await,
        Command::Submit(args) => submit::run(app, profile, args).await,
        Command::Privileges => privileges::run(app, profile).await,
    }
}

pub(crate) fn submission_path(uri: &str) -> String {
    format!(
        "{}/{}",
        SUBMISSION_API_PREFIX,
        uri.trim().trim_start_matches('/')
    )
}
