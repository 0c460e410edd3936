use crate::constants::{network::TIMEOUT_API_REQUEST_MS, profiles::DEFAULT_PROFILE};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthScheme {
    /// HMAC-SHA256 signed headers
    #[default]
    Hmac,
    /// Access token as a bearer credential
    Bearer,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SubmitMethod {
    #[default]
    Put,
    Post,
}

#[derive(Parser, Debug)]
#[command(name = "commons-client")]
#[command(version, about = "Authenticated operations against a data commons API")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration profile to use
    #[arg(long, global = true, default_value = DEFAULT_PROFILE)]
    pub profile: String,

    /// Per-attempt network timeout in milliseconds
    #[arg(long, global = true, default_value_t = TIMEOUT_API_REQUEST_MS)]
    pub timeout_ms: u64,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// How requests are authenticated
    #[arg(long, global = true, value_enum, default_value = "hmac")]
    pub auth_scheme: AuthScheme,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Store credentials and the api endpoint for a profile
    Configure(ConfigureArgs),

    /// Delete a submitted record
    Delete(DeleteArgs),

    /// Download a data file by GUID
    Download(DownloadArgs),

    /// Submit a JSON document
    Submit(SubmitArgs),

    /// Show the project access granted to this profile
    Privileges,
}

#[derive(Args, Debug)]
pub struct ConfigureArgs {
    /// Credentials JSON file downloaded from the commons
    #[arg(long)]
    pub cred: Option<PathBuf>,

    /// Base URL of the commons API
    #[arg(long = "apiendpoint")]
    pub api_endpoint: Option<String>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Path under the submission api, e.g. v0/submission/program/project/entities/<id>
    #[arg(long)]
    pub uri: String,
}

#[derive(Args, Debug)]
pub struct DownloadArgs {
    #[arg(long)]
    pub guid: String,

    /// Destination file
    #[arg(long)]
    pub file: PathBuf,
}

#[derive(Args, Debug)]
pub struct SubmitArgs {
    #[arg(long)]
    pub uri: String,

    /// JSON document to send
    #[arg(long)]
    pub file: PathBuf,

    #[arg(long, value_enum, default_value = "put")]
    pub method: SubmitMethod,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_have_defaults() {
        let cli = Cli::try_parse_from(["commons-client", "privileges"]).expect("parse");
        assert_eq!(cli.profile, "default");
        assert_eq!(cli.timeout_ms, 30_000);
        assert_eq!(cli.auth_scheme, AuthScheme::Hmac);
        assert!(!cli.verbose);
        assert!(matches!(cli.command, Command::Privileges));
    }

    #[test]
    fn global_flags_are_accepted_after_subcommand() {
        let cli = Cli::try_parse_from([
            "commons-client",
            "delete",
            "--uri",
            "v0/submission/p/q",
            "--profile",
            "user1",
            "--auth-scheme",
            "bearer",
        ])
        .expect("parse");
        assert_eq!(cli.profile, "user1");
        assert_eq!(cli.auth_scheme, AuthScheme::Bearer);
        match cli.command {
            Command::Delete(args) => assert_eq!(args.uri, "v0/submission/p/q"),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn submit_method_defaults_to_put() {
        let cli = Cli::try_parse_from([
            "commons-client",
            "submit",
            "--uri",
            "v0/submission/p/q",
            "--file",
            "doc.json",
        ])
        .expect("parse");
        match cli.command {
            Command::Submit(args) => assert_eq!(args.method, SubmitMethod::Put),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
