use clap::Parser;
use commons_client::app::App;
use commons_client::cli::Cli;
use commons_client::commands;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let result = match App::initialize(&cli) {
        Ok(app) => commands::run(&app, &cli).await,
        Err(err) => Err(err),
    };
    match result {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(err) => {
            eprintln!("commons-client: {}", err);
            if let Some(hint) = err.hint() {
                eprintln!("hint: {}", hint);
            }
            std::process::exit(1);
        }
    }
}
