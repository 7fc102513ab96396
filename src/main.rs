use clap::Parser;

use hotspud::Settings;
use hotspud::cli::commands::{init, run};
use hotspud::cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load configuration
    let config = match Settings::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Init { force } => init::run_init(force),
        Commands::Config => init::run_config(&config),
        Commands::Run { notifier, period } => {
            hotspud::logging::init(&config.log_level);
            run::run(config, run::RunArgs { notifier, period }).await
        }
    };

    if let Err(e) = result {
        if tracing::dispatcher::has_been_set() {
            tracing::error!("{e:#}");
        } else {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(1);
    }
}
