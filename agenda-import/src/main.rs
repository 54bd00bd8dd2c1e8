mod cli;

use anyhow::Result;
use clap::Parser;

use agenda_import::config::Config;
use cli::commands::{handle_import_command, handle_preview_command, handle_template_command};
use cli::{Cli, Commands};

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // RUST_LOG wins over -v
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            log::warn!("Failed to load .env file: {}", e);
        }
    }

    match cli.command {
        Commands::Preview(args) => handle_preview_command(args).await,
        Commands::Import(args) => {
            let mut config = Config::load(cli.config.as_deref())?;
            config.apply_process_env();
            handle_import_command(args, config).await
        }
        Commands::Template(args) => handle_template_command(args),
    }
}
