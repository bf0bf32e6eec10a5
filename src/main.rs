mod cli;
mod client;
mod commands;
mod config;
mod cursor;
mod error;
mod fetcher;
mod lookup;
mod output;
mod responses;
mod trigger;
mod types;

use std::error::Error;
use std::io;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, CursorCommands};
use client::LinearClient;
use config::Config;
use error::Result;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    let verbose = cli.verbose;

    init_logging(verbose);

    if let Err(e) = run(cli).await {
        if e.is_halted() {
            // Configuration problem the user fixes; the message stands alone.
            eprintln!("{e}");
            std::process::exit(1);
        }

        eprintln!("Error: {e}");
        if e.is_retryable() {
            eprintln!("This looks transient; the next poll may succeed.");
        }

        if verbose {
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("Caused by: {cause}");
                source = cause.source();
            }
        }

        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    output::set_json_output(cli.json);

    match cli.command {
        // Commands that don't require config/client
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "linear-triggers", &mut io::stdout());
        }
        Commands::Init => {
            commands::init::run()?;
        }
        Commands::Triggers => {
            commands::triggers::list();
        }
        Commands::Trigger { key } => {
            commands::triggers::show(&key)?;
        }
        Commands::Cursor { action } => {
            let config = Config::load()?;
            match action {
                CursorCommands::Show(args) => commands::cursor::show(&config, args)?,
                CursorCommands::Reset(args) => commands::cursor::reset(&config, args)?,
            }
        }
        // Commands that require config and client
        command => {
            let config = Config::load()?;
            let client = LinearClient::with_endpoint(config.api_key()?, config.api_url());

            match command {
                Commands::Poll(args) => {
                    commands::poll::run(&client, &config, args).await?;
                }
                Commands::Options { source, team } => {
                    commands::options::list(&client, &config, source, team).await?;
                }
                Commands::Completions { .. }
                | Commands::Init
                | Commands::Triggers
                | Commands::Trigger { .. }
                | Commands::Cursor { .. } => {
                    // Already handled above
                }
            }
        }
    }

    Ok(())
}
