use anyhow::Result;
use clap::Parser;
use inbox_triage::cli::{self, Cli, Commands};
use inbox_triage::config::Config;
use std::process;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Exit with proper code on error
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        eprintln!("\nFor help, run: inbox-triage --help");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with level based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("inbox_triage=debug,info"))
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("inbox_triage=info,warn,error"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = Config::load(&cli.config).await?;
    let session_path = cli
        .session_file
        .clone()
        .unwrap_or_else(|| config.session.file.clone());

    let client = cli::build_client(&config)?;

    match cli.command {
        Commands::Register => cli::cmd_register(client, &session_path).await?,
        Commands::Login => cli::cmd_login(client, &session_path).await?,
        Commands::Logout => cli::cmd_logout(&session_path).await?,
        Commands::Link { address } => cli::cmd_link(client, &session_path, address).await?,
        Commands::Status => cli::cmd_status(client, &session_path).await?,
        Commands::Scan => cli::cmd_scan(client, &session_path).await?,
        Commands::Review { yes } => cli::cmd_review(client, &session_path, yes).await?,
    }

    Ok(())
}
