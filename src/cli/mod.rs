pub mod commands;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "activity-tracker")]
#[command(about = "Activity tracker API - activities, entries, friends and charts")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply migrations and run the HTTP server")]
    Serve {
        #[arg(long, short, help = "Port to listen on (overrides API_PORT)")]
        port: Option<u16>,

        #[arg(long, help = "Start without applying pending migrations")]
        skip_migrations: bool,
    },

    #[command(about = "Apply pending database migrations and exit")]
    Migrate,
}

pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    match cli.command {
        Commands::Serve { port, skip_migrations } => commands::serve::handle(config, port, skip_migrations).await,
        Commands::Migrate => commands::migrate::handle(config).await,
    }
}
