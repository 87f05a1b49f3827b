mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use openfec_lib::{Config, Db};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "openfec")]
#[command(about = "Query a local mirror of FEC campaign finance data")]
struct Cli {
    /// Output format: table, json, csv or md
    #[arg(long, default_value = "table", global = true)]
    output: String,

    /// TOML config file; falls back to OPENFEC_* environment variables
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database path, overriding the config
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List itemized receipts (Schedule A)
    Receipts(Box<commands::receipts::ReceiptsArgs>),
    /// List candidates by election
    Candidates(commands::candidates::CandidatesArgs),
    /// Build document and regulation links
    Links(commands::links::LinksArgs),
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("openfec=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = OutputFormat::parse(&cli.output);

    let mut config = match cli.config {
        Some(ref path) => Config::load(path)?,
        None => Config::from_env()?,
    };
    if let Some(ref path) = cli.db {
        config.database = path.clone();
    }

    match &cli.command {
        Commands::Receipts(args) => {
            let db = open_db(&config)?;
            commands::receipts::run(args.as_ref(), &db, &config, &format)?
        }
        Commands::Candidates(args) => {
            let db = open_db(&config)?;
            commands::candidates::run(args, &db, &config, &format)?
        }
        Commands::Links(args) => commands::links::run(args, &format)?,
    }

    Ok(())
}

fn open_db(config: &Config) -> Result<Db> {
    tracing::info!("Opening {}", config.database.display());
    let db = Db::open(&config.database)?;
    db.init()?;
    Ok(db)
}
