// src/main.rs
//
// kvk - operate a KVK reporting database
//
// kvk init
// kvk stats
// kvk hierarchy
// kvk list districts --page 2 --limit 20 --search pur
// kvk forms

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::EnvFilter;

use kvk_reporting::application::commands::{
    get_hierarchy, get_master_stats, list_forms, list_master_data, CommandResult,
};
use kvk_reporting::application::AppState;
use kvk_reporting::config::AppConfig;
use kvk_reporting::db::{
    create_connection_pool, get_database_path, get_database_stats, initialize_database,
    verify_database_integrity,
};

#[derive(Parser)]
#[command(name = "kvk", about = "KVK reporting database tool")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create or verify the database schema
    Init,
    /// Row counts and database file statistics
    Stats,
    /// Zone -> state -> district -> organization -> university tree
    Hierarchy,
    /// List rows of a master entity
    List {
        /// Entity name, e.g. "states" or "important-days"
        entity: String,

        #[arg(long)]
        page: Option<u32>,

        #[arg(long)]
        limit: Option<u32>,

        /// Case-insensitive name search
        #[arg(long)]
        search: Option<String>,
    },
    /// Report forms and their fields
    Forms,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Command::Forms = cli.command {
        return print_json(&list_forms());
    }

    let config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    let pool = Arc::new(create_connection_pool(&config.database)?);

    // Initialize schema (idempotent)
    {
        let conn = pool.get()?;
        initialize_database(&conn)?;
    }

    let state = AppState::new(pool.clone(), &config)?;

    match cli.command {
        Command::Init => {
            let conn = pool.get()?;
            verify_database_integrity(&conn)?;
            let path = get_database_path(&config.database)?;
            log::info!("Database ready at {}", path.display());
            print_json(&json!({ "database": path, "status": "ok" }))
        }
        Command::Stats => {
            let counts = command(get_master_stats(&state))?;
            let conn = pool.get()?;
            let database = get_database_stats(&conn)?;
            print_json(&json!({ "entities": counts, "database": database }))
        }
        Command::Hierarchy => print_json(&command(get_hierarchy(&state))?),
        Command::List {
            entity,
            page,
            limit,
            search,
        } => {
            let query = json!({ "page": page, "limit": limit, "search": search });
            print_json(&command(list_master_data(&state, &entity, &query))?)
        }
        Command::Forms => print_json(&list_forms()),
    }
}

fn command<T>(result: CommandResult<T>) -> anyhow::Result<T> {
    result.map_err(|err| anyhow::anyhow!("{} (status {})", err.message, err.status))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
