//! Command-line entry point.
//!
//! # Responsibility
//! - Open a record store from configuration and print read surfaces as JSON.
//! - Map service errors to a non-zero exit with their status class.

use clap::{Args, Parser, Subcommand};
use perfscope_core::service::resolve_actor;
use perfscope_core::{
    core_version, init_logging, open_db, AnalyticsService, CoreConfig, InsightsGateway,
    ServiceError, SqliteStore,
};
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "perfscope", version, about = "Scoped performance analytics")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, env = "PERFSCOPE_CONFIG")]
    config: Option<PathBuf>,

    /// Database path, overriding configuration.
    #[arg(long)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the core version.
    Version,
    /// Probe the insights service.
    Health,
    Overview(ScopedArgs),
    Rankings(ActorArgs),
    Predictions(ScopedArgs),
    Anomalies(ScopedArgs),
    Insights(ScopedArgs),
    ProductivityScore(ScopedArgs),
    Dashboard(ScopedArgs),
}

#[derive(Debug, Args)]
struct ActorArgs {
    /// Acting identity.
    #[arg(long)]
    actor: Uuid,
}

#[derive(Debug, Args)]
struct ScopedArgs {
    #[arg(long)]
    actor: Uuid,

    /// Actor to view on behalf of; ignored for non-managers.
    #[arg(long)]
    target: Option<Uuid>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<ServiceError>() {
                Some(service_err) => {
                    eprintln!("error ({}): {service_err}", service_err.status_class())
                }
                None => eprintln!("error: {err}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    if matches!(cli.command, Command::Version) {
        println!("perfscope_core version={}", core_version());
        return Ok(());
    }

    let mut config = match cli.config.as_deref() {
        Some(path) => CoreConfig::load(path)?,
        None => CoreConfig::default(),
    }
    .apply_env_overrides(|key| std::env::var(key).ok())?;
    if let Some(db) = cli.db {
        config.database_path = db;
    }
    if let Some(log_dir) = config.log_dir.as_deref() {
        init_logging(&config.log_level, log_dir)?;
    }

    let gateway = InsightsGateway::new(&config.insights)?;
    if matches!(cli.command, Command::Health) {
        return print_json(&serde_json::json!({
            "base_url": gateway.base_url(),
            "healthy": gateway.health(),
        }));
    }

    let conn = open_db(&config.database_path)?;
    let store = SqliteStore::try_new(&conn)?;
    let analytics = AnalyticsService::new(&store, gateway);

    match cli.command {
        Command::Version | Command::Health => Ok(()),
        Command::Overview(args) => {
            let actor = resolve_actor(&store, args.actor)?;
            print_json(&analytics.get_overview(&actor, args.target)?)
        }
        Command::Rankings(args) => {
            let actor = resolve_actor(&store, args.actor)?;
            print_json(&analytics.get_team_rankings(&actor)?)
        }
        Command::Predictions(args) => {
            let actor = resolve_actor(&store, args.actor)?;
            print_json(&analytics.get_predictions(&actor, args.target))
        }
        Command::Anomalies(args) => {
            let actor = resolve_actor(&store, args.actor)?;
            print_json(&analytics.get_anomalies(&actor, args.target))
        }
        Command::Insights(args) => {
            let actor = resolve_actor(&store, args.actor)?;
            print_json(&analytics.get_insights(&actor, args.target))
        }
        Command::ProductivityScore(args) => {
            let actor = resolve_actor(&store, args.actor)?;
            print_json(&analytics.get_productivity_score(&actor, args.target))
        }
        Command::Dashboard(args) => {
            let actor = resolve_actor(&store, args.actor)?;
            print_json(&analytics.dashboard(&actor, args.target)?)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
