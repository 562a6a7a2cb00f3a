//! Brickstore command line: serve the API, import catalogues, and run the
//! buildability analyses against the configured store.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use brickstore::config::Settings;
use brickstore::engine::Engine;
use brickstore::error::{BrickError, Result};
use brickstore::import::{Catalogue, Importer};
use brickstore::persist::SqliteRepository;
use brickstore::repository::{BricksRepository, SetSelector};
use brickstore::server;

#[derive(Parser, Debug)]
#[command(name = "brickstore", version, about = "Which sets can your bricks build?")]
struct Cli {
    /// Settings file, instead of ./brickstore.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the JSON API on the configured address
    Serve,
    /// Load a catalogue document into the store
    Import { file: PathBuf },
    /// List the sets a user can build from their own inventory
    PossibleSets {
        #[arg(long)]
        user: String,
    },
    /// Rank other users by how many of the missing parts they own
    SuggestUsers {
        #[arg(long)]
        user: String,
        #[arg(long)]
        set: String,
    },
    /// List parts owned by at least the given fraction of users
    PartUsage {
        #[arg(long, default_value_t = 0.5)]
        threshold: f64,
    },
}

#[derive(Tabled)]
struct SetRow {
    #[tabled(rename = "Set")]
    name: String,
    #[tabled(rename = "Total pieces")]
    total_pieces: u64,
}

#[derive(Tabled)]
struct CandidateRow {
    #[tabled(rename = "User")]
    name: String,
    #[tabled(rename = "Shared parts")]
    shared_parts: u64,
}

#[derive(Tabled)]
struct UsageRow {
    #[tabled(rename = "Part")]
    name: String,
    #[tabled(rename = "Colour")]
    colour: String,
    #[tabled(rename = "Shape")]
    shape: String,
    #[tabled(rename = "Min # of parts")]
    minimum_quantity: u32,
}

fn render<T: Tabled>(rows: &[T]) -> String {
    Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .to_string()
}

fn initialize_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;
    initialize_tracing(&settings);

    let repository = SqliteRepository::open(&settings.persistence_mode())?;

    match cli.command {
        Command::Serve => {
            let listener = TcpListener::bind(&settings.bind)
                .await
                .map_err(|e| BrickError::Server(format!("cannot bind {}: {e}", settings.bind)))?;
            server::serve(listener, Arc::new(repository)).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Import { file } => {
            let catalogue = Catalogue::from_path(&file)?;
            let summary = Importer::new(&repository).import(&catalogue)?;
            info!(file = %file.display(), ?summary, "import finished");
            println!(
                "Imported {} sets and {} users ({} parts, {} colours, {} shapes created, {} skipped)",
                summary.sets, summary.users, summary.parts, summary.colours, summary.shapes, summary.skipped
            );
            Ok(ExitCode::SUCCESS)
        }
        Command::PossibleSets { user } => possible_sets(&repository, &user),
        Command::SuggestUsers { user, set } => suggest_users(&repository, &user, &set),
        Command::PartUsage { threshold } => part_usage(&repository, threshold),
    }
}

fn possible_sets(repository: &dyn BricksRepository, name: &str) -> Result<ExitCode> {
    let Some(user) = repository.user_by_name(name)? else {
        eprintln!("No user named '{name}'");
        return Ok(ExitCode::FAILURE);
    };
    let sets = Engine::new(repository).possible_sets_from_inventory(user.inventory())?;
    if sets.is_empty() {
        println!("{name} cannot build any set yet.");
        return Ok(ExitCode::SUCCESS);
    }
    let rows: Vec<SetRow> = sets
        .iter()
        .map(|set| SetRow {
            name: set.name().to_owned(),
            total_pieces: set.total_pieces(),
        })
        .collect();
    println!("Sets {name} can build\n");
    println!("{}", render(&rows));
    Ok(ExitCode::SUCCESS)
}

fn suggest_users(repository: &dyn BricksRepository, user_name: &str, set_name: &str) -> Result<ExitCode> {
    let Some(user) = repository.user_by_name(user_name)? else {
        eprintln!("No user named '{user_name}'");
        return Ok(ExitCode::FAILURE);
    };
    if repository.set_by_name(set_name)?.is_none() {
        eprintln!("No set named '{set_name}'");
        return Ok(ExitCode::FAILURE);
    }
    let ranked = Engine::new(repository)
        .suggest_users_for_part_sharing(user.id(), &SetSelector::from(set_name))?;
    if ranked.is_empty() {
        println!("Nobody can help {user_name} with {set_name}.");
        return Ok(ExitCode::SUCCESS);
    }
    let rows: Vec<CandidateRow> = ranked
        .iter()
        .map(|candidate| CandidateRow {
            name: candidate.user.name().to_owned(),
            shared_parts: candidate.shared_parts,
        })
        .collect();
    println!("Users who could help {user_name} build {set_name}\n");
    println!("{}", render(&rows));
    Ok(ExitCode::SUCCESS)
}

fn part_usage(repository: &dyn BricksRepository, threshold: f64) -> Result<ExitCode> {
    if !(0.0..=1.0).contains(&threshold) {
        eprintln!("Threshold must lie between 0 and 1, got {threshold}");
        return Ok(ExitCode::FAILURE);
    }
    let usage = Engine::new(repository).parts_with_usage_at_least(threshold)?;
    let colours: HashMap<_, _> = repository
        .all_colours()?
        .into_iter()
        .map(|colour| (colour.id(), colour.name().to_owned()))
        .collect();
    let shapes: HashMap<_, _> = repository
        .all_shapes()?
        .into_iter()
        .map(|shape| (shape.id(), shape.name().to_owned()))
        .collect();
    let rows: Vec<UsageRow> = usage
        .iter()
        .map(|usage| UsageRow {
            name: usage.part.name().to_owned(),
            colour: colours.get(&usage.part.colour()).cloned().unwrap_or_default(),
            shape: shapes.get(&usage.part.shape()).cloned().unwrap_or_default(),
            minimum_quantity: usage.minimum_quantity,
        })
        .collect();
    println!("Parts owned by at least {:.0}% of users\n", threshold * 100.0);
    println!("{}", render(&rows));
    Ok(ExitCode::SUCCESS)
}
