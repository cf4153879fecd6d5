//! Command-line front end for the MealMax catalog.
//!
//! # Responsibility
//! - Map subcommands onto `KitchenService` use-cases.
//! - Resolve configuration from flags first, environment second.
//! - Print results as JSON on stdout and failures on stderr.

use clap::{Args, Parser, Subcommand};
use log::error;
use mealmax_core::{
    init_logging, BattleResult, CoreConfig, KitchenService, LeaderboardSort, MealId,
    SqliteMealRepository, SqliteProvider,
};
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "mealmax")]
#[command(version)]
#[command(about = "Manage the MealMax meal catalog and battle leaderboard")]
#[command(long_about = None)]
struct Cli {
    /// SQLite database file (overrides MEALMAX_DB_PATH)
    #[arg(short = 'd', long, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Log level (overrides MEALMAX_LOG_LEVEL)
    #[arg(short = 'l', long, value_name = "LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add a meal to the catalog
    Create {
        meal: String,
        cuisine: String,
        /// Positive price, e.g. 12.50
        #[arg(allow_negative_numbers = true)]
        price: String,
        /// LOW, MED or HIGH
        difficulty: String,
    },
    /// Soft-delete a meal by id
    Delete { id: MealId },
    /// Look up an active meal
    Get(GetArgs),
    /// List active meals that have battled, best first
    Leaderboard {
        /// wins or win_pct
        #[arg(long, default_value = "wins")]
        sort: String,
    },
    /// Record a battle between two meals
    Battle { winner: MealId, loser: MealId },
    /// Record one battle outcome for a meal
    Stats {
        id: MealId,
        /// win or loss
        result: String,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct GetArgs {
    #[arg(long)]
    id: Option<MealId>,
    #[arg(long)]
    name: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = CoreConfig::from_env();
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    let log_dir = config
        .log_dir
        .as_ref()
        .map(|dir| dir.to_string_lossy().into_owned());
    if let Err(err) = init_logging(&config.log_level, log_dir.as_deref()) {
        eprintln!("mealmax: {err}");
        return ExitCode::FAILURE;
    }

    match run(&config, cli.command) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            error!("event=cli_command module=cli status=error error={message}");
            eprintln!("mealmax: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &CoreConfig, command: Command) -> Result<serde_json::Value, String> {
    let repo = SqliteMealRepository::try_new(SqliteProvider::new(&config.db_path))
        .map_err(|err| format!("catalog unavailable at {}: {err}", config.db_path.display()))?;
    let service = KitchenService::new(repo);

    let output = match command {
        Command::Create {
            meal,
            cuisine,
            price,
            difficulty,
        } => {
            let id = service
                .create_meal_from_text(&meal, &cuisine, &price, &difficulty)
                .map_err(|err| err.to_string())?;
            json!({ "status": "created", "id": id, "meal": meal })
        }
        Command::Delete { id } => {
            service.delete_meal(id).map_err(|err| err.to_string())?;
            json!({ "status": "deleted", "id": id })
        }
        Command::Get(GetArgs { id: Some(id), .. }) => {
            let meal = service.get_meal_by_id(id).map_err(|err| err.to_string())?;
            serde_json::to_value(meal).map_err(|err| err.to_string())?
        }
        Command::Get(GetArgs { name: Some(name), .. }) => {
            let meal = service
                .get_meal_by_name(&name)
                .map_err(|err| err.to_string())?;
            serde_json::to_value(meal).map_err(|err| err.to_string())?
        }
        Command::Get(_) => return Err("either --id or --name is required".to_string()),
        Command::Leaderboard { sort } => {
            let sort_by = sort
                .parse::<LeaderboardSort>()
                .map_err(|err| err.to_string())?;
            let board = service
                .get_leaderboard(sort_by)
                .map_err(|err| err.to_string())?;
            serde_json::to_value(board).map_err(|err| err.to_string())?
        }
        Command::Battle { winner, loser } => {
            service
                .record_battle(winner, loser)
                .map_err(|err| err.to_string())?;
            json!({ "status": "recorded", "winner": winner, "loser": loser })
        }
        Command::Stats { id, result } => {
            let result = result
                .parse::<BattleResult>()
                .map_err(|err| err.to_string())?;
            service
                .update_meal_stats(id, result)
                .map_err(|err| err.to_string())?;
            json!({ "status": "updated", "id": id, "result": result })
        }
    };

    Ok(output)
}
