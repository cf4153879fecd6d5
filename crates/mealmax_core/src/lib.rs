//! Core catalog logic for MealMax.
//! This crate is the single source of truth for meal invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::CoreConfig;
pub use db::{ConnectionProvider, Cursor, DbError, DbResult, SqliteProvider};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::leaderboard::{Leaderboard, LeaderboardEntry, LeaderboardSort};
pub use model::meal::{
    parse_price, BattleResult, Difficulty, Meal, MealId, MealValidationError, DIFFICULTY_TOKENS,
};
pub use repo::meal_repo::{
    MealKey, MealRepository, RepoError, RepoResult, SqliteMealRepository,
};
pub use service::kitchen_service::KitchenService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
