//! Meal repository contracts and SQL implementation.
//!
//! # Responsibility
//! - Provide the catalog CRUD APIs over the `meals` table.
//! - Keep SQL text and row mapping inside the persistence boundary.
//!
//! # Invariants
//! - Write paths validate input before acquiring a cursor.
//! - Every statement is parameterized with positional `?` arguments.
//! - Soft-deleted rows are never physically removed.
//! - `UNIQUE` violations surface as `RepoError::Conflict`, not as DB errors.

use crate::db::migrations::latest_version;
use crate::db::{ConnectionProvider, Cursor, DbError, Row};
use crate::model::leaderboard::{win_percentage, Leaderboard, LeaderboardEntry, LeaderboardSort};
use crate::model::meal::{
    validate_name, validate_price, BattleResult, Difficulty, Meal, MealId, MealValidationError,
};
use log::{error, info};
use rusqlite::types::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const INSERT_MEAL_SQL: &str =
    "INSERT INTO meals (meal, cuisine, price, difficulty) VALUES (?, ?, ?, ?)";
pub const SELECT_DELETED_SQL: &str = "SELECT deleted FROM meals WHERE id = ?";
pub const SOFT_DELETE_SQL: &str = "UPDATE meals SET deleted = TRUE WHERE id = ?";
pub const SELECT_BY_ID_SQL: &str =
    "SELECT id, meal, cuisine, price, difficulty, deleted FROM meals WHERE id = ?";
pub const SELECT_BY_NAME_SQL: &str =
    "SELECT id, meal, cuisine, price, difficulty, deleted FROM meals WHERE meal = ?";
pub const RECORD_WIN_SQL: &str =
    "UPDATE meals SET battles = battles + 1, wins = wins + 1 WHERE id = ?";
pub const RECORD_LOSS_SQL: &str = "UPDATE meals SET battles = battles + 1 WHERE id = ?";

const LEADERBOARD_SELECT_SQL: &str = "SELECT id, meal, cuisine, price, difficulty, battles, wins, (wins * 1.0 / battles) AS win_pct FROM meals WHERE deleted = FALSE AND battles > 0";

const REQUIRED_MEAL_COLUMNS: [&str; 8] = [
    "id",
    "meal",
    "cuisine",
    "price",
    "difficulty",
    "battles",
    "wins",
    "deleted",
];

/// Returns the full leaderboard statement for the given ranking column.
pub fn leaderboard_sql(sort_by: LeaderboardSort) -> String {
    format!("{LEADERBOARD_SELECT_SQL} ORDER BY {} DESC", sort_by.as_str())
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Lookup key used in not-found and deleted errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MealKey {
    Id(MealId),
    Name(String),
}

impl Display for MealKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "ID {id}"),
            Self::Name(name) => write!(f, "name {name}"),
        }
    }
}

/// Repository error for meal persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(MealValidationError),
    /// A meal with this name already exists.
    Conflict {
        meal: String,
    },
    NotFound(MealKey),
    AlreadyDeleted(MealKey),
    Db(DbError),
    InvalidData(String),
    /// Connection schema version is not the one this binary migrates to.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Conflict { meal } => write!(f, "Meal with name '{meal}' already exists"),
            Self::NotFound(key) => write!(f, "Meal with {key} not found"),
            Self::AlreadyDeleted(key) => write!(f, "Meal with {key} has been deleted"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted meal data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "meal repository requires schema version {expected_version}, found {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "meal repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "meal repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<MealValidationError> for RepoError {
    fn from(value: MealValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for the meal catalog.
pub trait MealRepository {
    /// Inserts a new meal and returns its storage-assigned id.
    fn create_meal(
        &self,
        meal: &str,
        cuisine: &str,
        price: f64,
        difficulty: &str,
    ) -> RepoResult<MealId>;
    /// Flags an active meal as deleted.
    fn delete_meal(&self, id: MealId) -> RepoResult<()>;
    fn get_meal_by_id(&self, id: MealId) -> RepoResult<Meal>;
    fn get_meal_by_name(&self, name: &str) -> RepoResult<Meal>;
    /// Lists active meals that fought at least one battle, best first.
    fn get_leaderboard(&self, sort_by: LeaderboardSort) -> RepoResult<Leaderboard>;
    /// Counts one battle for an active meal, plus a win when `result` is `Win`.
    fn update_meal_stats(&self, id: MealId, result: BattleResult) -> RepoResult<()>;
}

/// SQL-backed meal repository over any connection provider.
pub struct SqliteMealRepository<P> {
    provider: P,
}

impl<P: ConnectionProvider> SqliteMealRepository<P> {
    /// Wraps a provider without inspecting its schema.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Wraps a provider after checking that it exposes a migrated `meals` table.
    pub fn try_new(provider: P) -> RepoResult<Self> {
        provider.with_cursor(ensure_meal_schema_ready)?;
        Ok(Self { provider })
    }
}

impl<P: ConnectionProvider> MealRepository for SqliteMealRepository<P> {
    fn create_meal(
        &self,
        meal: &str,
        cuisine: &str,
        price: f64,
        difficulty: &str,
    ) -> RepoResult<MealId> {
        let price = validate_price(price)?;
        let difficulty: Difficulty = difficulty.parse()?;
        validate_name(meal)?;

        let result = self.provider.with_cursor(|cursor| -> RepoResult<MealId> {
            cursor
                .execute(
                    INSERT_MEAL_SQL,
                    &[
                        Value::Text(meal.to_string()),
                        Value::Text(cuisine.to_string()),
                        Value::Real(price),
                        Value::Text(difficulty.as_str().to_string()),
                    ],
                )
                .map_err(|err| {
                    if err.is_unique_violation() {
                        RepoError::Conflict {
                            meal: meal.to_string(),
                        }
                    } else {
                        RepoError::Db(err)
                    }
                })?;
            Ok(cursor.last_insert_id())
        });

        match &result {
            Ok(id) => info!("event=meal_create module=repo status=ok meal_id={id} meal={meal}"),
            Err(RepoError::Conflict { .. }) => {
                error!("event=meal_create module=repo status=error error_code=duplicate_meal meal={meal}")
            }
            Err(err) => log_db_error("meal_create", err),
        }
        result
    }

    fn delete_meal(&self, id: MealId) -> RepoResult<()> {
        let result = self.provider.with_cursor(|cursor| -> RepoResult<()> {
            ensure_active(cursor, id)?;
            cursor.execute(SOFT_DELETE_SQL, &[Value::Integer(id)])?;
            Ok(())
        });

        match &result {
            Ok(()) => info!("event=meal_delete module=repo status=ok meal_id={id}"),
            Err(err) => log_lookup_failure("meal_delete", err),
        }
        result
    }

    fn get_meal_by_id(&self, id: MealId) -> RepoResult<Meal> {
        let result = self.provider.with_cursor(|cursor| -> RepoResult<Meal> {
            let row = cursor.fetch_one(SELECT_BY_ID_SQL, &[Value::Integer(id)])?;
            active_meal_from_row(row, MealKey::Id(id))
        });
        if let Err(err) = &result {
            log_lookup_failure("meal_get", err);
        }
        result
    }

    fn get_meal_by_name(&self, name: &str) -> RepoResult<Meal> {
        let result = self.provider.with_cursor(|cursor| -> RepoResult<Meal> {
            let row = cursor.fetch_one(SELECT_BY_NAME_SQL, &[Value::Text(name.to_string())])?;
            active_meal_from_row(row, MealKey::Name(name.to_string()))
        });
        if let Err(err) = &result {
            log_lookup_failure("meal_get", err);
        }
        result
    }

    fn get_leaderboard(&self, sort_by: LeaderboardSort) -> RepoResult<Leaderboard> {
        let sql = leaderboard_sql(sort_by);
        let result = self.provider.with_cursor(|cursor| -> RepoResult<Leaderboard> {
            let rows = cursor.fetch_all(&sql, &[])?;
            rows.iter()
                .map(parse_leaderboard_row)
                .collect::<RepoResult<Vec<_>>>()
                .map(Leaderboard::new)
        });

        match &result {
            Ok(board) => info!(
                "event=leaderboard_get module=repo status=ok sort_by={} entries={}",
                sort_by.as_str(),
                board.len()
            ),
            Err(err) => log_db_error("leaderboard_get", err),
        }
        result
    }

    fn update_meal_stats(&self, id: MealId, result: BattleResult) -> RepoResult<()> {
        let sql = match result {
            BattleResult::Win => RECORD_WIN_SQL,
            BattleResult::Loss => RECORD_LOSS_SQL,
        };
        let outcome = self.provider.with_cursor(|cursor| -> RepoResult<()> {
            ensure_active(cursor, id)?;
            cursor.execute(sql, &[Value::Integer(id)])?;
            Ok(())
        });

        match &outcome {
            Ok(()) => info!(
                "event=meal_stats_update module=repo status=ok meal_id={id} result={result:?}"
            ),
            Err(err) => log_lookup_failure("meal_stats_update", err),
        }
        outcome
    }
}

/// Fails unless `id` names a row whose `deleted` flag is unset.
fn ensure_active(cursor: &mut dyn Cursor, id: MealId) -> RepoResult<()> {
    let row = cursor
        .fetch_one(SELECT_DELETED_SQL, &[Value::Integer(id)])?
        .ok_or(RepoError::NotFound(MealKey::Id(id)))?;
    if flag_at(&row, 0, "deleted")? {
        return Err(RepoError::AlreadyDeleted(MealKey::Id(id)));
    }
    Ok(())
}

fn active_meal_from_row(row: Option<Row>, key: MealKey) -> RepoResult<Meal> {
    let row = row.ok_or_else(|| RepoError::NotFound(key.clone()))?;
    let meal = parse_meal_row(&row)?;
    if meal.deleted {
        return Err(RepoError::AlreadyDeleted(key));
    }
    Ok(meal)
}

fn parse_meal_row(row: &Row) -> RepoResult<Meal> {
    let meal = Meal {
        id: int_at(row, 0, "id")?,
        meal: text_at(row, 1, "meal")?,
        cuisine: text_at(row, 2, "cuisine")?,
        price: real_at(row, 3, "price")?,
        difficulty: difficulty_at(row, 4)?,
        deleted: flag_at(row, 5, "deleted")?,
    };
    meal.validate()
        .map_err(|err| RepoError::InvalidData(format!("meal {}: {err}", meal.id)))?;
    Ok(meal)
}

fn parse_leaderboard_row(row: &Row) -> RepoResult<LeaderboardEntry> {
    let ratio = match row.get(7) {
        Some(Value::Null) => 0.0,
        _ => real_at(row, 7, "win_pct")?,
    };
    Ok(LeaderboardEntry {
        id: int_at(row, 0, "id")?,
        meal: text_at(row, 1, "meal")?,
        cuisine: text_at(row, 2, "cuisine")?,
        price: real_at(row, 3, "price")?,
        difficulty: difficulty_at(row, 4)?,
        battles: int_at(row, 5, "battles")?,
        wins: int_at(row, 6, "wins")?,
        win_pct: win_percentage(ratio),
    })
}

fn column<'r>(row: &'r Row, index: usize, column: &str) -> RepoResult<&'r Value> {
    row.get(index)
        .ok_or_else(|| RepoError::InvalidData(format!("missing column `{column}` at {index}")))
}

fn int_at(row: &Row, index: usize, name: &str) -> RepoResult<i64> {
    match column(row, index, name)? {
        Value::Integer(value) => Ok(*value),
        other => Err(unexpected_type(name, other)),
    }
}

fn real_at(row: &Row, index: usize, name: &str) -> RepoResult<f64> {
    match column(row, index, name)? {
        Value::Real(value) => Ok(*value),
        Value::Integer(value) => Ok(*value as f64),
        other => Err(unexpected_type(name, other)),
    }
}

fn text_at(row: &Row, index: usize, name: &str) -> RepoResult<String> {
    match column(row, index, name)? {
        Value::Text(value) => Ok(value.clone()),
        other => Err(unexpected_type(name, other)),
    }
}

fn flag_at(row: &Row, index: usize, name: &str) -> RepoResult<bool> {
    match column(row, index, name)? {
        Value::Integer(0) => Ok(false),
        Value::Integer(1) => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid {name} value `{other:?}` in meals.{name}"
        ))),
    }
}

fn difficulty_at(row: &Row, index: usize) -> RepoResult<Difficulty> {
    let token = text_at(row, index, "difficulty")?;
    token.parse().map_err(|_| {
        RepoError::InvalidData(format!("invalid difficulty `{token}` in meals.difficulty"))
    })
}

fn unexpected_type(name: &str, value: &Value) -> RepoError {
    RepoError::InvalidData(format!("unexpected value `{value:?}` in meals.{name}"))
}

fn ensure_meal_schema_ready(cursor: &mut dyn Cursor) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = match cursor.fetch_one("PRAGMA user_version;", &[])? {
        Some(row) => u32::try_from(int_at(&row, 0, "user_version")?).unwrap_or(0),
        None => 0,
    };
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let exists = cursor.fetch_one(
        "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?",
        &[Value::Text("meals".to_string())],
    )?;
    if exists.is_none() {
        return Err(RepoError::MissingRequiredTable("meals"));
    }

    let columns = cursor
        .fetch_all("PRAGMA table_info(meals);", &[])?
        .iter()
        .map(|row| text_at(row, 1, "name"))
        .collect::<RepoResult<Vec<_>>>()?;
    for column in REQUIRED_MEAL_COLUMNS {
        if !columns.iter().any(|name| name == column) {
            return Err(RepoError::MissingRequiredColumn {
                table: "meals",
                column,
            });
        }
    }

    Ok(())
}

fn log_lookup_failure(event: &str, err: &RepoError) {
    match err {
        RepoError::NotFound(key) => {
            info!("event={event} module=repo status=not_found key=\"{key}\"")
        }
        RepoError::AlreadyDeleted(key) => {
            info!("event={event} module=repo status=deleted key=\"{key}\"")
        }
        other => log_db_error(event, other),
    }
}

fn log_db_error(event: &str, err: &RepoError) {
    error!("event={event} module=repo status=error error={err}");
}
