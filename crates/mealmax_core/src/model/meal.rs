//! Meal domain model.
//!
//! # Responsibility
//! - Define the catalog record and its closed value sets.
//! - Validate caller input before any storage access happens.
//!
//! # Invariants
//! - `price` is finite and strictly positive.
//! - `difficulty` is one of `LOW`, `MED`, `HIGH`.
//! - `meal` is non-empty after trimming.
//! - Equality ignores `id` and `deleted`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Storage-assigned meal identifier.
pub type MealId = i64;

/// Wire tokens accepted for [`Difficulty`], in declaration order.
pub const DIFFICULTY_TOKENS: [&str; 3] = ["LOW", "MED", "HIGH"];

/// How hard a meal is to cook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Difficulty {
    Low,
    Med,
    High,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Med => "MED",
            Self::High => "HIGH",
        }
    }
}

impl Display for Difficulty {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = MealValidationError;

    /// Tokens are matched exactly; `low` or `Hard` are rejected.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "LOW" => Ok(Self::Low),
            "MED" => Ok(Self::Med),
            "HIGH" => Ok(Self::High),
            other => Err(MealValidationError::InvalidDifficulty(other.to_string())),
        }
    }
}

/// Outcome of one battle, as recorded by `update_meal_stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleResult {
    Win,
    Loss,
}

impl FromStr for BattleResult {
    type Err = MealValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "win" => Ok(Self::Win),
            "loss" => Ok(Self::Loss),
            other => Err(MealValidationError::InvalidBattleResult(other.to_string())),
        }
    }
}

/// Validation failures raised before a request reaches storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MealValidationError {
    /// Offending price, rendered as the caller supplied it.
    InvalidPrice(String),
    InvalidDifficulty(String),
    EmptyName,
    InvalidSortField(String),
    InvalidBattleResult(String),
    /// A meal cannot battle itself.
    SameMealBattle(MealId),
}

impl Display for MealValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPrice(value) => {
                write!(f, "Invalid price: {value}. Price must be a positive number.")
            }
            Self::InvalidDifficulty(value) => write!(
                f,
                "Invalid difficulty level: {value}. Must be 'LOW', 'MED', or 'HIGH'."
            ),
            Self::EmptyName => write!(f, "Meal name must not be empty."),
            Self::InvalidSortField(value) => write!(
                f,
                "Invalid sort_by parameter: {value}. Must be 'wins' or 'win_pct'."
            ),
            Self::InvalidBattleResult(value) => {
                write!(f, "Invalid result: {value}. Expected 'win' or 'loss'.")
            }
            Self::SameMealBattle(id) => write!(f, "Meal with ID {id} cannot battle itself"),
        }
    }
}

impl Error for MealValidationError {}

/// Checks that `price` is a finite, strictly positive number.
pub fn validate_price(price: f64) -> Result<f64, MealValidationError> {
    if price.is_finite() && price > 0.0 {
        Ok(price)
    } else {
        Err(MealValidationError::InvalidPrice(price.to_string()))
    }
}

/// Parses textual price input (CLI, imports) and validates it.
///
/// Non-numeric text is reported with the original text, not a parse error.
pub fn parse_price(raw: &str) -> Result<f64, MealValidationError> {
    let trimmed = raw.trim();
    let price = trimmed
        .parse::<f64>()
        .map_err(|_| MealValidationError::InvalidPrice(trimmed.to_string()))?;
    validate_price(price)
}

/// Checks that a meal name carries visible text.
pub fn validate_name(name: &str) -> Result<(), MealValidationError> {
    if name.trim().is_empty() {
        return Err(MealValidationError::EmptyName);
    }
    Ok(())
}

/// Catalog record as stored in the `meals` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meal {
    pub id: MealId,
    /// Unique display name.
    pub meal: String,
    pub cuisine: String,
    pub price: f64,
    pub difficulty: Difficulty,
    /// Soft-delete flag. Deleted meals keep their row.
    #[serde(default)]
    pub deleted: bool,
}

impl Meal {
    /// Re-checks field invariants, e.g. on rows read back from storage.
    pub fn validate(&self) -> Result<(), MealValidationError> {
        validate_name(&self.meal)?;
        validate_price(self.price)?;
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        !self.deleted
    }
}

impl PartialEq for Meal {
    fn eq(&self, other: &Self) -> bool {
        self.meal == other.meal
            && self.cuisine == other.cuisine
            && self.price == other.price
            && self.difficulty == other.difficulty
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_price, validate_price, BattleResult, Difficulty, Meal, MealValidationError};

    #[test]
    fn difficulty_tokens_are_exact() {
        assert_eq!("MED".parse::<Difficulty>().unwrap(), Difficulty::Med);
        assert_eq!(
            "med".parse::<Difficulty>().unwrap_err(),
            MealValidationError::InvalidDifficulty("med".to_string())
        );
    }

    #[test]
    fn price_validation_mentions_offending_value() {
        let err = validate_price(-10.0).unwrap_err();
        assert!(err.to_string().contains("-10"), "unexpected message: {err}");
        assert!(validate_price(0.0).is_err());
        assert!(validate_price(f64::NAN).is_err());
        assert_eq!(validate_price(5.5).unwrap(), 5.5);
    }

    #[test]
    fn parse_price_rejects_text() {
        let err = parse_price("invalid").unwrap_err();
        assert_eq!(err, MealValidationError::InvalidPrice("invalid".to_string()));
        assert_eq!(parse_price(" 7.25 ").unwrap(), 7.25);
    }

    #[test]
    fn battle_result_parses_known_tokens() {
        assert_eq!("win".parse::<BattleResult>().unwrap(), BattleResult::Win);
        assert_eq!("loss".parse::<BattleResult>().unwrap(), BattleResult::Loss);
        assert!("draw".parse::<BattleResult>().is_err());
    }

    #[test]
    fn equality_ignores_id_and_deleted_flag() {
        let left = Meal {
            id: 1,
            meal: "Paella".to_string(),
            cuisine: "Spanish".to_string(),
            price: 18.0,
            difficulty: Difficulty::High,
            deleted: false,
        };
        let right = Meal {
            id: 9,
            deleted: true,
            ..left.clone()
        };
        assert_eq!(left, right);
    }
}
