//! Leaderboard read model.
//!
//! # Invariants
//! - Entries keep the order storage returned them in.
//! - `win_pct` is a percentage rounded to one decimal place.

use crate::model::meal::{Difficulty, MealId, MealValidationError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Column the leaderboard is ranked by, descending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardSort {
    #[default]
    Wins,
    WinPct,
}

impl LeaderboardSort {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wins => "wins",
            Self::WinPct => "win_pct",
        }
    }
}

impl FromStr for LeaderboardSort {
    type Err = MealValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "wins" => Ok(Self::Wins),
            "win_pct" => Ok(Self::WinPct),
            other => Err(MealValidationError::InvalidSortField(other.to_string())),
        }
    }
}

/// One ranked meal with its battle statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub id: MealId,
    pub meal: String,
    pub cuisine: String,
    pub price: f64,
    pub difficulty: Difficulty,
    pub battles: i64,
    pub wins: i64,
    pub win_pct: f64,
}

/// Converts a raw win ratio (`0.0..=1.0`) into a one-decimal percentage.
///
/// Exact ties round to the even digit, so 1 win in 16 battles is `6.2`.
pub fn win_percentage(ratio: f64) -> f64 {
    (ratio * 1000.0).round_ties_even() / 10.0
}

/// Finite, restartable sequence of leaderboard entries.
///
/// Rows are materialized when the query runs; nothing is fetched lazily.
/// `iter()` can be called any number of times; each pass yields the same
/// entries in the same order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn new(entries: Vec<LeaderboardEntry>) -> Self {
        Self { entries }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LeaderboardEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for Leaderboard {
    type Item = LeaderboardEntry;
    type IntoIter = std::vec::IntoIter<LeaderboardEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Leaderboard {
    type Item = &'a LeaderboardEntry;
    type IntoIter = std::slice::Iter<'a, LeaderboardEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::{win_percentage, LeaderboardSort};

    #[test]
    fn win_percentage_rounds_to_one_decimal() {
        assert_eq!(win_percentage(2.0 / 3.0), 66.7);
        assert_eq!(win_percentage(1.0), 100.0);
        assert_eq!(win_percentage(0.0), 0.0);
    }

    #[test]
    fn win_percentage_rounds_exact_ties_to_even() {
        assert_eq!(win_percentage(1.0 / 16.0), 6.2);
        assert_eq!(win_percentage(5.0 / 16.0), 31.2);
        assert_eq!(win_percentage(3.0 / 16.0), 18.8);
    }

    #[test]
    fn sort_field_parses_known_columns_only() {
        assert_eq!("wins".parse::<LeaderboardSort>().unwrap(), LeaderboardSort::Wins);
        assert_eq!(
            "win_pct".parse::<LeaderboardSort>().unwrap(),
            LeaderboardSort::WinPct
        );
        let err = "price".parse::<LeaderboardSort>().unwrap_err();
        assert!(err.to_string().contains("price"));
    }
}
