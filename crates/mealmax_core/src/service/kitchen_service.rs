//! Kitchen use-case service.
//!
//! # Responsibility
//! - Provide stable catalog entry points for core callers.
//! - Delegate persistence to repository implementations.
//! - Turn a battle outcome into paired win/loss stat updates.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::model::leaderboard::{Leaderboard, LeaderboardSort};
use crate::model::meal::{parse_price, BattleResult, Meal, MealId, MealValidationError};
use crate::repo::meal_repo::{MealRepository, RepoResult};

/// Use-case service wrapper for meal catalog operations.
pub struct KitchenService<R: MealRepository> {
    repo: R,
}

impl<R: MealRepository> KitchenService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_meal(
        &self,
        meal: &str,
        cuisine: &str,
        price: f64,
        difficulty: &str,
    ) -> RepoResult<MealId> {
        self.repo.create_meal(meal, cuisine, price, difficulty)
    }

    /// Creates a meal from raw text input, e.g. command-line arguments.
    ///
    /// A price that is not a number fails validation before storage is touched.
    pub fn create_meal_from_text(
        &self,
        meal: &str,
        cuisine: &str,
        price: &str,
        difficulty: &str,
    ) -> RepoResult<MealId> {
        let price = parse_price(price)?;
        self.repo.create_meal(meal, cuisine, price, difficulty)
    }

    pub fn delete_meal(&self, id: MealId) -> RepoResult<()> {
        self.repo.delete_meal(id)
    }

    pub fn get_meal_by_id(&self, id: MealId) -> RepoResult<Meal> {
        self.repo.get_meal_by_id(id)
    }

    pub fn get_meal_by_name(&self, name: &str) -> RepoResult<Meal> {
        self.repo.get_meal_by_name(name)
    }

    pub fn get_leaderboard(&self, sort_by: LeaderboardSort) -> RepoResult<Leaderboard> {
        self.repo.get_leaderboard(sort_by)
    }

    pub fn update_meal_stats(&self, id: MealId, result: BattleResult) -> RepoResult<()> {
        self.repo.update_meal_stats(id, result)
    }

    /// Records one battle: a win for `winner` and a loss for `loser`.
    ///
    /// # Contract
    /// - `winner` and `loser` must differ.
    /// - Both meals must be active; the loser is checked before any stats change.
    pub fn record_battle(&self, winner: MealId, loser: MealId) -> RepoResult<()> {
        if winner == loser {
            return Err(MealValidationError::SameMealBattle(winner).into());
        }
        self.repo.get_meal_by_id(loser)?;
        self.repo.update_meal_stats(winner, BattleResult::Win)?;
        self.repo.update_meal_stats(loser, BattleResult::Loss)
    }
}
