//! Domain model for the meal catalog.
//!
//! # Responsibility
//! - Define the canonical records used by repository and service layers.
//! - Own input validation rules shared by every write path.
//!
//! # Invariants
//! - Every meal is identified by a storage-assigned `MealId`.
//! - Deletion is represented by a soft-delete flag, never by removing rows.

pub mod leaderboard;
pub mod meal;
