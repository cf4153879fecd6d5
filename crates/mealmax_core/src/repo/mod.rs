//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQL statement details from service orchestration.
//!
//! # Invariants
//! - Repository writes validate input before touching storage.
//! - Repository APIs return semantic errors (`NotFound`, `AlreadyDeleted`,
//!   `Conflict`) in addition to DB transport errors.

pub mod meal_repo;
