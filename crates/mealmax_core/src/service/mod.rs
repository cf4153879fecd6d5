//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep CLI layers decoupled from storage details.

pub mod kitchen_service;
