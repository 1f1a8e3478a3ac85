//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration and intent catalog loading
//! - Storage: In-memory records
//! - Database: SQLite records
//! - Adapters: Platform integrations (console)

pub mod adapters;
pub mod config;
pub mod database;
pub mod storage;
