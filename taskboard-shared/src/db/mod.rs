/// Database layer for taskboard
///
/// This module provides database connection pooling and the migration
/// runner. Models live in the `models` module at crate root level.
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool management with a startup health check
/// - `migrations`: embedded sqlx migration runner

pub mod migrations;
pub mod pool;
