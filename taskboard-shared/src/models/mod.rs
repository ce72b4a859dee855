/// Database models for taskboard
///
/// This module contains all database models and their SQL operations.
///
/// # Models
///
/// - `user`: User accounts used for authentication and task assignment
/// - `task`: Tasks with assignment and soft-delete semantics
///
/// Read operations take the connection pool; mutating operations take any
/// `PgExecutor` so callers can run them inside a transaction.

pub mod task;
pub mod user;
