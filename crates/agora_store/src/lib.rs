//! SQLite implementation of the interaction audit log.

pub mod sqlite;

pub use sqlite::SqliteInteractionLog;
