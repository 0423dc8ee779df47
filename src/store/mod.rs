// src/store/mod.rs
//! The relational store the crawl writes into and the graph builder reads.
//!
//! A `Store` owns one SQLite connection. It is handed explicitly to whoever
//! needs it; the crawl's single orchestrating caller is its only writer.

mod queries;
pub mod schema;
mod sink;

pub use queries::Member;
pub use schema::Table;

use crate::error::AppError;
use rusqlite::Connection;
use std::path::Path;

/// SQLite-backed crawl store.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) a store at the given path.
    pub fn open(path: &Path) -> Result<Self, AppError> {
        let store = Self {
            conn: Connection::open(path)?,
        };
        store.initialize()?;
        log::debug!("Opened store at {}", path.display());
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    pub fn in_memory() -> Result<Self, AppError> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.initialize()?;
        Ok(store)
    }

    fn initialize(&self) -> Result<(), AppError> {
        self.conn.execute_batch("PRAGMA synchronous = NORMAL;")?;
        // in-memory databases report "memory" and keep their journal mode
        if let Err(e) = self.conn.execute_batch("PRAGMA journal_mode = WAL;") {
            log::warn!("Could not enable WAL journaling, continuing without it: {}", e);
        }
        self.conn.execute_batch(schema::SCHEMA_SQL)?;
        Ok(())
    }

    /// Number of rows in `table`.
    pub fn row_count(&self, table: Table) -> Result<u64, AppError> {
        let sql = format!("SELECT COUNT(*) FROM {}", table.name());
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_store_starts_empty() {
        let store = Store::in_memory().unwrap();
        for table in Table::ALL {
            assert_eq!(store.row_count(table).unwrap(), 0, "{}", table.name());
        }
    }

    #[test]
    fn test_file_store_journals_with_wal() {
        let path = std::env::temp_dir().join(format!("osf2graph-wal-{}.sqlite", std::process::id()));
        let store = Store::open(&path).unwrap();
        let mode: String = store
            .conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode, "wal");
        assert_eq!(store.row_count(Table::Nodes).unwrap(), 0);

        drop(store);
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
    }

    #[test]
    fn test_schema_bootstrap_is_repeatable() {
        let store = Store::in_memory().unwrap();
        store.initialize().unwrap();
        assert_eq!(store.row_count(Table::Users).unwrap(), 0);
    }
}
