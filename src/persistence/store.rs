//! SQLite connection handling.
//!
//! Connections run with `journal_mode = WAL`, a 5s busy timeout and foreign
//! keys enabled so the CLI and the board can share one database file.

use super::schema;
use crate::error::PlannerResult;
use anyhow::{Context, Result};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::{path::Path, time::Duration};

/// Busy timeout applied to every connection
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Owns the database connection
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) the database file, apply pragmas and migrate
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create database directory {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("open database {}", path.display()))?;
        let store = Self::init(conn)?;
        tracing::debug!(path = %path.display(), "opened store");
        Ok(store)
    }

    /// Fresh private database, used by tests
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory database")?;
        Self::init(conn)
    }

    fn init(mut conn: Connection) -> Result<Self> {
        configure_connection(&conn).context("configure sqlite pragmas")?;
        schema::migrate(&mut conn).context("apply migrations")?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Run `f` inside one `BEGIN IMMEDIATE` transaction.
    /// Any error rolls the whole unit back.
    pub fn with_tx<T>(
        &mut self,
        f: impl FnOnce(&Transaction<'_>) -> PlannerResult<T>,
    ) -> PlannerResult<T> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }
}

fn configure_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    let _journal_mode: String =
        conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    conn.busy_timeout(DEFAULT_BUSY_TIMEOUT)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlannerError;

    #[test]
    fn test_open_sets_pragmas() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = Store::open(&temp_dir.path().join("weekboard.db")).unwrap();

        let journal_mode: String = store
            .conn()
            .pragma_query_value(None, "journal_mode", |row| row.get(0))
            .unwrap();
        assert_eq!(journal_mode.to_ascii_lowercase(), "wal");

        let foreign_keys: i64 = store
            .conn()
            .pragma_query_value(None, "foreign_keys", |row| row.get(0))
            .unwrap();
        assert_eq!(foreign_keys, 1);
    }

    #[test]
    fn test_with_tx_rolls_back_on_error() {
        let mut store = Store::open_in_memory().unwrap();

        let result: PlannerResult<()> = store.with_tx(|tx| {
            tx.execute(
                "INSERT INTO config (id, value) VALUES (1, '{}')",
                [],
            )?;
            Err(PlannerError::validation("abort"))
        });
        assert!(result.is_err());

        let rows: i64 = store
            .conn()
            .query_row("SELECT COUNT(*) FROM config", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 0);
    }
}
