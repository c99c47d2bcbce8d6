//! SQLite-backed package store implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{PackageRecord, PackageStore, PackageStoreError};

/// SQLite-backed package store.
pub struct SqlitePackageStore {
    conn: Mutex<Connection>,
}

impl SqlitePackageStore {
    /// Create a new SQLite package store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, PackageStoreError> {
        let conn = Connection::open(path)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite package store (useful for testing).
    pub fn in_memory() -> Result<Self, PackageStoreError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), PackageStoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS packages (
                name TEXT PRIMARY KEY,
                document TEXT NOT NULL,
                synced_by TEXT NOT NULL,
                synced_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_packages_synced_at ON packages(synced_at);
            "#,
        )?;
        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, PackageStoreError> {
        self.conn
            .lock()
            .map_err(|e| PackageStoreError::Database(format!("connection lock poisoned: {}", e)))
    }
}

impl PackageStore for SqlitePackageStore {
    fn upsert(
        &self,
        name: &str,
        document: &serde_json::Value,
        synced_by: &str,
    ) -> Result<PackageRecord, PackageStoreError> {
        let conn = self.conn()?;
        let now = Utc::now();
        let document_json = serde_json::to_string(document)?;

        conn.execute(
            "INSERT INTO packages (name, document, synced_by, synced_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(name) DO UPDATE SET
                document = excluded.document,
                synced_by = excluded.synced_by,
                synced_at = excluded.synced_at",
            params![name, document_json, synced_by, now.to_rfc3339()],
        )?;

        Ok(PackageRecord {
            name: name.to_string(),
            document: document.clone(),
            synced_by: synced_by.to_string(),
            synced_at: now,
        })
    }

    fn get(&self, name: &str) -> Result<Option<PackageRecord>, PackageStoreError> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                "SELECT name, document, synced_by, synced_at FROM packages WHERE name = ?",
                params![name],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((name, document_json, synced_by, synced_at_str)) = row else {
            return Ok(None);
        };

        let synced_at = DateTime::parse_from_rfc3339(&synced_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| PackageStoreError::Database(format!("invalid synced_at: {}", e)))?;

        Ok(Some(PackageRecord {
            name,
            document: serde_json::from_str(&document_json)?,
            synced_by,
            synced_at,
        }))
    }

    fn remove(&self, name: &str) -> Result<bool, PackageStoreError> {
        let conn = self.conn()?;
        let removed = conn.execute("DELETE FROM packages WHERE name = ?", params![name])?;
        Ok(removed > 0)
    }

    fn count(&self) -> Result<i64, PackageStoreError> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM packages", [], |row| row.get(0))?;
        Ok(count)
    }
}
