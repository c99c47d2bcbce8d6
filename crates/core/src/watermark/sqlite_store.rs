//! SQLite-backed watermark store implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, warn};

use super::{Watermark, WatermarkError, WatermarkStore};

/// SQLite-backed watermark store.
///
/// Holds a single row (`id = 1`). The row is seeded as "never synced" when the
/// schema is created, so a fresh installation starts in bootstrap mode.
pub struct SqliteWatermarkStore {
    conn: Mutex<Connection>,
}

impl SqliteWatermarkStore {
    /// Create a new SQLite watermark store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, WatermarkError> {
        let conn = Connection::open(path)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite watermark store (useful for testing).
    pub fn in_memory() -> Result<Self, WatermarkError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), WatermarkError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS sync_watermark (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                last_sync_time INTEGER,
                last_sync_module TEXT,
                updated_at TEXT NOT NULL
            );
            "#,
        )?;

        conn.execute(
            "INSERT OR IGNORE INTO sync_watermark (id, last_sync_time, last_sync_module, updated_at)
             VALUES (1, NULL, NULL, ?)",
            params![Utc::now().to_rfc3339()],
        )?;

        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, WatermarkError> {
        self.conn
            .lock()
            .map_err(|e| WatermarkError::Database(format!("connection lock poisoned: {}", e)))
    }

    fn record_exists(conn: &Connection) -> Result<bool, WatermarkError> {
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM sync_watermark WHERE id = 1", [], |row| {
                row.get(0)
            })?;
        Ok(count > 0)
    }
}

#[async_trait]
impl WatermarkStore for SqliteWatermarkStore {
    async fn read(&self) -> Result<Watermark, WatermarkError> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                "SELECT last_sync_time, last_sync_module FROM sync_watermark WHERE id = 1",
                [],
                |row| Ok((row.get::<_, Option<i64>>(0)?, row.get::<_, Option<String>>(1)?)),
            )
            .optional()?;

        let Some((last_sync_ms, last_sync_module)) = row else {
            return Err(WatermarkError::NotFound);
        };

        let last_sync_time = match last_sync_ms {
            Some(ms) => match Utc.timestamp_millis_opt(ms).single() {
                Some(time) => Some(time),
                None => {
                    return Err(WatermarkError::Database(format!(
                        "invalid last_sync_time: {}",
                        ms
                    )))
                }
            },
            None => None,
        };

        Ok(Watermark {
            last_sync_time,
            last_sync_module,
        })
    }

    async fn write(&self, time: DateTime<Utc>) -> Result<bool, WatermarkError> {
        let conn = self.conn()?;
        let ms = time.timestamp_millis();

        let changed = conn.execute(
            "UPDATE sync_watermark SET last_sync_time = ?1, updated_at = ?2
             WHERE id = 1 AND (last_sync_time IS NULL OR last_sync_time < ?1)",
            params![ms, Utc::now().to_rfc3339()],
        )?;

        if changed == 0 {
            if !Self::record_exists(&conn)? {
                return Err(WatermarkError::NotFound);
            }
            warn!(
                "Ignoring watermark write for {}: stored watermark is not older",
                time
            );
            return Ok(false);
        }

        debug!("Watermark advanced to {}", time);
        Ok(true)
    }

    async fn record_module(&self, name: &str) -> Result<(), WatermarkError> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE sync_watermark SET last_sync_module = ?1, updated_at = ?2 WHERE id = 1",
            params![name, Utc::now().to_rfc3339()],
        )?;

        if changed == 0 {
            return Err(WatermarkError::NotFound);
        }

        Ok(())
    }
}
