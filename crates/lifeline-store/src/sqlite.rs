//! SQLite-backed audit log.
//!
//! One row per record. The full record is kept as JSON next to the columns
//! queries filter and sort on, so reads never scan more than `LIMIT` rows
//! off the index.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use lifeline_common::{EventRecord, LifelineError, LifelineResult};
use rusqlite::{Connection, params};

use crate::audit::{AuditQuery, AuditStore};

const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS audit_events (
    seq          INTEGER PRIMARY KEY AUTOINCREMENT,
    entity_id    TEXT    NOT NULL,
    timestamp_us INTEGER NOT NULL,
    record       TEXT    NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_audit_events_recent
    ON audit_events (timestamp_us DESC, seq DESC);
CREATE INDEX IF NOT EXISTS idx_audit_events_entity
    ON audit_events (entity_id, timestamp_us DESC, seq DESC);
";

/// Append-only audit log in a SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteAuditLog {
    conn: Arc<Mutex<Connection>>,
}

fn db_error(err: rusqlite::Error) -> LifelineError {
    LifelineError::storage(format!("audit database: {err}"))
}

impl SqliteAuditLog {
    /// Open (and create if needed) the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or the schema applied.
    pub fn open(path: &Path) -> LifelineResult<Self> {
        let conn = Connection::open(path).map_err(db_error)?;
        tracing::debug!(path = %path.display(), "Opened audit database");
        Self::init(conn)
    }

    /// A throwaway in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be applied.
    pub fn open_in_memory() -> LifelineResult<Self> {
        Self::init(Connection::open_in_memory().map_err(db_error)?)
    }

    fn init(conn: Connection) -> LifelineResult<Self> {
        conn.pragma_update(None, "synchronous", "NORMAL")
            .map_err(db_error)?;
        conn.execute_batch(SCHEMA).map_err(db_error)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> LifelineResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> LifelineResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| LifelineError::storage("audit database lock poisoned"))?;
            f(&conn)
        })
        .await
        .map_err(|e| LifelineError::Internal {
            message: format!("audit database task failed: {e}"),
        })?
    }
}

fn select_recent(
    conn: &Connection,
    query: &AuditQuery,
) -> LifelineResult<Vec<EventRecord>> {
    let limit = i64::try_from(query.effective_limit()).unwrap_or(i64::MAX);

    let rows: Vec<String> = match &query.entity_id {
        Some(id) => {
            let mut stmt = conn
                .prepare_cached(
                    "SELECT record FROM audit_events
                     WHERE entity_id = ?1
                     ORDER BY timestamp_us DESC, seq DESC
                     LIMIT ?2",
                )
                .map_err(db_error)?;
            stmt.query_map(params![id.as_str(), limit], |row| row.get(0))
                .map_err(db_error)?
                .collect::<Result<_, _>>()
                .map_err(db_error)?
        }
        None => {
            let mut stmt = conn
                .prepare_cached(
                    "SELECT record FROM audit_events
                     ORDER BY timestamp_us DESC, seq DESC
                     LIMIT ?1",
                )
                .map_err(db_error)?;
            stmt.query_map(params![limit], |row| row.get(0))
                .map_err(db_error)?
                .collect::<Result<_, _>>()
                .map_err(db_error)?
        }
    };

    Ok(rows
        .iter()
        .filter_map(|json| match serde_json::from_str::<EventRecord>(json) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping corrupt audit record");
                None
            }
        })
        .collect())
}

#[async_trait]
impl AuditStore for SqliteAuditLog {
    async fn append(&self, record: EventRecord) -> LifelineResult<()> {
        let json = serde_json::to_string(&record)?;
        let entity_id = record.entity_id.as_str().to_string();
        let timestamp_us = record.timestamp.timestamp_micros();

        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO audit_events (entity_id, timestamp_us, record) VALUES (?1, ?2, ?3)",
                params![entity_id, timestamp_us, json],
            )
            .map_err(db_error)?;
            Ok(())
        })
        .await
    }

    async fn query(&self, query: AuditQuery) -> LifelineResult<Vec<EventRecord>> {
        self.with_conn(move |conn| select_recent(conn, &query)).await
    }

    async fn count(&self) -> LifelineResult<usize> {
        self.with_conn(|conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM audit_events", [], |row| row.get(0))
                .map_err(db_error)?;
            Ok(usize::try_from(count).unwrap_or(0))
        })
        .await
    }
}
