//! `SQLite` implementation of the plan store.

use tokio_rusqlite::Connection;

use crate::plan::{PlanId, PlanRecord};
use crate::storage::{PlanStore, StoreError, StoreFuture, StoreResult};

/// `SQLite`-backed plan store. Rows are JSON documents keyed by record id.
pub struct SqlitePlanStore {
    conn: Connection,
}

impl SqlitePlanStore {
    /// Open (or create) the store at the given path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened.
    pub async fn open(path: &str) -> StoreResult<Self> {
        let conn = Connection::open(path).await?;
        Self::init(conn).await
    }

    /// Open an in-memory store.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened.
    pub async fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory().await?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> StoreResult<Self> {
        conn.call(|conn| {
            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS tour_plan (
                    id TEXT PRIMARY KEY,
                    record_json TEXT NOT NULL,
                    created_at INTEGER NOT NULL
                )",
            )?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }
}

impl PlanStore for SqlitePlanStore {
    fn insert(&self, record: &PlanRecord) -> StoreFuture<'_, StoreResult<()>> {
        let record = record.clone();
        Box::pin(async move {
            let id = record.id.to_string();
            let record_json = serde_json::to_string(&record)?;
            let created_at = record.created_at.timestamp_millis();

            self.conn
                .call(move |conn| {
                    conn.execute(
                        "INSERT INTO tour_plan (id, record_json, created_at)
                         VALUES (?1, ?2, ?3)",
                        rusqlite::params![id, record_json, created_at],
                    )?;
                    Ok(())
                })
                .await?;

            Ok(())
        })
    }

    fn list_all(&self) -> StoreFuture<'_, StoreResult<Vec<PlanRecord>>> {
        Box::pin(async move {
            let rows: Vec<String> = self
                .conn
                .call(|conn| {
                    let mut stmt = conn
                        .prepare("SELECT record_json FROM tour_plan ORDER BY created_at, id")?;
                    let rows = stmt
                        .query_map([], |row| row.get::<_, String>(0))?
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(rows)
                })
                .await?;

            rows.iter()
                .map(|json| serde_json::from_str(json).map_err(StoreError::from))
                .collect()
        })
    }

    fn delete_by_id(&self, id: PlanId) -> StoreFuture<'_, StoreResult<()>> {
        Box::pin(async move {
            let id = id.to_string();
            self.conn
                .call(move |conn| {
                    conn.execute("DELETE FROM tour_plan WHERE id = ?1", rusqlite::params![id])?;
                    Ok(())
                })
                .await?;
            Ok(())
        })
    }
}
