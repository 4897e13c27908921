use async_trait::async_trait;
use sheetlink_core::error::{Result, StorageError};
use sheetlink_core::{Row, TabularStore};
use sqlx::{MySqlPool, Row as _};
use tracing::trace;

const SCHEMA: &str = include_str!("../ddl/mysql/sheet_rows.sql");

/// MySQL implementation of the tabular store contract.
///
/// Each row is one record in `sheet_rows`, its cells stored as a JSON array.
/// The auto-increment `position` column gives the table order, so reads
/// return rows in insertion order. Rows are never updated or deleted.
#[derive(Debug, Clone)]
pub struct MySqlTable {
    pool: MySqlPool,
}

impl MySqlTable {
    /// Creates a table from an existing MySQL connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Creates a table by opening a new MySQL connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = MySqlPool::connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Creates the `sheet_rows` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::Configuration(_) => StorageError::Configuration(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Operation(message),
    }
}

#[async_trait]
impl TabularStore for MySqlTable {
    async fn append(&self, row: Row) -> Result<()> {
        let cells = serde_json::to_string(&row)
            .map_err(|e| StorageError::InvalidData(format!("cannot encode row: {e}")))?;

        let result = sqlx::query("INSERT INTO sheet_rows (cells) VALUES (?)")
            .bind(cells)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        trace!(position = result.last_insert_id(), "appended row");
        Ok(())
    }

    async fn read_range(&self) -> Result<Vec<Option<Row>>> {
        let records = sqlx::query("SELECT cells FROM sheet_rows ORDER BY position ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        records
            .iter()
            .map(|record| {
                let cells: String = record.try_get("cells").map_err(map_sqlx_error)?;
                serde_json::from_str::<Row>(&cells)
                    .map(Some)
                    .map_err(|e| StorageError::InvalidData(format!("invalid row '{cells}': {e}")))
            })
            .collect()
    }
}
