use async_trait::async_trait;
use parking_lot::RwLock;
use sheetlink_core::error::Result;
use sheetlink_core::{Row, TabularStore};
use std::sync::Arc;
use tracing::trace;

/// In-memory append-only table.
///
/// Clones share the same rows, so a clone handed to a service can be
/// inspected from a test.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTable {
    rows: Arc<RwLock<Vec<Row>>>,
}

impl InMemoryTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table pre-populated with `rows`, in order.
    pub fn with_rows(rows: impl IntoIterator<Item = Row>) -> Self {
        Self {
            rows: Arc::new(RwLock::new(rows.into_iter().collect())),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}

#[async_trait]
impl TabularStore for InMemoryTable {
    async fn append(&self, row: Row) -> Result<()> {
        let mut rows = self.rows.write();
        rows.push(row);
        trace!(position = rows.len() - 1, "appended row");
        Ok(())
    }

    async fn read_range(&self) -> Result<Vec<Option<Row>>> {
        Ok(self.rows.read().iter().cloned().map(Some).collect())
    }
}
