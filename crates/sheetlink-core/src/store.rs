use crate::error::Result;
use async_trait::async_trait;

/// An ordered sequence of cell values.
pub type Row = Vec<String>;

/// An append-only table addressed through one fixed range.
///
/// Implementations hold whatever connection or authorization context the
/// backing resource needs, and perform exactly one round trip per call. No
/// retry is performed; failures are returned to the caller as-is.
#[async_trait]
pub trait TabularStore: Send + Sync + 'static {
    /// Appends `row` after the last populated row of the range.
    async fn append(&self, row: Row) -> Result<()>;

    /// Reads every row of the range in table order.
    ///
    /// Entries the backing resource reports as absent are `None`. An empty
    /// range yields an empty vector, never an error.
    async fn read_range(&self) -> Result<Vec<Option<Row>>>;
}

#[async_trait]
impl<T: TabularStore + ?Sized> TabularStore for std::sync::Arc<T> {
    async fn append(&self, row: Row) -> Result<()> {
        (**self).append(row).await
    }

    async fn read_range(&self) -> Result<Vec<Option<Row>>> {
        (**self).read_range().await
    }
}
