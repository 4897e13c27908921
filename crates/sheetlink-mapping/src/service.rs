use crate::error::{MappingError, Result};
use crate::mappings::{CreateMapping, Mappings};
use async_trait::async_trait;
use sheetlink_core::{ColumnLayout, TabularStore, UrlMapping};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, trace};

/// What `create` does when the short url is already stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Append regardless; `list` returns every copy.
    #[default]
    Allow,
    /// Check the table before appending and refuse duplicates.
    ///
    /// Creates are serialized through one lock per service, so the check
    /// only holds against writers sharing this service instance.
    Reject,
}

/// A concrete implementation of the [`Mappings`] trait.
///
/// This service wraps a [`TabularStore`] and handles:
/// - laying mappings out as rows (and back) with one [`ColumnLayout`]
/// - the duplicate short url policy
#[derive(Debug)]
pub struct MappingService<S> {
    store: Arc<S>,
    layout: ColumnLayout,
    duplicates: DuplicatePolicy,
    write_lock: Arc<Mutex<()>>,
}

// Clones share the store and the write lock.
impl<S> Clone for MappingService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            layout: self.layout,
            duplicates: self.duplicates,
            write_lock: Arc::clone(&self.write_lock),
        }
    }
}

impl<S: TabularStore> MappingService<S> {
    /// Creates a service with the canonical layout that allows duplicates.
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(store),
            layout: ColumnLayout::default(),
            duplicates: DuplicatePolicy::default(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn with_layout(mut self, layout: ColumnLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_duplicate_policy(mut self, duplicates: DuplicatePolicy) -> Self {
        self.duplicates = duplicates;
        self
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    async fn read_mappings(&self) -> Result<Vec<UrlMapping>> {
        let rows = self.store.read_range().await?;

        Ok(rows
            .into_iter()
            .flatten()
            .map(|row| self.layout.decode(&row))
            .collect())
    }

    async fn append(&self, mapping: &UrlMapping) -> Result<()> {
        self.store.append(self.layout.encode(mapping)).await?;
        Ok(())
    }
}

#[async_trait]
impl<S: TabularStore> Mappings for MappingService<S> {
    async fn create(&self, request: CreateMapping) -> Result<UrlMapping> {
        let mapping = request.into_mapping();
        trace!(short_url = %mapping.short_url, "creating mapping");

        match self.duplicates {
            DuplicatePolicy::Allow => self.append(&mapping).await?,
            DuplicatePolicy::Reject => {
                let _guard = self.write_lock.lock().await;

                let taken = self
                    .read_mappings()
                    .await?
                    .iter()
                    .any(|existing| existing.short_url == mapping.short_url);
                if taken {
                    debug!(short_url = %mapping.short_url, "short url already stored");
                    return Err(MappingError::Conflict(mapping.short_url));
                }

                self.append(&mapping).await?;
            }
        }

        debug!(short_url = %mapping.short_url, long_url = %mapping.long_url, "mapping created");
        Ok(mapping)
    }

    async fn list(&self) -> Result<Vec<UrlMapping>> {
        let mappings = self.read_mappings().await?;
        trace!(count = mappings.len(), "listed mappings");
        Ok(mappings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetlink_core::{Row, StorageError};
    use sheetlink_storage::InMemoryTable;

    fn test_service() -> MappingService<InMemoryTable> {
        MappingService::new(InMemoryTable::new())
    }

    fn mapping(short_url: &str, long_url: &str) -> UrlMapping {
        UrlMapping::new(short_url, long_url)
    }

    /// A store that reports some rows as absent, like a sheet API returning `null`.
    struct SparseStore(Vec<Option<Row>>);

    #[async_trait]
    impl TabularStore for SparseStore {
        async fn append(&self, _row: Row) -> sheetlink_core::error::Result<()> {
            Ok(())
        }

        async fn read_range(&self) -> sheetlink_core::error::Result<Vec<Option<Row>>> {
            Ok(self.0.clone())
        }
    }

    /// A store whose every call fails the way an expired credential would.
    struct RejectingStore;

    #[async_trait]
    impl TabularStore for RejectingStore {
        async fn append(&self, _row: Row) -> sheetlink_core::error::Result<()> {
            Err(StorageError::Unauthorized("invalid_grant".to_string()))
        }

        async fn read_range(&self) -> sheetlink_core::error::Result<Vec<Option<Row>>> {
            Err(StorageError::Unavailable("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn create_then_list_contains_mapping() {
        let service = test_service();

        let created = service
            .create(CreateMapping::new("abc123", "https://example.com"))
            .await
            .unwrap();
        assert_eq!(created, mapping("abc123", "https://example.com"));

        let listed = service.list().await.unwrap();
        assert_eq!(listed, vec![mapping("abc123", "https://example.com")]);
    }

    #[tokio::test]
    async fn create_writes_short_url_first() {
        let service = test_service();

        service
            .create(CreateMapping::new("abc123", "https://example.com"))
            .await
            .unwrap();

        let rows = service.store().read_range().await.unwrap();
        assert_eq!(
            rows,
            vec![Some(vec!["abc123".to_string(), "https://example.com".to_string()])]
        );
    }

    #[tokio::test]
    async fn list_preserves_insertion_order() {
        let service = test_service();

        let requests = [
            ("s1", "https://one.example"),
            ("s2", "https://two.example"),
            ("s3", "https://three.example"),
        ];
        for (short_url, long_url) in requests {
            service.create(CreateMapping::new(short_url, long_url)).await.unwrap();
        }

        let listed = service.list().await.unwrap();
        assert_eq!(
            listed,
            vec![
                mapping("s1", "https://one.example"),
                mapping("s2", "https://two.example"),
                mapping("s3", "https://three.example"),
            ]
        );
    }

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        let service = test_service();

        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicates_are_kept_by_default() {
        let service = test_service();

        service.create(CreateMapping::new("dup", "https://one.example")).await.unwrap();
        service.create(CreateMapping::new("dup", "https://two.example")).await.unwrap();

        let listed = service.list().await.unwrap();
        assert_eq!(
            listed,
            vec![mapping("dup", "https://one.example"), mapping("dup", "https://two.example")]
        );
    }

    #[tokio::test]
    async fn list_is_repeatable() {
        let service = test_service();
        service.create(CreateMapping::new("abc", "https://example.com")).await.unwrap();

        let first = service.list().await.unwrap();
        let second = service.list().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn missing_fields_are_stored_empty() {
        let service = test_service();

        let created = service.create(CreateMapping::default()).await.unwrap();
        assert_eq!(created, mapping("", ""));

        let listed = service.list().await.unwrap();
        assert_eq!(listed, vec![mapping("", "")]);
    }

    #[tokio::test]
    async fn short_rows_are_padded_and_extra_cells_ignored() {
        let table = InMemoryTable::with_rows([
            vec!["abc".to_string()],
            vec![],
            vec!["def".to_string(), "https://example.org".to_string(), "extra".to_string()],
        ]);
        let service = MappingService::new(table);

        let listed = service.list().await.unwrap();
        assert_eq!(
            listed,
            vec![mapping("abc", ""), mapping("", ""), mapping("def", "https://example.org")]
        );
    }

    #[tokio::test]
    async fn absent_rows_are_skipped_but_blank_rows_kept() {
        let service = MappingService::new(SparseStore(vec![
            Some(vec!["abc".to_string(), "https://example.com".to_string()]),
            None,
            Some(vec![]),
        ]));

        let listed = service.list().await.unwrap();
        assert_eq!(listed, vec![mapping("abc", "https://example.com"), mapping("", "")]);
    }

    #[test]
    fn clones_share_store_and_lock() {
        let service = MappingService::new(RejectingStore);
        let cloned = service.clone();

        assert!(Arc::ptr_eq(&service.store, &cloned.store));
        assert!(Arc::ptr_eq(&service.write_lock, &cloned.write_lock));
    }

    #[tokio::test]
    async fn long_first_layout_reads_legacy_rows() {
        let table = InMemoryTable::with_rows([vec![
            "https://example.com".to_string(),
            "abc123".to_string(),
        ]]);
        let service = MappingService::new(table).with_layout(ColumnLayout::LONG_FIRST);

        service.create(CreateMapping::new("def456", "https://example.org")).await.unwrap();

        let listed = service.list().await.unwrap();
        assert_eq!(
            listed,
            vec![mapping("abc123", "https://example.com"), mapping("def456", "https://example.org")]
        );
    }

    #[tokio::test]
    async fn reject_policy_refuses_duplicates() {
        let service = test_service().with_duplicate_policy(DuplicatePolicy::Reject);

        service.create(CreateMapping::new("dup", "https://one.example")).await.unwrap();
        let err = service
            .create(CreateMapping::new("dup", "https://two.example"))
            .await
            .unwrap_err();
        assert!(matches!(err, MappingError::Conflict(ref code) if code == "dup"));

        let listed = service.list().await.unwrap();
        assert_eq!(listed, vec![mapping("dup", "https://one.example")]);
    }

    #[tokio::test]
    async fn reject_policy_holds_under_concurrency() {
        let service = test_service().with_duplicate_policy(DuplicatePolicy::Reject);
        let mut handles = vec![];

        for i in 0..10u64 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service
                    .create(CreateMapping::new("contested", format!("https://example{i}.com")))
                    .await
                    .is_ok()
            }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap() {
                successes += 1;
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(service.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn storage_failures_propagate() {
        let service = MappingService::new(RejectingStore);

        let err = service
            .create(CreateMapping::new("abc", "https://example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, MappingError::Storage(StorageError::Unauthorized(_))));

        let err = service.list().await.unwrap_err();
        assert!(matches!(err, MappingError::Storage(StorageError::Unavailable(_))));
    }
}
