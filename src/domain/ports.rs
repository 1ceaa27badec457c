use crate::domain::model::CounterDocument;
use crate::utils::error::Result;

/// Document store holding the counter.
pub trait CounterStore: Send + Sync {
    fn read_item(
        &self,
        id: &str,
        partition_key: &str,
    ) -> impl std::future::Future<Output = Result<CounterDocument>> + Send;

    /// Insert-or-replace. Returns the document as persisted by the store.
    fn upsert_item(
        &self,
        document: &CounterDocument,
    ) -> impl std::future::Future<Output = Result<CounterDocument>> + Send;
}
