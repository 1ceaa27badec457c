use crate::domain::model::{COUNTER_ID, COUNTER_PARTITION_KEY};
use crate::domain::ports::CounterStore;
use crate::utils::error::{CounterError, Result};

/// Read-modify-write of the single visit counter document.
///
/// There is no conditional write on `_etag`: two invocations racing on the
/// same value both persist `value + 1`.
pub struct CounterService<S: CounterStore> {
    store: S,
    id: String,
    partition_key: String,
}

impl<S: CounterStore> CounterService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            id: COUNTER_ID.to_string(),
            partition_key: COUNTER_PARTITION_KEY.to_string(),
        }
    }

    pub fn counter_id(&self) -> &str {
        &self.id
    }

    /// Increments the stored counter and returns the new value.
    pub async fn increment(&self) -> Result<u64> {
        tracing::debug!(id = %self.id, "Reading counter document");
        let mut document = self.store.read_item(&self.id, &self.partition_key).await?;

        let current = document.value;
        let new_value = current
            .checked_add(1)
            .ok_or(CounterError::Overflow { value: current })?;
        document.value = new_value;

        tracing::debug!(id = %self.id, current, new_value, "Upserting counter document");
        self.store.upsert_item(&document).await?;

        Ok(new_value)
    }
}
