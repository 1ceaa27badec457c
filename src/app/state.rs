use crate::core::counter::CounterService;
use crate::domain::ports::CounterStore;
use std::sync::Arc;

/// Router state. Built once at startup; every request shares the same
/// service and therefore the same database client.
pub struct AppState<S: CounterStore> {
    pub counter: Arc<CounterService<S>>,
}

impl<S: CounterStore> AppState<S> {
    pub fn new(service: CounterService<S>) -> Self {
        Self {
            counter: Arc::new(service),
        }
    }
}

// Manual impl: deriving would require `S: Clone`.
impl<S: CounterStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            counter: Arc::clone(&self.counter),
        }
    }
}
