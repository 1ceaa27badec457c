pub mod counter;

pub use crate::domain::model::CounterDocument;
pub use crate::domain::ports::CounterStore;
pub use crate::utils::error::Result;
