pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::ServeArgs;

pub use adapters::{CosmosClient, CosmosCounterStore};
pub use app::{build_router, AppState};
pub use config::FunctionConfig;
pub use crate::core::counter::CounterService;
pub use domain::model::CounterDocument;
pub use utils::error::{CounterError, ErrorCategory, Result};
