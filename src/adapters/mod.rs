// Adapters layer: concrete implementations of the domain ports for external systems.

pub mod auth;
pub mod cosmos;

pub use cosmos::{CosmosClient, CosmosCounterStore};
