// Domain layer: the counter document and the store port it is persisted through.

pub mod model;
pub mod ports;
