// Application layer: the HTTP surface the Functions host forwards requests to.

pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
