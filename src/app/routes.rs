use crate::app::state::AppState;
use crate::domain::ports::CounterStore;
use crate::utils::error::{CounterError, ErrorCategory};
use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};

/// The Functions host forwards `increment-counter` under its `api` prefix.
pub const INCREMENT_ROUTE: &str = "/api/increment-counter";

pub const ERROR_BODY: &str = "An error occurred while processing the request.";

pub fn build_router<S: CounterStore + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route(INCREMENT_ROUTE, any(increment_counter::<S>))
        .with_state(state)
}

pub async fn increment_counter<S: CounterStore + 'static>(
    State(state): State<AppState<S>>,
    method: Method,
) -> Response {
    tracing::info!(%method, "Increment counter function processed a request");

    match state.counter.increment().await {
        Ok(new_value) => {
            tracing::info!(id = state.counter.counter_id(), new_value, "Counter incremented");
            plain_text(
                StatusCode::OK,
                format!("Counter value incremented to {}", new_value),
            )
        }
        Err(e) => {
            log_failure(&e);
            plain_text(StatusCode::INTERNAL_SERVER_ERROR, ERROR_BODY.to_string())
        }
    }
}

fn plain_text(status: StatusCode, body: String) -> Response {
    (status, [(CONTENT_TYPE, "text/plain")], body).into_response()
}

// Callers only ever see ERROR_BODY; the detail goes to the log.
fn log_failure(err: &CounterError) {
    match err.category() {
        ErrorCategory::Transient => tracing::warn!(
            error = %err,
            retryable = err.is_retryable(),
            "Counter update failed on a transient database error"
        ),
        ErrorCategory::NotFound => tracing::error!(
            error = %err,
            "Counter document is missing; it has to be provisioned before the function is called"
        ),
        ErrorCategory::Auth => tracing::error!(
            error = %err,
            "Database rejected the function's credentials"
        ),
        category => tracing::error!(error = %err, ?category, "An error occurred"),
    }
}
