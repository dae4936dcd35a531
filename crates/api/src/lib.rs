//! HTTP API server for the invoice creation workflow.
//!
//! Exposes the saga trigger endpoint and saga status lookup, with
//! structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use accounting_client::AccountingClient;
use axum::Router;
use axum::routing::{get, post};
use journal::JournalStore;
use metrics_exporter_prometheus::PrometheusHandle;
use saga::{RetryPolicy, SagaCoordinator};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::invoices::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<J, C>(state: Arc<AppState<J, C>>, metrics_handle: PrometheusHandle) -> Router
where
    J: JournalStore + Clone + 'static,
    C: AccountingClient + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/create-invoice", post(routes::invoices::create::<J, C>))
        .route(
            "/invoice-sagas/{id}",
            get(routes::invoices::saga_status::<J, C>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state around a journal and accounting client.
pub fn create_state<J, C>(journal: J, client: C, retry: RetryPolicy) -> Arc<AppState<J, C>>
where
    J: JournalStore + Clone + 'static,
    C: AccountingClient + 'static,
{
    Arc::new(AppState {
        coordinator: SagaCoordinator::new(journal, client, retry),
    })
}
