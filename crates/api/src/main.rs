//! API server entry point.

use accounting_client::HttpAccountingClient;
use api::config::Config;
use journal::{InMemoryJournal, JournalStore, PostgresJournal};
use metrics_exporter_prometheus::PrometheusHandle;
use saga::RetryPolicy;
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

/// Builds the app around the given journal and runs the server.
async fn serve<J>(journal: J, config: Config, metrics_handle: PrometheusHandle)
where
    J: JournalStore + Clone + 'static,
{
    let client = HttpAccountingClient::new(&config.accounting_base_url, config.accounting_timeout)
        .expect("failed to build accounting client");

    let state = api::create_state(journal, client, RetryPolicy::default());
    let app = api::create_app(state, metrics_handle);

    let addr = config.addr();
    tracing::info!(%addr, accounting_url = %config.accounting_base_url, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}

#[tokio::main]
async fn main() {
    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Install Prometheus metrics recorder
    let prometheus_builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let metrics_handle = prometheus_builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    let config = Config::from_env();

    // 3. Pick the journal: Postgres when DATABASE_URL is set, otherwise
    // in-memory (useful for local development)
    match std::env::var("DATABASE_URL") {
        Ok(database_url) => {
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(5)
                .connect(&database_url)
                .await
                .expect("failed to connect to Postgres");
            let journal = PostgresJournal::new(pool);
            journal
                .run_migrations()
                .await
                .expect("failed to run migrations");
            tracing::info!("using Postgres journal");
            serve(journal, config, metrics_handle).await;
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set, using in-memory journal");
            serve(InMemoryJournal::new(), config, metrics_handle).await;
        }
    }
}
