use duckdb::Connection;
use shoplytics::config::Config;
use shoplytics::query::cache::ResponseCache;
use shoplytics::server::{self, AppState};
use shoplytics::storage::store::Datastore;
use shoplytics::storage::{import, migrations};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shoplytics=info,tower_http=info".into()),
        )
        .init();

    // Load configuration
    let config_path = std::env::args().nth(1);
    let config = Config::load(config_path.as_deref().map(std::path::Path::new));

    tracing::info!(
        host = %config.host,
        port = config.port,
        data_dir = %config.data_dir.display(),
        "Starting Shoplytics"
    );

    let store = Datastore::empty();
    let state = Arc::new(AppState {
        store: store.clone(),
        cache: ResponseCache::new(config.cache_ttl_secs),
        default_limit: config.default_limit,
    });

    // Bootstrap off the accept path: the server answers 503 on the data
    // routes until the import finishes and the connection is installed.
    let orders_path = config.orders_path();
    let customers_path = config.customers_path();
    tokio::task::spawn_blocking(move || {
        let conn = match Connection::open_in_memory() {
            Ok(conn) => conn,
            Err(e) => {
                tracing::error!(error = %e, "Failed to open DuckDB; data routes stay unavailable");
                return;
            }
        };
        if let Err(e) = migrations::run_migrations(&conn) {
            tracing::error!(error = %e, "Failed to run migrations; data routes stay unavailable");
            return;
        }

        if orders_path.exists() {
            match import::import_orders(&conn, &orders_path) {
                Ok(count) => tracing::info!(count, path = %orders_path.display(), "Imported orders"),
                Err(e) => {
                    tracing::error!(error = %e, "Order import failed; data routes stay unavailable");
                    return;
                }
            }
        } else {
            tracing::warn!(path = %orders_path.display(), "No order export found, starting empty");
        }

        if customers_path.exists() {
            match import::import_customers(&conn, &customers_path) {
                Ok(count) => {
                    tracing::info!(count, path = %customers_path.display(), "Imported customers");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Customer import failed; data routes stay unavailable");
                    return;
                }
            }
        } else {
            tracing::warn!(path = %customers_path.display(), "No customer export found, starting empty");
        }

        store.install(conn);
        tracing::info!("Dataset ready");
    });

    let app = server::build_router(state, config.frontend_origin.as_deref());
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind to {addr}: {e}"));

    tracing::info!(addr = %addr, "Listening");
    axum::serve(listener, app).await.expect("Server error");
}
