//! Read-only retail analytics dashboard over the `retail_analytics` database.
//!
//!
//!
//! # Pages
//!
//! Sidebar navigation, one route per page. `/` redirects to `/about`.
//! - **About**: what the dashboard is for, static text.
//! - **Overview**: headline metrics across all four collections, revenue by state, category mix, order
//!   status and payment method breakdowns.
//! - **Products**: pricing and stock per category, price distribution, full catalog.
//! - **Customers**: geography, loyalty tiers, customer directory.
//! - **Orders**: revenue, fulfillment status, order value distribution, recent orders.
//! - **Reviews**: rating distribution, top rated products, helpfulness, recent reviews.
//!
//!
//!
//! # Data Access
//!
//! - Full collection reads and three aggregations, see [`queries`].
//! - Every result goes through the [`cache::QueryCache`] with a fixed TTL.
//! - A failing query never fails the page. The error is logged, shown inline, and the page renders with
//!   whatever else loaded.
//! - The dashboard never writes to the database.
//!
//!
//!
//! # Refresh
//!
//! Drop cached results without waiting for the TTL.
//! ```sh
//! curl -X POST localhost:8501/refresh
//! curl -X POST localhost:8501/refresh/top_products
//! ```
//!
//!
//!
//! # Configuration
//!
//! | Variable | Default |
//! |---|---|
//! | `COSMOS_CONNECTION_STRING` | required |
//! | `RETAIL_DATABASE` | `retail_analytics` |
//! | `DASHBOARD_PORT` | `8501` |
//! | `CACHE_TTL_SECS` | `300` |
//!
//! A missing connection string or an unreachable database stops startup.

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post},
};
use records::{mongo::MongoStore, store::DocumentStore};
use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

pub mod analytics;
pub mod cache;
pub mod config;
pub mod error;
pub mod html;
pub mod pages;
pub mod queries;
pub mod routes;
pub mod state;

use config::Config;
use routes::{index_handler, page_handler, refresh_all_handler, refresh_query_handler};
use state::AppState;

pub fn router<S: DocumentStore + 'static>(state: Arc<AppState<S>>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/refresh", post(refresh_all_handler::<S>))
        .route("/refresh/{query}", post(refresh_query_handler::<S>))
        .route("/{page}", get(page_handler::<S>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Loading config...");
    let config = Config::load()?;

    info!("Connecting to database...");
    let store = match MongoStore::connect(&config.store).await {
        Ok(store) => store,
        Err(e) => {
            error!("Error connecting to the database: {e}");
            return Err(e.into());
        }
    };

    let state = AppState::new(store, config.cache_ttl);

    info!("Starting server...");

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let app = router(state).layer(cors);

    let address = format!("0.0.0.0:{}", config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("Dashboard running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Dashboard shutting down...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
