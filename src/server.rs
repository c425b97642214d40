use std::sync::Arc;

use anyhow::Context;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::info;

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::database::EntityStore;
use crate::handlers::{protected, public};
use crate::middleware::{security_headers_middleware, CorsPolicy};
use crate::services::{AuthService, CredentialStore, OrderService, ProductService};

/// Shared, immutable per-process state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn EntityStore>,
    pub auth: Arc<AuthService>,
    pub products: Arc<ProductService>,
    pub orders: Arc<OrderService>,
    pub cors: Arc<CorsPolicy>,
}

impl AppState {
    /// Wire every service over one store.
    pub fn new(config: AppConfig, store: Arc<dyn EntityStore>) -> anyhow::Result<Self> {
        let tokens = TokenService::new(&config.security.jwt_secret, config.security.jwt_expiry_hours)
            .context("failed to initialise token service")?;
        let credentials = CredentialStore::new(store.clone());

        Ok(Self {
            auth: Arc::new(AuthService::new(credentials, tokens)),
            products: Arc::new(ProductService::new(store.clone())),
            orders: Arc::new(OrderService::new(store.clone())),
            cors: Arc::new(CorsPolicy::from_config(&config.security)),
            config: Arc::new(config),
            store,
        })
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(public::system::root))
        .route("/health", get(public::system::health))
        .route("/auth/register", post(public::auth::register))
        .route("/auth/login", post(public::auth::login))
        // Reads are public, mutations take a bearer token
        .route(
            "/products",
            get(public::products::list).post(protected::products::create),
        )
        .route(
            "/products/:id",
            get(public::products::show)
                .put(protected::products::update)
                .delete(protected::products::delete),
        )
        // Protected
        .route("/auth/me", get(protected::auth::me))
        .route("/orders", get(protected::orders::list).post(protected::orders::create))
        .route("/orders/:id", get(protected::orders::show))
        .fallback(public::system::not_found)
        // Global middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn_with_state(
                    state.cors.clone(),
                    security_headers_middleware,
                ))
                .layer(RequestBodyLimitLayer::new(state.config.server.max_request_size_bytes)),
        )
        .with_state(state)
}

/// Bind and serve until Ctrl-C.
pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let bind_addr = state.config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!(
        "Storefront API listening on http://{} ({:?})",
        bind_addr, state.config.environment
    );

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        // Without a signal handler, run until killed.
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
