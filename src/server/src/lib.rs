use axum::{Json, Router, middleware, response::IntoResponse, routing::get, routing::post};
use common::auth::{Authenticator, auth_middleware};
use common::config::Configuration;
use common::store::ClientStore;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub mod cache;
pub mod endpoints;
pub mod export;

use cache::ResponseCache;

/// Shared state available to all route handlers
pub trait ServerState: Clone + Send + Sync + 'static {
    fn store(&self) -> &ClientStore;
    fn config(&self) -> &Configuration;
    fn authenticator(&self) -> &Arc<Authenticator>;
    fn cache(&self) -> &ResponseCache;
}

#[derive(Clone)]
pub struct AppState {
    store: ClientStore,
    config: Configuration,
    authenticator: Arc<Authenticator>,
    cache: ResponseCache,
}

impl AppState {
    /// Create the application state from a connected store and configuration
    pub fn new(store: ClientStore, config: Configuration) -> Self {
        let authenticator = Arc::new(Authenticator::new(&config.auth, store.clone()));
        let cache = ResponseCache::new(&config.cache);

        Self {
            store,
            config,
            authenticator,
            cache,
        }
    }
}

impl ServerState for AppState {
    fn store(&self) -> &ClientStore {
        &self.store
    }

    fn config(&self) -> &Configuration {
        &self.config
    }

    fn authenticator(&self) -> &Arc<Authenticator> {
        &self.authenticator
    }

    fn cache(&self) -> &ResponseCache {
        &self.cache
    }
}

/// Create a new router instance with all routes configured
pub fn create_router<S: ServerState>(state: S) -> Router {
    // Bearer-token middleware shared by the protected routes
    let authenticator = state.authenticator().clone();
    let auth_layer =
        middleware::from_fn(move |req, next| auth_middleware(authenticator.clone(), req, next));

    Router::new()
        // Public endpoints
        .route("/", get(root))
        .route("/health", get(health_check::<S>))
        .route("/api/v1/auth/login", post(endpoints::auth::login::<S>))
        // Protected endpoints
        .route(
            "/api/v1/auth/me",
            get(endpoints::auth::me::<S>).layer(auth_layer.clone()),
        )
        .merge(endpoints::clients::router::<S>().layer(auth_layer))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Root endpoint: service identification
async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Cadastro Admin API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Health check endpoint: reports database connectivity
async fn health_check<S: ServerState>(
    axum::extract::State(state): axum::extract::State<S>,
) -> impl IntoResponse {
    let database = match state.store().ping().await {
        Ok(()) => "connected",
        Err(e) => {
            log::warn!("Health check database ping failed: {e}");
            "disconnected"
        }
    };

    Json(serde_json::json!({
        "status": "healthy",
        "database": database,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
