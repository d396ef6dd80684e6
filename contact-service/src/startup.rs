//! Application wiring: shared state, the router with its middleware stack, and the
//! server lifecycle.

use axum::{
    handler::HandlerWithoutStateExt,
    http::{header, HeaderName, HeaderValue, Method},
    middleware::from_fn,
    routing::get,
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics_middleware, request_id_middleware, security_headers_middleware, REQUEST_ID_HEADER,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::{DefaultOnResponse, TraceLayer},
    LatencyUnit,
};
use tracing::Level;

use crate::config::{ContactConfig, HttpConfig};
use crate::handlers;
use crate::services::{ContactStore, MongoContactStore};

/// Shared, read-only application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ContactConfig,
    pub store: Arc<dyn ContactStore>,
}

impl AppState {
    pub fn new(config: ContactConfig, store: Arc<dyn ContactStore>) -> Self {
        Self { config, store }
    }
}

/// Build the full HTTP router: API routes, probes, the unmatched-path fallback (through
/// the static asset directory when one is configured) and the middleware stack.
pub fn build_router(state: AppState) -> Router {
    let http = state.config.http.clone();

    // Unsupported methods on known paths are unknown endpoints too, not 405s
    let routes = Router::new()
        .route(
            "/api/contacts",
            get(handlers::list_contacts)
                .post(handlers::create_contact)
                .fallback(handlers::unknown_endpoint),
        )
        .route(
            "/api/contacts/:id",
            get(handlers::get_contact)
                .put(handlers::update_contact)
                .delete(handlers::delete_contact)
                .fallback(handlers::unknown_endpoint),
        )
        .route("/info", get(handlers::info).fallback(handlers::unknown_endpoint))
        .route(
            "/health",
            get(handlers::health_check).fallback(handlers::unknown_endpoint),
        )
        .route(
            "/ready",
            get(handlers::readiness_check).fallback(handlers::unknown_endpoint),
        )
        .route(
            "/metrics",
            get(handlers::metrics).fallback(handlers::unknown_endpoint),
        );

    let routes = match &http.static_dir {
        Some(dir) => {
            tracing::info!(static_dir = %dir, "Serving static assets");
            routes.fallback_service(
                ServeDir::new(dir)
                    .call_fallback_on_method_not_allowed(true)
                    .not_found_service(handlers::unknown_endpoint.into_service()),
            )
        }
        None => routes.fallback(handlers::unknown_endpoint),
    };

    routes
        .with_state(state)
        .layer(TimeoutLayer::new(Duration::from_secs(
            http.request_timeout_secs,
        )))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    let request_id = request
                        .headers()
                        .get(REQUEST_ID_HEADER)
                        .and_then(|value| value.to_str().ok())
                        .unwrap_or("-");

                    tracing::info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = %request.method(),
                        uri = %request.uri(),
                        version = ?request.version(),
                    )
                })
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Millis),
                ),
        )
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(cors_layer(&http))
}

fn cors_layer(http: &HttpConfig) -> CorsLayer {
    let origins = if http.allows_any_origin() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(http.allowed_origins.iter().filter_map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|e| tracing::error!("Ignoring invalid CORS origin '{}': {}", origin, e))
                .ok()
        }))
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Connect to MongoDB, ensure indexes, and bind the listener.
    pub async fn build(config: ContactConfig) -> Result<Self, AppError> {
        let store = MongoContactStore::connect(&config.mongodb.uri, &config.mongodb.database)
            .await
            .map_err(AppError::from)?;

        store.initialize_indexes().await.map_err(|e| {
            tracing::error!("Failed to initialize database indexes: {}", e);
            AppError::from(e)
        })?;

        Self::build_with_store(config, Arc::new(store)).await
    }

    /// Bind the listener around an already constructed store.
    pub async fn build_with_store(
        config: ContactConfig,
        store: Arc<dyn ContactStore>,
    ) -> Result<Self, AppError> {
        // Port 0 binds a random port (tests)
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(service = %config.service_name, port, "Listening");

        Ok(Self {
            port,
            listener,
            state: AppState::new(config, store),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests.
    pub async fn run_until<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = build_router(self.state);

        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown)
            .await
    }
}
