//! HTTP server wiring for Sözlük (API routes, handlers, and shared state).

/// Argument parsing and startup shared by the server binaries.
pub mod entry;
/// HTTP error mapping for API handlers.
pub mod error;
/// HTTP handlers for dictionary, badge, and sync endpoints.
pub mod handlers;

pub use sozluk_core::{config, db, models, AppError, Config, Database, DEFAULT_PORT};
pub use sozluk_core::{SyncManager, SyncStatus};

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use sozluk_core::sync::{DataSource, HttpSource};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

const API_CONTENT_SECURITY_POLICY: &str = "default-src 'none'; frame-ancestors 'none'";

/// Shared state passed to HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub config: Arc<Config>,
    pub sync: Arc<SyncManager>,
}

impl AppState {
    /// Construct shared state that syncs from the configured object store.
    ///
    /// # Errors
    /// Returns an error when the HTTP client cannot be built.
    pub fn new(config: Config, db: Database) -> Result<Self, AppError> {
        let source = Arc::new(HttpSource::from_config(&config)?);
        Ok(Self::with_source(config, db, source))
    }

    /// Construct shared state around an explicit data source.
    pub fn with_source(config: Config, db: Database, source: Arc<dyn DataSource>) -> Self {
        let db = Arc::new(db);
        let sync = Arc::new(SyncManager::new(db.clone(), source));
        Self {
            db,
            config: Arc::new(config),
            sync,
        }
    }
}

/// Create the application router with all routes and middleware.
///
/// Public `/api/v1` and profile routes answer any origin. Admin routes only
/// accept same-host origins unless `allow_public_access` is set.
pub fn create_app(state: AppState, allow_public_access: bool) -> Router {
    let cors_port = state.config.port;
    create_app_with_cors_port(state, allow_public_access, cors_port)
}

/// Resolve the listener address from the `BIND` override and security policy.
pub fn resolve_bind_address(config: &Config, allow_public_access: bool) -> SocketAddr {
    let bind = std::env::var("BIND").ok();
    resolve_bind_address_from(config, allow_public_access, bind.as_deref())
}

fn resolve_bind_address_from(
    config: &Config,
    allow_public_access: bool,
    bind: Option<&str>,
) -> SocketAddr {
    let default_bind = SocketAddr::from(([127, 0, 0, 1], config.port));
    let requested = match bind {
        Some(value) => match value.trim().parse::<SocketAddr>() {
            Ok(addr) => addr,
            Err(err) => {
                tracing::warn!(
                    "Invalid BIND='{}': {}. Falling back to {}",
                    value,
                    err,
                    default_bind
                );
                default_bind
            }
        },
        None => default_bind,
    };

    if allow_public_access || requested.ip().is_loopback() {
        return requested;
    }

    tracing::warn!(
        "Non-loopback bind {} requested without ALLOW_PUBLIC_ACCESS; forcing 127.0.0.1",
        requested
    );
    SocketAddr::from(([127, 0, 0, 1], requested.port()))
}

fn admin_cors(allow_public_access: bool, cors_port: u16) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::PUT, Method::DELETE];
    if allow_public_access {
        return CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(methods)
            .allow_headers(tower_http::cors::Any);
    }
    let origins: Vec<HeaderValue> = [
        format!("http://localhost:{}", cors_port),
        format!("http://127.0.0.1:{}", cors_port),
    ]
    .iter()
    .filter_map(|origin| HeaderValue::from_str(origin).ok())
    .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::HeaderName::from_static(sozluk_core::constants::ADMIN_KEY_HEADER),
        ])
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/word/:word",
            get(handlers::words::get_word).options(handlers::words::preflight),
        )
        .route(
            "/api/v1/autocomplete",
            get(handlers::words::suggest).options(handlers::words::preflight),
        )
        .route("/api/users/:user_id/badges", get(handlers::users::user_badges))
        .route("/api/users/:user_id/stats", get(handlers::users::user_stats))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
}

fn admin_routes(allow_public_access: bool, cors_port: u16) -> Router<AppState> {
    Router::new()
        .route(
            "/api/admin/badges",
            get(handlers::badges::list_badges).post(handlers::badges::create_badge),
        )
        .route(
            "/api/admin/badges/:slug",
            put(handlers::badges::update_badge).delete(handlers::badges::delete_badge),
        )
        .route(
            "/api/admin/badges/:slug/users/:user_id",
            post(handlers::badges::assign_badge).delete(handlers::badges::revoke_badge),
        )
        .route(
            "/api/admin/contributions",
            post(handlers::contributions::record_contribution),
        )
        .route(
            "/api/admin/sync",
            post(handlers::sync::trigger_sync).delete(handlers::sync::delete_dictionary),
        )
        .route("/api/admin/sync/status", get(handlers::sync::sync_status))
        .layer(admin_cors(allow_public_access, cors_port))
}

fn create_app_with_cors_port(state: AppState, allow_public_access: bool, cors_port: u16) -> Router {
    Router::new()
        .merge(public_routes())
        .merge(admin_routes(allow_public_access, cors_port))
        .with_state(state)
        .layer(
            tower::ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(SetResponseHeaderLayer::overriding(
                    header::CONTENT_SECURITY_POLICY,
                    HeaderValue::from_static(API_CONTENT_SECURITY_POLICY),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_FRAME_OPTIONS,
                    HeaderValue::from_static("DENY"),
                )),
        )
}

fn listener_cors_port(listener: &tokio::net::TcpListener, fallback_port: u16) -> u16 {
    listener
        .local_addr()
        .map(|addr| addr.port())
        .unwrap_or(fallback_port)
}

/// Run the Axum server with graceful shutdown support.
///
/// # Errors
/// Returns any I/O error produced by `axum::serve`.
pub async fn serve_router(
    listener: tokio::net::TcpListener,
    state: AppState,
    allow_public_access: bool,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), std::io::Error> {
    let cors_port = listener_cors_port(&listener, state.config.port);
    let app = create_app_with_cors_port(state, allow_public_access, cors_port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
}

#[cfg(test)]
mod tests {
    use super::{listener_cors_port, resolve_bind_address_from};
    use sozluk_core::{Config, DEFAULT_PORT};
    use std::net::SocketAddr;

    fn config(port: u16) -> Config {
        let mut config = Config::from_lookup(|_| None);
        config.port = port;
        config
    }

    #[tokio::test]
    async fn listener_cors_port_uses_bound_listener_port() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("listener");
        let expected = listener.local_addr().expect("listener addr").port();
        let resolved = listener_cors_port(&listener, DEFAULT_PORT);
        assert_eq!(resolved, expected);
    }

    #[test]
    fn resolve_bind_address_enforces_loopback_when_public_access_disabled() {
        let resolved = resolve_bind_address_from(&config(4040), false, Some("0.0.0.0:4040"));
        assert_eq!(resolved.ip().to_string(), "127.0.0.1");
        assert_eq!(resolved.port(), 4040);

        let public = resolve_bind_address_from(&config(4040), true, Some("0.0.0.0:4040"));
        assert_eq!(public, SocketAddr::from(([0, 0, 0, 0], 4040)));
    }

    #[test]
    fn resolve_bind_address_allows_loopback_and_invalid_fallback() {
        let loopback = resolve_bind_address_from(&config(4041), false, None);
        assert_eq!(loopback, SocketAddr::from(([127, 0, 0, 1], 4041)));

        let fallback = resolve_bind_address_from(&config(4041), false, Some("bad:host"));
        assert_eq!(fallback, SocketAddr::from(([127, 0, 0, 1], 4041)));
    }
}
