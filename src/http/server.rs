//! Public API server setup.
//!
//! # Responsibilities
//! - Create the Axum router with the `/v1` routes and the documentation routes
//! - Wire up middleware (request ID, tracing, metrics, timeout, body limit, CORS)
//! - Serve on a listener until the shutdown broadcast fires

use std::time::Duration;

use axum::{
    http::{header, request::Parts, HeaderValue, Method},
    middleware, Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::cache::MovieCache;
use crate::config::GatewayConfig;
use crate::http::handlers::{api_routes, meta_routes};
use crate::http::state::AppState;
use crate::lifecycle::shutdown;
use crate::observability::metrics::track_requests;
use crate::providers::Providers;

/// HTTP server for the public API.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Build the providers and the router for `config`.
    pub fn new(config: GatewayConfig, cache: MovieCache) -> Result<Self, reqwest::Error> {
        let providers = Providers::from_config(&config, cache)?;
        Ok(Self::from_state(AppState::new(config, providers)))
    }

    pub fn from_state(state: AppState) -> Self {
        let router = Self::build_router(state);
        Self { router }
    }

    /// The fully layered router, for serving elsewhere or for tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    #[allow(deprecated)]
    fn build_router(state: AppState) -> Router {
        let config = state.config.clone();

        Router::new()
            .nest("/v1", api_routes())
            .merge(meta_routes())
            .with_state(state)
            .layer(middleware::from_fn(track_requests))
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(cors_layer(&config.public.domain))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Public API listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("Public API stopped");
        Ok(())
    }
}

/// Origins whose value contains the public domain may call with credentials.
fn cors_layer(domain: &str) -> CorsLayer {
    let domain = domain.to_string();
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _: &Parts| {
            origin.to_str().is_ok_and(|o| o.contains(domain.as_str()))
        }))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
