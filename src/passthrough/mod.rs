//! Services API: the backend-facing gateway.
//!
//! # Responsibilities
//! - Expose every microservice under its `/api/<service>` prefix on a second listener
//! - Forward method, path, query, headers and body unchanged
//! - Retry idempotent requests, answer 502 when a service is unreachable
//!
//! # Design Decisions
//! - No reshaping: clients of this listener speak the microservices' own API
//! - Raw hyper client instead of the typed one used by the providers

pub mod forward;
pub mod matcher;

use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, routing::any, Router};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::lifecycle::shutdown;
use crate::observability::metrics::track_requests;
use crate::resilience::RetryBudget;
use forward::{forward, ForwardState};
pub use matcher::{RouteError, ServiceRoute, ServiceRoutes};

pub struct ServicesApiServer {
    router: Router,
}

impl ServicesApiServer {
    pub fn new(config: &GatewayConfig) -> Result<Self, RouteError> {
        let routes = Arc::new(ServiceRoutes::from_config(&config.upstreams)?);

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.timeouts.connect_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        let state = ForwardState {
            routes,
            client,
            retries: config.retries.clone(),
            budget: Arc::new(RetryBudget::new(config.retries.budget_ratio, 10)),
            upstream_timeout: Duration::from_secs(config.timeouts.upstream_secs),
            max_body_size: config.security.max_body_size,
        };

        Ok(Self {
            router: Self::build_router(config, state),
        })
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: ForwardState) -> Router {
        Router::new()
            .route("/{*path}", any(forward))
            .route("/", any(forward))
            .with_state(state)
            .layer(middleware::from_fn(track_requests))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Services API listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("Services API stopped");
        Ok(())
    }
}
