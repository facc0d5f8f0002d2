//! Prefix routing for the services API.
//!
//! # Design Decisions
//! - Prefixes match whole path segments: `/api/movies` covers `/api/movies` and `/api/movies/...`
//!   but not `/api/moviesx`
//! - Longest prefix wins
//! - Path matching is case-sensitive

use axum::http::Uri;

use crate::config::UpstreamConfig;

#[derive(Debug, thiserror::Error)]
#[error("invalid base URL for {service}: {value}")]
pub struct RouteError {
    pub service: &'static str,
    pub value: String,
}

/// One microservice reachable through the services API.
#[derive(Debug, Clone)]
pub struct ServiceRoute {
    pub prefix: String,
    pub service: &'static str,
    base_url: String,
}

impl ServiceRoute {
    pub fn new(prefix: impl Into<String>, service: &'static str, base_url: &str) -> Result<Self, RouteError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let parsed: Uri = base_url.parse().map_err(|_| RouteError {
            service,
            value: base_url.clone(),
        })?;
        if parsed.scheme().is_none() || parsed.authority().is_none() {
            return Err(RouteError {
                service,
                value: base_url,
            });
        }
        Ok(Self {
            prefix: prefix.into(),
            service,
            base_url,
        })
    }

    pub fn matches(&self, path: &str) -> bool {
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    /// Upstream URI for an incoming path and query, forwarded verbatim.
    pub fn target(&self, uri: &Uri) -> Option<Uri> {
        let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
        format!("{}{}", self.base_url, path_and_query).parse().ok()
    }
}

/// All routes, longest prefix first.
#[derive(Debug, Clone)]
pub struct ServiceRoutes {
    routes: Vec<ServiceRoute>,
}

impl ServiceRoutes {
    pub fn new(mut routes: Vec<ServiceRoute>) -> Self {
        routes.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
        Self { routes }
    }

    /// `/api/<service>` for each microservice.
    pub fn from_config(upstreams: &UpstreamConfig) -> Result<Self, RouteError> {
        let routes = upstreams
            .all()
            .into_iter()
            .map(|(service, url)| ServiceRoute::new(format!("/api/{service}"), service, url))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(routes))
    }

    pub fn match_path(&self, path: &str) -> Option<&ServiceRoute> {
        self.routes.iter().find(|route| route.matches(path))
    }
}
