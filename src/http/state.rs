//! Shared state injected into every public API handler.

use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::config::GatewayConfig;
use crate::providers::Providers;

#[derive(Clone)]
pub struct AppState {
    pub providers: Arc<Providers>,
    pub tokens: Arc<TokenVerifier>,
    pub config: Arc<GatewayConfig>,
}

impl AppState {
    pub fn new(config: GatewayConfig, providers: Providers) -> Self {
        Self {
            tokens: Arc::new(TokenVerifier::new(&config.auth.secret_key)),
            providers: Arc::new(providers),
            config: Arc::new(config),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.config.auth.cookie_name
    }

    /// Whether cookies should carry the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        self.config.public.scheme == "https"
    }
}
