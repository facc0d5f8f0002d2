//! Token handling.
//!
//! # Responsibilities
//! - Verify HS256 JWTs issued by the users service
//! - Locate the token in a request (bearer header first, then cookie)
//! - Build the log-in / log-out cookies
//!
//! # Design Decisions
//! - The gateway never issues tokens; it only verifies them with the shared secret
//! - The cookie lives exactly as long as the token inside it

pub mod cookie;

use std::time::{SystemTime, UNIX_EPOCH};

use axum::http::{header, HeaderMap};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims the gateway relies on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    /// User ID.
    pub sub: Uuid,
    /// Expiry as a unix timestamp.
    pub exp: u64,
}

impl TokenPayload {
    /// Seconds until expiry, zero if already expired.
    pub fn remaining_secs(&self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        self.exp.saturating_sub(now)
    }
}

pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<TokenPayload, jsonwebtoken::errors::Error> {
        jsonwebtoken::decode::<TokenPayload>(token, &self.key, &self.validation).map(|data| data.claims)
    }
}

/// Raw token from `Authorization: Bearer ...` or, failing that, the named cookie.
pub fn token_from_headers<'a>(headers: &'a HeaderMap, cookie_name: &str) -> Option<&'a str> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    bearer.or_else(|| cookie::read(headers, cookie_name))
}
