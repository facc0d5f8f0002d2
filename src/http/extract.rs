//! Request extractors shared by the handlers.
//!
//! # Responsibilities
//! - Validate UUID path parameters into the 422 body clients expect
//! - Parse list queries leniently (a malformed query string means defaults)
//! - Resolve the caller's token, required or optional

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::auth::{token_from_headers, TokenPayload};
use crate::error::{ApiError, HttpValidationError};
use crate::http::state::AppState;
use crate::paging::ListQuery;

/// Parse a path segment as a hyphenated UUID, reporting `field` on failure.
///
/// The simple, braced and URN forms `Uuid::parse_str` also takes are rejected.
pub fn parse_uuid(raw: &str, field: &str) -> Result<Uuid, ApiError> {
    let hyphenated = raw.len() == 36
        && raw
            .bytes()
            .enumerate()
            .all(|(i, b)| matches!(i, 8 | 13 | 18 | 23) == (b == b'-'));
    hyphenated
        .then(|| Uuid::parse_str(raw).ok())
        .flatten()
        .ok_or_else(|| HttpValidationError::invalid_uuid(field).into())
}

/// List query that never rejects. A repeated key counts as absent; the others still apply.
#[derive(Debug, Default)]
pub struct ListParams(pub ListQuery);

impl<S: Send + Sync> FromRequestParts<S> for ListParams {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let pairs = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
            .map(|Query(pairs)| pairs)
            .unwrap_or_default();
        Ok(Self(ListQuery {
            limit: single_value(&pairs, "limit"),
            skip: single_value(&pairs, "skip"),
            sort: single_value(&pairs, "sort"),
            sort_dir: single_value(&pairs, "sort_dir"),
        }))
    }
}

fn single_value(pairs: &[(String, String)], key: &str) -> Option<String> {
    let mut values = pairs.iter().filter(|(k, _)| k == key).map(|(_, v)| v);
    match (values.next(), values.next()) {
        (Some(value), None) => Some(value.clone()),
        _ => None,
    }
}

/// The caller's verified token. Missing → 401 with a detail, invalid → bare 401.
#[derive(Debug, Clone)]
pub struct RequireToken(pub TokenPayload);

impl FromRequestParts<AppState> for RequireToken {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let raw = token_from_headers(&parts.headers, state.cookie_name())
            .ok_or(ApiError::Unauthorized(Some("Missing token")))?;
        let payload = state.tokens.verify(raw).map_err(|e| {
            tracing::debug!(error = %e, "Rejected token");
            ApiError::Unauthorized(None)
        })?;
        Ok(Self(payload))
    }
}

/// The caller's token when one is sent. An invalid token is still a bare 401.
#[derive(Debug, Clone)]
pub struct OptionalToken(pub Option<TokenPayload>);

impl FromRequestParts<AppState> for OptionalToken {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match token_from_headers(&parts.headers, state.cookie_name()) {
            None => Ok(Self(None)),
            Some(raw) => state
                .tokens
                .verify(raw)
                .map(|payload| Self(Some(payload)))
                .map_err(|_| ApiError::Unauthorized(None)),
        }
    }
}

/// Body as a JSON object; anything else (including malformed JSON) is an empty object.
pub fn json_object(body: &[u8]) -> Map<String, Value> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

/// Integer value of `field`, accepting numbers and numeric strings.
pub fn integer_field(body: &Map<String, Value>, field: &str) -> Option<i64> {
    match body.get(field)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Non-empty string value of `field`.
pub fn string_field(body: &Map<String, Value>, field: &str) -> Option<String> {
    body.get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}
