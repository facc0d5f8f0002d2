//! Credential routes: token issuance and the cookie session.

use axum::{
    body::Bytes,
    extract::{rejection::FormRejection, State},
    http::{header, HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse, Response},
    Form, Json,
};
use serde::Deserialize;

use crate::auth::cookie;
use crate::error::{ApiError, HttpValidationError, AUTH_PASSTHROUGH_CODES};
use crate::http::extract::{json_object, string_field};
use crate::http::state::AppState;
use crate::models::{Token, LOGIN_AVATAR_SIZE};

#[derive(Debug, Default, Deserialize)]
pub struct Credentials {
    username: Option<String>,
    password: Option<String>,
}

impl Credentials {
    /// Both fields, or the 422 clients expect when either is missing.
    fn require(self) -> Result<(String, String), ApiError> {
        match (self.username, self.password) {
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => Ok((u, p)),
            _ => Err(HttpValidationError::missing_credentials().into()),
        }
    }
}

/// `POST /v1/auth/authorize`
pub async fn authorize(
    State(state): State<AppState>,
    form: Result<Form<Credentials>, FormRejection>,
) -> Result<Json<Token>, ApiError> {
    let (username, password) = form.map(|Form(c)| c).unwrap_or_default().require()?;

    let token = state
        .providers
        .users
        .access_token(&username, &password)
        .await
        .map_err(|e| ApiError::from_upstream(e, AUTH_PASSTHROUGH_CODES))?;
    Ok(Json(token))
}

/// `POST /v1/auth/log-in`
pub async fn log_in(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let body = json_object(&body);
    let credentials = Credentials {
        username: string_field(&body, "username"),
        password: string_field(&body, "password"),
    };
    let (username, password) = credentials.require()?;

    let logged_in = cookie::read(&headers, state.cookie_name())
        .is_some_and(|raw| state.tokens.verify(raw).is_ok());
    if logged_in {
        return Err(ApiError::BadRequest("Already logged in."));
    }

    let token = state
        .providers
        .users
        .access_token(&username, &password)
        .await
        .map_err(|e| ApiError::from_upstream(e, AUTH_PASSTHROUGH_CODES))?;

    let payload = state
        .tokens
        .verify(&token.access_token)
        .map_err(|e| ApiError::Internal(format!("users service issued an unverifiable token: {e}")))?;

    let user = state
        .providers
        .users
        .by_id_sized(payload.sub, LOGIN_AVATAR_SIZE)
        .await
        .map_err(|e| ApiError::from_upstream(e, AUTH_PASSTHROUGH_CODES))?;

    let set_cookie = cookie::issue(
        state.cookie_name(),
        &token.access_token,
        payload.remaining_secs(),
        state.secure_cookies(),
    )
    .ok_or_else(|| ApiError::Internal("token is not a valid cookie value".to_string()))?;

    tracing::info!(user_id = %payload.sub, "User logged in");
    Ok((AppendHeaders([(header::SET_COOKIE, set_cookie)]), Json(user)).into_response())
}

/// `GET /v1/auth/log-out`
pub async fn log_out(State(state): State<AppState>) -> Response {
    match cookie::clear(state.cookie_name(), state.secure_cookies()) {
        Some(clear) => (StatusCode::OK, AppendHeaders([(header::SET_COOKIE, clear)])).into_response(),
        None => StatusCode::OK.into_response(),
    }
}
