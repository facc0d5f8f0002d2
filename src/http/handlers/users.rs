//! User routes.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::ApiError;
use crate::http::extract::{parse_uuid, ListParams, OptionalToken, RequireToken};
use crate::http::state::AppState;
use crate::models::{Info, PublicUser, UserList};
use crate::paging::Pagination;

/// `GET /v1/users`
pub async fn list(
    State(state): State<AppState>,
    ListParams(query): ListParams,
) -> Result<Json<UserList>, ApiError> {
    let pagination = Pagination::from_query(&query);
    let users = state.providers.users.list(pagination).await?;
    let info = Info::from_page(pagination.skip, users.len());
    Ok(Json(UserList { users, info }))
}

/// `GET /v1/users/me`
pub async fn me(
    State(state): State<AppState>,
    RequireToken(caller): RequireToken,
) -> Result<Json<PublicUser>, ApiError> {
    Ok(Json(state.providers.users.by_id(caller.sub).await?))
}

/// `GET /v1/users/{id}`
pub async fn by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
    token: Result<OptionalToken, ApiError>,
) -> Result<Json<PublicUser>, ApiError> {
    let id = parse_uuid(&id, "id")?;
    let OptionalToken(token) = token?;

    let mut user = state.providers.users.by_id(id).await?;
    if let Some(token) = token {
        user.following = Some(state.providers.relations.is_following(token.sub, id).await?);
    }
    Ok(Json(user))
}
