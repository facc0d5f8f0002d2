//! Follow graph routes under `/v1/users/{id}`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::http::extract::{parse_uuid, ListParams, RequireToken};
use crate::http::state::AppState;
use crate::models::{IdPage, UserList};
use crate::paging::{Pagination, Sorting, RELATION_SORTS};

/// `GET /v1/users/{id}/followers`
pub async fn followers(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ListParams(query): ListParams,
) -> Result<Json<UserList>, ApiError> {
    let user_id = parse_uuid(&id, "id")?;
    let page = state
        .providers
        .relations
        .follower_ids(user_id, Pagination::from_query(&query), Sorting::from_query(&query, RELATION_SORTS))
        .await?;
    resolve_users(&state, page).await
}

/// `GET /v1/users/{id}/follows`
pub async fn follows(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ListParams(query): ListParams,
) -> Result<Json<UserList>, ApiError> {
    let user_id = parse_uuid(&id, "id")?;
    let page = state
        .providers
        .relations
        .following_ids(user_id, Pagination::from_query(&query), Sorting::from_query(&query, RELATION_SORTS))
        .await?;
    resolve_users(&state, page).await
}

/// `POST /v1/users/{id}/followers/{follower_id}`
pub async fn follow(
    State(state): State<AppState>,
    Path((id, follower_id)): Path<(String, String)>,
    token: Result<RequireToken, ApiError>,
) -> Result<StatusCode, ApiError> {
    let (user_id, follower_id) = authorize_follower(&state, &id, &follower_id, token).await?;
    state.providers.relations.follow(follower_id, user_id).await?;
    tracing::info!(user_id = %user_id, follower_id = %follower_id, "Follower added");
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /v1/users/{id}/followers/{follower_id}`
pub async fn unfollow(
    State(state): State<AppState>,
    Path((id, follower_id)): Path<(String, String)>,
    token: Result<RequireToken, ApiError>,
) -> Result<StatusCode, ApiError> {
    let (user_id, follower_id) = authorize_follower(&state, &id, &follower_id, token).await?;
    state.providers.relations.unfollow(follower_id, user_id).await?;
    tracing::info!(user_id = %user_id, follower_id = %follower_id, "Follower removed");
    Ok(StatusCode::NO_CONTENT)
}

/// Validate both IDs, require the caller to be the follower, and check both users exist.
async fn authorize_follower(
    state: &AppState,
    id: &str,
    follower_id: &str,
    token: Result<RequireToken, ApiError>,
) -> Result<(Uuid, Uuid), ApiError> {
    let user_id = parse_uuid(id, "id")?;
    let follower_id = parse_uuid(follower_id, "follower_id")?;
    let RequireToken(caller) = token?;

    if caller.sub != follower_id {
        return Err(ApiError::Unauthorized(None));
    }

    state.providers.users.by_ids(&[user_id, follower_id]).await?;
    Ok((user_id, follower_id))
}

async fn resolve_users(state: &AppState, page: IdPage) -> Result<Json<UserList>, ApiError> {
    let users = state.providers.users.by_ids(&page.ids).await?;
    Ok(Json(UserList {
        users,
        info: page.info,
    }))
}
