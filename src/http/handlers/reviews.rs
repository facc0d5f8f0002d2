//! Review routes, including the per-movie and per-user listings.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{ApiError, HttpValidationError};
use crate::http::extract::{integer_field, json_object, parse_uuid, ListParams, RequireToken};
use crate::http::state::AppState;
use crate::models::{PublicReview, ReviewCreate, ReviewList};
use crate::paging::{Pagination, Sorting, REVIEW_SORTS};

const RATING_RANGE: std::ops::RangeInclusive<i64> = 1..=10;

/// `GET /v1/reviews`
pub async fn list(
    State(state): State<AppState>,
    ListParams(query): ListParams,
) -> Result<Json<ReviewList>, ApiError> {
    let providers = &state.providers;
    let mut page = providers
        .reviews
        .list(Pagination::from_query(&query), Sorting::from_query(&query, REVIEW_SORTS))
        .await?;

    providers.attach_movies(&mut page.reviews).await;
    providers.attach_users(&mut page.reviews).await;
    Ok(Json(page))
}

/// `GET /v1/movies/{id}/reviews`
pub async fn by_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ListParams(query): ListParams,
) -> Result<Json<ReviewList>, ApiError> {
    let movie_id = parse_uuid(&id, "id")?;
    let providers = &state.providers;
    let mut page = providers
        .reviews
        .by_movie(movie_id, Pagination::from_query(&query), Sorting::from_query(&query, REVIEW_SORTS))
        .await?;

    providers.attach_users(&mut page.reviews).await;
    Ok(Json(page))
}

/// `GET /v1/users/{id}/reviews`
pub async fn by_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ListParams(query): ListParams,
) -> Result<Json<ReviewList>, ApiError> {
    let user_id = parse_uuid(&id, "id")?;
    let providers = &state.providers;
    let mut page = providers
        .reviews
        .by_user(user_id, Pagination::from_query(&query), Sorting::from_query(&query, REVIEW_SORTS))
        .await?;

    providers.attach_movies(&mut page.reviews).await;
    Ok(Json(page))
}

/// `POST /v1/reviews`
pub async fn create(
    State(state): State<AppState>,
    RequireToken(caller): RequireToken,
    body: Bytes,
) -> Result<Json<PublicReview>, ApiError> {
    let body = json_object(&body);

    // Only the author may post their own review.
    let user_id = uuid_field(&body, "user_id");
    if user_id != Some(caller.sub) {
        return Err(ApiError::Unauthorized(None));
    }
    let user_id = caller.sub;

    let movie_id =
        uuid_field(&body, "movie_id").ok_or_else(|| HttpValidationError::invalid_param("movie_id"))?;

    let providers = &state.providers;
    providers.users.by_id(user_id).await?;
    providers.movies.by_id(movie_id).await?;

    let review = validate_review(&body, user_id, movie_id)?;
    let created = providers.reviews.create(&review).await?;
    tracing::info!(review_id = %created.id, movie_id = %movie_id, user_id = %user_id, "Review added");
    Ok(Json(created))
}

/// `DELETE /v1/reviews/{id}`
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    token: Result<RequireToken, ApiError>,
) -> Result<StatusCode, ApiError> {
    let review_id = parse_uuid(&id, "id")?;
    let RequireToken(caller) = token?;

    let reviews = &state.providers.reviews;
    let review = reviews.by_id(review_id).await?;
    if review.user_id != caller.sub {
        return Err(ApiError::Unauthorized(None));
    }

    reviews.delete(review.id).await?;
    tracing::info!(review_id = %review.id, user_id = %caller.sub, "Review deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn uuid_field(body: &Map<String, Value>, field: &str) -> Option<Uuid> {
    body.get(field)
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
}

fn validate_review(
    body: &Map<String, Value>,
    user_id: Uuid,
    movie_id: Uuid,
) -> Result<ReviewCreate, HttpValidationError> {
    let rating = integer_field(body, "rating")
        .filter(|r| RATING_RANGE.contains(r))
        .and_then(|r| i32::try_from(r).ok())
        .ok_or_else(|| HttpValidationError::invalid_param("rating"))?;

    let comment = match body.get("comment") {
        None | Some(Value::Null) => None,
        Some(Value::String(c)) => Some(c.clone()),
        Some(_) => return Err(HttpValidationError::invalid_param("comment")),
    };

    Ok(ReviewCreate {
        user_id,
        movie_id,
        rating,
        comment,
    })
}
