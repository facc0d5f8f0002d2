//! Movie routes.

use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use serde_json::{Map, Value};

use crate::error::{ApiError, HttpValidationError};
use crate::http::extract::{
    integer_field, json_object, parse_uuid, string_field, ListParams, OptionalToken, RequireToken,
};
use crate::http::state::AppState;
use crate::models::{Info, MovieCreate, MovieList, PublicMovie};
use crate::paging::{Pagination, Sorting, MOVIE_SORTS, RATING_SORTS};

/// Earliest accepted production year.
const MIN_YEAR: i64 = 1000;

/// `GET /v1/movies`
pub async fn list(
    State(state): State<AppState>,
    ListParams(query): ListParams,
) -> Result<Json<MovieList>, ApiError> {
    let pagination = Pagination::from_query(&query);
    let sorting = Sorting::from_query(&query, MOVIE_SORTS);
    let providers = &state.providers;

    match sorting {
        Some(s) if RATING_SORTS.contains(&s.by) => {
            let ids = providers.reviews.movie_ids_by_rating(pagination, sorting).await?;
            let movies = providers.movies.by_ids(&ids).await?;
            let info = Info::from_page(pagination.skip, movies.len());
            Ok(Json(MovieList { movies, info }))
        }
        _ => Ok(Json(providers.movies.list(pagination, sorting).await?)),
    }
}

/// `POST /v1/movies`
pub async fn create(
    State(state): State<AppState>,
    RequireToken(caller): RequireToken,
    body: Bytes,
) -> Result<Json<PublicMovie>, ApiError> {
    let movie = validate_movie(&json_object(&body))?;
    let created = state.providers.movies.create(&movie).await?;
    tracing::info!(movie_id = %created.id, user_id = %caller.sub, "Movie added");
    Ok(Json(created))
}

/// `GET /v1/movies/{id}`
pub async fn by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
    token: Result<OptionalToken, ApiError>,
) -> Result<Json<PublicMovie>, ApiError> {
    let id = parse_uuid(&id, "id")?;
    let OptionalToken(token) = token?;

    let mut movie = state.providers.movies.by_id(id).await?;

    if let Some(token) = token {
        match state.providers.reviews.by_movie_and_user(movie.id, token.sub).await {
            Ok(review) => movie.review = review.map(Box::new),
            Err(e) => tracing::debug!(error = %e, "Could not attach caller's review"),
        }
    }

    Ok(Json(movie))
}

fn validate_movie(body: &Map<String, Value>) -> Result<MovieCreate, HttpValidationError> {
    let year = integer_field(body, "year")
        .filter(|y| *y >= MIN_YEAR)
        .and_then(|y| i32::try_from(y).ok())
        .ok_or_else(|| HttpValidationError::invalid_param("year"))?;

    let poster_url = string_field(body, "poster_url")
        .filter(|u| is_url(u))
        .ok_or_else(|| HttpValidationError::invalid_param("poster_url"))?;

    let background_url = match body.get("background_url") {
        None | Some(Value::Null) => None,
        Some(Value::String(u)) if u.is_empty() => None,
        Some(Value::String(u)) if is_url(u) => Some(u.clone()),
        Some(_) => return Err(HttpValidationError::invalid_param("background_url")),
    };

    let text = |field: &str| string_field(body, field).ok_or_else(|| HttpValidationError::invalid_param(field));

    Ok(MovieCreate {
        title: text("title")?,
        director: text("director")?,
        country: text("country")?,
        category: text("category")?,
        year,
        poster_url,
        background_url,
    })
}

fn is_url(raw: &str) -> bool {
    url::Url::parse(raw).is_ok()
}
