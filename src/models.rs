//! Data shapes.
//!
//! Two families live here: what the microservices return (`Movie`, `Review`, `UserWeb`,
//! `Relationship` and their list envelopes) and what the gateway hands to clients
//! (`PublicMovie`, `PublicReview`, `PublicUser` and the `*List` envelopes).

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Avatar size used in lists and user details.
pub const AVATAR_SIZE: u32 = 128;

/// Avatar size returned on log-in.
pub const LOGIN_AVATAR_SIZE: u32 = 512;

/// Pagination envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Info {
    pub count: usize,
    #[serde(rename = "totalCount")]
    pub total_count: usize,
}

impl Info {
    /// Envelope for services that do not report a total: everything before the page plus
    /// the page itself.
    pub fn from_page(skip: u32, count: usize) -> Self {
        Self {
            count,
            total_count: skip as usize + count,
        }
    }
}

// ── Microservice shapes ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: Uuid,
    pub title: String,
    pub director: String,
    pub year: i32,
    pub country: String,
    pub category: String,
    pub poster_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MoviesInfo {
    pub movies: Vec<Movie>,
    pub info: Info,
}

/// Body sent to the movies service on creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieCreate {
    pub title: String,
    pub director: String,
    pub year: i32,
    pub country: String,
    pub category: String,
    pub poster_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub movie_id: Uuid,
    pub rating: i32,
    #[serde(default)]
    pub comment: Option<String>,
    pub created: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewsInfo {
    pub reviews: Vec<Review>,
    pub info: Info,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewCreate {
    pub user_id: Uuid,
    pub movie_id: Uuid,
    pub rating: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserWeb {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub user_id: Uuid,
    pub followed_user_id: Uuid,
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub created: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelationshipsInfo {
    pub relationships: Vec<Relationship>,
    pub info: Info,
}

/// Body of follow/unfollow calls: `user_id` follows `followed_user_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RelationshipCreate {
    pub user_id: Uuid,
    pub followed_user_id: Uuid,
}

/// Token issued by the users service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
}

// ── Public representations ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicMovie {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub director: String,
    pub year: i32,
    pub country: String,
    pub category: String,
    pub poster_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_url: Option<String>,
    /// The requesting user's review, when a token was supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<Box<PublicReview>>,
}

impl From<Movie> for PublicMovie {
    fn from(movie: Movie) -> Self {
        Self {
            slug: slug::slugify(&movie.title),
            id: movie.id,
            title: movie.title,
            director: movie.director,
            year: movie.year,
            country: movie.country,
            category: movie.category,
            poster_url: movie.poster_url,
            background_url: movie.background_url,
            review: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicReview {
    pub id: Uuid,
    pub user_id: Uuid,
    pub movie_id: Uuid,
    pub rating: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub created: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movie: Option<Box<PublicMovie>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<PublicUser>,
}

impl From<Review> for PublicReview {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            user_id: review.user_id,
            movie_id: review.movie_id,
            rating: review.rating,
            comment: review.comment,
            created: review.created,
            movie: None,
            user: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub login: String,
    pub name: String,
    pub avatar_url: String,
    /// Whether the requesting user follows this one, when a token was supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub following: Option<bool>,
}

impl PublicUser {
    pub fn from_web(user: UserWeb, avatar_size: u32) -> Self {
        let login = user.id.to_string();
        Self {
            avatar_url: avatar_url(&login, avatar_size),
            id: user.id,
            login,
            name: user.name,
            following: None,
        }
    }
}

/// Gravatar identicon URL for a login.
pub fn avatar_url(login: &str, size: u32) -> String {
    let hash = Md5::digest(login.trim().to_lowercase().as_bytes());
    format!("https://www.gravatar.com/avatar/{hash:x}?d=identicon&s={size}&r=g")
}

#[derive(Debug, Clone, Serialize)]
pub struct MovieList {
    pub movies: Vec<PublicMovie>,
    pub info: Info,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewList {
    pub reviews: Vec<PublicReview>,
    pub info: Info,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserList {
    pub users: Vec<PublicUser>,
    pub info: Info,
}

/// A page of user IDs from the relationships service.
#[derive(Debug, Clone)]
pub struct IdPage {
    pub ids: Vec<Uuid>,
    pub info: Info,
}
