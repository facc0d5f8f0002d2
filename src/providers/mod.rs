//! Providers: one per microservice.
//!
//! # Data Flow
//! ```text
//! handler
//!     → provider (movies / reviews / users / relations)
//!     → ServiceClient call(s), concurrently where the IDs are independent
//!     → conversion into the public representation
//! ```
//!
//! # Design Decisions
//! - Providers know paths and shapes; handlers know HTTP
//! - Enrichment (attaching movies/users to reviews) is best-effort and never fails a request

pub mod movies;
pub mod relations;
pub mod reviews;
pub mod users;

use std::sync::Arc;

use uuid::Uuid;

pub use movies::MoviesProvider;
pub use relations::RelationsProvider;
pub use reviews::ReviewsProvider;
pub use users::UsersProvider;

use crate::cache::MovieCache;
use crate::config::GatewayConfig;
use crate::models::PublicReview;
use crate::resilience::RetryBudget;
use crate::upstream::{build_http_client, ServiceClient};

/// All providers, built once and shared by every request.
#[derive(Clone)]
pub struct Providers {
    pub movies: MoviesProvider,
    pub reviews: ReviewsProvider,
    pub users: UsersProvider,
    pub relations: RelationsProvider,
}

impl Providers {
    pub fn from_config(config: &GatewayConfig, cache: MovieCache) -> Result<Self, reqwest::Error> {
        let http = build_http_client(&config.timeouts)?;
        let budget = Arc::new(RetryBudget::new(config.retries.budget_ratio, 10));
        let client = |service: &'static str, url: &str| {
            ServiceClient::new(service, url, http.clone(), config.retries.clone(), budget.clone())
        };

        Ok(Self {
            movies: MoviesProvider::new(client("movies", &config.upstreams.movies_url), cache),
            reviews: ReviewsProvider::new(client("reviews", &config.upstreams.reviews_url)),
            users: UsersProvider::new(client("users", &config.upstreams.users_url)),
            relations: RelationsProvider::new(client(
                "relationships",
                &config.upstreams.relationships_url,
            )),
        })
    }

    /// Attach each review's movie. On any failure the reviews are left untouched.
    pub async fn attach_movies(&self, reviews: &mut [PublicReview]) {
        let ids: Vec<Uuid> = reviews.iter().map(|r| r.movie_id).collect();
        match self.movies.by_ids(&ids).await {
            Ok(movies) => {
                for (review, movie) in reviews.iter_mut().zip(movies) {
                    review.movie = Some(Box::new(movie));
                }
            }
            Err(e) => tracing::warn!(error = %e, "Could not attach movies to reviews"),
        }
    }

    /// Attach each review's author. On any failure the reviews are left untouched.
    pub async fn attach_users(&self, reviews: &mut [PublicReview]) {
        let ids: Vec<Uuid> = reviews.iter().map(|r| r.user_id).collect();
        match self.users.by_ids(&ids).await {
            Ok(users) => {
                for (review, user) in reviews.iter_mut().zip(users) {
                    review.user = Some(user);
                }
            }
            Err(e) => tracing::warn!(error = %e, "Could not attach users to reviews"),
        }
    }
}
