//! Movies provider.
//!
//! # Responsibilities
//! - Page through the movies service
//! - Resolve lists of movie IDs through the cache first, the service second
//! - Create movies
//!
//! # Design Decisions
//! - Batched lookups return movies in exactly the order of the requested IDs
//! - Every movie that passes through the gateway is written to the cache

use std::collections::HashMap;

use futures_util::future::{join_all, try_join_all};
use uuid::Uuid;

use crate::cache::MovieCache;
use crate::models::{Movie, MovieCreate, MovieList, MoviesInfo, PublicMovie};
use crate::paging::{list_query, Pagination, Sorting};
use crate::upstream::{ServiceClient, UpstreamError};

#[derive(Clone)]
pub struct MoviesProvider {
    client: ServiceClient,
    cache: MovieCache,
}

impl MoviesProvider {
    pub fn new(client: ServiceClient, cache: MovieCache) -> Self {
        Self { client, cache }
    }

    pub async fn list(
        &self,
        pagination: Pagination,
        sorting: Option<Sorting>,
    ) -> Result<MovieList, UpstreamError> {
        let page: MoviesInfo = self
            .client
            .get("/api/movies/", &list_query(pagination, sorting))
            .await?;

        let movies: Vec<PublicMovie> = page.movies.into_iter().map(PublicMovie::from).collect();
        self.remember(&movies).await;

        Ok(MovieList {
            movies,
            info: page.info,
        })
    }

    /// Fetch several movies, preserving the order (and duplicates) of `ids`.
    pub async fn by_ids(&self, ids: &[Uuid]) -> Result<Vec<PublicMovie>, UpstreamError> {
        let cached = join_all(ids.iter().map(|id| self.cache.get_movie(id))).await;

        let mut found: HashMap<Uuid, PublicMovie> = HashMap::with_capacity(ids.len());
        for movie in cached.into_iter().flatten() {
            found.insert(movie.id, movie);
        }

        let mut missing: Vec<Uuid> = Vec::new();
        for id in ids {
            if !found.contains_key(id) && !missing.contains(id) {
                missing.push(*id);
            }
        }

        if !missing.is_empty() {
            tracing::debug!(requested = ids.len(), missing = missing.len(), "Fetching uncached movies");
            let fetched = try_join_all(missing.iter().map(|id| self.fetch_one(*id))).await?;
            self.remember(&fetched).await;
            for (id, movie) in missing.into_iter().zip(fetched) {
                found.insert(id, movie);
            }
        }

        Ok(ids.iter().filter_map(|id| found.get(id).cloned()).collect())
    }

    pub async fn by_id(&self, id: Uuid) -> Result<PublicMovie, UpstreamError> {
        if let Some(movie) = self.cache.get_movie(&id).await {
            return Ok(movie);
        }
        let movie = self.fetch_one(id).await?;
        self.cache.set_movie(&movie).await;
        Ok(movie)
    }

    pub async fn create(&self, movie: &MovieCreate) -> Result<PublicMovie, UpstreamError> {
        let created: Movie = self.client.post_json("/api/movies/add", movie).await?;
        let created = PublicMovie::from(created);
        self.cache.set_movie(&created).await;
        Ok(created)
    }

    async fn fetch_one(&self, id: Uuid) -> Result<PublicMovie, UpstreamError> {
        let movie: Movie = self.client.get(&format!("/api/movies/{id}"), &[]).await?;
        Ok(PublicMovie::from(movie))
    }

    async fn remember(&self, movies: &[PublicMovie]) {
        join_all(movies.iter().map(|movie| self.cache.set_movie(movie))).await;
    }
}
