//! Reviews provider.

use uuid::Uuid;

use crate::models::{PublicReview, Review, ReviewCreate, ReviewList, ReviewsInfo};
use crate::paging::{list_query, Pagination, Sorting};
use crate::upstream::{ServiceClient, UpstreamError};

#[derive(Clone)]
pub struct ReviewsProvider {
    client: ServiceClient,
}

impl ReviewsProvider {
    pub fn new(client: ServiceClient) -> Self {
        Self { client }
    }

    pub async fn list(
        &self,
        pagination: Pagination,
        sorting: Option<Sorting>,
    ) -> Result<ReviewList, UpstreamError> {
        self.page("/api/reviews/", pagination, sorting).await
    }

    pub async fn by_movie(
        &self,
        movie_id: Uuid,
        pagination: Pagination,
        sorting: Option<Sorting>,
    ) -> Result<ReviewList, UpstreamError> {
        self.page(&format!("/api/reviews/movie/{movie_id}/reviews"), pagination, sorting)
            .await
    }

    pub async fn by_user(
        &self,
        user_id: Uuid,
        pagination: Pagination,
        sorting: Option<Sorting>,
    ) -> Result<ReviewList, UpstreamError> {
        self.page(&format!("/api/reviews/user/{user_id}/reviews"), pagination, sorting)
            .await
    }

    pub async fn by_id(&self, id: Uuid) -> Result<PublicReview, UpstreamError> {
        let review: Review = self.client.get(&format!("/api/reviews/review/{id}"), &[]).await?;
        Ok(review.into())
    }

    /// The review `user_id` wrote for `movie_id`, if any.
    pub async fn by_movie_and_user(
        &self,
        movie_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<PublicReview>, UpstreamError> {
        let path = format!("/api/reviews/movie/{movie_id}/user/{user_id}");
        match self.client.get::<Review>(&path, &[]).await {
            Ok(review) => Ok(Some(review.into())),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Movie IDs ordered by a rating-based criterion.
    pub async fn movie_ids_by_rating(
        &self,
        pagination: Pagination,
        sorting: Option<Sorting>,
    ) -> Result<Vec<Uuid>, UpstreamError> {
        self.client
            .get("/api/reviews/movies", &list_query(pagination, sorting))
            .await
    }

    pub async fn create(&self, review: &ReviewCreate) -> Result<PublicReview, UpstreamError> {
        let created: Review = self.client.post_json("/api/reviews/new", review).await?;
        Ok(created.into())
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), UpstreamError> {
        self.client
            .delete::<()>(&format!("/api/reviews/review/{id}"), None)
            .await
    }

    async fn page(
        &self,
        path: &str,
        pagination: Pagination,
        sorting: Option<Sorting>,
    ) -> Result<ReviewList, UpstreamError> {
        let page: ReviewsInfo = self.client.get(path, &list_query(pagination, sorting)).await?;
        Ok(ReviewList {
            reviews: page.reviews.into_iter().map(PublicReview::from).collect(),
            info: page.info,
        })
    }
}
