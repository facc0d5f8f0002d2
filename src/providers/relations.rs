//! Relations (follow graph) provider.

use uuid::Uuid;

use crate::models::{IdPage, RelationshipCreate, RelationshipsInfo};
use crate::paging::{list_query, Pagination, Sorting};
use crate::upstream::{ServiceClient, UpstreamError};

#[derive(Clone)]
pub struct RelationsProvider {
    client: ServiceClient,
}

impl RelationsProvider {
    pub fn new(client: ServiceClient) -> Self {
        Self { client }
    }

    /// IDs of the users following `user_id`.
    pub async fn follower_ids(
        &self,
        user_id: Uuid,
        pagination: Pagination,
        sorting: Option<Sorting>,
    ) -> Result<IdPage, UpstreamError> {
        let page: RelationshipsInfo = self
            .client
            .get(
                &format!("/api/relationships/following/{user_id}"),
                &list_query(pagination, sorting),
            )
            .await?;
        Ok(IdPage {
            ids: page.relationships.iter().map(|r| r.user_id).collect(),
            info: page.info,
        })
    }

    /// IDs of the users `user_id` follows.
    pub async fn following_ids(
        &self,
        user_id: Uuid,
        pagination: Pagination,
        sorting: Option<Sorting>,
    ) -> Result<IdPage, UpstreamError> {
        let page: RelationshipsInfo = self
            .client
            .get(
                &format!("/api/relationships/followed-by/{user_id}"),
                &list_query(pagination, sorting),
            )
            .await?;
        Ok(IdPage {
            ids: page.relationships.iter().map(|r| r.followed_user_id).collect(),
            info: page.info,
        })
    }

    pub async fn is_following(&self, follower_id: Uuid, user_id: Uuid) -> Result<bool, UpstreamError> {
        self.client
            .get(
                &format!("/api/relationships/users/{follower_id}/followers/{user_id}"),
                &[],
            )
            .await
    }

    pub async fn follow(&self, follower_id: Uuid, user_id: Uuid) -> Result<(), UpstreamError> {
        let body = RelationshipCreate {
            user_id: follower_id,
            followed_user_id: user_id,
        };
        self.client
            .post_json_discard("/api/relationships/follow", &body)
            .await
    }

    pub async fn unfollow(&self, follower_id: Uuid, user_id: Uuid) -> Result<(), UpstreamError> {
        let body = RelationshipCreate {
            user_id: follower_id,
            followed_user_id: user_id,
        };
        self.client
            .delete("/api/relationships/unfollow", Some(&body))
            .await
    }
}
