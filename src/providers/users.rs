//! Users provider.

use futures_util::future::try_join_all;
use uuid::Uuid;

use crate::models::{PublicUser, Token, UserWeb, AVATAR_SIZE};
use crate::paging::Pagination;
use crate::upstream::{ServiceClient, UpstreamError};

#[derive(Clone)]
pub struct UsersProvider {
    client: ServiceClient,
}

impl UsersProvider {
    pub fn new(client: ServiceClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, pagination: Pagination) -> Result<Vec<PublicUser>, UpstreamError> {
        let users: Vec<UserWeb> = self.client.get("/api/users/", &pagination.to_query()).await?;
        Ok(users
            .into_iter()
            .map(|user| PublicUser::from_web(user, AVATAR_SIZE))
            .collect())
    }

    pub async fn by_id(&self, id: Uuid) -> Result<PublicUser, UpstreamError> {
        self.by_id_sized(id, AVATAR_SIZE).await
    }

    pub async fn by_id_sized(&self, id: Uuid, avatar_size: u32) -> Result<PublicUser, UpstreamError> {
        let user: UserWeb = self.client.get(&format!("/api/users/{id}"), &[]).await?;
        Ok(PublicUser::from_web(user, avatar_size))
    }

    /// Resolve every ID concurrently; the result follows the order of `ids`.
    pub async fn by_ids(&self, ids: &[Uuid]) -> Result<Vec<PublicUser>, UpstreamError> {
        try_join_all(ids.iter().map(|id| self.by_id(*id))).await
    }

    /// Exchange credentials for a token.
    pub async fn access_token(&self, username: &str, password: &str) -> Result<Token, UpstreamError> {
        self.client
            .post_form(
                "/api/users/login/access-token",
                &[("username", username), ("password", password)],
            )
            .await
    }
}
