//! Path parameter extractors
//!
//! Type-safe extraction of country and user ids from path parameters.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use uuid::Uuid;
use votes_core::{ActiveUserKey, CountryId, VoteIdentity};

use crate::response::ApiError;

/// Path extractor that rejects with an `ApiError` instead of plain text
#[derive(Debug, Clone)]
pub struct ApiPath<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(inner) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_path(e.body_text()))?;

        Ok(ApiPath(inner))
    }
}

/// `/countries/:country_id`
#[derive(Debug, Deserialize)]
pub struct CountryPath {
    pub country_id: CountryId,
}

/// `/countries/:country_id/users/:user_id`
#[derive(Debug, Deserialize)]
pub struct UserPath {
    pub country_id: CountryId,
    pub user_id: Uuid,
}

impl UserPath {
    pub fn user_key(&self) -> Result<ActiveUserKey, ApiError> {
        Ok(ActiveUserKey::new(self.country_id, self.user_id)?)
    }
}

/// `/countries/:country_id/users/:user_id/.../:peer_id`
#[derive(Debug, Deserialize)]
pub struct PeerPath {
    pub country_id: CountryId,
    pub user_id: Uuid,
    pub peer_id: Uuid,
}

impl PeerPath {
    /// Identity of the vote `user_id` casts on `peer_id`
    pub fn identity(&self) -> Result<VoteIdentity, ApiError> {
        Ok(VoteIdentity::new(
            self.country_id,
            self.user_id,
            self.peer_id,
        )?)
    }
}
