//! Romance service
//!
//! Reads and deletes the shared aggregate of a user pair, requests the
//! asynchronous removal of every romance of a user and carries out that
//! removal on the consumer side.

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use votes_core::traits::publish;
use votes_core::{ActiveUserKey, DeleteRomancesMessage, VoteIdentity};

use crate::dto::{DeleteRomancesAcceptedResponse, RomanceResponse};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::retry::load_romance;

/// Romance service
pub struct RomanceService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> RomanceService<'a> {
    /// Create a new RomanceService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// The pair's romance from the caller's side; version `0` if never stored
    #[instrument(skip(self, identity), fields(identity = %identity))]
    pub async fn get_romance(&self, identity: VoteIdentity) -> ServiceResult<RomanceResponse> {
        let romance = load_romance(self.ctx.romance_repo(), &identity).await?;
        Ok(RomanceResponse::from(&romance))
    }

    /// Remove the pair's romance. Removing an absent romance is not an error.
    #[instrument(skip(self, identity), fields(identity = %identity))]
    pub async fn delete_romance(&self, identity: VoteIdentity) -> ServiceResult<bool> {
        let (key, _) = identity.pair_key();
        let removed = self.ctx.romance_repo().delete(&key).await?;
        info!(removed, "Romance deleted");
        Ok(removed)
    }

    /// Publish a request to delete every romance of a user.
    ///
    /// Returns once the bus accepted the request; deletion happens later.
    #[instrument(skip(self, user_key), fields(user = %user_key))]
    pub async fn request_delete_all(
        &self,
        user_key: ActiveUserKey,
    ) -> ServiceResult<DeleteRomancesAcceptedResponse> {
        let message = DeleteRomancesMessage::new(user_key);
        let message_id = publish(self.ctx.publisher(), &message).await?;

        info!(request_id = %message.id, message_id = %message_id, "Romance deletion requested");
        Ok(DeleteRomancesAcceptedResponse {
            request_id: message.id,
            message_id,
        })
    }

    /// Delete every romance involving a user, in batches, until none remain.
    ///
    /// Safe to repeat: a user without romances deletes nothing.
    #[instrument(skip(self, user_key), fields(user = %user_key))]
    pub async fn purge_user_romances(
        &self,
        user_key: &ActiveUserKey,
        batch_size: u32,
    ) -> ServiceResult<u64> {
        let repo = self.ctx.romance_repo();
        let batch_size = batch_size.max(1);
        let mut total = 0u64;

        loop {
            let keys = repo.find_keys_by_user(user_key, batch_size).await?;
            if keys.is_empty() {
                break;
            }

            let mut removed = 0u64;
            for key in &keys {
                if repo.delete(key).await? {
                    removed += 1;
                }
            }
            total += removed;
            debug!(found = keys.len(), removed, "Romance batch deleted");

            // Nothing left that this pass can remove
            if removed == 0 {
                break;
            }
        }

        info!(total, "User romances deleted");
        Ok(total)
    }

    /// Remove romances whose retention ended before `now`, in batches
    #[instrument(skip(self))]
    pub async fn purge_expired(&self, now: DateTime<Utc>, batch_size: u32) -> ServiceResult<u64> {
        let batch_size = batch_size.max(1);
        let mut total = 0u64;

        loop {
            let purged = self
                .ctx
                .romance_repo()
                .purge_expired(now, batch_size)
                .await?;
            total += purged;
            if purged < u64::from(batch_size) {
                break;
            }
        }

        if total > 0 {
            info!(total, "Expired romances purged");
        }
        Ok(total)
    }
}
