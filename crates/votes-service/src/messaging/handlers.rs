//! Message handlers

use async_trait::async_trait;
use tracing::instrument;

use votes_core::traits::MessageHandler;
use votes_core::{DeleteRomancesMessage, DomainError};

use crate::services::{RomanceService, ServiceContext};

/// Deletes every romance of the user named in the message
#[derive(Debug, Clone)]
pub struct DeleteRomancesHandler {
    ctx: ServiceContext,
    batch_size: u32,
}

impl DeleteRomancesHandler {
    pub fn new(ctx: ServiceContext, batch_size: u32) -> Self {
        Self { ctx, batch_size }
    }
}

#[async_trait]
impl MessageHandler<DeleteRomancesMessage> for DeleteRomancesHandler {
    #[instrument(skip(self, message), fields(request_id = %message.id, country_id = message.country_id, user_id = %message.active_user_id))]
    async fn handle(&self, message: DeleteRomancesMessage) -> Result<(), DomainError> {
        let user_key = message.user_key()?;
        RomanceService::new(&self.ctx)
            .purge_user_romances(&user_key, self.batch_size)
            .await
            .map_err(|e| e.into_domain())?;
        Ok(())
    }
}
