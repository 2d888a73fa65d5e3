//! Cascade delete request - remove every romance of a user

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;
use crate::traits::Message;
use crate::value_objects::{ActiveUserKey, CountryId};

/// Published when all romances of a user must go; consumed asynchronously
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteRomancesMessage {
    pub id: Uuid,
    pub active_user_id: Uuid,
    pub country_id: CountryId,
}

impl DeleteRomancesMessage {
    pub fn new(user_key: ActiveUserKey) -> Self {
        Self {
            id: Uuid::new_v4(),
            active_user_id: user_key.user_id,
            country_id: user_key.country_id,
        }
    }

    pub fn user_key(&self) -> Result<ActiveUserKey, DomainError> {
        ActiveUserKey::new(self.country_id, self.active_user_id)
    }
}

impl Message for DeleteRomancesMessage {
    const TOPIC: &'static str = "delete-romances";

    fn message_id(&self) -> Uuid {
        self.id
    }
}
