//! Romance entity <-> model mapper

use uuid::Uuid;

use votes_core::entities::{Romance, Vote};
use votes_core::error::DomainError;
use votes_core::value_objects::{CanonicalPairKey, CountryId, PairSide, VoteIdentity, VoteType};

use crate::models::{PairKeyModel, RomanceModel};

pub fn country_id_to_db(country_id: CountryId) -> i32 {
    i32::from(country_id)
}

fn country_id_from_db(country_id: i32) -> Result<CountryId, DomainError> {
    CountryId::try_from(country_id)
        .map_err(|_| DomainError::DatabaseError(format!("country_id out of range: {country_id}")))
}

fn vote_type_from_db(code: i16) -> Result<VoteType, DomainError> {
    VoteType::from_code(code).map_err(|e| DomainError::DatabaseError(e.to_string()))
}

pub fn pair_key_from_model(model: &PairKeyModel) -> Result<CanonicalPairKey, DomainError> {
    CanonicalPairKey::from_parts(
        country_id_from_db(model.country_id)?,
        model.low_user_id,
        model.high_user_id,
    )
}

/// Build a romance from a row, seen from `identity`'s active user
pub fn romance_from_model(model: RomanceModel, identity: &VoteIdentity) -> Result<Romance, DomainError> {
    let key = CanonicalPairKey::from_parts(
        country_id_from_db(model.country_id)?,
        model.low_user_id,
        model.high_user_id,
    )?;
    let (expected_key, side) = identity.pair_key();
    if key != expected_key {
        return Err(DomainError::DatabaseError(format!(
            "row {key} does not belong to {identity}"
        )));
    }

    let low_vote = Vote {
        identity: key.identity_for(PairSide::Low),
        vote_type: vote_type_from_db(model.low_vote_type)?,
        voted_at: model.low_voted_at,
        created_at: model.low_created_at,
        updated_at: model.low_updated_at,
    };
    let high_vote = Vote {
        identity: key.identity_for(PairSide::High),
        vote_type: vote_type_from_db(model.high_vote_type)?,
        voted_at: model.high_voted_at,
        created_at: model.high_created_at,
        updated_at: model.high_updated_at,
    };
    let version = u32::try_from(model.version)
        .map_err(|_| DomainError::DatabaseError(format!("version out of range: {}", model.version)))?;

    let (active_user_vote, peer_user_vote) = match side {
        PairSide::Low => (low_vote, high_vote),
        PairSide::High => (high_vote, low_vote),
    };

    Ok(Romance {
        active_user_vote,
        peer_user_vote,
        version,
    })
}

/// Column values for writing a romance
pub struct RomanceWrite<'a> {
    pub key: CanonicalPairKey,
    pub low_vote: &'a Vote,
    pub high_vote: &'a Vote,
}

impl<'a> RomanceWrite<'a> {
    pub fn new(romance: &'a Romance) -> Self {
        let (key, side) = romance.pair_key();
        let (low_vote, high_vote) = match side {
            PairSide::Low => (&romance.active_user_vote, &romance.peer_user_vote),
            PairSide::High => (&romance.peer_user_vote, &romance.active_user_vote),
        };
        Self {
            key,
            low_vote,
            high_vote,
        }
    }

    pub fn country_id(&self) -> i32 {
        country_id_to_db(self.key.country_id())
    }

    pub fn low_user_id(&self) -> Uuid {
        self.key.low_user_id()
    }

    pub fn high_user_id(&self) -> Uuid {
        self.key.high_user_id()
    }
}
