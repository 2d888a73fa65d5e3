//! Counters group - incoming/outgoing yes/no totals of one user in one bucket

use serde::{Deserialize, Serialize};

use crate::value_objects::{ActiveUserKey, CounterField, HourBucket};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountersGroup {
    pub user_key: ActiveUserKey,
    pub hour_bucket: HourBucket,
    pub incoming_yes: u32,
    pub incoming_no: u32,
    pub outgoing_yes: u32,
    pub outgoing_no: u32,
}

impl CountersGroup {
    /// All-zero group, used when no row exists
    pub fn empty(user_key: ActiveUserKey, hour_bucket: HourBucket) -> Self {
        Self {
            user_key,
            hour_bucket,
            incoming_yes: 0,
            incoming_no: 0,
            outgoing_yes: 0,
            outgoing_no: 0,
        }
    }

    #[inline]
    pub fn is_lifetime(&self) -> bool {
        self.hour_bucket.is_lifetime()
    }

    pub fn get(&self, field: CounterField) -> u32 {
        match field {
            CounterField::IncomingYes => self.incoming_yes,
            CounterField::IncomingNo => self.incoming_no,
            CounterField::OutgoingYes => self.outgoing_yes,
            CounterField::OutgoingNo => self.outgoing_no,
        }
    }

    pub fn set(&mut self, field: CounterField, value: u32) {
        match field {
            CounterField::IncomingYes => self.incoming_yes = value,
            CounterField::IncomingNo => self.incoming_no = value,
            CounterField::OutgoingYes => self.outgoing_yes = value,
            CounterField::OutgoingNo => self.outgoing_no = value,
        }
    }

    pub fn increment(&mut self, field: CounterField) {
        self.set(field, self.get(field).saturating_add(1));
    }
}
