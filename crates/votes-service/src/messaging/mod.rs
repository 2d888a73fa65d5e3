//! Message consumption
//!
//! One generic listen loop drives any `MessageHandler`; handlers only see
//! decoded messages.

mod handlers;
mod listener;

pub use handlers::DeleteRomancesHandler;
pub use listener::{listen, ListenStats, RECEIVE_ERROR_BACKOFF};
