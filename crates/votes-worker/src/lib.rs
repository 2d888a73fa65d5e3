//! # votes-worker
//!
//! Background processes that run beside the API: the cascade-delete
//! consumer and the periodic purge of expired romances.

pub mod purge;
pub mod server;
pub mod shutdown;

pub use purge::run_purge_loop;
pub use server::{create_worker_state, run, run_consumer, WorkerState};
pub use shutdown::{shutdown_signal, Shutdown};
