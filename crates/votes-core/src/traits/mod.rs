//! Ports implemented by the infrastructure crates

mod messaging;
mod repositories;

pub use messaging::{
    publish, Delivery, Message, MessageHandler, MessagePublisher, MessageSubscriber,
    MessagingResult, Subscription,
};
pub use repositories::{CounterRepository, RepoResult, RomanceRepository};
