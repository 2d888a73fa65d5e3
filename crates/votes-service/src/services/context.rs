//! Service context - dependency container for services
//!
//! Holds the repositories, the message publisher and the voting policy.

use std::sync::Arc;

use votes_core::traits::{CounterRepository, MessagePublisher, RomanceRepository};
use votes_core::VotingPolicy;

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
///
/// Passed by reference to every service. Repositories are trait objects so
/// the same services run over PostgreSQL/Redis or in-memory stores.
#[derive(Clone)]
pub struct ServiceContext {
    romance_repo: Arc<dyn RomanceRepository>,
    counter_repo: Arc<dyn CounterRepository>,
    publisher: Arc<dyn MessagePublisher>,
    policy: VotingPolicy,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    pub fn new(
        romance_repo: Arc<dyn RomanceRepository>,
        counter_repo: Arc<dyn CounterRepository>,
        publisher: Arc<dyn MessagePublisher>,
        policy: VotingPolicy,
    ) -> Self {
        Self {
            romance_repo,
            counter_repo,
            publisher,
            policy,
        }
    }

    // === Repositories ===

    /// Get the romance repository
    pub fn romance_repo(&self) -> &dyn RomanceRepository {
        self.romance_repo.as_ref()
    }

    /// Get the counter repository
    pub fn counter_repo(&self) -> &dyn CounterRepository {
        self.counter_repo.as_ref()
    }

    /// Shared handle to the counter repository, for detached updates
    pub fn counter_repo_handle(&self) -> Arc<dyn CounterRepository> {
        Arc::clone(&self.counter_repo)
    }

    // === Messaging ===

    /// Get the message publisher
    pub fn publisher(&self) -> &dyn MessagePublisher {
        self.publisher.as_ref()
    }

    // === Policy ===

    pub fn policy(&self) -> &VotingPolicy {
        &self.policy
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("publisher", &"...")
            .field("policy", &self.policy)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    romance_repo: Option<Arc<dyn RomanceRepository>>,
    counter_repo: Option<Arc<dyn CounterRepository>>,
    publisher: Option<Arc<dyn MessagePublisher>>,
    policy: Option<VotingPolicy>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn romance_repo(mut self, repo: Arc<dyn RomanceRepository>) -> Self {
        self.romance_repo = Some(repo);
        self
    }

    pub fn counter_repo(mut self, repo: Arc<dyn CounterRepository>) -> Self {
        self.counter_repo = Some(repo);
        self
    }

    pub fn publisher(mut self, publisher: Arc<dyn MessagePublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// Defaults to `VotingPolicy::default()` when not set
    pub fn policy(mut self, policy: VotingPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::MissingDependency` if a port was not set
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.romance_repo
                .ok_or_else(|| ServiceError::MissingDependency("romance repository"))?,
            self.counter_repo
                .ok_or_else(|| ServiceError::MissingDependency("counter repository"))?,
            self.publisher
                .ok_or_else(|| ServiceError::MissingDependency("publisher"))?,
            self.policy.unwrap_or_default(),
        ))
    }
}
