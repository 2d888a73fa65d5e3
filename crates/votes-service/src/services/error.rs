//! Service layer errors

use votes_common::{domain_status_code, AppError};
use votes_core::DomainError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Rule violation, missing vote, contention or a failing store
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The context was built without one of its ports
    #[error("Service context is missing its {0}")]
    MissingDependency(&'static str),
}

impl ServiceError {
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(e) => Some(e),
            Self::MissingDependency(_) => None,
        }
    }

    /// Collapse into a domain error, for ports that speak `DomainError`
    pub fn into_domain(self) -> DomainError {
        match self {
            Self::Domain(e) => e,
            other @ Self::MissingDependency(_) => DomainError::InternalError(other.to_string()),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::Domain(e) => domain_status_code(e),
            Self::MissingDependency(_) => 500,
        }
    }

    pub fn error_code(&self) -> &str {
        match self {
            Self::Domain(e) => e.code(),
            Self::MissingDependency(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(e) => AppError::Domain(e),
            other @ ServiceError::MissingDependency(_) => AppError::internal(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
