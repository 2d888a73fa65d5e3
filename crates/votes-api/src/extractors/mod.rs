//! Axum extractors for request handling
//!
//! Custom extractors for path parameters and validated bodies/queries.

mod path;
mod validated;

pub use path::{ApiPath, CountryPath, PeerPath, UserPath};
pub use validated::{ValidatedJson, ValidatedQuery};
