//! API clients for external services
//!
//! - TMDB: movie/TV metadata, search, discover and curated lists
//! - `MetadataProvider`: the slice of the client the pager depends on

pub mod provider;
pub mod tmdb;

pub use provider::MetadataProvider;
pub use tmdb::{ErrorCategory, TimeWindow, TmdbClient, TmdbError};
