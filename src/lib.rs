//! cinegrid - browse movies and TV shows from TMDB
//!
//! Search, discover and page through movie and TV listings. List views share
//! one pagination model: reset on query change, append on "load more", and
//! drop responses that belong to a superseded request.
//!
//! # Modules
//!
//! - `models` - Catalog entries, filters, detail records
//! - `api` - TMDB client and the provider seam the pager runs against
//! - `pager` - Per-view aggregation state and stale-response handling
//! - `links` - Image and embedded player URLs
//! - `config` - Config file and environment overrides
//! - `cli` / `commands` - Command line surface

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod links;
pub mod models;
pub mod pager;

// Re-export commonly used types
pub use models::{
    Catalog, FilterSet, Item, MediaKind, Movie, QueryDescriptor, ResultPage, Show, SortOrder,
};

pub use api::{MetadataProvider, TmdbClient, TmdbError};
pub use config::Config;
pub use pager::{AggregationState, Aggregator, Endpoint, FetchTicket, PageOutcome};
