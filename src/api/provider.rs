//! Provider abstraction used by the pager
//!
//! Lets the aggregation logic run against the real TMDB client or a
//! scripted stand-in in tests.

use super::tmdb::Result;
use crate::models::{Catalog, FilterSet, Item, MediaKind, ResultPage};

/// Paginated list operations the pager needs from a metadata source
#[allow(async_fn_in_trait)]
pub trait MetadataProvider {
    /// One page of free-text search results
    async fn search(&self, catalog: Catalog, term: &str, page: u32) -> Result<ResultPage<Item>>;

    /// One page of titles matching a filter set
    async fn discover(
        &self,
        kind: MediaKind,
        filters: &FilterSet,
        page: u32,
    ) -> Result<ResultPage<Item>>;
}

impl<P: MetadataProvider + ?Sized> MetadataProvider for &P {
    async fn search(&self, catalog: Catalog, term: &str, page: u32) -> Result<ResultPage<Item>> {
        (**self).search(catalog, term, page).await
    }

    async fn discover(
        &self,
        kind: MediaKind,
        filters: &FilterSet,
        page: u32,
    ) -> Result<ResultPage<Item>> {
        (**self).discover(kind, filters, page).await
    }
}
