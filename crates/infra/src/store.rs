//! Storage boundary for the inventory.

use async_trait::async_trait;
pub use sqlx::Error as SqlxError;
use thiserror::Error;

use binventory_core::{
    AreaDetail, Autocomplete, BinDetail, BinRef, ContainerDetail, ContainerRef, DomainError,
    DomainResult, Item, ItemId, ItemPatch, LocationNames, NewItem, SearchResult, TagDetail,
};

/// Largest page the item listing returns.
pub const MAX_PAGE_SIZE: i64 = 1000;
pub const DEFAULT_PAGE_SIZE: i64 = 100;
pub const DEFAULT_AUTOCOMPLETE_LIMIT: i64 = 10;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("database error in {operation}: {source}")]
    Database {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

impl StoreError {
    pub(crate) fn db(operation: &'static str) -> impl FnOnce(sqlx::Error) -> StoreError {
        move |source| StoreError::Database { operation, source }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Filters and paging for the item listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemQuery {
    /// Full-text search over name, description and location fields.
    pub search: Option<String>,
    pub area: Option<String>,
    pub container: Option<String>,
    pub bin: Option<String>,
    pub tag: Option<String>,
    pub skip: i64,
    pub limit: i64,
}

impl Default for ItemQuery {
    fn default() -> Self {
        Self {
            search: None,
            area: None,
            container: None,
            bin: None,
            tag: None,
            skip: 0,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ItemQuery {
    /// Reject negative paging and cap the page size.
    pub fn normalized(self) -> DomainResult<Self> {
        if self.skip < 0 {
            return Err(DomainError::validation("skip cannot be negative"));
        }
        if self.limit < 0 {
            return Err(DomainError::validation("limit cannot be negative"));
        }
        let present = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Ok(Self {
            search: present(self.search),
            area: present(self.area),
            container: present(self.container),
            bin: present(self.bin),
            tag: present(self.tag),
            skip: self.skip,
            limit: self.limit.min(MAX_PAGE_SIZE),
        })
    }
}

/// Everything the HTTP layer needs from persistence.
///
/// Lookups of a single record return `StoreError::Domain(NotFound)` when
/// nothing matches. Write payloads are normalised by the implementation.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    async fn list_items(&self, query: ItemQuery) -> StoreResult<SearchResult>;

    async fn get_item(&self, id: ItemId) -> StoreResult<Item>;

    async fn create_item(&self, item: NewItem) -> StoreResult<Item>;

    /// Apply a partial update; `tags`, when present, replaces the tag list.
    async fn update_item(&self, id: ItemId, patch: ItemPatch) -> StoreResult<Item>;

    async fn delete_item(&self, id: ItemId) -> StoreResult<()>;

    async fn autocomplete(&self, q: &str, limit: i64) -> StoreResult<Autocomplete>;

    async fn list_tags(&self) -> StoreResult<Vec<String>>;

    async fn tag_detail(&self, tag: &str) -> StoreResult<TagDetail>;

    async fn list_areas(&self) -> StoreResult<Vec<String>>;

    async fn area_detail(&self, area: &str) -> StoreResult<AreaDetail>;

    async fn list_containers(&self, area: Option<&str>) -> StoreResult<Vec<ContainerRef>>;

    async fn container_detail(&self, name: &str, area: Option<&str>) -> StoreResult<ContainerDetail>;

    async fn list_bins(&self, area: Option<&str>, container: Option<&str>) -> StoreResult<Vec<BinRef>>;

    async fn bin_detail(
        &self,
        name: &str,
        area: Option<&str>,
        container: Option<&str>,
    ) -> StoreResult<BinDetail>;

    /// Distinct non-blank area, container and bin names.
    async fn location_names(&self) -> StoreResult<LocationNames>;

    /// Flat word list for the server-rendered search box.
    async fn search_vocabulary(&self) -> StoreResult<Vec<String>>;
}
