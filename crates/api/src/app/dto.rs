use serde::{Deserialize, Serialize};

use binventory_infra::ItemQuery;
use binventory_infra::store::{DEFAULT_AUTOCOMPLETE_LIMIT, DEFAULT_PAGE_SIZE};

// -------------------------
// Request DTOs
// -------------------------

/// Query string of `GET /items`.
#[derive(Debug, Default, Deserialize)]
pub struct ItemListParams {
    pub search: Option<String>,
    pub area: Option<String>,
    pub container: Option<String>,
    pub bin: Option<String>,
    pub tag: Option<String>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl From<ItemListParams> for ItemQuery {
    fn from(p: ItemListParams) -> Self {
        ItemQuery {
            search: p.search,
            area: p.area,
            container: p.container,
            bin: p.bin,
            tag: p.tag,
            skip: p.skip.unwrap_or(0),
            limit: p.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AutocompleteParams {
    #[serde(default)]
    pub q: String,
    pub limit: Option<i64>,
}

impl AutocompleteParams {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_AUTOCOMPLETE_LIMIT)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AreaFilter {
    pub area: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BinFilter {
    pub area: Option<String>,
    pub container: Option<String>,
}

/// Query string GitHub sends back to the callback.
#[derive(Debug, Default, Deserialize)]
pub struct OAuthCallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct WhoAmIResponse {
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<String>,
}
