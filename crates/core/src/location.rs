//! Read-side views over the area → container → bin hierarchy and tags.

use serde::{Deserialize, Serialize};

use crate::item::Item;

/// Reported when a parent location cannot be determined from the data.
pub const UNKNOWN_LOCATION: &str = "Unknown";

/// Containers listed on an area page.
pub const AREA_CONTAINER_LIMIT: i64 = 6;
/// Bins listed on a container page.
pub const CONTAINER_BIN_LIMIT: i64 = 6;
/// Areas, containers and bins listed on a tag page (each).
pub const TAG_LOCATION_LIMIT: i64 = 9;

/// One page of items plus the unpaginated match count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub items: Vec<Item>,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSummary {
    pub name: String,
    pub item_count: i64,
    pub total_quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaDetail {
    pub name: String,
    pub item_count: i64,
    pub total_quantity: i64,
    pub containers: Vec<ContainerSummary>,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerDetail {
    pub name: String,
    pub area: String,
    pub item_count: i64,
    pub total_quantity: i64,
    pub bins: Vec<String>,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinDetail {
    pub name: String,
    pub area: String,
    pub container: String,
    pub item_count: i64,
    pub total_quantity: i64,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagDetail {
    pub name: String,
    pub item_count: i64,
    pub total_quantity: i64,
    pub areas: Vec<String>,
    pub containers: Vec<String>,
    pub bins: Vec<String>,
    pub items: Vec<Item>,
}

/// Entry of the container listing. `area` echoes the requested filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerRef {
    pub name: String,
    pub area: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinRef {
    pub name: String,
    pub area: String,
    pub container: String,
}

/// Grouped suggestions for the global search box.
///
/// Field order is also the order the dropdown renders its sections in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Autocomplete {
    pub items: Vec<String>,
    pub areas: Vec<String>,
    pub containers: Vec<String>,
    pub bins: Vec<String>,
    pub tags: Vec<String>,
}

impl Autocomplete {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
            && self.areas.is_empty()
            && self.containers.is_empty()
            && self.bins.is_empty()
            && self.tags.is_empty()
    }
}

/// Distinct location names in use (legacy location picker).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationNames {
    pub areas: Vec<String>,
    pub containers: Vec<String>,
    pub bins: Vec<String>,
}

/// Resolve an optional parent location to the reported name.
pub fn or_unknown(value: Option<String>) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| UNKNOWN_LOCATION.to_string())
}
