//! Inventory item records and write-side validation.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::id::ItemId;

/// An inventory item as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub description: Option<String>,
    pub area: Option<String>,
    pub container: Option<String>,
    pub bin: Option<String>,
    pub quantity: i64,
    pub cost: f64,
    pub url: Option<String>,
    pub tags: Vec<ItemTag>,
}

impl Item {
    /// Tag labels in stored order.
    pub fn tag_labels(&self) -> Vec<&str> {
        self.tags.iter().map(|t| t.tag.as_str()).collect()
    }
}

/// A tag attached to an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemTag {
    pub id: i64,
    pub item_id: ItemId,
    pub tag: String,
}

fn default_quantity() -> i64 {
    1
}

/// Payload for creating an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub container: Option<String>,
    #[serde(default)]
    pub bin: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewItem {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            area: None,
            container: None,
            bin: None,
            quantity: default_quantity(),
            cost: 0.0,
            url: None,
            tags: Vec::new(),
        }
    }

    /// Validate and canonicalise the payload before it is written.
    ///
    /// Text is trimmed, blank optional fields become `None`, and tags are
    /// cleaned with [`normalize_tags`].
    pub fn normalized(self) -> DomainResult<Self> {
        let name = require_name(&self.name)?;
        ensure_quantity(self.quantity)?;
        ensure_cost(self.cost)?;

        Ok(Self {
            name,
            description: clean_text(self.description.as_deref()),
            area: clean_text(self.area.as_deref()),
            container: clean_text(self.container.as_deref()),
            bin: clean_text(self.bin.as_deref()),
            quantity: self.quantity,
            cost: self.cost,
            url: clean_text(self.url.as_deref()),
            tags: normalize_tags(&self.tags),
        })
    }
}

/// Partial update. `None` leaves a field untouched.
///
/// For optional text fields a blank string clears the stored value. When
/// `tags` is present it replaces the whole tag list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub container: Option<String>,
    #[serde(default)]
    pub bin: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl ItemPatch {
    pub fn normalized(self) -> DomainResult<Self> {
        let name = match self.name {
            Some(n) => Some(require_name(&n)?),
            None => None,
        };
        if let Some(q) = self.quantity {
            ensure_quantity(q)?;
        }
        if let Some(c) = self.cost {
            ensure_cost(c)?;
        }

        let trim = |v: Option<String>| v.map(|s| s.trim().to_string());

        Ok(Self {
            name,
            description: trim(self.description),
            area: trim(self.area),
            container: trim(self.container),
            bin: trim(self.bin),
            quantity: self.quantity,
            cost: self.cost,
            url: trim(self.url),
            tags: self.tags.map(|t| normalize_tags(&t)),
        })
    }

    /// True when no column of the `items` row changes (tags may still change).
    pub fn touches_no_columns(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.area.is_none()
            && self.container.is_none()
            && self.bin.is_none()
            && self.quantity.is_none()
            && self.cost.is_none()
            && self.url.is_none()
    }
}

/// Trim a text value; blank becomes `None`.
pub fn clean_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Trim tags, drop blanks and repeated labels (first occurrence wins).
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() || out.iter().any(|t| t == tag) {
            continue;
        }
        out.push(tag.to_string());
    }
    out
}

fn require_name(name: &str) -> DomainResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::validation("name cannot be empty"));
    }
    Ok(name.to_string())
}

fn ensure_quantity(quantity: i64) -> DomainResult<()> {
    if quantity < 0 {
        return Err(DomainError::validation("quantity cannot be negative"));
    }
    Ok(())
}

fn ensure_cost(cost: f64) -> DomainResult<()> {
    if !cost.is_finite() || cost < 0.0 {
        return Err(DomainError::validation("cost must be a non-negative number"));
    }
    Ok(())
}
