//! SQLite-backed inventory store.
//!
//! ## Consistency
//!
//! An item row and its tags are always written in one transaction. FTS5
//! indexes are maintained by triggers (see `db`), so they change in the same
//! transaction as the rows they index.
//!
//! ## Location inference
//!
//! Detail lookups accept optional parent names. A container's missing area
//! is taken from the oldest matching row that has one. A bin's missing
//! parents are both read from the oldest matching row. A parent that stays
//! blank is reported as `"Unknown"` and does not narrow the lookup.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::{Span, instrument};

use binventory_core::location::{
    AREA_CONTAINER_LIMIT, CONTAINER_BIN_LIMIT, TAG_LOCATION_LIMIT, or_unknown,
};
use binventory_core::vocabulary::search_vocabulary;
use binventory_core::{
    AreaDetail, Autocomplete, BinDetail, BinRef, ContainerDetail, ContainerRef, ContainerSummary,
    DomainError, Item, ItemId, ItemPatch, ItemTag, LocationNames, NewItem, SearchResult,
    TagDetail,
};

use crate::fts;
use crate::store::{InventoryStore, ItemQuery, MAX_PAGE_SIZE, StoreError, StoreResult};

const ITEM_COLUMNS: &str = "id, name, description, area, container, bin, \
     COALESCE(quantity, 1) AS quantity, COALESCE(cost, 0.0) AS cost, url";

const TOTALS: &str =
    "SELECT COUNT(id) AS item_count, COALESCE(SUM(COALESCE(quantity, 1)), 0) AS total_quantity";

/// Bound parameters per `IN (...)` list when loading tags.
const TAG_BATCH: usize = 500;

#[derive(Debug, FromRow)]
struct ItemRow {
    id: i64,
    name: String,
    description: Option<String>,
    area: Option<String>,
    container: Option<String>,
    bin: Option<String>,
    quantity: i64,
    cost: f64,
    url: Option<String>,
}

impl ItemRow {
    fn into_item(self, tags: Vec<ItemTag>) -> Item {
        Item {
            id: ItemId::new(self.id),
            name: self.name,
            description: self.description,
            area: self.area,
            container: self.container,
            bin: self.bin,
            quantity: self.quantity,
            cost: self.cost,
            url: self.url,
            tags,
        }
    }
}

#[derive(Debug, FromRow)]
struct TagRow {
    id: i64,
    item_id: i64,
    tag: String,
}

#[derive(Debug, FromRow)]
struct Totals {
    item_count: i64,
    total_quantity: i64,
}

#[derive(Debug, FromRow)]
struct ContainerRow {
    name: String,
    item_count: i64,
    total_quantity: i64,
}

/// Equality filters on the location columns.
#[derive(Debug, Default, Clone, Copy)]
struct Scope<'s> {
    area: Option<&'s str>,
    container: Option<&'s str>,
    bin: Option<&'s str>,
}

impl Scope<'_> {
    /// Append ` AND column = ?` per set field. The builder must already
    /// contain a `WHERE` clause.
    fn push_to(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        let fields = [
            ("area", self.area),
            ("container", self.container),
            ("bin", self.bin),
        ];
        for (column, value) in fields {
            if let Some(value) = value {
                qb.push(format!(" AND {column} = "))
                    .push_bind(value.to_string());
            }
        }
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Blank text in a patch clears the column.
fn blank_to_null(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

fn push_item_filters(qb: &mut QueryBuilder<'_, Sqlite>, query: &ItemQuery) {
    qb.push(" WHERE 1 = 1");
    if let Some(expr) = query.search.as_deref().and_then(fts::match_all_terms) {
        qb.push(" AND id IN (SELECT rowid FROM items_fts WHERE items_fts MATCH ")
            .push_bind(expr)
            .push(")");
    }
    Scope {
        area: query.area.as_deref(),
        container: query.container.as_deref(),
        bin: query.bin.as_deref(),
    }
    .push_to(qb);
    if let Some(tag) = &query.tag {
        qb.push(" AND id IN (SELECT item_id FROM items_tags WHERE tag = ")
            .push_bind(tag.clone())
            .push(")");
    }
}

async fn insert_tags(conn: &mut SqliteConnection, item_id: i64, tags: &[String]) -> StoreResult<()> {
    for tag in tags {
        sqlx::query("INSERT INTO items_tags (item_id, tag) VALUES (?, ?)")
            .bind(item_id)
            .bind(tag)
            .execute(&mut *conn)
            .await
            .map_err(StoreError::db("insert_tags"))?;
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct SqliteInventoryStore {
    pool: SqlitePool,
}

impl SqliteInventoryStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Attach tags (in insertion order) to loaded rows.
    async fn with_tags(&self, rows: Vec<ItemRow>) -> StoreResult<Vec<Item>> {
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let mut by_item: HashMap<i64, Vec<ItemTag>> = HashMap::new();

        for batch in ids.chunks(TAG_BATCH) {
            let mut qb = QueryBuilder::<Sqlite>::new("SELECT id, item_id, tag FROM items_tags WHERE item_id IN (");
            {
                let mut list = qb.separated(", ");
                for id in batch {
                    list.push_bind(*id);
                }
            }
            qb.push(") ORDER BY id");

            let tags: Vec<TagRow> = qb
                .build_query_as()
                .fetch_all(&self.pool)
                .await
                .map_err(StoreError::db("load_tags"))?;

            for t in tags {
                by_item.entry(t.item_id).or_default().push(ItemTag {
                    id: t.id,
                    item_id: ItemId::new(t.item_id),
                    tag: t.tag,
                });
            }
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let tags = by_item.remove(&row.id).unwrap_or_default();
                row.into_item(tags)
            })
            .collect())
    }

    async fn items_in(&self, scope: Scope<'_>) -> StoreResult<Vec<Item>> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {ITEM_COLUMNS} FROM items WHERE 1 = 1"));
        scope.push_to(&mut qb);
        qb.push(" ORDER BY id");

        let rows: Vec<ItemRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::db("items_in"))?;
        self.with_tags(rows).await
    }

    async fn totals(&self, scope: Scope<'_>) -> StoreResult<Totals> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!("{TOTALS} FROM items WHERE 1 = 1"));
        scope.push_to(&mut qb);
        qb.build_query_as()
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::db("totals"))
    }

    /// Sorted distinct non-blank values of `column` within `scope`.
    async fn distinct_in(
        &self,
        column: &'static str,
        scope: Scope<'_>,
        limit: Option<i64>,
    ) -> StoreResult<Vec<String>> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT DISTINCT {column} FROM items WHERE {column} IS NOT NULL AND {column} <> ''"
        ));
        scope.push_to(&mut qb);
        qb.push(format!(" ORDER BY {column}"));
        if let Some(limit) = limit {
            qb.push(" LIMIT ").push_bind(limit);
        }
        qb.build_query_scalar()
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::db("distinct_in"))
    }

    /// `column` of the oldest row in `scope` that has one.
    async fn first_in(&self, column: &'static str, scope: Scope<'_>) -> StoreResult<Option<String>> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {column} FROM items WHERE {column} IS NOT NULL AND {column} <> ''"
        ));
        scope.push_to(&mut qb);
        qb.push(" ORDER BY id LIMIT 1");
        qb.build_query_scalar()
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::db("first_in"))
    }

    /// Area and container of the oldest row in `scope`.
    async fn first_parents(&self, scope: Scope<'_>) -> StoreResult<(Option<String>, Option<String>)> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT area, container FROM items WHERE 1 = 1");
        scope.push_to(&mut qb);
        qb.push(" ORDER BY id LIMIT 1");
        let row: Option<(Option<String>, Option<String>)> = qb
            .build_query_as()
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::db("first_parents"))?;
        Ok(row.unwrap_or_default())
    }

    /// Distinct `column` values across items carrying `tag`.
    async fn tag_locations(&self, column: &'static str, tag: &str) -> StoreResult<Vec<String>> {
        let sql = format!(
            "SELECT DISTINCT {column} FROM items \
             WHERE id IN (SELECT item_id FROM items_tags WHERE tag = ?) \
             AND {column} IS NOT NULL AND {column} <> '' \
             ORDER BY {column} LIMIT ?"
        );
        sqlx::query_scalar(&sql)
            .bind(tag)
            .bind(TAG_LOCATION_LIMIT)
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::db("tag_locations"))
    }

    /// Distinct `column` values containing `q` (case-insensitive for ASCII).
    async fn distinct_like(
        &self,
        table: &'static str,
        column: &'static str,
        q: &str,
        limit: i64,
    ) -> StoreResult<Vec<String>> {
        let sql = format!(
            r"SELECT DISTINCT {column} FROM {table} WHERE {column} LIKE ? ESCAPE '\' AND {column} <> '' ORDER BY {column} LIMIT ?"
        );
        sqlx::query_scalar(&sql)
            .bind(fts::like_contains(q))
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::db("autocomplete"))
    }
}

#[async_trait]
impl InventoryStore for SqliteInventoryStore {
    #[instrument(skip(self), fields(total = tracing::field::Empty), err)]
    async fn list_items(&self, query: ItemQuery) -> StoreResult<SearchResult> {
        let query = query.normalized()?;

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM items");
        push_item_filters(&mut count, &query);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::db("count_items"))?;

        let mut page = QueryBuilder::<Sqlite>::new(format!("SELECT {ITEM_COLUMNS} FROM items"));
        push_item_filters(&mut page, &query);
        page.push(" ORDER BY id LIMIT ")
            .push_bind(query.limit)
            .push(" OFFSET ")
            .push_bind(query.skip);
        let rows: Vec<ItemRow> = page
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::db("list_items"))?;

        Span::current().record("total", total);
        Ok(SearchResult {
            items: self.with_tags(rows).await?,
            total,
        })
    }

    #[instrument(skip(self), fields(item_id = %id), err)]
    async fn get_item(&self, id: ItemId) -> StoreResult<Item> {
        let row: Option<ItemRow> = sqlx::query_as(&format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?"))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::db("get_item"))?;

        let row = row.ok_or(DomainError::not_found("Item"))?;
        let mut items = self.with_tags(vec![row]).await?;
        items.pop().ok_or_else(|| DomainError::not_found("Item").into())
    }

    #[instrument(skip(self, item), fields(item_id = tracing::field::Empty), err)]
    async fn create_item(&self, item: NewItem) -> StoreResult<Item> {
        let item = item.normalized()?;

        let mut tx = self.pool.begin().await.map_err(StoreError::db("create_item"))?;
        let id = sqlx::query(
            r#"
            INSERT INTO items (name, description, area, container, bin, quantity, cost, url)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&item.name)
        .bind(&item.description)
        .bind(&item.area)
        .bind(&item.container)
        .bind(&item.bin)
        .bind(item.quantity)
        .bind(item.cost)
        .bind(&item.url)
        .execute(&mut *tx)
        .await
        .map_err(StoreError::db("create_item"))?
        .last_insert_rowid();

        insert_tags(&mut *tx, id, &item.tags).await?;
        tx.commit().await.map_err(StoreError::db("create_item"))?;

        Span::current().record("item_id", id);
        tracing::info!(item_id = id, tags = item.tags.len(), "item created");
        self.get_item(ItemId::new(id)).await
    }

    #[instrument(skip(self, patch), fields(item_id = %id), err)]
    async fn update_item(&self, id: ItemId, patch: ItemPatch) -> StoreResult<Item> {
        let patch = patch.normalized()?;

        let mut tx = self.pool.begin().await.map_err(StoreError::db("update_item"))?;
        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM items WHERE id = ?")
            .bind(id.get())
            .fetch_optional(&mut *tx)
            .await
            .map_err(StoreError::db("update_item"))?;
        if exists.is_none() {
            return Err(DomainError::not_found("Item").into());
        }

        if !patch.touches_no_columns() {
            let mut qb = QueryBuilder::<Sqlite>::new("UPDATE items SET ");
            {
                let mut set = qb.separated(", ");
                if let Some(name) = patch.name {
                    set.push("name = ").push_bind_unseparated(name);
                }
                let text_columns = [
                    ("description", patch.description),
                    ("area", patch.area),
                    ("container", patch.container),
                    ("bin", patch.bin),
                    ("url", patch.url),
                ];
                for (column, value) in text_columns {
                    if let Some(value) = value {
                        set.push(format!("{column} = "))
                            .push_bind_unseparated(blank_to_null(value));
                    }
                }
                if let Some(quantity) = patch.quantity {
                    set.push("quantity = ").push_bind_unseparated(quantity);
                }
                if let Some(cost) = patch.cost {
                    set.push("cost = ").push_bind_unseparated(cost);
                }
            }
            qb.push(" WHERE id = ").push_bind(id.get());
            qb.build()
                .execute(&mut *tx)
                .await
                .map_err(StoreError::db("update_item"))?;
        }

        if let Some(tags) = &patch.tags {
            sqlx::query("DELETE FROM items_tags WHERE item_id = ?")
                .bind(id.get())
                .execute(&mut *tx)
                .await
                .map_err(StoreError::db("update_item"))?;
            insert_tags(&mut *tx, id.get(), tags).await?;
        }

        tx.commit().await.map_err(StoreError::db("update_item"))?;
        self.get_item(id).await
    }

    #[instrument(skip(self), fields(item_id = %id), err)]
    async fn delete_item(&self, id: ItemId) -> StoreResult<()> {
        let deleted = sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(StoreError::db("delete_item"))?
            .rows_affected();

        if deleted == 0 {
            return Err(DomainError::not_found("Item").into());
        }
        tracing::info!("item deleted");
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn autocomplete(&self, q: &str, limit: i64) -> StoreResult<Autocomplete> {
        let q = q.trim();
        let limit = limit.clamp(0, MAX_PAGE_SIZE);
        if q.is_empty() || limit == 0 {
            return Ok(Autocomplete::default());
        }

        let items = match fts::match_prefixes(q) {
            Some(expr) => sqlx::query_scalar(
                r#"
                SELECT name FROM items
                WHERE id IN (SELECT rowid FROM items_fts WHERE items_fts MATCH ?)
                GROUP BY name
                ORDER BY name
                LIMIT ?
                "#,
            )
            .bind(expr)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::db("autocomplete"))?,
            None => Vec::new(),
        };

        Ok(Autocomplete {
            items,
            areas: self.distinct_like("items", "area", q, limit).await?,
            containers: self.distinct_like("items", "container", q, limit).await?,
            bins: self.distinct_like("items", "bin", q, limit).await?,
            tags: self.distinct_like("items_tags", "tag", q, limit).await?,
        })
    }

    #[instrument(skip(self), err)]
    async fn list_tags(&self) -> StoreResult<Vec<String>> {
        sqlx::query_scalar("SELECT DISTINCT tag FROM items_tags ORDER BY tag")
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::db("list_tags"))
    }

    #[instrument(skip(self), err)]
    async fn tag_detail(&self, tag: &str) -> StoreResult<TagDetail> {
        let totals: Totals = sqlx::query_as(&format!(
            "{TOTALS} FROM items WHERE id IN (SELECT item_id FROM items_tags WHERE tag = ?)"
        ))
        .bind(tag)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::db("tag_detail"))?;
        if totals.item_count == 0 {
            return Err(DomainError::not_found("Tag").into());
        }

        let rows: Vec<ItemRow> = sqlx::query_as(&format!(
            "SELECT {ITEM_COLUMNS} FROM items \
             WHERE id IN (SELECT item_id FROM items_tags WHERE tag = ?) ORDER BY id"
        ))
        .bind(tag)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::db("tag_detail"))?;

        Ok(TagDetail {
            name: tag.to_string(),
            item_count: totals.item_count,
            total_quantity: totals.total_quantity,
            areas: self.tag_locations("area", tag).await?,
            containers: self.tag_locations("container", tag).await?,
            bins: self.tag_locations("bin", tag).await?,
            items: self.with_tags(rows).await?,
        })
    }

    #[instrument(skip(self), err)]
    async fn list_areas(&self) -> StoreResult<Vec<String>> {
        self.distinct_in("area", Scope::default(), None).await
    }

    #[instrument(skip(self), err)]
    async fn area_detail(&self, area: &str) -> StoreResult<AreaDetail> {
        let scope = Scope {
            area: Some(area),
            ..Default::default()
        };
        let totals = self.totals(scope).await?;
        if totals.item_count == 0 {
            return Err(DomainError::not_found("Area").into());
        }

        let containers: Vec<ContainerRow> = sqlx::query_as(&format!(
            "SELECT container AS name, COUNT(id) AS item_count, \
             COALESCE(SUM(COALESCE(quantity, 1)), 0) AS total_quantity \
             FROM items \
             WHERE area = ? AND container IS NOT NULL AND container <> '' \
             GROUP BY container ORDER BY container LIMIT {AREA_CONTAINER_LIMIT}"
        ))
        .bind(area)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::db("area_detail"))?;

        Ok(AreaDetail {
            name: area.to_string(),
            item_count: totals.item_count,
            total_quantity: totals.total_quantity,
            containers: containers
                .into_iter()
                .map(|c| ContainerSummary {
                    name: c.name,
                    item_count: c.item_count,
                    total_quantity: c.total_quantity,
                })
                .collect(),
            items: self.items_in(scope).await?,
        })
    }

    #[instrument(skip(self), err)]
    async fn list_containers(&self, area: Option<&str>) -> StoreResult<Vec<ContainerRef>> {
        let area = present(area);
        let names = self
            .distinct_in(
                "container",
                Scope {
                    area,
                    ..Default::default()
                },
                None,
            )
            .await?;
        Ok(names
            .into_iter()
            .map(|name| ContainerRef {
                name,
                area: area.map(str::to_string),
            })
            .collect())
    }

    #[instrument(skip(self), err)]
    async fn container_detail(&self, name: &str, area: Option<&str>) -> StoreResult<ContainerDetail> {
        let area = present(area);
        let exists = self
            .totals(Scope {
                area,
                container: Some(name),
                bin: None,
            })
            .await?;
        if exists.item_count == 0 {
            return Err(DomainError::not_found("Container").into());
        }

        let area = match area {
            Some(a) => Some(a.to_string()),
            None => {
                self.first_in(
                    "area",
                    Scope {
                        container: Some(name),
                        ..Default::default()
                    },
                )
                .await?
            }
        };
        let scope = Scope {
            area: area.as_deref(),
            container: Some(name),
            bin: None,
        };
        let totals = self.totals(scope).await?;

        Ok(ContainerDetail {
            name: name.to_string(),
            item_count: totals.item_count,
            total_quantity: totals.total_quantity,
            bins: self.distinct_in("bin", scope, Some(CONTAINER_BIN_LIMIT)).await?,
            items: self.items_in(scope).await?,
            area: or_unknown(area),
        })
    }

    #[instrument(skip(self), err)]
    async fn list_bins(&self, area: Option<&str>, container: Option<&str>) -> StoreResult<Vec<BinRef>> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT DISTINCT bin, area, container FROM items WHERE bin IS NOT NULL AND bin <> ''",
        );
        Scope {
            area: present(area),
            container: present(container),
            bin: None,
        }
        .push_to(&mut qb);
        qb.push(" ORDER BY bin, area, container");

        let rows: Vec<(String, Option<String>, Option<String>)> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::db("list_bins"))?;

        Ok(rows
            .into_iter()
            .map(|(name, area, container)| BinRef {
                name,
                area: or_unknown(area),
                container: or_unknown(container),
            })
            .collect())
    }

    #[instrument(skip(self), err)]
    async fn bin_detail(
        &self,
        name: &str,
        area: Option<&str>,
        container: Option<&str>,
    ) -> StoreResult<BinDetail> {
        let given = Scope {
            area: present(area),
            container: present(container),
            bin: Some(name),
        };
        let exists = self.totals(given).await?;
        if exists.item_count == 0 {
            return Err(DomainError::not_found("Bin").into());
        }

        // Both parents come from the same row so the narrowed scope still
        // matches at least that row.
        let (first_area, first_container) = self.first_parents(given).await?;
        let area = match given.area {
            Some(a) => Some(a.to_string()),
            None => first_area.filter(|a| !a.trim().is_empty()),
        };
        let container = match given.container {
            Some(c) => Some(c.to_string()),
            None => first_container.filter(|c| !c.trim().is_empty()),
        };
        let scope = Scope {
            area: area.as_deref(),
            container: container.as_deref(),
            bin: Some(name),
        };
        let totals = self.totals(scope).await?;

        Ok(BinDetail {
            name: name.to_string(),
            item_count: totals.item_count,
            total_quantity: totals.total_quantity,
            items: self.items_in(scope).await?,
            area: or_unknown(area),
            container: or_unknown(container),
        })
    }

    #[instrument(skip(self), err)]
    async fn location_names(&self) -> StoreResult<LocationNames> {
        Ok(LocationNames {
            areas: self.distinct_in("area", Scope::default(), None).await?,
            containers: self.distinct_in("container", Scope::default(), None).await?,
            bins: self.distinct_in("bin", Scope::default(), None).await?,
        })
    }

    #[instrument(skip(self), err)]
    async fn search_vocabulary(&self) -> StoreResult<Vec<String>> {
        let texts: Vec<(String, Option<String>)> =
            sqlx::query_as("SELECT name, description FROM items ORDER BY id")
                .fetch_all(&self.pool)
                .await
                .map_err(StoreError::db("search_vocabulary"))?;
        let locations = self.location_names().await?;
        Ok(search_vocabulary(&texts, &locations))
    }
}
