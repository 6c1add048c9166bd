//! Product persistence.
//!
//! # Responsibility
//! - Store products with decimals as minor units and sizes as a JSON array.
//! - Assign unique slugs inside the insert transaction.
//!
//! # Invariants
//! - Product list order is `created_at DESC, id DESC`.
//! - Deleting a product removes its gemstone links, images and variants
//!   (`ON DELETE CASCADE`).

use crate::model::price::{self, RangeBound, PRODUCT_PRICE, WEIGHT_GRAMS};
use crate::model::product::{Product, ProductDraft, PRODUCT_SLUG_MAX_CHARS};
use crate::model::slug::SlugRequest;
use crate::model::EntityId;
use crate::repo::filter::SqlFilter;
use crate::repo::{
    bool_to_int, map_write_error, not_found, parse_flag, resolve_slug, RepoError, RepoResult,
    ReferenceField, SqliteCatalogStore, UniqueField,
};
use rust_decimal::Decimal;
use rusqlite::{params, params_from_iter, Connection, Row};

const PRODUCT_SELECT_SQL: &str = "SELECT
    p.id AS id,
    p.category_id AS category_id,
    p.metal_type_id AS metal_type_id,
    p.name AS name,
    p.slug AS slug,
    p.description AS description,
    p.weight_grams_minor AS weight_grams_minor,
    p.base_price_minor AS base_price_minor,
    p.discount_price_minor AS discount_price_minor,
    p.is_customizable AS is_customizable,
    p.stock_quantity AS stock_quantity,
    p.available_sizes AS available_sizes,
    p.created_at AS created_at,
    p.updated_at AS updated_at
FROM products p
INNER JOIN metal_types m ON m.id = p.metal_type_id";

const NOW_MS_SQL: &str = "CAST((julianday('now') - 2440587.5) * 86400000 AS INTEGER)";

/// Query options for listing products.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductListQuery {
    pub category_id: Option<EntityId>,
    pub metal_type_id: Option<EntityId>,
    pub is_customizable: Option<bool>,
    /// Inclusive lower bound on `base_price`.
    pub base_price_gte: Option<Decimal>,
    /// Inclusive upper bound on `base_price`.
    pub base_price_lte: Option<Decimal>,
    /// Matched against name, description and metal type name.
    pub search: Option<String>,
    pub limit: Option<u32>,
    pub offset: u32,
}

pub trait ProductRepository {
    fn insert_product(&self, draft: &ProductDraft, slug: &SlugRequest) -> RepoResult<Product>;
    /// Replaces fields; keeps the slug unless `draft.slug` is set.
    fn update_product(&self, id: EntityId, draft: &ProductDraft) -> RepoResult<Product>;
    fn get_product(&self, id: EntityId) -> RepoResult<Option<Product>>;
    fn get_product_by_slug(&self, slug: &str) -> RepoResult<Option<Product>>;
    fn list_products(&self, query: &ProductListQuery) -> RepoResult<Vec<Product>>;
    /// Deletes the product and everything that belongs to it.
    fn delete_product(&self, id: EntityId) -> RepoResult<()>;
}

/// Draft values in storage representation.
struct ProductColumns {
    weight_grams_minor: i64,
    base_price_minor: i64,
    discount_price_minor: Option<i64>,
    available_sizes: String,
}

impl ProductColumns {
    fn from_draft(draft: &ProductDraft) -> RepoResult<Self> {
        let available_sizes = serde_json::to_string(&draft.available_sizes).map_err(|err| {
            RepoError::InvalidData(format!("cannot encode available_sizes: {err}"))
        })?;
        Ok(Self {
            weight_grams_minor: price::to_minor_units(
                "weight_grams",
                WEIGHT_GRAMS,
                draft.weight_grams,
            )?,
            base_price_minor: price::to_minor_units("base_price", PRODUCT_PRICE, draft.base_price)?,
            discount_price_minor: draft
                .discount_price
                .map(|value| price::to_minor_units("discount_price", PRODUCT_PRICE, value))
                .transpose()?,
            available_sizes,
        })
    }
}

impl ProductRepository for SqliteCatalogStore<'_> {
    fn insert_product(&self, draft: &ProductDraft, slug: &SlugRequest) -> RepoResult<Product> {
        let columns = ProductColumns::from_draft(draft)?;
        let tx = self.begin_immediate()?;
        let slug = resolve_slug(&tx, "products", slug, PRODUCT_SLUG_MAX_CHARS)?;

        tx.execute(
            "INSERT INTO products (
                category_id,
                metal_type_id,
                name,
                slug,
                description,
                weight_grams_minor,
                base_price_minor,
                discount_price_minor,
                is_customizable,
                stock_quantity,
                available_sizes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
            params![
                draft.category_id,
                draft.metal_type_id,
                draft.name.as_str(),
                slug.as_str(),
                draft.description.as_str(),
                columns.weight_grams_minor,
                columns.base_price_minor,
                columns.discount_price_minor,
                bool_to_int(draft.is_customizable),
                draft.stock_quantity,
                columns.available_sizes.as_str(),
            ],
        )
        .map_err(|err| {
            map_write_error(&tx, err, &unique_fields(&slug), &reference_fields(draft))
        })?;

        let product = load_required_product(&tx, tx.last_insert_rowid())?;
        tx.commit()?;
        Ok(product)
    }

    fn update_product(&self, id: EntityId, draft: &ProductDraft) -> RepoResult<Product> {
        let columns = ProductColumns::from_draft(draft)?;
        let tx = self.begin_immediate()?;
        let current = load_product(&tx, id)?.ok_or_else(|| not_found("product", id))?;
        let slug = draft.slug.clone().unwrap_or(current.slug);

        tx.execute(
            &format!(
                "UPDATE products
                 SET
                    category_id = ?2,
                    metal_type_id = ?3,
                    name = ?4,
                    slug = ?5,
                    description = ?6,
                    weight_grams_minor = ?7,
                    base_price_minor = ?8,
                    discount_price_minor = ?9,
                    is_customizable = ?10,
                    stock_quantity = ?11,
                    available_sizes = ?12,
                    updated_at = {NOW_MS_SQL}
                 WHERE id = ?1;"
            ),
            params![
                id,
                draft.category_id,
                draft.metal_type_id,
                draft.name.as_str(),
                slug.as_str(),
                draft.description.as_str(),
                columns.weight_grams_minor,
                columns.base_price_minor,
                columns.discount_price_minor,
                bool_to_int(draft.is_customizable),
                draft.stock_quantity,
                columns.available_sizes.as_str(),
            ],
        )
        .map_err(|err| {
            map_write_error(&tx, err, &unique_fields(&slug), &reference_fields(draft))
        })?;

        let product = load_required_product(&tx, id)?;
        tx.commit()?;
        Ok(product)
    }

    fn get_product(&self, id: EntityId) -> RepoResult<Option<Product>> {
        load_product(self.conn(), id)
    }

    fn get_product_by_slug(&self, slug: &str) -> RepoResult<Option<Product>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("{PRODUCT_SELECT_SQL} WHERE p.slug = ?1;"))?;
        let mut rows = stmt.query([slug])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_product_row(row)?));
        }
        Ok(None)
    }

    fn list_products(&self, query: &ProductListQuery) -> RepoResult<Vec<Product>> {
        let Some(bounds) = price_bounds(query) else {
            return Ok(Vec::new());
        };
        let mut filter = SqlFilter::new();
        filter
            .eq("p.category_id", query.category_id)
            .eq("p.metal_type_id", query.metal_type_id)
            .eq("p.is_customizable", query.is_customizable.map(bool_to_int))
            .gte("p.base_price_minor", bounds.0)
            .lte("p.base_price_minor", bounds.1)
            .search(
                &["p.name", "p.description", "m.name"],
                query.search.as_deref(),
            );
        let (sql, binds) = filter.finish(
            PRODUCT_SELECT_SQL,
            "p.created_at DESC, p.id DESC",
            query.limit,
            query.offset,
        );

        let mut stmt = self.conn().prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(binds))?;
        let mut products = Vec::new();
        while let Some(row) = rows.next()? {
            products.push(parse_product_row(row)?);
        }
        Ok(products)
    }

    fn delete_product(&self, id: EntityId) -> RepoResult<()> {
        let changed = self
            .conn()
            .execute("DELETE FROM products WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(not_found("product", id));
        }
        Ok(())
    }
}

/// Converts the decimal range bounds to minor units.
///
/// Bounds may carry any precision and any magnitude; they are rounded outward
/// and clamped to the column range. `None` means no product can match.
fn price_bounds(query: &ProductListQuery) -> Option<(Option<i64>, Option<i64>)> {
    let lower = query
        .base_price_gte
        .map_or(RangeBound::Unbounded, |value| price::lower_bound(PRODUCT_PRICE, value));
    let upper = query
        .base_price_lte
        .map_or(RangeBound::Unbounded, |value| price::upper_bound(PRODUCT_PRICE, value));
    Some((lower.minor_units()?, upper.minor_units()?))
}

fn reference_fields(draft: &ProductDraft) -> [ReferenceField; 2] {
    [
        ReferenceField {
            table: "categories",
            field: "category",
            id: draft.category_id,
        },
        ReferenceField {
            table: "metal_types",
            field: "metal_type",
            id: draft.metal_type_id,
        },
    ]
}

fn unique_fields(slug: &str) -> [UniqueField<'_>; 1] {
    [UniqueField {
        column: "products.slug",
        field: "slug",
        value: slug,
    }]
}

pub(crate) fn load_product(conn: &Connection, id: EntityId) -> RepoResult<Option<Product>> {
    let mut stmt = conn.prepare(&format!("{PRODUCT_SELECT_SQL} WHERE p.id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_product_row(row)?));
    }
    Ok(None)
}

fn load_required_product(conn: &Connection, id: EntityId) -> RepoResult<Product> {
    load_product(conn, id)?
        .ok_or_else(|| RepoError::InvalidData(format!("product {id} missing after write")))
}

fn parse_product_row(row: &Row<'_>) -> RepoResult<Product> {
    let sizes_text: String = row.get("available_sizes")?;
    let available_sizes = serde_json::from_str::<Vec<String>>(&sizes_text).map_err(|err| {
        RepoError::InvalidData(format!(
            "invalid available_sizes `{sizes_text}` in products.available_sizes: {err}"
        ))
    })?;

    Ok(Product {
        id: row.get("id")?,
        category_id: row.get("category_id")?,
        metal_type_id: row.get("metal_type_id")?,
        name: row.get("name")?,
        slug: row.get("slug")?,
        description: row.get("description")?,
        weight_grams: price::from_minor_units(row.get("weight_grams_minor")?),
        base_price: price::from_minor_units(row.get("base_price_minor")?),
        discount_price: row
            .get::<_, Option<i64>>("discount_price_minor")?
            .map(price::from_minor_units),
        is_customizable: parse_flag(row, "products", "is_customizable")?,
        stock_quantity: row.get("stock_quantity")?,
        available_sizes,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
