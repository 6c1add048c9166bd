//! Metal type persistence.
//!
//! A metal referenced by any product cannot be deleted.

use crate::model::metal_type::{MetalType, MetalTypeDraft};
use crate::model::price::{self, PRICE_PER_GRAM};
use crate::model::EntityId;
use crate::repo::filter::SqlFilter;
use crate::repo::{count_references, not_found, RepoError, RepoResult, SqliteCatalogStore};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const METAL_TYPE_SELECT_SQL: &str = "SELECT
    id,
    name,
    purity,
    price_per_gram_minor
FROM metal_types";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetalTypeListQuery {
    /// Matched against name and purity.
    pub search: Option<String>,
    pub limit: Option<u32>,
    pub offset: u32,
}

pub trait MetalTypeRepository {
    fn insert_metal_type(&self, draft: &MetalTypeDraft) -> RepoResult<MetalType>;
    fn update_metal_type(&self, id: EntityId, draft: &MetalTypeDraft) -> RepoResult<MetalType>;
    fn get_metal_type(&self, id: EntityId) -> RepoResult<Option<MetalType>>;
    fn list_metal_types(&self, query: &MetalTypeListQuery) -> RepoResult<Vec<MetalType>>;
    fn delete_metal_type(&self, id: EntityId) -> RepoResult<()>;
}

impl MetalTypeRepository for SqliteCatalogStore<'_> {
    fn insert_metal_type(&self, draft: &MetalTypeDraft) -> RepoResult<MetalType> {
        let price_minor =
            price::to_minor_units("price_per_gram", PRICE_PER_GRAM, draft.price_per_gram)?;
        self.conn().execute(
            "INSERT INTO metal_types (name, purity, price_per_gram_minor)
             VALUES (?1, ?2, ?3);",
            params![draft.name.as_str(), draft.purity.as_str(), price_minor],
        )?;
        load_required_metal_type(self.conn(), self.conn().last_insert_rowid())
    }

    fn update_metal_type(&self, id: EntityId, draft: &MetalTypeDraft) -> RepoResult<MetalType> {
        let price_minor =
            price::to_minor_units("price_per_gram", PRICE_PER_GRAM, draft.price_per_gram)?;
        let changed = self.conn().execute(
            "UPDATE metal_types
             SET name = ?2, purity = ?3, price_per_gram_minor = ?4
             WHERE id = ?1;",
            params![id, draft.name.as_str(), draft.purity.as_str(), price_minor],
        )?;
        if changed == 0 {
            return Err(not_found("metal type", id));
        }
        load_required_metal_type(self.conn(), id)
    }

    fn get_metal_type(&self, id: EntityId) -> RepoResult<Option<MetalType>> {
        load_metal_type(self.conn(), id)
    }

    fn list_metal_types(&self, query: &MetalTypeListQuery) -> RepoResult<Vec<MetalType>> {
        let mut filter = SqlFilter::new();
        filter.search(&["name", "purity"], query.search.as_deref());
        let (sql, binds) =
            filter.finish(METAL_TYPE_SELECT_SQL, "id ASC", query.limit, query.offset);

        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(binds), parse_metal_type_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn delete_metal_type(&self, id: EntityId) -> RepoResult<()> {
        let tx = self.begin_immediate()?;
        if load_metal_type(&tx, id)?.is_none() {
            return Err(not_found("metal type", id));
        }

        let count = count_references(&tx, "products", "metal_type_id", id)?;
        if count > 0 {
            return Err(RepoError::Protected {
                entity: "metal type",
                id,
                referenced_by: "product",
                count,
            });
        }

        tx.execute("DELETE FROM metal_types WHERE id = ?1;", [id])?;
        tx.commit()?;
        Ok(())
    }
}

pub(crate) fn load_metal_type(conn: &Connection, id: EntityId) -> RepoResult<Option<MetalType>> {
    let metal = conn
        .query_row(
            &format!("{METAL_TYPE_SELECT_SQL} WHERE id = ?1;"),
            [id],
            parse_metal_type_row,
        )
        .optional()?;
    Ok(metal)
}

fn load_required_metal_type(conn: &Connection, id: EntityId) -> RepoResult<MetalType> {
    load_metal_type(conn, id)?
        .ok_or_else(|| RepoError::InvalidData(format!("metal type {id} missing after write")))
}

fn parse_metal_type_row(row: &Row<'_>) -> rusqlite::Result<MetalType> {
    Ok(MetalType {
        id: row.get("id")?,
        name: row.get("name")?,
        purity: row.get("purity")?,
        price_per_gram: price::from_minor_units(row.get("price_per_gram_minor")?),
    })
}
