//! Gemstone persistence.
//!
//! A gemstone linked to any product cannot be deleted.

use crate::model::gemstone::{Gemstone, GemstoneDraft};
use crate::model::EntityId;
use crate::repo::filter::SqlFilter;
use crate::repo::{
    bool_to_int, count_references, not_found, parse_flag, RepoError, RepoResult,
    SqliteCatalogStore,
};
use rusqlite::{params, params_from_iter, Connection, Row};

const GEMSTONE_SELECT_SQL: &str = "SELECT
    id,
    name,
    color,
    is_precious
FROM gemstones";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GemstoneListQuery {
    pub is_precious: Option<bool>,
    /// Matched against name and color.
    pub search: Option<String>,
    pub limit: Option<u32>,
    pub offset: u32,
}

pub trait GemstoneRepository {
    fn insert_gemstone(&self, draft: &GemstoneDraft) -> RepoResult<Gemstone>;
    fn update_gemstone(&self, id: EntityId, draft: &GemstoneDraft) -> RepoResult<Gemstone>;
    fn get_gemstone(&self, id: EntityId) -> RepoResult<Option<Gemstone>>;
    fn list_gemstones(&self, query: &GemstoneListQuery) -> RepoResult<Vec<Gemstone>>;
    fn delete_gemstone(&self, id: EntityId) -> RepoResult<()>;
}

impl GemstoneRepository for SqliteCatalogStore<'_> {
    fn insert_gemstone(&self, draft: &GemstoneDraft) -> RepoResult<Gemstone> {
        self.conn().execute(
            "INSERT INTO gemstones (name, color, is_precious) VALUES (?1, ?2, ?3);",
            params![
                draft.name.as_str(),
                draft.color.as_str(),
                bool_to_int(draft.is_precious),
            ],
        )?;
        load_required_gemstone(self.conn(), self.conn().last_insert_rowid())
    }

    fn update_gemstone(&self, id: EntityId, draft: &GemstoneDraft) -> RepoResult<Gemstone> {
        let changed = self.conn().execute(
            "UPDATE gemstones SET name = ?2, color = ?3, is_precious = ?4 WHERE id = ?1;",
            params![
                id,
                draft.name.as_str(),
                draft.color.as_str(),
                bool_to_int(draft.is_precious),
            ],
        )?;
        if changed == 0 {
            return Err(not_found("gemstone", id));
        }
        load_required_gemstone(self.conn(), id)
    }

    fn get_gemstone(&self, id: EntityId) -> RepoResult<Option<Gemstone>> {
        load_gemstone(self.conn(), id)
    }

    fn list_gemstones(&self, query: &GemstoneListQuery) -> RepoResult<Vec<Gemstone>> {
        let mut filter = SqlFilter::new();
        filter
            .eq("is_precious", query.is_precious.map(bool_to_int))
            .search(&["name", "color"], query.search.as_deref());
        let (sql, binds) = filter.finish(GEMSTONE_SELECT_SQL, "id ASC", query.limit, query.offset);

        let mut stmt = self.conn().prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(binds))?;
        let mut gemstones = Vec::new();
        while let Some(row) = rows.next()? {
            gemstones.push(parse_gemstone_row(row)?);
        }
        Ok(gemstones)
    }

    fn delete_gemstone(&self, id: EntityId) -> RepoResult<()> {
        let tx = self.begin_immediate()?;
        if load_gemstone(&tx, id)?.is_none() {
            return Err(not_found("gemstone", id));
        }

        let count = count_references(&tx, "product_gemstones", "gemstone_id", id)?;
        if count > 0 {
            return Err(RepoError::Protected {
                entity: "gemstone",
                id,
                referenced_by: "product gemstone",
                count,
            });
        }

        tx.execute("DELETE FROM gemstones WHERE id = ?1;", [id])?;
        tx.commit()?;
        Ok(())
    }
}

fn load_gemstone(conn: &Connection, id: EntityId) -> RepoResult<Option<Gemstone>> {
    let mut stmt = conn.prepare(&format!("{GEMSTONE_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_gemstone_row(row)?));
    }
    Ok(None)
}

fn load_required_gemstone(conn: &Connection, id: EntityId) -> RepoResult<Gemstone> {
    load_gemstone(conn, id)?
        .ok_or_else(|| RepoError::InvalidData(format!("gemstone {id} missing after write")))
}

/// Parses a gemstone from `row`, reading columns prefixed with `prefix`.
pub(crate) fn parse_gemstone_columns(row: &Row<'_>, prefix: &str) -> RepoResult<Gemstone> {
    Ok(Gemstone {
        id: row.get(format!("{prefix}id").as_str())?,
        name: row.get(format!("{prefix}name").as_str())?,
        color: row.get(format!("{prefix}color").as_str())?,
        is_precious: parse_flag(row, "gemstones", &format!("{prefix}is_precious"))?,
    })
}

fn parse_gemstone_row(row: &Row<'_>) -> RepoResult<Gemstone> {
    parse_gemstone_columns(row, "")
}
