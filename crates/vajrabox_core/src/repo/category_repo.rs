//! Category persistence.
//!
//! # Invariants
//! - `name` and `slug` are unique.
//! - A category referenced by any product cannot be deleted.

use crate::model::category::{Category, CategoryDraft, CATEGORY_SLUG_MAX_CHARS};
use crate::model::slug::SlugRequest;
use crate::model::EntityId;
use crate::repo::filter::SqlFilter;
use crate::repo::{
    count_references, map_write_error, not_found, resolve_slug, RepoError, RepoResult,
    SqliteCatalogStore, UniqueField,
};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const CATEGORY_SELECT_SQL: &str = "SELECT
    id,
    name,
    slug,
    description,
    image
FROM categories";

/// Query options for listing categories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryListQuery {
    /// Matched against name and description.
    pub search: Option<String>,
    pub limit: Option<u32>,
    pub offset: u32,
}

pub trait CategoryRepository {
    fn insert_category(&self, draft: &CategoryDraft, slug: &SlugRequest) -> RepoResult<Category>;
    /// Replaces fields; keeps the slug unless `draft.slug` is set.
    fn update_category(&self, id: EntityId, draft: &CategoryDraft) -> RepoResult<Category>;
    fn get_category(&self, id: EntityId) -> RepoResult<Option<Category>>;
    fn get_category_by_slug(&self, slug: &str) -> RepoResult<Option<Category>>;
    fn list_categories(&self, query: &CategoryListQuery) -> RepoResult<Vec<Category>>;
    fn delete_category(&self, id: EntityId) -> RepoResult<()>;
}

impl CategoryRepository for SqliteCatalogStore<'_> {
    fn insert_category(&self, draft: &CategoryDraft, slug: &SlugRequest) -> RepoResult<Category> {
        let tx = self.begin_immediate()?;
        let slug = resolve_slug(&tx, "categories", slug, CATEGORY_SLUG_MAX_CHARS)?;
        tx.execute(
            "INSERT INTO categories (name, slug, description, image)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                draft.name.as_str(),
                slug.as_str(),
                draft.description.as_str(),
                draft.image.as_str(),
            ],
        )
        .map_err(|err| map_write_error(&tx, err, &unique_fields(&draft.name, &slug), &[]))?;

        let category = load_required_category(&tx, tx.last_insert_rowid())?;
        tx.commit()?;
        Ok(category)
    }

    fn update_category(&self, id: EntityId, draft: &CategoryDraft) -> RepoResult<Category> {
        let tx = self.begin_immediate()?;
        let current = load_category(&tx, id)?.ok_or_else(|| not_found("category", id))?;
        let slug = draft.slug.clone().unwrap_or(current.slug);

        tx.execute(
            "UPDATE categories
             SET name = ?2, slug = ?3, description = ?4, image = ?5
             WHERE id = ?1;",
            params![
                id,
                draft.name.as_str(),
                slug.as_str(),
                draft.description.as_str(),
                draft.image.as_str(),
            ],
        )
        .map_err(|err| map_write_error(&tx, err, &unique_fields(&draft.name, &slug), &[]))?;

        let category = load_required_category(&tx, id)?;
        tx.commit()?;
        Ok(category)
    }

    fn get_category(&self, id: EntityId) -> RepoResult<Option<Category>> {
        load_category(self.conn(), id)
    }

    fn get_category_by_slug(&self, slug: &str) -> RepoResult<Option<Category>> {
        let category = self
            .conn()
            .query_row(
                &format!("{CATEGORY_SELECT_SQL} WHERE slug = ?1;"),
                [slug],
                parse_category_row,
            )
            .optional()?;
        Ok(category)
    }

    fn list_categories(&self, query: &CategoryListQuery) -> RepoResult<Vec<Category>> {
        let mut filter = SqlFilter::new();
        filter.search(&["name", "description"], query.search.as_deref());
        let (sql, binds) = filter.finish(CATEGORY_SELECT_SQL, "id ASC", query.limit, query.offset);

        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(binds), parse_category_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn delete_category(&self, id: EntityId) -> RepoResult<()> {
        let tx = self.begin_immediate()?;
        if load_category(&tx, id)?.is_none() {
            return Err(not_found("category", id));
        }

        let count = count_references(&tx, "products", "category_id", id)?;
        if count > 0 {
            return Err(RepoError::Protected {
                entity: "category",
                id,
                referenced_by: "product",
                count,
            });
        }

        tx.execute("DELETE FROM categories WHERE id = ?1;", [id])?;
        tx.commit()?;
        Ok(())
    }
}

fn unique_fields<'a>(name: &'a str, slug: &'a str) -> [UniqueField<'a>; 2] {
    [
        UniqueField {
            column: "categories.name",
            field: "name",
            value: name,
        },
        UniqueField {
            column: "categories.slug",
            field: "slug",
            value: slug,
        },
    ]
}

fn load_category(conn: &Connection, id: EntityId) -> RepoResult<Option<Category>> {
    let category = conn
        .query_row(
            &format!("{CATEGORY_SELECT_SQL} WHERE id = ?1;"),
            [id],
            parse_category_row,
        )
        .optional()?;
    Ok(category)
}

fn load_required_category(conn: &Connection, id: EntityId) -> RepoResult<Category> {
    load_category(conn, id)?.ok_or_else(|| {
        RepoError::InvalidData(format!("category {id} missing after write"))
    })
}

fn parse_category_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get("id")?,
        name: row.get("name")?,
        slug: row.get("slug")?,
        description: row.get("description")?,
        image: row.get("image")?,
    })
}
