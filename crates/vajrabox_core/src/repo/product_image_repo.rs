//! Product image persistence.
//!
//! # Invariants
//! - At most one image per product has `is_primary = 1`.
//! - Writing a primary image clears its siblings' flag and persists the row
//!   in the same immediate transaction; the partial unique index
//!   `idx_product_images_single_primary` rejects anything that slips past.

use crate::model::product_image::{ProductImage, ProductImageDraft};
use crate::model::EntityId;
use crate::repo::filter::SqlFilter;
use crate::repo::{
    bool_to_int, map_write_error, not_found, parse_flag, RepoError, RepoResult,
    ReferenceField, SqliteCatalogStore, UniqueField,
};
use rusqlite::{params, params_from_iter, Connection, Row};

const PRODUCT_IMAGE_SELECT_SQL: &str = "SELECT
    id,
    product_id,
    image,
    is_primary,
    alt_text
FROM product_images";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductImageListQuery {
    pub product_id: Option<EntityId>,
    pub is_primary: Option<bool>,
    pub limit: Option<u32>,
    pub offset: u32,
}

pub trait ProductImageRepository {
    /// Inserts the image; a primary image demotes the product's others.
    fn insert_product_image(&self, draft: &ProductImageDraft) -> RepoResult<ProductImage>;
    /// Replaces the image; a primary image demotes the product's others.
    fn update_product_image(
        &self,
        id: EntityId,
        draft: &ProductImageDraft,
    ) -> RepoResult<ProductImage>;
    fn get_product_image(&self, id: EntityId) -> RepoResult<Option<ProductImage>>;
    fn list_product_images(&self, query: &ProductImageListQuery)
        -> RepoResult<Vec<ProductImage>>;
    fn delete_product_image(&self, id: EntityId) -> RepoResult<()>;
}

impl ProductImageRepository for SqliteCatalogStore<'_> {
    fn insert_product_image(&self, draft: &ProductImageDraft) -> RepoResult<ProductImage> {
        let tx = self.begin_immediate()?;
        if draft.is_primary {
            clear_primary(&tx, draft.product_id, None)?;
        }

        tx.execute(
            "INSERT INTO product_images (product_id, image, is_primary, alt_text)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                draft.product_id,
                draft.image.as_str(),
                bool_to_int(draft.is_primary),
                draft.alt_text.as_str(),
            ],
        )
        .map_err(|err| {
            map_write_error(
                &tx,
                err,
                &PRIMARY_UNIQUE,
                &[product_reference(draft.product_id)],
            )
        })?;

        let image = load_required_product_image(&tx, tx.last_insert_rowid())?;
        tx.commit()?;
        Ok(image)
    }

    fn update_product_image(
        &self,
        id: EntityId,
        draft: &ProductImageDraft,
    ) -> RepoResult<ProductImage> {
        let tx = self.begin_immediate()?;
        if load_product_image(&tx, id)?.is_none() {
            return Err(not_found("product image", id));
        }
        if draft.is_primary {
            clear_primary(&tx, draft.product_id, Some(id))?;
        }

        tx.execute(
            "UPDATE product_images
             SET product_id = ?2, image = ?3, is_primary = ?4, alt_text = ?5
             WHERE id = ?1;",
            params![
                id,
                draft.product_id,
                draft.image.as_str(),
                bool_to_int(draft.is_primary),
                draft.alt_text.as_str(),
            ],
        )
        .map_err(|err| {
            map_write_error(
                &tx,
                err,
                &PRIMARY_UNIQUE,
                &[product_reference(draft.product_id)],
            )
        })?;

        let image = load_required_product_image(&tx, id)?;
        tx.commit()?;
        Ok(image)
    }

    fn get_product_image(&self, id: EntityId) -> RepoResult<Option<ProductImage>> {
        load_product_image(self.conn(), id)
    }

    fn list_product_images(
        &self,
        query: &ProductImageListQuery,
    ) -> RepoResult<Vec<ProductImage>> {
        let mut filter = SqlFilter::new();
        filter
            .eq("product_id", query.product_id)
            .eq("is_primary", query.is_primary.map(bool_to_int));
        let (sql, binds) = filter.finish(
            PRODUCT_IMAGE_SELECT_SQL,
            "id ASC",
            query.limit,
            query.offset,
        );

        let mut stmt = self.conn().prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(binds))?;
        let mut images = Vec::new();
        while let Some(row) = rows.next()? {
            images.push(parse_product_image_row(row)?);
        }
        Ok(images)
    }

    fn delete_product_image(&self, id: EntityId) -> RepoResult<()> {
        let changed = self
            .conn()
            .execute("DELETE FROM product_images WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(not_found("product image", id));
        }
        Ok(())
    }
}

const PRIMARY_UNIQUE: [UniqueField<'static>; 1] = [UniqueField {
    column: "product_images.product_id",
    field: "is_primary",
    value: "true",
}];

fn product_reference(product_id: EntityId) -> ReferenceField {
    ReferenceField {
        table: "products",
        field: "product",
        id: product_id,
    }
}

fn clear_primary(conn: &Connection, product_id: EntityId, keep: Option<EntityId>) -> RepoResult<()> {
    conn.execute(
        "UPDATE product_images
         SET is_primary = 0
         WHERE product_id = ?1
           AND is_primary = 1
           AND (?2 IS NULL OR id <> ?2);",
        params![product_id, keep],
    )?;
    Ok(())
}

fn load_product_image(conn: &Connection, id: EntityId) -> RepoResult<Option<ProductImage>> {
    let mut stmt = conn.prepare(&format!("{PRODUCT_IMAGE_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_product_image_row(row)?));
    }
    Ok(None)
}

fn load_required_product_image(conn: &Connection, id: EntityId) -> RepoResult<ProductImage> {
    load_product_image(conn, id)?
        .ok_or_else(|| RepoError::InvalidData(format!("product image {id} missing after write")))
}

fn parse_product_image_row(row: &Row<'_>) -> RepoResult<ProductImage> {
    Ok(ProductImage {
        id: row.get("id")?,
        product_id: row.get("product_id")?,
        image: row.get("image")?,
        is_primary: parse_flag(row, "product_images", "is_primary")?,
        alt_text: row.get("alt_text")?,
    })
}
