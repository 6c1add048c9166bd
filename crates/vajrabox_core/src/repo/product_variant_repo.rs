//! Product variant persistence.

use crate::model::price::{self, PRICE_MODIFIER};
use crate::model::product_variant::{ProductVariant, ProductVariantDraft};
use crate::model::EntityId;
use crate::repo::filter::SqlFilter;
use crate::repo::{
    map_write_error, not_found, ReferenceField, RepoError, RepoResult, SqliteCatalogStore,
};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const PRODUCT_VARIANT_SELECT_SQL: &str = "SELECT
    id,
    product_id,
    name,
    price_modifier_minor
FROM product_variants";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductVariantListQuery {
    pub product_id: Option<EntityId>,
    pub limit: Option<u32>,
    pub offset: u32,
}

pub trait ProductVariantRepository {
    fn insert_product_variant(&self, draft: &ProductVariantDraft) -> RepoResult<ProductVariant>;
    fn update_product_variant(
        &self,
        id: EntityId,
        draft: &ProductVariantDraft,
    ) -> RepoResult<ProductVariant>;
    fn get_product_variant(&self, id: EntityId) -> RepoResult<Option<ProductVariant>>;
    fn list_product_variants(
        &self,
        query: &ProductVariantListQuery,
    ) -> RepoResult<Vec<ProductVariant>>;
    fn delete_product_variant(&self, id: EntityId) -> RepoResult<()>;
}

impl ProductVariantRepository for SqliteCatalogStore<'_> {
    fn insert_product_variant(&self, draft: &ProductVariantDraft) -> RepoResult<ProductVariant> {
        let modifier_minor =
            price::to_minor_units("price_modifier", PRICE_MODIFIER, draft.price_modifier)?;
        self.conn()
            .execute(
                "INSERT INTO product_variants (product_id, name, price_modifier_minor)
                 VALUES (?1, ?2, ?3);",
                params![draft.product_id, draft.name.as_str(), modifier_minor],
            )
            .map_err(|err| map_write_error(self.conn(), err, &[], &reference_fields(draft)))?;
        load_required_product_variant(self.conn(), self.conn().last_insert_rowid())
    }

    fn update_product_variant(
        &self,
        id: EntityId,
        draft: &ProductVariantDraft,
    ) -> RepoResult<ProductVariant> {
        let modifier_minor =
            price::to_minor_units("price_modifier", PRICE_MODIFIER, draft.price_modifier)?;
        let changed = self
            .conn()
            .execute(
                "UPDATE product_variants
                 SET product_id = ?2, name = ?3, price_modifier_minor = ?4
                 WHERE id = ?1;",
                params![id, draft.product_id, draft.name.as_str(), modifier_minor],
            )
            .map_err(|err| map_write_error(self.conn(), err, &[], &reference_fields(draft)))?;
        if changed == 0 {
            return Err(not_found("product variant", id));
        }
        load_required_product_variant(self.conn(), id)
    }

    fn get_product_variant(&self, id: EntityId) -> RepoResult<Option<ProductVariant>> {
        let variant = self
            .conn()
            .query_row(
                &format!("{PRODUCT_VARIANT_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_product_variant_row,
            )
            .optional()?;
        Ok(variant)
    }

    fn list_product_variants(
        &self,
        query: &ProductVariantListQuery,
    ) -> RepoResult<Vec<ProductVariant>> {
        let mut filter = SqlFilter::new();
        filter.eq("product_id", query.product_id);
        let (sql, binds) = filter.finish(
            PRODUCT_VARIANT_SELECT_SQL,
            "id ASC",
            query.limit,
            query.offset,
        );

        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(binds), parse_product_variant_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn delete_product_variant(&self, id: EntityId) -> RepoResult<()> {
        let changed = self
            .conn()
            .execute("DELETE FROM product_variants WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(not_found("product variant", id));
        }
        Ok(())
    }
}

fn reference_fields(draft: &ProductVariantDraft) -> [ReferenceField; 1] {
    [ReferenceField {
        table: "products",
        field: "product",
        id: draft.product_id,
    }]
}

fn load_required_product_variant(conn: &Connection, id: EntityId) -> RepoResult<ProductVariant> {
    conn.query_row(
        &format!("{PRODUCT_VARIANT_SELECT_SQL} WHERE id = ?1;"),
        [id],
        parse_product_variant_row,
    )
    .optional()?
    .ok_or_else(|| RepoError::InvalidData(format!("product variant {id} missing after write")))
}

fn parse_product_variant_row(row: &Row<'_>) -> rusqlite::Result<ProductVariant> {
    Ok(ProductVariant {
        id: row.get("id")?,
        product_id: row.get("product_id")?,
        name: row.get("name")?,
        price_modifier: price::from_minor_units(row.get("price_modifier_minor")?),
    })
}
