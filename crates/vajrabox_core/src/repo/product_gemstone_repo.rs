//! Product-gemstone link persistence.

use crate::model::product_gemstone::{
    ProductGemstone, ProductGemstoneDetail, ProductGemstoneDraft,
};
use crate::model::EntityId;
use crate::repo::filter::SqlFilter;
use crate::repo::gemstone_repo::parse_gemstone_columns;
use crate::repo::{
    map_write_error, not_found, ReferenceField, RepoError, RepoResult, SqliteCatalogStore,
    UniqueField,
};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const PRODUCT_GEMSTONE_SELECT_SQL: &str = "SELECT
    id,
    product_id,
    gemstone_id,
    quantity,
    size,
    placement
FROM product_gemstones";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductGemstoneListQuery {
    pub product_id: Option<EntityId>,
    pub gemstone_id: Option<EntityId>,
    pub limit: Option<u32>,
    pub offset: u32,
}

pub trait ProductGemstoneRepository {
    fn insert_product_gemstone(&self, draft: &ProductGemstoneDraft)
        -> RepoResult<ProductGemstone>;
    fn update_product_gemstone(
        &self,
        id: EntityId,
        draft: &ProductGemstoneDraft,
    ) -> RepoResult<ProductGemstone>;
    fn get_product_gemstone(&self, id: EntityId) -> RepoResult<Option<ProductGemstone>>;
    fn list_product_gemstones(
        &self,
        query: &ProductGemstoneListQuery,
    ) -> RepoResult<Vec<ProductGemstone>>;
    /// Links of one product with the gemstone expanded, in link order.
    fn list_gemstone_details(&self, product_id: EntityId)
        -> RepoResult<Vec<ProductGemstoneDetail>>;
    fn delete_product_gemstone(&self, id: EntityId) -> RepoResult<()>;
}

impl ProductGemstoneRepository for SqliteCatalogStore<'_> {
    fn insert_product_gemstone(
        &self,
        draft: &ProductGemstoneDraft,
    ) -> RepoResult<ProductGemstone> {
        self.conn()
            .execute(
                "INSERT INTO product_gemstones (product_id, gemstone_id, quantity, size, placement)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    draft.product_id,
                    draft.gemstone_id,
                    draft.quantity,
                    draft.size.as_str(),
                    draft.placement.as_str(),
                ],
            )
            .map_err(|err| {
                map_write_error(
                    self.conn(),
                    err,
                    &unique_fields(&draft.placement),
                    &reference_fields(draft),
                )
            })?;
        load_required_product_gemstone(self.conn(), self.conn().last_insert_rowid())
    }

    fn update_product_gemstone(
        &self,
        id: EntityId,
        draft: &ProductGemstoneDraft,
    ) -> RepoResult<ProductGemstone> {
        let changed = self
            .conn()
            .execute(
                "UPDATE product_gemstones
                 SET product_id = ?2, gemstone_id = ?3, quantity = ?4, size = ?5, placement = ?6
                 WHERE id = ?1;",
                params![
                    id,
                    draft.product_id,
                    draft.gemstone_id,
                    draft.quantity,
                    draft.size.as_str(),
                    draft.placement.as_str(),
                ],
            )
            .map_err(|err| {
                map_write_error(
                    self.conn(),
                    err,
                    &unique_fields(&draft.placement),
                    &reference_fields(draft),
                )
            })?;
        if changed == 0 {
            return Err(not_found("product gemstone", id));
        }
        load_required_product_gemstone(self.conn(), id)
    }

    fn get_product_gemstone(&self, id: EntityId) -> RepoResult<Option<ProductGemstone>> {
        load_product_gemstone(self.conn(), id)
    }

    fn list_product_gemstones(
        &self,
        query: &ProductGemstoneListQuery,
    ) -> RepoResult<Vec<ProductGemstone>> {
        let mut filter = SqlFilter::new();
        filter
            .eq("product_id", query.product_id)
            .eq("gemstone_id", query.gemstone_id);
        let (sql, binds) = filter.finish(
            PRODUCT_GEMSTONE_SELECT_SQL,
            "id ASC",
            query.limit,
            query.offset,
        );

        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(binds), parse_product_gemstone_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn list_gemstone_details(
        &self,
        product_id: EntityId,
    ) -> RepoResult<Vec<ProductGemstoneDetail>> {
        let mut stmt = self.conn().prepare(
            "SELECT
                pg.id AS id,
                pg.quantity AS quantity,
                pg.size AS size,
                pg.placement AS placement,
                g.id AS gemstone_id,
                g.name AS gemstone_name,
                g.color AS gemstone_color,
                g.is_precious AS gemstone_is_precious
             FROM product_gemstones pg
             INNER JOIN gemstones g ON g.id = pg.gemstone_id
             WHERE pg.product_id = ?1
             ORDER BY pg.id ASC;",
        )?;
        let mut rows = stmt.query([product_id])?;
        let mut details = Vec::new();
        while let Some(row) = rows.next()? {
            details.push(ProductGemstoneDetail {
                id: row.get("id")?,
                gemstone: parse_gemstone_columns(row, "gemstone_")?,
                quantity: row.get("quantity")?,
                size: row.get("size")?,
                placement: row.get("placement")?,
            });
        }
        Ok(details)
    }

    fn delete_product_gemstone(&self, id: EntityId) -> RepoResult<()> {
        let changed = self
            .conn()
            .execute("DELETE FROM product_gemstones WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(not_found("product gemstone", id));
        }
        Ok(())
    }
}

fn reference_fields(draft: &ProductGemstoneDraft) -> [ReferenceField; 2] {
    [
        ReferenceField {
            table: "products",
            field: "product",
            id: draft.product_id,
        },
        ReferenceField {
            table: "gemstones",
            field: "gemstone",
            id: draft.gemstone_id,
        },
    ]
}

fn unique_fields(placement: &str) -> [UniqueField<'_>; 1] {
    [UniqueField {
        column: "product_gemstones.placement",
        field: "placement",
        value: placement,
    }]
}

fn load_product_gemstone(conn: &Connection, id: EntityId) -> RepoResult<Option<ProductGemstone>> {
    let link = conn
        .query_row(
            &format!("{PRODUCT_GEMSTONE_SELECT_SQL} WHERE id = ?1;"),
            [id],
            parse_product_gemstone_row,
        )
        .optional()?;
    Ok(link)
}

fn load_required_product_gemstone(conn: &Connection, id: EntityId) -> RepoResult<ProductGemstone> {
    load_product_gemstone(conn, id)?.ok_or_else(|| {
        RepoError::InvalidData(format!("product gemstone {id} missing after write"))
    })
}

fn parse_product_gemstone_row(row: &Row<'_>) -> rusqlite::Result<ProductGemstone> {
    Ok(ProductGemstone {
        id: row.get("id")?,
        product_id: row.get("product_id")?,
        gemstone_id: row.get("gemstone_id")?,
        quantity: row.get("quantity")?,
        size: row.get("size")?,
        placement: row.get("placement")?,
    })
}
