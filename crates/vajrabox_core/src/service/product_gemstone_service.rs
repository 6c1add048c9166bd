//! Product-gemstone link use-case service.

use crate::model::product_gemstone::{
    ProductGemstone, ProductGemstoneDraft, ProductGemstonePatch,
};
use crate::model::EntityId;
use crate::repo::gemstone_repo::GemstoneRepository;
use crate::repo::product_gemstone_repo::{ProductGemstoneListQuery, ProductGemstoneRepository};
use crate::repo::product_repo::ProductRepository;
use crate::service::{found, referenced, CatalogResult};
use log::info;

pub struct ProductGemstoneService<R>
where
    R: ProductGemstoneRepository + ProductRepository + GemstoneRepository,
{
    repo: R,
}

impl<R> ProductGemstoneService<R>
where
    R: ProductGemstoneRepository + ProductRepository + GemstoneRepository,
{
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn list(&self, query: &ProductGemstoneListQuery) -> CatalogResult<Vec<ProductGemstone>> {
        Ok(self.repo.list_product_gemstones(query)?)
    }

    pub fn get(&self, id: EntityId) -> CatalogResult<ProductGemstone> {
        found(self.repo.get_product_gemstone(id)?, "product gemstone", id)
    }

    /// Links a gemstone to a product. `(product, gemstone, placement)` must
    /// be unique.
    pub fn create(&self, draft: &ProductGemstoneDraft) -> CatalogResult<ProductGemstone> {
        self.check_references(draft)?;
        let link = self.repo.insert_product_gemstone(draft)?;
        info!(
            "event=catalog_write module=service entity=product_gemstone op=create status=ok id={}",
            link.id
        );
        Ok(link)
    }

    pub fn update(
        &self,
        id: EntityId,
        draft: &ProductGemstoneDraft,
    ) -> CatalogResult<ProductGemstone> {
        self.check_references(draft)?;
        let link = self.repo.update_product_gemstone(id, draft)?;
        info!(
            "event=catalog_write module=service entity=product_gemstone op=update status=ok id={id}"
        );
        Ok(link)
    }

    pub fn partial_update(
        &self,
        id: EntityId,
        patch: ProductGemstonePatch,
    ) -> CatalogResult<ProductGemstone> {
        let current = self.get(id)?;
        self.update(id, &patch.merge_into(&current))
    }

    pub fn delete(&self, id: EntityId) -> CatalogResult<()> {
        self.repo.delete_product_gemstone(id)?;
        info!(
            "event=catalog_write module=service entity=product_gemstone op=delete status=ok id={id}"
        );
        Ok(())
    }

    fn check_references(&self, draft: &ProductGemstoneDraft) -> CatalogResult<()> {
        draft.validate()?;
        referenced(self.repo.get_product(draft.product_id)?, "product", draft.product_id)?;
        referenced(
            self.repo.get_gemstone(draft.gemstone_id)?,
            "gemstone",
            draft.gemstone_id,
        )?;
        Ok(())
    }
}
