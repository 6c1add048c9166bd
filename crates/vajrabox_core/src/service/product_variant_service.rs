//! Product variant use-case service.

use crate::model::product_variant::{ProductVariant, ProductVariantDraft, ProductVariantPatch};
use crate::model::EntityId;
use crate::repo::product_repo::ProductRepository;
use crate::repo::product_variant_repo::{ProductVariantListQuery, ProductVariantRepository};
use crate::service::{found, referenced, CatalogResult};
use log::info;

pub struct ProductVariantService<R: ProductVariantRepository + ProductRepository> {
    repo: R,
}

impl<R: ProductVariantRepository + ProductRepository> ProductVariantService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn list(&self, query: &ProductVariantListQuery) -> CatalogResult<Vec<ProductVariant>> {
        Ok(self.repo.list_product_variants(query)?)
    }

    pub fn get(&self, id: EntityId) -> CatalogResult<ProductVariant> {
        found(self.repo.get_product_variant(id)?, "product variant", id)
    }

    pub fn create(&self, draft: &ProductVariantDraft) -> CatalogResult<ProductVariant> {
        self.check_references(draft)?;
        let variant = self.repo.insert_product_variant(draft)?;
        info!(
            "event=catalog_write module=service entity=product_variant op=create status=ok id={}",
            variant.id
        );
        Ok(variant)
    }

    pub fn update(
        &self,
        id: EntityId,
        draft: &ProductVariantDraft,
    ) -> CatalogResult<ProductVariant> {
        self.check_references(draft)?;
        let variant = self.repo.update_product_variant(id, draft)?;
        info!(
            "event=catalog_write module=service entity=product_variant op=update status=ok id={id}"
        );
        Ok(variant)
    }

    pub fn partial_update(
        &self,
        id: EntityId,
        patch: ProductVariantPatch,
    ) -> CatalogResult<ProductVariant> {
        let current = self.get(id)?;
        self.update(id, &patch.merge_into(&current))
    }

    pub fn delete(&self, id: EntityId) -> CatalogResult<()> {
        self.repo.delete_product_variant(id)?;
        info!(
            "event=catalog_write module=service entity=product_variant op=delete status=ok id={id}"
        );
        Ok(())
    }

    fn check_references(&self, draft: &ProductVariantDraft) -> CatalogResult<()> {
        draft.validate()?;
        referenced(self.repo.get_product(draft.product_id)?, "product", draft.product_id)?;
        Ok(())
    }
}
