//! Product image use-case service.
//!
//! Writing an image with `is_primary = true` demotes every other image of
//! the same product in the same transaction.

use crate::model::product_image::{ProductImage, ProductImageDraft, ProductImagePatch};
use crate::model::EntityId;
use crate::repo::product_image_repo::{ProductImageListQuery, ProductImageRepository};
use crate::repo::product_repo::ProductRepository;
use crate::service::{found, referenced, CatalogResult};
use log::info;

pub struct ProductImageService<R: ProductImageRepository + ProductRepository> {
    repo: R,
}

impl<R: ProductImageRepository + ProductRepository> ProductImageService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn list(&self, query: &ProductImageListQuery) -> CatalogResult<Vec<ProductImage>> {
        Ok(self.repo.list_product_images(query)?)
    }

    pub fn get(&self, id: EntityId) -> CatalogResult<ProductImage> {
        found(self.repo.get_product_image(id)?, "product image", id)
    }

    pub fn create(&self, draft: &ProductImageDraft) -> CatalogResult<ProductImage> {
        self.check_references(draft)?;
        let image = self.repo.insert_product_image(draft)?;
        info!(
            "event=catalog_write module=service entity=product_image op=create status=ok id={} primary={}",
            image.id, image.is_primary
        );
        Ok(image)
    }

    pub fn update(&self, id: EntityId, draft: &ProductImageDraft) -> CatalogResult<ProductImage> {
        self.check_references(draft)?;
        let image = self.repo.update_product_image(id, draft)?;
        info!(
            "event=catalog_write module=service entity=product_image op=update status=ok id={id} primary={}",
            image.is_primary
        );
        Ok(image)
    }

    pub fn partial_update(
        &self,
        id: EntityId,
        patch: ProductImagePatch,
    ) -> CatalogResult<ProductImage> {
        let current = self.get(id)?;
        self.update(id, &patch.merge_into(&current))
    }

    pub fn delete(&self, id: EntityId) -> CatalogResult<()> {
        self.repo.delete_product_image(id)?;
        info!("event=catalog_write module=service entity=product_image op=delete status=ok id={id}");
        Ok(())
    }

    fn check_references(&self, draft: &ProductImageDraft) -> CatalogResult<()> {
        draft.validate()?;
        referenced(self.repo.get_product(draft.product_id)?, "product", draft.product_id)?;
        Ok(())
    }
}
