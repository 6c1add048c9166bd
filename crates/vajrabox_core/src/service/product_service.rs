//! Product use-case service.
//!
//! # Responsibility
//! - Check category and metal type exist before any product write.
//! - Derive a missing slug from `"{name} {metal name}"`.
//! - Return products as detail projections with nested metal, gemstones,
//!   images, variants and `current_price`.
//!
//! # Invariants
//! - List order follows the repository: newest first.
//! - Updates never re-derive the slug.

use crate::model::metal_type::MetalType;
use crate::model::product::{
    Product, ProductDetail, ProductDraft, ProductPatch, PRODUCT_SLUG_MAX_CHARS,
};
use crate::model::slug;
use crate::model::EntityId;
use crate::repo::product_image_repo::ProductImageListQuery;
use crate::repo::product_repo::ProductListQuery;
use crate::repo::product_variant_repo::ProductVariantListQuery;
use crate::repo::{CatalogRepository, RepoError};
use crate::service::{found, referenced, CatalogError, CatalogResult};
use log::info;

/// Product façade; needs the whole catalog store for references and detail.
pub struct ProductService<S: CatalogRepository> {
    store: S,
}

impl<S: CatalogRepository> ProductService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn list(&self, query: &ProductListQuery) -> CatalogResult<Vec<ProductDetail>> {
        self.store
            .list_products(query)?
            .into_iter()
            .map(|product| self.detail(product))
            .collect()
    }

    pub fn get(&self, id: EntityId) -> CatalogResult<ProductDetail> {
        let product = found(self.store.get_product(id)?, "product", id)?;
        self.detail(product)
    }

    pub fn get_by_slug(&self, slug: &str) -> CatalogResult<ProductDetail> {
        let product = found(self.store.get_product_by_slug(slug)?, "product", slug)?;
        self.detail(product)
    }

    /// Creates a product; an absent slug is derived from name and metal.
    ///
    /// A derived slug that is already taken gets a `-2`, `-3`, ... suffix;
    /// a taken explicit slug is rejected as a duplicate.
    pub fn create(&self, draft: &ProductDraft) -> CatalogResult<ProductDetail> {
        let metal = self.check_references(draft)?;
        let request = slug::request_for(
            draft.slug.as_deref(),
            &draft.slug_source(&metal.name),
            PRODUCT_SLUG_MAX_CHARS,
        )?;
        let product = self.store.insert_product(draft, &request)?;
        info!(
            "event=catalog_write module=service entity=product op=create status=ok id={}",
            product.id
        );
        self.detail(product)
    }

    /// Replaces every field; the slug stays unless `draft.slug` is set.
    pub fn update(&self, id: EntityId, draft: &ProductDraft) -> CatalogResult<ProductDetail> {
        self.check_references(draft)?;
        let product = self.store.update_product(id, draft)?;
        info!("event=catalog_write module=service entity=product op=update status=ok id={id}");
        self.detail(product)
    }

    pub fn partial_update(&self, id: EntityId, patch: ProductPatch) -> CatalogResult<ProductDetail> {
        let current = found(self.store.get_product(id)?, "product", id)?;
        self.update(id, &patch.merge_into(&current))
    }

    /// Deletes the product together with its gemstone links, images and
    /// variants.
    pub fn delete(&self, id: EntityId) -> CatalogResult<()> {
        self.store.delete_product(id)?;
        info!("event=catalog_write module=service entity=product op=delete status=ok id={id}");
        Ok(())
    }

    fn check_references(&self, draft: &ProductDraft) -> CatalogResult<MetalType> {
        draft.validate()?;
        referenced(
            self.store.get_category(draft.category_id)?,
            "category",
            draft.category_id,
        )?;
        referenced(
            self.store.get_metal_type(draft.metal_type_id)?,
            "metal_type",
            draft.metal_type_id,
        )
    }

    fn detail(&self, product: Product) -> CatalogResult<ProductDetail> {
        let metal = self
            .store
            .get_metal_type(product.metal_type_id)?
            .ok_or_else(|| {
                CatalogError::Storage(RepoError::InvalidData(format!(
                    "product {} points at missing metal type {}",
                    product.id, product.metal_type_id
                )))
            })?;
        let gemstones = self.store.list_gemstone_details(product.id)?;
        let images = self.store.list_product_images(&ProductImageListQuery {
            product_id: Some(product.id),
            ..ProductImageListQuery::default()
        })?;
        let variants = self.store.list_product_variants(&ProductVariantListQuery {
            product_id: Some(product.id),
            ..ProductVariantListQuery::default()
        })?;
        Ok(ProductDetail::assemble(product, metal, gemstones, images, variants))
    }
}
