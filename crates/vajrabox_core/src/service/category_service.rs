//! Category use-case service.
//!
//! # Invariants
//! - A category created without a slug gets one derived from its name.
//! - Updates keep the stored slug unless a new one is supplied.

use crate::model::category::{Category, CategoryDraft, CategoryPatch, CATEGORY_SLUG_MAX_CHARS};
use crate::model::slug;
use crate::model::EntityId;
use crate::repo::category_repo::{CategoryListQuery, CategoryRepository};
use crate::service::{found, CatalogResult};
use log::info;

/// Category façade over a repository implementation.
pub struct CategoryService<R: CategoryRepository> {
    repo: R,
}

impl<R: CategoryRepository> CategoryService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn list(&self, query: &CategoryListQuery) -> CatalogResult<Vec<Category>> {
        Ok(self.repo.list_categories(query)?)
    }

    pub fn get(&self, id: EntityId) -> CatalogResult<Category> {
        found(self.repo.get_category(id)?, "category", id)
    }

    pub fn get_by_slug(&self, slug: &str) -> CatalogResult<Category> {
        found(self.repo.get_category_by_slug(slug)?, "category", slug)
    }

    pub fn create(&self, draft: &CategoryDraft) -> CatalogResult<Category> {
        draft.validate()?;
        let request = slug::request_for(draft.slug.as_deref(), &draft.name, CATEGORY_SLUG_MAX_CHARS)?;
        let category = self.repo.insert_category(draft, &request)?;
        info!(
            "event=catalog_write module=service entity=category op=create status=ok id={}",
            category.id
        );
        Ok(category)
    }

    /// Replaces every field of the category.
    pub fn update(&self, id: EntityId, draft: &CategoryDraft) -> CatalogResult<Category> {
        draft.validate()?;
        let category = self.repo.update_category(id, draft)?;
        info!("event=catalog_write module=service entity=category op=update status=ok id={id}");
        Ok(category)
    }

    pub fn partial_update(&self, id: EntityId, patch: CategoryPatch) -> CatalogResult<Category> {
        let current = self.get(id)?;
        self.update(id, &patch.merge_into(&current))
    }

    /// Fails with `ReferentialIntegrity` while any product is in the category.
    pub fn delete(&self, id: EntityId) -> CatalogResult<()> {
        self.repo.delete_category(id)?;
        info!("event=catalog_write module=service entity=category op=delete status=ok id={id}");
        Ok(())
    }
}
