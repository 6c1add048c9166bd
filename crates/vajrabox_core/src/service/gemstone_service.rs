//! Gemstone use-case service.

use crate::model::gemstone::{Gemstone, GemstoneDraft, GemstonePatch};
use crate::model::EntityId;
use crate::repo::gemstone_repo::{GemstoneListQuery, GemstoneRepository};
use crate::service::{found, CatalogResult};
use log::info;

pub struct GemstoneService<R: GemstoneRepository> {
    repo: R,
}

impl<R: GemstoneRepository> GemstoneService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn list(&self, query: &GemstoneListQuery) -> CatalogResult<Vec<Gemstone>> {
        Ok(self.repo.list_gemstones(query)?)
    }

    pub fn get(&self, id: EntityId) -> CatalogResult<Gemstone> {
        found(self.repo.get_gemstone(id)?, "gemstone", id)
    }

    pub fn create(&self, draft: &GemstoneDraft) -> CatalogResult<Gemstone> {
        draft.validate()?;
        let gemstone = self.repo.insert_gemstone(draft)?;
        info!(
            "event=catalog_write module=service entity=gemstone op=create status=ok id={}",
            gemstone.id
        );
        Ok(gemstone)
    }

    pub fn update(&self, id: EntityId, draft: &GemstoneDraft) -> CatalogResult<Gemstone> {
        draft.validate()?;
        let gemstone = self.repo.update_gemstone(id, draft)?;
        info!("event=catalog_write module=service entity=gemstone op=update status=ok id={id}");
        Ok(gemstone)
    }

    pub fn partial_update(&self, id: EntityId, patch: GemstonePatch) -> CatalogResult<Gemstone> {
        let current = self.get(id)?;
        self.update(id, &patch.merge_into(&current))
    }

    pub fn delete(&self, id: EntityId) -> CatalogResult<()> {
        self.repo.delete_gemstone(id)?;
        info!("event=catalog_write module=service entity=gemstone op=delete status=ok id={id}");
        Ok(())
    }
}
