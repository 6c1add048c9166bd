//! Metal type use-case service.

use crate::model::metal_type::{MetalType, MetalTypeDraft, MetalTypePatch};
use crate::model::EntityId;
use crate::repo::metal_type_repo::{MetalTypeListQuery, MetalTypeRepository};
use crate::service::{found, CatalogResult};
use log::info;

pub struct MetalTypeService<R: MetalTypeRepository> {
    repo: R,
}

impl<R: MetalTypeRepository> MetalTypeService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn list(&self, query: &MetalTypeListQuery) -> CatalogResult<Vec<MetalType>> {
        Ok(self.repo.list_metal_types(query)?)
    }

    pub fn get(&self, id: EntityId) -> CatalogResult<MetalType> {
        found(self.repo.get_metal_type(id)?, "metal type", id)
    }

    pub fn create(&self, draft: &MetalTypeDraft) -> CatalogResult<MetalType> {
        draft.validate()?;
        let metal = self.repo.insert_metal_type(draft)?;
        info!(
            "event=catalog_write module=service entity=metal_type op=create status=ok id={}",
            metal.id
        );
        Ok(metal)
    }

    pub fn update(&self, id: EntityId, draft: &MetalTypeDraft) -> CatalogResult<MetalType> {
        draft.validate()?;
        let metal = self.repo.update_metal_type(id, draft)?;
        info!("event=catalog_write module=service entity=metal_type op=update status=ok id={id}");
        Ok(metal)
    }

    pub fn partial_update(&self, id: EntityId, patch: MetalTypePatch) -> CatalogResult<MetalType> {
        let current = self.get(id)?;
        self.update(id, &patch.merge_into(&current))
    }

    /// Fails with `ReferentialIntegrity` while any product uses the metal.
    pub fn delete(&self, id: EntityId) -> CatalogResult<()> {
        self.repo.delete_metal_type(id)?;
        info!("event=catalog_write module=service entity=metal_type op=delete status=ok id={id}");
        Ok(())
    }
}
