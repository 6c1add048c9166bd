//! Catalog use-case services (the read/write façade).
//!
//! # Responsibility
//! - Validate drafts and check foreign-key targets before touching storage.
//! - Derive missing slugs explicitly, then hand off to the repository.
//! - Translate repository failures into the catalog error taxonomy.
//!
//! # Invariants
//! - Every failed operation returns one `CatalogError`; nothing is retried.
//! - Writes log metadata only (entity, operation, id), never field values.

use crate::model::validation::ValidationError;
use crate::model::EntityId;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod category_service;
pub mod gemstone_service;
pub mod metal_type_service;
pub mod product_gemstone_service;
pub mod product_image_service;
pub mod product_service;
pub mod product_variant_service;

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Error surfaced by every façade operation.
#[derive(Debug)]
pub enum CatalogError {
    /// Missing or malformed field, uniqueness violation or unknown reference.
    Validation(ValidationError),
    /// Delete blocked by rows that still reference the target.
    ReferentialIntegrity {
        entity: &'static str,
        id: EntityId,
        referenced_by: &'static str,
        count: u64,
    },
    /// Lookup by id or slug found nothing.
    NotFound { entity: &'static str, key: String },
    /// Database failure or corrupt persisted data.
    Storage(RepoError),
}

impl CatalogError {
    /// Field named by a validation failure.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Validation(err) => Some(err.field()),
            _ => None,
        }
    }
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::ReferentialIntegrity {
                entity,
                id,
                referenced_by,
                count,
            } => write!(
                f,
                "cannot delete {entity} {id} because it is referenced by {count} {referenced_by} row(s)"
            ),
            Self::NotFound { entity, key } => write!(f, "{entity} not found: {key}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for CatalogError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound { entity, key } => Self::NotFound { entity, key },
            RepoError::Protected {
                entity,
                id,
                referenced_by,
                count,
            } => Self::ReferentialIntegrity {
                entity,
                id,
                referenced_by,
                count,
            },
            other => Self::Storage(other),
        }
    }
}

impl From<ValidationError> for CatalogError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Unwraps a lookup result or reports the entity as missing.
pub(crate) fn found<T>(value: Option<T>, entity: &'static str, key: impl ToString) -> CatalogResult<T> {
    value.ok_or_else(|| CatalogError::NotFound {
        entity,
        key: key.to_string(),
    })
}

/// Unwraps a foreign-key lookup or reports the field as an unknown reference.
pub(crate) fn referenced<T>(value: Option<T>, field: &'static str, id: EntityId) -> CatalogResult<T> {
    value.ok_or(CatalogError::Validation(ValidationError::UnknownReference { field, id }))
}
