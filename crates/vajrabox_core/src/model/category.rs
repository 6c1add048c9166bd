//! Jewelry category (rings, necklaces, bracelets, ...).

use crate::model::slug;
use crate::model::validation::{limit_text, require_text, ValidationResult};
use crate::model::EntityId;
use serde::{Deserialize, Serialize};

pub const CATEGORY_NAME_MAX_CHARS: usize = 100;
pub const CATEGORY_SLUG_MAX_CHARS: usize = 150;
pub const CATEGORY_IMAGE_MAX_CHARS: usize = 100;

/// Persisted category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: EntityId,
    /// Unique display name.
    pub name: String,
    /// Unique URL identifier, derived from `name` unless supplied.
    pub slug: String,
    pub description: String,
    /// Storage reference of the category image; blank when unset.
    pub image: String,
}

/// Create/replace input for a category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDraft {
    pub name: String,
    /// `None` on create derives the slug from `name`; `None` on replace keeps
    /// the current slug.
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
}

impl CategoryDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        require_text("name", &self.name, CATEGORY_NAME_MAX_CHARS)?;
        if let Some(value) = self.slug.as_deref() {
            slug::validate_explicit(value, CATEGORY_SLUG_MAX_CHARS)?;
        }
        limit_text("image", &self.image, CATEGORY_IMAGE_MAX_CHARS)
    }
}

/// Partial update input; absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl CategoryPatch {
    /// Merges this patch over `current` into a full replacement draft.
    pub fn merge_into(self, current: &Category) -> CategoryDraft {
        CategoryDraft {
            name: self.name.unwrap_or_else(|| current.name.clone()),
            slug: self.slug,
            description: self
                .description
                .unwrap_or_else(|| current.description.clone()),
            image: self.image.unwrap_or_else(|| current.image.clone()),
        }
    }
}
