//! Product images. At most one image per product is primary.

use crate::model::validation::{limit_text, require_reference, require_text, ValidationResult};
use crate::model::EntityId;
use serde::{Deserialize, Serialize};

pub const IMAGE_REF_MAX_CHARS: usize = 100;
pub const IMAGE_ALT_TEXT_MAX_CHARS: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub id: EntityId,
    #[serde(rename = "product")]
    pub product_id: EntityId,
    /// Storage reference, e.g. `products/solitaire-front.jpg`.
    pub image: String,
    pub is_primary: bool,
    pub alt_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImageDraft {
    #[serde(rename = "product")]
    pub product_id: EntityId,
    pub image: String,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub alt_text: String,
}

impl ProductImageDraft {
    pub fn new(product_id: EntityId, image: impl Into<String>) -> Self {
        Self {
            product_id,
            image: image.into(),
            is_primary: false,
            alt_text: String::new(),
        }
    }

    pub fn primary(mut self) -> Self {
        self.is_primary = true;
        self
    }

    pub fn validate(&self) -> ValidationResult<()> {
        require_reference("product", self.product_id)?;
        require_text("image", &self.image, IMAGE_REF_MAX_CHARS)?;
        limit_text("alt_text", &self.alt_text, IMAGE_ALT_TEXT_MAX_CHARS)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImagePatch {
    #[serde(default, rename = "product")]
    pub product_id: Option<EntityId>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub is_primary: Option<bool>,
    #[serde(default)]
    pub alt_text: Option<String>,
}

impl ProductImagePatch {
    pub fn merge_into(self, current: &ProductImage) -> ProductImageDraft {
        ProductImageDraft {
            product_id: self.product_id.unwrap_or(current.product_id),
            image: self.image.unwrap_or_else(|| current.image.clone()),
            is_primary: self.is_primary.unwrap_or(current.is_primary),
            alt_text: self.alt_text.unwrap_or_else(|| current.alt_text.clone()),
        }
    }
}
