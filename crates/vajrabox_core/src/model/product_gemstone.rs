//! Product-gemstone link carrying quantity, size and placement.
//!
//! `(product, gemstone, placement)` is unique.

use crate::model::gemstone::Gemstone;
use crate::model::validation::{
    limit_text, require_reference, ValidationError, ValidationResult,
};
use crate::model::EntityId;
use serde::{Deserialize, Serialize};

pub const GEMSTONE_SIZE_MAX_CHARS: usize = 20;
pub const GEMSTONE_PLACEMENT_MAX_CHARS: usize = 100;
pub const GEMSTONE_QUANTITY_MAX: u16 = 32_767;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductGemstone {
    pub id: EntityId,
    #[serde(rename = "product")]
    pub product_id: EntityId,
    #[serde(rename = "gemstone")]
    pub gemstone_id: EntityId,
    pub quantity: u16,
    /// e.g. `0.5ct`.
    pub size: String,
    /// e.g. `Center stone`.
    pub placement: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductGemstoneDraft {
    #[serde(rename = "product")]
    pub product_id: EntityId,
    #[serde(rename = "gemstone")]
    pub gemstone_id: EntityId,
    #[serde(default = "default_quantity")]
    pub quantity: u16,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub placement: String,
}

fn default_quantity() -> u16 {
    1
}

impl ProductGemstoneDraft {
    pub fn new(product_id: EntityId, gemstone_id: EntityId) -> Self {
        Self {
            product_id,
            gemstone_id,
            quantity: default_quantity(),
            size: String::new(),
            placement: String::new(),
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        require_reference("product", self.product_id)?;
        require_reference("gemstone", self.gemstone_id)?;
        if self.quantity == 0 || self.quantity > GEMSTONE_QUANTITY_MAX {
            return Err(ValidationError::OutOfRange {
                field: "quantity",
                min: 1,
                max: i64::from(GEMSTONE_QUANTITY_MAX),
            });
        }
        limit_text("size", &self.size, GEMSTONE_SIZE_MAX_CHARS)?;
        limit_text("placement", &self.placement, GEMSTONE_PLACEMENT_MAX_CHARS)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductGemstonePatch {
    #[serde(default, rename = "product")]
    pub product_id: Option<EntityId>,
    #[serde(default, rename = "gemstone")]
    pub gemstone_id: Option<EntityId>,
    #[serde(default)]
    pub quantity: Option<u16>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub placement: Option<String>,
}

impl ProductGemstonePatch {
    pub fn merge_into(self, current: &ProductGemstone) -> ProductGemstoneDraft {
        ProductGemstoneDraft {
            product_id: self.product_id.unwrap_or(current.product_id),
            gemstone_id: self.gemstone_id.unwrap_or(current.gemstone_id),
            quantity: self.quantity.unwrap_or(current.quantity),
            size: self.size.unwrap_or_else(|| current.size.clone()),
            placement: self.placement.unwrap_or_else(|| current.placement.clone()),
        }
    }
}

/// Link row with the gemstone expanded, as nested in product details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductGemstoneDetail {
    pub id: EntityId,
    pub gemstone: Gemstone,
    pub quantity: u16,
    pub size: String,
    pub placement: String,
}
