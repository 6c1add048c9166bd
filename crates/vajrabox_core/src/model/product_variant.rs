//! Customization options (engraving, chain length, ...) with a signed price
//! modifier.

use crate::model::price::{self, PRICE_MODIFIER};
use crate::model::validation::{require_reference, require_text, ValidationResult};
use crate::model::EntityId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const VARIANT_NAME_MAX_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariant {
    pub id: EntityId,
    #[serde(rename = "product")]
    pub product_id: EntityId,
    pub name: String,
    pub price_modifier: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariantDraft {
    #[serde(rename = "product")]
    pub product_id: EntityId,
    pub name: String,
    #[serde(default)]
    pub price_modifier: Decimal,
}

impl ProductVariantDraft {
    pub fn new(product_id: EntityId, name: impl Into<String>) -> Self {
        Self {
            product_id,
            name: name.into(),
            price_modifier: Decimal::ZERO,
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        require_reference("product", self.product_id)?;
        require_text("name", &self.name, VARIANT_NAME_MAX_CHARS)?;
        price::to_minor_units("price_modifier", PRICE_MODIFIER, self.price_modifier)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariantPatch {
    #[serde(default, rename = "product")]
    pub product_id: Option<EntityId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price_modifier: Option<Decimal>,
}

impl ProductVariantPatch {
    pub fn merge_into(self, current: &ProductVariant) -> ProductVariantDraft {
        ProductVariantDraft {
            product_id: self.product_id.unwrap_or(current.product_id),
            name: self.name.unwrap_or_else(|| current.name.clone()),
            price_modifier: self.price_modifier.unwrap_or(current.price_modifier),
        }
    }
}
