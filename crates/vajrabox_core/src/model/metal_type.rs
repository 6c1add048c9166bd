//! Metal options (gold, silver, platinum) with purity and gram price.

use crate::model::price::{self, PRICE_PER_GRAM};
use crate::model::validation::{require_text, ValidationResult};
use crate::model::EntityId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const METAL_NAME_MAX_CHARS: usize = 50;
pub const METAL_PURITY_MAX_CHARS: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetalType {
    pub id: EntityId,
    /// e.g. `Gold`; feeds product slugs.
    pub name: String,
    /// e.g. `18K`, `925 Sterling`.
    pub purity: String,
    pub price_per_gram: Decimal,
}

impl Display for MetalType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.purity)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetalTypeDraft {
    pub name: String,
    pub purity: String,
    pub price_per_gram: Decimal,
}

impl MetalTypeDraft {
    pub fn new(
        name: impl Into<String>,
        purity: impl Into<String>,
        price_per_gram: Decimal,
    ) -> Self {
        Self {
            name: name.into(),
            purity: purity.into(),
            price_per_gram,
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        require_text("name", &self.name, METAL_NAME_MAX_CHARS)?;
        require_text("purity", &self.purity, METAL_PURITY_MAX_CHARS)?;
        price::to_minor_units("price_per_gram", PRICE_PER_GRAM, self.price_per_gram)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetalTypePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub purity: Option<String>,
    #[serde(default)]
    pub price_per_gram: Option<Decimal>,
}

impl MetalTypePatch {
    pub fn merge_into(self, current: &MetalType) -> MetalTypeDraft {
        MetalTypeDraft {
            name: self.name.unwrap_or_else(|| current.name.clone()),
            purity: self.purity.unwrap_or_else(|| current.purity.clone()),
            price_per_gram: self.price_per_gram.unwrap_or(current.price_per_gram),
        }
    }
}
