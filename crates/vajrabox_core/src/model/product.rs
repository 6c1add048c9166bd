//! Core jewelry product model and its read projection.
//!
//! # Invariants
//! - `slug` is unique across products and derived from `name` + metal name
//!   when not supplied on create.
//! - `current_price` is computed on read, never stored.
//! - `stock_quantity` is never negative (enforced by its unsigned type).

use crate::model::metal_type::MetalType;
use crate::model::price::{self, PRODUCT_PRICE, WEIGHT_GRAMS};
use crate::model::product_gemstone::ProductGemstoneDetail;
use crate::model::product_image::ProductImage;
use crate::model::product_variant::ProductVariant;
use crate::model::slug;
use crate::model::validation::{
    require_reference, require_text, ValidationError, ValidationResult,
};
use crate::model::{double_option, EntityId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const PRODUCT_NAME_MAX_CHARS: usize = 255;
pub const PRODUCT_SLUG_MAX_CHARS: usize = 300;
pub const PRODUCT_SIZE_MAX_CHARS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: EntityId,
    #[serde(rename = "category")]
    pub category_id: EntityId,
    #[serde(rename = "metal_type")]
    pub metal_type_id: EntityId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub weight_grams: Decimal,
    pub base_price: Decimal,
    pub discount_price: Option<Decimal>,
    pub is_customizable: bool,
    pub stock_quantity: u32,
    /// Ordered size labels, e.g. ring sizes `["6", "7", "8"]`.
    pub available_sizes: Vec<String>,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds.
    pub updated_at: i64,
}

impl Product {
    pub fn current_price(&self) -> Decimal {
        price::current_price(self.base_price, self.discount_price)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    #[serde(rename = "category")]
    pub category_id: EntityId,
    #[serde(rename = "metal_type")]
    pub metal_type_id: EntityId,
    pub name: String,
    /// `None` on create derives the slug; `None` on replace keeps it.
    #[serde(default)]
    pub slug: Option<String>,
    pub description: String,
    pub weight_grams: Decimal,
    pub base_price: Decimal,
    #[serde(default)]
    pub discount_price: Option<Decimal>,
    #[serde(default)]
    pub is_customizable: bool,
    #[serde(default)]
    pub stock_quantity: u32,
    #[serde(default)]
    pub available_sizes: Vec<String>,
}

impl ProductDraft {
    /// Minimal draft; remaining fields take their defaults.
    pub fn new(
        category_id: EntityId,
        metal_type_id: EntityId,
        name: impl Into<String>,
        description: impl Into<String>,
        weight_grams: Decimal,
        base_price: Decimal,
    ) -> Self {
        Self {
            category_id,
            metal_type_id,
            name: name.into(),
            slug: None,
            description: description.into(),
            weight_grams,
            base_price,
            discount_price: None,
            is_customizable: false,
            stock_quantity: 0,
            available_sizes: Vec::new(),
        }
    }

    /// Checks field presence and limits. Reference existence is checked by
    /// the service against the store.
    pub fn validate(&self) -> ValidationResult<()> {
        require_reference("category", self.category_id)?;
        require_reference("metal_type", self.metal_type_id)?;
        require_text("name", &self.name, PRODUCT_NAME_MAX_CHARS)?;
        if let Some(value) = self.slug.as_deref() {
            slug::validate_explicit(value, PRODUCT_SLUG_MAX_CHARS)?;
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "description",
            });
        }
        price::to_minor_units("weight_grams", WEIGHT_GRAMS, self.weight_grams)?;
        price::to_minor_units("base_price", PRODUCT_PRICE, self.base_price)?;
        if let Some(discount) = self.discount_price {
            price::to_minor_units("discount_price", PRODUCT_PRICE, discount)?;
        }
        for size in &self.available_sizes {
            require_text("available_sizes", size, PRODUCT_SIZE_MAX_CHARS)?;
        }
        Ok(())
    }

    /// Text a missing slug is derived from: product name followed by metal.
    pub fn slug_source(&self, metal_name: &str) -> String {
        format!("{} {}", self.name, metal_name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPatch {
    #[serde(default, rename = "category")]
    pub category_id: Option<EntityId>,
    #[serde(default, rename = "metal_type")]
    pub metal_type_id: Option<EntityId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub weight_grams: Option<Decimal>,
    #[serde(default)]
    pub base_price: Option<Decimal>,
    /// `Some(None)` clears the discount; `None` leaves it untouched.
    #[serde(default, deserialize_with = "double_option")]
    pub discount_price: Option<Option<Decimal>>,
    #[serde(default)]
    pub is_customizable: Option<bool>,
    #[serde(default)]
    pub stock_quantity: Option<u32>,
    #[serde(default)]
    pub available_sizes: Option<Vec<String>>,
}

impl ProductPatch {
    pub fn merge_into(self, current: &Product) -> ProductDraft {
        ProductDraft {
            category_id: self.category_id.unwrap_or(current.category_id),
            metal_type_id: self.metal_type_id.unwrap_or(current.metal_type_id),
            name: self.name.unwrap_or_else(|| current.name.clone()),
            slug: self.slug,
            description: self
                .description
                .unwrap_or_else(|| current.description.clone()),
            weight_grams: self.weight_grams.unwrap_or(current.weight_grams),
            base_price: self.base_price.unwrap_or(current.base_price),
            discount_price: self.discount_price.unwrap_or(current.discount_price),
            is_customizable: self.is_customizable.unwrap_or(current.is_customizable),
            stock_quantity: self.stock_quantity.unwrap_or(current.stock_quantity),
            available_sizes: self
                .available_sizes
                .unwrap_or_else(|| current.available_sizes.clone()),
        }
    }
}

/// Product as returned by the façade: nested metal, gemstones, images and
/// variants plus the computed `current_price`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductDetail {
    pub id: EntityId,
    pub name: String,
    pub slug: String,
    pub description: String,
    #[serde(rename = "category")]
    pub category_id: EntityId,
    pub metal_type: MetalType,
    pub gemstones: Vec<ProductGemstoneDetail>,
    pub weight_grams: Decimal,
    pub base_price: Decimal,
    pub discount_price: Option<Decimal>,
    pub current_price: Decimal,
    pub is_customizable: bool,
    pub stock_quantity: u32,
    pub available_sizes: Vec<String>,
    pub images: Vec<ProductImage>,
    pub variants: Vec<ProductVariant>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl ProductDetail {
    pub fn assemble(
        product: Product,
        metal_type: MetalType,
        gemstones: Vec<ProductGemstoneDetail>,
        images: Vec<ProductImage>,
        variants: Vec<ProductVariant>,
    ) -> Self {
        let current_price = product.current_price();
        Self {
            id: product.id,
            name: product.name,
            slug: product.slug,
            description: product.description,
            category_id: product.category_id,
            metal_type,
            gemstones,
            weight_grams: product.weight_grams,
            base_price: product.base_price,
            discount_price: product.discount_price,
            current_price,
            is_customizable: product.is_customizable,
            stock_quantity: product.stock_quantity,
            available_sizes: product.available_sizes,
            images,
            variants,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }

    /// Image flagged primary, if any.
    pub fn primary_image(&self) -> Option<&ProductImage> {
        self.images.iter().find(|image| image.is_primary)
    }
}
