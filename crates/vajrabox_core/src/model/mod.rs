//! Catalog domain model.
//!
//! # Responsibility
//! - Define the catalog records (categories, metals, gemstones, products and
//!   their images, variants and gemstone links).
//! - Define write inputs (`*Draft` for create/replace, `*Patch` for partial
//!   update) and their field-level validation.
//! - Host the pure derivation rules: slug normalization and price math.
//!
//! # Invariants
//! - Every persisted record is identified by a positive [`EntityId`].
//! - Drafts are validated before any repository write.

use serde::{Deserialize, Deserializer};

pub mod category;
pub mod gemstone;
pub mod metal_type;
pub mod price;
pub mod product;
pub mod product_gemstone;
pub mod product_image;
pub mod product_variant;
pub mod slug;
pub mod validation;

/// Numeric row identity shared by all catalog entities.
pub type EntityId = i64;

/// Distinguishes "field absent" from "field explicitly null" in patches.
///
/// Used with `#[serde(default, deserialize_with = "double_option")]` on
/// `Option<Option<T>>` fields.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
