//! Core catalog logic for VajraBox.
//! This crate owns the jewelry catalog model, its storage and its write-time rules.

pub mod auth;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use auth::token::{TokenClaims, TokenIssuer, TokenPair, TokenSettings, TokenType};
pub use auth::{obtain_token_pair, AuthError, CredentialVerifier, UserIdentity};
pub use config::{CatalogConfig, ConfigError};
pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::category::{Category, CategoryDraft, CategoryPatch};
pub use model::gemstone::{Gemstone, GemstoneDraft, GemstonePatch};
pub use model::metal_type::{MetalType, MetalTypeDraft, MetalTypePatch};
pub use model::product::{Product, ProductDetail, ProductDraft, ProductPatch};
pub use model::product_gemstone::{
    ProductGemstone, ProductGemstoneDetail, ProductGemstoneDraft, ProductGemstonePatch,
};
pub use model::product_image::{ProductImage, ProductImageDraft, ProductImagePatch};
pub use model::product_variant::{ProductVariant, ProductVariantDraft, ProductVariantPatch};
pub use model::validation::ValidationError;
pub use model::EntityId;
pub use repo::category_repo::CategoryListQuery;
pub use repo::gemstone_repo::GemstoneListQuery;
pub use repo::metal_type_repo::MetalTypeListQuery;
pub use repo::product_gemstone_repo::ProductGemstoneListQuery;
pub use repo::product_image_repo::ProductImageListQuery;
pub use repo::product_repo::ProductListQuery;
pub use repo::product_variant_repo::ProductVariantListQuery;
pub use repo::{CatalogRepository, RepoError, RepoResult, SqliteCatalogStore};
pub use service::category_service::CategoryService;
pub use service::gemstone_service::GemstoneService;
pub use service::metal_type_service::MetalTypeService;
pub use service::product_gemstone_service::ProductGemstoneService;
pub use service::product_image_service::ProductImageService;
pub use service::product_service::ProductService;
pub use service::product_variant_service::ProductVariantService;
pub use service::{CatalogError, CatalogResult};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
