//! Command-line entry point for the VajraBox catalog.
//!
//! # Responsibility
//! - Smoke-check core linkage (`ping`, `version`).
//! - Seed and browse a catalog database configured via `VAJRABOX_*`.

use log::error;
use rust_decimal::Decimal;
use std::error::Error;
use std::process::ExitCode;
use vajrabox_core::{
    init_logging, open_db, CatalogConfig, CatalogError, CategoryDraft, CategoryService,
    GemstoneDraft, GemstoneService, MetalTypeDraft, MetalTypeService, ProductDraft,
    ProductGemstoneDraft, ProductGemstoneService, ProductImageDraft, ProductImageService,
    ProductListQuery, ProductService, ProductVariantDraft, ProductVariantService,
    SqliteCatalogStore,
};

const USAGE: &str = "usage: vajrabox <ping|version|seed-demo|products [search]|product <slug>>";

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_command module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<(), Box<dyn Error>> {
    let command = args.first().map(String::as_str);
    match command {
        Some("ping") => {
            println!("vajrabox_core ping={}", vajrabox_core::ping());
            Ok(())
        }
        Some("version") => {
            println!("vajrabox_core version={}", vajrabox_core::core_version());
            Ok(())
        }
        Some("seed-demo") => with_store(seed_demo),
        Some("products") => {
            let search = args.get(1).cloned();
            with_store(|store| {
                let products = ProductService::new(store).list(&ProductListQuery {
                    search,
                    ..ProductListQuery::default()
                })?;
                println!("{}", serde_json::to_string_pretty(&products)?);
                Ok(())
            })
        }
        Some("product") => {
            let slug = args.get(1).ok_or(USAGE)?.clone();
            with_store(|store| {
                let product = ProductService::new(store).get_by_slug(&slug)?;
                println!("{}", serde_json::to_string_pretty(&product)?);
                Ok(())
            })
        }
        _ => Err(USAGE.into()),
    }
}

/// Loads config, starts logging when a log dir is set, and opens the store.
fn with_store<F>(action: F) -> Result<(), Box<dyn Error>>
where
    F: FnOnce(SqliteCatalogStore<'_>) -> Result<(), Box<dyn Error>>,
{
    let config = CatalogConfig::from_env()?;
    if let Some(log_dir) = config.log_dir.as_ref() {
        let log_dir = log_dir.to_str().ok_or("VAJRABOX_LOG_DIR is not valid UTF-8")?;
        init_logging(config.log_level, log_dir)?;
    }
    let conn = open_db(&config.database_path)?;
    let store = SqliteCatalogStore::try_new(&conn)?;
    action(store)
}

fn seed_demo(store: SqliteCatalogStore<'_>) -> Result<(), Box<dyn Error>> {
    let categories = CategoryService::new(store);
    match categories.get_by_slug("rings") {
        Ok(_) => {
            println!("demo catalog already present");
            return Ok(());
        }
        Err(CatalogError::NotFound { .. }) => {}
        Err(err) => return Err(err.into()),
    }

    let rings = categories.create(&CategoryDraft {
        description: "Engagement and everyday rings".to_string(),
        ..CategoryDraft::new("Rings")
    })?;
    let gold = MetalTypeService::new(store).create(&MetalTypeDraft::new(
        "Gold",
        "18K",
        Decimal::new(6000, 2),
    ))?;
    let diamond = GemstoneService::new(store).create(&GemstoneDraft {
        color: "White".to_string(),
        is_precious: true,
        ..GemstoneDraft::new("Diamond")
    })?;

    let products = ProductService::new(store);
    let solitaire = products.create(&ProductDraft {
        is_customizable: true,
        stock_quantity: 4,
        available_sizes: vec!["6".to_string(), "7".to_string(), "8".to_string()],
        ..ProductDraft::new(
            rings.id,
            gold.id,
            "Solitaire",
            "Single brilliant-cut diamond on a plain band",
            Decimal::new(350, 2),
            Decimal::new(50000, 2),
        )
    })?;

    ProductGemstoneService::new(store).create(&ProductGemstoneDraft {
        size: "0.5ct".to_string(),
        placement: "center".to_string(),
        ..ProductGemstoneDraft::new(solitaire.id, diamond.id)
    })?;
    ProductImageService::new(store).create(
        &ProductImageDraft::new(solitaire.id, "products/solitaire-front.jpg").primary(),
    )?;
    ProductVariantService::new(store).create(&ProductVariantDraft {
        price_modifier: Decimal::new(7500, 2),
        ..ProductVariantDraft::new(solitaire.id, "Platinum prongs")
    })?;

    let detail = products.get(solitaire.id)?;
    println!("{}", serde_json::to_string_pretty(&detail)?);
    Ok(())
}
