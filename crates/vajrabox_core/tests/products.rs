use rust_decimal::Decimal;
use rusqlite::Connection;
use vajrabox_core::db::open_db_in_memory;
use vajrabox_core::model::slug::SlugRequest;
use vajrabox_core::repo::product_gemstone_repo::ProductGemstoneRepository;
use vajrabox_core::repo::product_repo::ProductRepository;
use vajrabox_core::repo::product_variant_repo::ProductVariantRepository;
use vajrabox_core::{
    CatalogError, Category, CategoryDraft, CategoryService, GemstoneDraft, GemstoneService,
    MetalType, MetalTypeDraft, MetalTypeService, ProductDraft, ProductGemstoneDraft,
    ProductGemstoneService, ProductImageDraft, ProductImageService, ProductListQuery,
    ProductPatch, ProductService, ProductVariantDraft, ProductVariantService, RepoError,
    SqliteCatalogStore, ValidationError,
};

fn rings_and_gold(store: SqliteCatalogStore<'_>) -> (Category, MetalType) {
    let rings = CategoryService::new(store)
        .create(&CategoryDraft::new("Rings"))
        .unwrap();
    let gold = MetalTypeService::new(store)
        .create(&MetalTypeDraft::new("Gold", "18K", Decimal::new(6000, 2)))
        .unwrap();
    (rings, gold)
}

fn solitaire(category: &Category, metal: &MetalType) -> ProductDraft {
    ProductDraft::new(
        category.id,
        metal.id,
        "Solitaire",
        "Single stone on a plain band",
        Decimal::new(350, 2),
        Decimal::new(50000, 2),
    )
}

fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

#[test]
fn solitaire_example_derives_slug_and_tracks_current_price() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCatalogStore::try_new(&conn).unwrap();
    let (rings, gold) = rings_and_gold(store);
    let products = ProductService::new(store);

    let created = products.create(&solitaire(&rings, &gold)).unwrap();
    assert_eq!(created.slug, "solitaire-gold");
    assert_eq!(created.current_price, Decimal::new(50000, 2));
    assert_eq!(created.discount_price, None);
    assert_eq!(created.metal_type, gold);
    assert_eq!(created.category_id, rings.id);

    let discounted = products
        .partial_update(
            created.id,
            ProductPatch {
                discount_price: Some(Some(Decimal::new(45000, 2))),
                ..ProductPatch::default()
            },
        )
        .unwrap();
    assert_eq!(discounted.current_price, Decimal::new(45000, 2));
    assert_eq!(discounted.base_price, Decimal::new(50000, 2));
    assert_eq!(discounted.slug, "solitaire-gold");

    let cleared = products
        .partial_update(
            created.id,
            ProductPatch {
                discount_price: Some(None),
                ..ProductPatch::default()
            },
        )
        .unwrap();
    assert_eq!(cleared.current_price, Decimal::new(50000, 2));
}

#[test]
fn zero_and_oversized_discounts_still_override_base_price() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCatalogStore::try_new(&conn).unwrap();
    let (rings, gold) = rings_and_gold(store);
    let products = ProductService::new(store);

    let free = products
        .create(&ProductDraft {
            discount_price: Some(Decimal::ZERO),
            ..solitaire(&rings, &gold)
        })
        .unwrap();
    assert_eq!(free.current_price, Decimal::ZERO);

    let marked_up = products
        .create(&ProductDraft {
            discount_price: Some(Decimal::new(60000, 2)),
            ..solitaire(&rings, &gold)
        })
        .unwrap();
    assert_eq!(marked_up.current_price, Decimal::new(60000, 2));
}

#[test]
fn colliding_derived_slugs_get_numeric_suffix() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCatalogStore::try_new(&conn).unwrap();
    let (rings, gold) = rings_and_gold(store);
    let products = ProductService::new(store);

    let first = products.create(&solitaire(&rings, &gold)).unwrap();
    let second = products.create(&solitaire(&rings, &gold)).unwrap();
    let third = products.create(&solitaire(&rings, &gold)).unwrap();

    assert_eq!(first.slug, "solitaire-gold");
    assert_eq!(second.slug, "solitaire-gold-2");
    assert_eq!(third.slug, "solitaire-gold-3");
}

#[test]
fn duplicate_explicit_slug_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCatalogStore::try_new(&conn).unwrap();
    let (rings, gold) = rings_and_gold(store);
    let products = ProductService::new(store);

    products.create(&solitaire(&rings, &gold)).unwrap();
    let err = products
        .create(&ProductDraft {
            slug: Some("solitaire-gold".to_string()),
            ..solitaire(&rings, &gold)
        })
        .unwrap_err();

    assert!(matches!(
        err,
        CatalogError::Validation(ValidationError::Duplicate { field: "slug", .. })
    ));
    assert_eq!(count_rows(&conn, "products"), 1);
}

#[test]
fn unknown_category_or_metal_is_reported_by_field() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCatalogStore::try_new(&conn).unwrap();
    let (rings, gold) = rings_and_gold(store);
    let products = ProductService::new(store);

    let err = products
        .create(&ProductDraft {
            category_id: 999,
            ..solitaire(&rings, &gold)
        })
        .unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Validation(ValidationError::UnknownReference {
            field: "category",
            id: 999
        })
    ));

    let err = products
        .create(&ProductDraft {
            metal_type_id: 999,
            ..solitaire(&rings, &gold)
        })
        .unwrap_err();
    assert_eq!(err.field(), Some("metal_type"));
}

#[test]
fn missing_description_and_negative_price_are_rejected() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCatalogStore::try_new(&conn).unwrap();
    let (rings, gold) = rings_and_gold(store);
    let products = ProductService::new(store);

    let err = products
        .create(&ProductDraft {
            description: String::new(),
            ..solitaire(&rings, &gold)
        })
        .unwrap_err();
    assert_eq!(err.field(), Some("description"));

    let err = products
        .create(&ProductDraft {
            base_price: Decimal::new(-1, 2),
            ..solitaire(&rings, &gold)
        })
        .unwrap_err();
    assert_eq!(err.field(), Some("base_price"));
}

#[test]
fn available_sizes_keep_their_order() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCatalogStore::try_new(&conn).unwrap();
    let (rings, gold) = rings_and_gold(store);
    let products = ProductService::new(store);

    let sizes = vec!["8".to_string(), "6".to_string(), "7.5".to_string()];
    let created = products
        .create(&ProductDraft {
            available_sizes: sizes.clone(),
            ..solitaire(&rings, &gold)
        })
        .unwrap();
    assert_eq!(created.available_sizes, sizes);
    assert_eq!(
        products.get_by_slug("solitaire-gold").unwrap().available_sizes,
        sizes
    );
}

#[test]
fn detail_projection_nests_related_rows() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCatalogStore::try_new(&conn).unwrap();
    let (rings, gold) = rings_and_gold(store);
    let products = ProductService::new(store);
    let product = products.create(&solitaire(&rings, &gold)).unwrap();

    let diamond = GemstoneService::new(store)
        .create(&GemstoneDraft {
            is_precious: true,
            ..GemstoneDraft::new("Diamond")
        })
        .unwrap();
    ProductGemstoneService::new(store)
        .create(&ProductGemstoneDraft {
            placement: "center".to_string(),
            ..ProductGemstoneDraft::new(product.id, diamond.id)
        })
        .unwrap();
    ProductImageService::new(store)
        .create(&ProductImageDraft::new(product.id, "products/solitaire.jpg").primary())
        .unwrap();
    ProductVariantService::new(store)
        .create(&ProductVariantDraft {
            price_modifier: Decimal::new(-2500, 2),
            ..ProductVariantDraft::new(product.id, "Thin band")
        })
        .unwrap();

    let detail = products.get(product.id).unwrap();
    assert_eq!(detail.gemstones.len(), 1);
    assert_eq!(detail.gemstones[0].gemstone, diamond);
    assert_eq!(detail.gemstones[0].quantity, 1);
    assert_eq!(detail.gemstones[0].placement, "center");
    assert_eq!(
        detail.primary_image().map(|image| image.image.as_str()),
        Some("products/solitaire.jpg")
    );
    assert_eq!(detail.variants[0].price_modifier, Decimal::new(-2500, 2));

    let json = serde_json::to_value(&detail).unwrap();
    assert_eq!(json["metal_type"]["name"], "Gold");
    assert_eq!(json["category"], rings.id);
    assert_eq!(json["current_price"], "500.00");
}

#[test]
fn duplicate_gemstone_placement_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCatalogStore::try_new(&conn).unwrap();
    let (rings, gold) = rings_and_gold(store);
    let product = ProductService::new(store)
        .create(&solitaire(&rings, &gold))
        .unwrap();
    let diamond = GemstoneService::new(store)
        .create(&GemstoneDraft::new("Diamond"))
        .unwrap();
    let links = ProductGemstoneService::new(store);

    let side = ProductGemstoneDraft {
        quantity: 2,
        placement: "side".to_string(),
        ..ProductGemstoneDraft::new(product.id, diamond.id)
    };
    links.create(&side).unwrap();
    let err = links.create(&side).unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Validation(ValidationError::Duplicate {
            field: "placement",
            ..
        })
    ));

    links
        .create(&ProductGemstoneDraft {
            placement: "halo".to_string(),
            ..side
        })
        .unwrap();
}

#[test]
fn zero_gemstone_quantity_is_out_of_range() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCatalogStore::try_new(&conn).unwrap();
    let (rings, gold) = rings_and_gold(store);
    let product = ProductService::new(store)
        .create(&solitaire(&rings, &gold))
        .unwrap();
    let diamond = GemstoneService::new(store)
        .create(&GemstoneDraft::new("Diamond"))
        .unwrap();

    let err = ProductGemstoneService::new(store)
        .create(&ProductGemstoneDraft {
            quantity: 0,
            ..ProductGemstoneDraft::new(product.id, diamond.id)
        })
        .unwrap_err();
    assert_eq!(err.field(), Some("quantity"));
}

#[test]
fn deleting_product_cascades_to_owned_rows() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCatalogStore::try_new(&conn).unwrap();
    let (rings, gold) = rings_and_gold(store);
    let products = ProductService::new(store);
    let product = products.create(&solitaire(&rings, &gold)).unwrap();
    let diamond = GemstoneService::new(store)
        .create(&GemstoneDraft::new("Diamond"))
        .unwrap();

    ProductGemstoneService::new(store)
        .create(&ProductGemstoneDraft::new(product.id, diamond.id))
        .unwrap();
    let images = ProductImageService::new(store);
    images
        .create(&ProductImageDraft::new(product.id, "products/a.jpg").primary())
        .unwrap();
    images
        .create(&ProductImageDraft::new(product.id, "products/b.jpg"))
        .unwrap();
    ProductVariantService::new(store)
        .create(&ProductVariantDraft::new(product.id, "Matte"))
        .unwrap();

    products.delete(product.id).unwrap();

    assert_eq!(count_rows(&conn, "products"), 0);
    assert_eq!(count_rows(&conn, "product_gemstones"), 0);
    assert_eq!(count_rows(&conn, "product_images"), 0);
    assert_eq!(count_rows(&conn, "product_variants"), 0);
    assert_eq!(count_rows(&conn, "gemstones"), 1);
    assert!(matches!(
        products.get(product.id),
        Err(CatalogError::NotFound { entity: "product", .. })
    ));
}

#[test]
fn list_returns_newest_first() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCatalogStore::try_new(&conn).unwrap();
    let (rings, gold) = rings_and_gold(store);
    let products = ProductService::new(store);

    let older = products.create(&solitaire(&rings, &gold)).unwrap();
    let newer = products
        .create(&ProductDraft {
            name: "Eternity".to_string(),
            ..solitaire(&rings, &gold)
        })
        .unwrap();

    let listed = products.list(&ProductListQuery::default()).unwrap();
    let ids: Vec<_> = listed.iter().map(|product| product.id).collect();
    assert_eq!(ids, vec![newer.id, older.id]);
}

#[test]
fn full_update_replaces_fields_and_keeps_slug() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCatalogStore::try_new(&conn).unwrap();
    let (rings, gold) = rings_and_gold(store);
    let products = ProductService::new(store);
    let created = products.create(&solitaire(&rings, &gold)).unwrap();

    let updated = products
        .update(
            created.id,
            &ProductDraft {
                stock_quantity: 3,
                is_customizable: true,
                ..ProductDraft::new(
                    rings.id,
                    gold.id,
                    "Solitaire Deluxe",
                    "Larger stone",
                    Decimal::new(420, 2),
                    Decimal::new(72000, 2),
                )
            },
        )
        .unwrap();

    assert_eq!(updated.name, "Solitaire Deluxe");
    assert_eq!(updated.slug, "solitaire-gold");
    assert_eq!(updated.stock_quantity, 3);
    assert!(updated.is_customizable);
    assert!(updated.updated_at >= created.updated_at);
}

#[test]
fn store_names_reference_that_vanished_before_insert() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCatalogStore::try_new(&conn).unwrap();
    let (rings, gold) = rings_and_gold(store);
    let silver = MetalTypeService::new(store)
        .create(&MetalTypeDraft::new("Silver", "925", Decimal::new(95, 2)))
        .unwrap();
    MetalTypeService::new(store).delete(silver.id).unwrap();

    // The metal passed the service check, then was deleted before the write.
    let err = store
        .insert_product(
            &solitaire(&rings, &silver),
            &SlugRequest::Derived("solitaire-silver".to_string()),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::UnknownReference {
            field: "metal_type",
            id,
        }) if id == silver.id
    ));
    assert_eq!(count_rows(&conn, "products"), 0);

    let product = ProductService::new(store)
        .create(&solitaire(&rings, &gold))
        .unwrap();
    let err = store
        .insert_product_gemstone(&ProductGemstoneDraft::new(product.id, 404))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::UnknownReference {
            field: "gemstone",
            id: 404,
        })
    ));
}

#[test]
fn variant_write_for_deleted_product_is_unknown_reference() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCatalogStore::try_new(&conn).unwrap();
    let (rings, gold) = rings_and_gold(store);
    let products = ProductService::new(store);
    let product = products.create(&solitaire(&rings, &gold)).unwrap();
    let variant = ProductVariantService::new(store)
        .create(&ProductVariantDraft::new(product.id, "Size 7"))
        .unwrap();

    let err = store
        .update_product_variant(variant.id, &ProductVariantDraft::new(product.id + 100, "Size 8"))
        .unwrap_err();
    let err = CatalogError::from(err);
    assert_eq!(err.field(), Some("product"));
    assert!(matches!(err, CatalogError::Validation(_)));
}
