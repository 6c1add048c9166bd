use rust_decimal::Decimal;
use std::str::FromStr;
use vajrabox_core::db::open_db_in_memory;
use vajrabox_core::{
    CategoryDraft, CategoryListQuery, CategoryService, EntityId, GemstoneDraft,
    GemstoneListQuery, GemstoneService, MetalTypeDraft, MetalTypeListQuery, MetalTypeService,
    ProductDetail, ProductDraft, ProductListQuery, ProductService, SqliteCatalogStore,
};

struct Catalog {
    rings: EntityId,
    earrings: EntityId,
    gold: EntityId,
    silver: EntityId,
}

fn seed(store: SqliteCatalogStore<'_>) -> Catalog {
    let categories = CategoryService::new(store);
    let rings = categories
        .create(&CategoryDraft {
            description: "Bands and solitaires".to_string(),
            ..CategoryDraft::new("Rings")
        })
        .unwrap();
    let earrings = categories
        .create(&CategoryDraft {
            description: "Studs, hoops and drops".to_string(),
            ..CategoryDraft::new("Earrings")
        })
        .unwrap();

    let metals = MetalTypeService::new(store);
    let gold = metals
        .create(&MetalTypeDraft::new("Gold", "22K", Decimal::new(6800, 2)))
        .unwrap();
    let silver = metals
        .create(&MetalTypeDraft::new("Silver", "925", Decimal::new(95, 2)))
        .unwrap();

    let products = ProductService::new(store);
    let product = |category: EntityId, metal: EntityId, name: &str, price: i64| ProductDraft {
        is_customizable: name.contains("Custom"),
        ..ProductDraft::new(
            category,
            metal,
            name,
            format!("{name} with a 100% recycled finish"),
            Decimal::new(300, 2),
            Decimal::new(price, 2),
        )
    };
    products
        .create(&product(rings.id, gold.id, "Classic Band", 25000))
        .unwrap();
    products
        .create(&product(rings.id, silver.id, "Custom Signet", 8000))
        .unwrap();
    products
        .create(&product(earrings.id, gold.id, "Drop Earrings", 41050))
        .unwrap();
    products
        .create(&product(earrings.id, silver.id, "Hoops", 4500))
        .unwrap();

    Catalog {
        rings: rings.id,
        earrings: earrings.id,
        gold: gold.id,
        silver: silver.id,
    }
}

fn names(products: &[ProductDetail]) -> Vec<&str> {
    let mut names: Vec<&str> = products.iter().map(|product| product.name.as_str()).collect();
    names.sort_unstable();
    names
}

#[test]
fn exact_filters_match_foreign_keys_and_flags() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCatalogStore::try_new(&conn).unwrap();
    let catalog = seed(store);
    let products = ProductService::new(store);

    let rings = products
        .list(&ProductListQuery {
            category_id: Some(catalog.rings),
            ..ProductListQuery::default()
        })
        .unwrap();
    assert_eq!(names(&rings), vec!["Classic Band", "Custom Signet"]);

    let gold_earrings = products
        .list(&ProductListQuery {
            category_id: Some(catalog.earrings),
            metal_type_id: Some(catalog.gold),
            ..ProductListQuery::default()
        })
        .unwrap();
    assert_eq!(names(&gold_earrings), vec!["Drop Earrings"]);

    let customizable = products
        .list(&ProductListQuery {
            is_customizable: Some(true),
            ..ProductListQuery::default()
        })
        .unwrap();
    assert_eq!(names(&customizable), vec!["Custom Signet"]);
}

#[test]
fn price_range_is_inclusive() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCatalogStore::try_new(&conn).unwrap();
    seed(store);
    let products = ProductService::new(store);

    let mid_range = products
        .list(&ProductListQuery {
            base_price_gte: Some(Decimal::new(8000, 2)),
            base_price_lte: Some(Decimal::new(25000, 2)),
            ..ProductListQuery::default()
        })
        .unwrap();
    assert_eq!(names(&mid_range), vec!["Classic Band", "Custom Signet"]);

    let premium = products
        .list(&ProductListQuery {
            base_price_gte: Some(Decimal::new(410500, 3)),
            ..ProductListQuery::default()
        })
        .unwrap();
    assert_eq!(names(&premium), vec!["Drop Earrings"]);

    let fractional_bound = products
        .list(&ProductListQuery {
            base_price_lte: Some(Decimal::new(450001, 4)),
            ..ProductListQuery::default()
        })
        .unwrap();
    assert_eq!(names(&fractional_bound), vec!["Hoops"]);
}

#[test]
fn huge_price_bounds_filter_instead_of_failing() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCatalogStore::try_new(&conn).unwrap();
    seed(store);
    let products = ProductService::new(store);
    let huge = Decimal::from_i128_with_scale(10_i128.pow(27), 0);

    let above_everything = products
        .list(&ProductListQuery {
            base_price_gte: Some(huge),
            ..ProductListQuery::default()
        })
        .unwrap();
    assert!(above_everything.is_empty());

    let under_huge = products
        .list(&ProductListQuery {
            base_price_lte: Some(huge),
            ..ProductListQuery::default()
        })
        .unwrap();
    assert_eq!(under_huge.len(), 4);

    let max_bounds = products
        .list(&ProductListQuery {
            base_price_gte: Some(Decimal::MAX),
            base_price_lte: Some(Decimal::MAX),
            ..ProductListQuery::default()
        })
        .unwrap();
    assert!(max_bounds.is_empty());
}

#[test]
fn out_of_column_range_bounds_are_clamped() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCatalogStore::try_new(&conn).unwrap();
    seed(store);
    let products = ProductService::new(store);

    let wide_upper = products
        .list(&ProductListQuery {
            base_price_lte: Some(Decimal::from_str("100000000000").unwrap()),
            ..ProductListQuery::default()
        })
        .unwrap();
    assert_eq!(wide_upper.len(), 4);

    let negative_lower = products
        .list(&ProductListQuery {
            base_price_gte: Some(Decimal::from(-5)),
            ..ProductListQuery::default()
        })
        .unwrap();
    assert_eq!(negative_lower.len(), 4);

    let both = products
        .list(&ProductListQuery {
            base_price_gte: Some(Decimal::from(-5)),
            base_price_lte: Some(Decimal::new(8000, 2)),
            ..ProductListQuery::default()
        })
        .unwrap();
    assert_eq!(names(&both), vec!["Custom Signet", "Hoops"]);

    let above_column_max = products
        .list(&ProductListQuery {
            base_price_gte: Some(Decimal::from_str("10000000000").unwrap()),
            ..ProductListQuery::default()
        })
        .unwrap();
    assert!(above_column_max.is_empty());

    let negative_upper = products
        .list(&ProductListQuery {
            base_price_lte: Some(Decimal::new(-1, 2)),
            ..ProductListQuery::default()
        })
        .unwrap();
    assert!(negative_upper.is_empty());
}

#[test]
fn accented_names_fold_for_slug_and_search() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCatalogStore::try_new(&conn).unwrap();
    let catalog = seed(store);

    let cafe = CategoryService::new(store)
        .create(&CategoryDraft::new("Café Noir"))
        .unwrap();
    assert_eq!(cafe.slug, "cafe-noir");

    let found = CategoryService::new(store)
        .list(&CategoryListQuery {
            search: Some("CAFÉ".to_string()),
            ..CategoryListQuery::default()
        })
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, cafe.id);

    let products = ProductService::new(store);
    let creme = products
        .create(&ProductDraft::new(
            catalog.rings,
            catalog.gold,
            "Crème Band",
            "Brushed finish",
            Decimal::new(300, 2),
            Decimal::new(19900, 2),
        ))
        .unwrap();
    assert_eq!(creme.slug, "creme-band-gold");

    let found = products
        .list(&ProductListQuery {
            search: Some("CRÈME".to_string()),
            ..ProductListQuery::default()
        })
        .unwrap();
    assert_eq!(names(&found), vec!["Crème Band"]);
}

#[test]
fn search_matches_metal_type_name() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCatalogStore::try_new(&conn).unwrap();
    let catalog = seed(store);
    let products = ProductService::new(store);

    let silver = products
        .list(&ProductListQuery {
            search: Some("SILVER".to_string()),
            ..ProductListQuery::default()
        })
        .unwrap();
    assert_eq!(names(&silver), vec!["Custom Signet", "Hoops"]);
    assert!(silver
        .iter()
        .all(|product| product.metal_type.id == catalog.silver));
}

#[test]
fn every_search_term_must_match() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCatalogStore::try_new(&conn).unwrap();
    seed(store);
    let products = ProductService::new(store);

    let found = products
        .list(&ProductListQuery {
            search: Some("gold, drop".to_string()),
            ..ProductListQuery::default()
        })
        .unwrap();
    assert_eq!(names(&found), vec!["Drop Earrings"]);

    let none = products
        .list(&ProductListQuery {
            search: Some("silver drop".to_string()),
            ..ProductListQuery::default()
        })
        .unwrap();
    assert!(none.is_empty());
}

#[test]
fn like_wildcards_in_search_are_literal() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCatalogStore::try_new(&conn).unwrap();
    seed(store);
    let products = ProductService::new(store);

    let percent = products
        .list(&ProductListQuery {
            search: Some("100%".to_string()),
            ..ProductListQuery::default()
        })
        .unwrap();
    assert_eq!(percent.len(), 4);

    let underscore = products
        .list(&ProductListQuery {
            search: Some("_".to_string()),
            ..ProductListQuery::default()
        })
        .unwrap();
    assert!(underscore.is_empty());
}

#[test]
fn blank_search_returns_everything() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCatalogStore::try_new(&conn).unwrap();
    seed(store);

    let all = ProductService::new(store)
        .list(&ProductListQuery {
            search: Some(" , ".to_string()),
            ..ProductListQuery::default()
        })
        .unwrap();
    assert_eq!(all.len(), 4);
}

#[test]
fn limit_and_offset_page_through_newest_first() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCatalogStore::try_new(&conn).unwrap();
    seed(store);
    let products = ProductService::new(store);

    let first_page = products
        .list(&ProductListQuery {
            limit: Some(2),
            ..ProductListQuery::default()
        })
        .unwrap();
    let second_page = products
        .list(&ProductListQuery {
            limit: Some(2),
            offset: 2,
            ..ProductListQuery::default()
        })
        .unwrap();
    let tail = products
        .list(&ProductListQuery {
            offset: 3,
            ..ProductListQuery::default()
        })
        .unwrap();

    assert_eq!(first_page[0].name, "Hoops");
    assert_eq!(first_page[1].name, "Drop Earrings");
    assert_eq!(second_page[0].name, "Custom Signet");
    assert_eq!(second_page[1].name, "Classic Band");
    assert_eq!(tail.len(), 1);
    assert_eq!(tail[0].name, "Classic Band");
}

#[test]
fn category_metal_and_gemstone_search_fields() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCatalogStore::try_new(&conn).unwrap();
    seed(store);

    let categories = CategoryService::new(store)
        .list(&CategoryListQuery {
            search: Some("hoops".to_string()),
            ..CategoryListQuery::default()
        })
        .unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].name, "Earrings");

    let metals = MetalTypeService::new(store)
        .list(&MetalTypeListQuery {
            search: Some("22k".to_string()),
            ..MetalTypeListQuery::default()
        })
        .unwrap();
    assert_eq!(metals.len(), 1);
    assert_eq!(metals[0].name, "Gold");

    let gemstones = GemstoneService::new(store);
    gemstones
        .create(&GemstoneDraft {
            color: "Blue".to_string(),
            is_precious: true,
            ..GemstoneDraft::new("Sapphire")
        })
        .unwrap();
    gemstones
        .create(&GemstoneDraft {
            color: "Blue".to_string(),
            ..GemstoneDraft::new("Topaz")
        })
        .unwrap();

    let blue = gemstones
        .list(&GemstoneListQuery {
            search: Some("blue".to_string()),
            ..GemstoneListQuery::default()
        })
        .unwrap();
    assert_eq!(blue.len(), 2);

    let precious_blue = gemstones
        .list(&GemstoneListQuery {
            is_precious: Some(true),
            search: Some("blue".to_string()),
            ..GemstoneListQuery::default()
        })
        .unwrap();
    assert_eq!(precious_blue.len(), 1);
    assert_eq!(precious_blue[0].name, "Sapphire");
}
