use rust_decimal::Decimal;
use rusqlite::Connection;
use std::path::Path;
use std::thread;
use vajrabox_core::db::{open_db, open_db_in_memory};
use vajrabox_core::{
    CategoryDraft, CategoryService, EntityId, MetalTypeDraft, MetalTypeService, ProductDraft,
    ProductImageDraft, ProductImageListQuery, ProductImagePatch, ProductImageService,
    ProductService, SqliteCatalogStore,
};

fn create_product(store: SqliteCatalogStore<'_>, name: &str) -> EntityId {
    let category = CategoryService::new(store)
        .create(&CategoryDraft::new(format!("{name} category")))
        .unwrap();
    let metal = MetalTypeService::new(store)
        .create(&MetalTypeDraft::new("Silver", "925", Decimal::new(95, 2)))
        .unwrap();
    ProductService::new(store)
        .create(&ProductDraft::new(
            category.id,
            metal.id,
            name,
            "Hand finished",
            Decimal::new(500, 2),
            Decimal::new(12000, 2),
        ))
        .unwrap()
        .id
}

fn primary_ids(conn: &Connection, product_id: EntityId) -> Vec<EntityId> {
    let mut stmt = conn
        .prepare("SELECT id FROM product_images WHERE product_id = ?1 AND is_primary = 1;")
        .unwrap();
    let rows = stmt
        .query_map([product_id], |row| row.get::<_, EntityId>(0))
        .unwrap();
    rows.collect::<Result<Vec<_>, _>>().unwrap()
}

#[test]
fn new_primary_image_demotes_previous_primary() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCatalogStore::try_new(&conn).unwrap();
    let product_id = create_product(store, "Hoop");
    let images = ProductImageService::new(store);

    let front = images
        .create(&ProductImageDraft::new(product_id, "products/hoop-front.jpg").primary())
        .unwrap();
    let side = images
        .create(&ProductImageDraft::new(product_id, "products/hoop-side.jpg").primary())
        .unwrap();

    assert!(side.is_primary);
    assert!(!images.get(front.id).unwrap().is_primary);
    assert_eq!(primary_ids(&conn, product_id), vec![side.id]);
}

#[test]
fn promoting_existing_image_demotes_siblings() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCatalogStore::try_new(&conn).unwrap();
    let product_id = create_product(store, "Hoop");
    let images = ProductImageService::new(store);

    let front = images
        .create(&ProductImageDraft::new(product_id, "products/hoop-front.jpg").primary())
        .unwrap();
    let back = images
        .create(&ProductImageDraft::new(product_id, "products/hoop-back.jpg"))
        .unwrap();

    let promoted = images
        .partial_update(
            back.id,
            ProductImagePatch {
                is_primary: Some(true),
                ..ProductImagePatch::default()
            },
        )
        .unwrap();
    assert!(promoted.is_primary);
    assert_eq!(primary_ids(&conn, product_id), vec![back.id]);

    // Re-saving the current primary keeps it primary.
    images
        .partial_update(
            back.id,
            ProductImagePatch {
                alt_text: Some("Back view".to_string()),
                ..ProductImagePatch::default()
            },
        )
        .unwrap();
    assert_eq!(primary_ids(&conn, product_id), vec![back.id]);
    assert!(!images.get(front.id).unwrap().is_primary);
}

#[test]
fn primary_flags_are_scoped_per_product() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCatalogStore::try_new(&conn).unwrap();
    let hoop = create_product(store, "Hoop");
    let stud = create_product(store, "Stud");
    let images = ProductImageService::new(store);

    let hoop_image = images
        .create(&ProductImageDraft::new(hoop, "products/hoop.jpg").primary())
        .unwrap();
    let stud_image = images
        .create(&ProductImageDraft::new(stud, "products/stud.jpg").primary())
        .unwrap();

    assert_eq!(primary_ids(&conn, hoop), vec![hoop_image.id]);
    assert_eq!(primary_ids(&conn, stud), vec![stud_image.id]);

    let primaries = images
        .list(&ProductImageListQuery {
            is_primary: Some(true),
            ..ProductImageListQuery::default()
        })
        .unwrap();
    assert_eq!(primaries.len(), 2);
}

#[test]
fn non_primary_images_leave_primary_untouched() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCatalogStore::try_new(&conn).unwrap();
    let product_id = create_product(store, "Hoop");
    let images = ProductImageService::new(store);

    let front = images
        .create(&ProductImageDraft::new(product_id, "products/front.jpg").primary())
        .unwrap();
    for index in 0..3 {
        images
            .create(&ProductImageDraft::new(
                product_id,
                format!("products/detail-{index}.jpg"),
            ))
            .unwrap();
    }

    assert_eq!(primary_ids(&conn, product_id), vec![front.id]);
    let listed = images
        .list(&ProductImageListQuery {
            product_id: Some(product_id),
            ..ProductImageListQuery::default()
        })
        .unwrap();
    assert_eq!(listed.len(), 4);
}

#[test]
fn moving_primary_image_demotes_destination_primaries() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCatalogStore::try_new(&conn).unwrap();
    let hoop = create_product(store, "Hoop");
    let stud = create_product(store, "Stud");
    let images = ProductImageService::new(store);

    let hoop_front = images
        .create(&ProductImageDraft::new(hoop, "products/hoop-front.jpg").primary())
        .unwrap();
    let stud_front = images
        .create(&ProductImageDraft::new(stud, "products/stud-front.jpg").primary())
        .unwrap();

    let moved = images
        .partial_update(
            stud_front.id,
            ProductImagePatch {
                product_id: Some(hoop),
                is_primary: Some(true),
                ..ProductImagePatch::default()
            },
        )
        .unwrap();

    assert_eq!(moved.product_id, hoop);
    assert!(moved.is_primary);
    assert_eq!(primary_ids(&conn, hoop), vec![stud_front.id]);
    assert!(primary_ids(&conn, stud).is_empty());
    assert!(!images.get(hoop_front.id).unwrap().is_primary);
}

#[test]
fn schema_rejects_second_primary_written_directly() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCatalogStore::try_new(&conn).unwrap();
    let product_id = create_product(store, "Hoop");
    ProductImageService::new(store)
        .create(&ProductImageDraft::new(product_id, "products/front.jpg").primary())
        .unwrap();

    let result = conn.execute(
        "INSERT INTO product_images (product_id, image, is_primary) VALUES (?1, 'x.jpg', 1);",
        [product_id],
    );
    assert!(result.is_err());
}

#[test]
fn image_for_unknown_product_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCatalogStore::try_new(&conn).unwrap();

    let err = ProductImageService::new(store)
        .create(&ProductImageDraft::new(404, "products/ghost.jpg"))
        .unwrap_err();
    assert_eq!(err.field(), Some("product"));
}

#[test]
fn concurrent_primary_writes_leave_one_primary() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("images.sqlite3");
    let product_id = {
        let conn = open_db(&path).unwrap();
        let store = SqliteCatalogStore::try_new(&conn).unwrap();
        create_product(store, "Hoop")
    };

    let writers: Vec<_> = (0..4)
        .map(|writer| {
            let path = path.clone();
            thread::spawn(move || write_primaries(&path, product_id, writer))
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }

    let conn = open_db(&path).unwrap();
    assert_eq!(primary_ids(&conn, product_id).len(), 1);
    let total: i64 = conn
        .query_row("SELECT COUNT(*) FROM product_images;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(total, 40);
}

fn write_primaries(path: &Path, product_id: EntityId, writer: usize) {
    let conn = open_db(path).unwrap();
    let store = SqliteCatalogStore::try_new(&conn).unwrap();
    let images = ProductImageService::new(store);
    for index in 0..10 {
        images
            .create(
                &ProductImageDraft::new(product_id, format!("products/{writer}-{index}.jpg"))
                    .primary(),
            )
            .unwrap();
    }
}
