use giftdesk_core::media::{MediaResult, ObjectBody, StoredObject};
use giftdesk_core::model::category::CategoryInput;
use giftdesk_core::model::offer::{DiscountType, OfferInput};
use giftdesk_core::model::product::ProductInput;
use giftdesk_core::repo::category_repo::{CategoryListQuery, SqliteCategoryRepository};
use giftdesk_core::repo::offer_repo::{OfferListQuery, SqliteOfferRepository};
use giftdesk_core::repo::product_repo::SqliteProductRepository;
use giftdesk_core::{
    open_db_in_memory, CategoryService, FsObjectStore, ImageUpload, MediaError, ObjectStore,
    OfferService, ProductService, RecordStatus, ServiceError,
};
use rusqlite::Connection;
use std::cell::Cell;
use std::path::Path;
use uuid::Uuid;

const BASE_URL: &str = "http://localhost:8080/media";

fn image(name: &str) -> ImageUpload {
    ImageUpload::new(name, "image/png", vec![0x89, b'P', b'N', b'G'])
}

fn images(count: usize) -> Vec<ImageUpload> {
    (0..count).map(|i| image(&format!("photo-{i}.png"))).collect()
}

fn count_objects(root: &Path) -> usize {
    let Ok(entries) = std::fs::read_dir(root) else {
        return 0;
    };
    entries
        .map(|entry| entry.unwrap().path())
        .map(|path| if path.is_dir() { count_objects(&path) } else { 1 })
        .sum()
}

fn reject_inserts(conn: &Connection, table: &str) {
    conn.execute_batch(&format!(
        "CREATE TRIGGER reject_{table} BEFORE INSERT ON {table}
         BEGIN SELECT RAISE(ABORT, 'write rejected'); END;"
    ))
    .unwrap();
}

/// Store that fails the put after `ok_puts` successful ones.
struct FlakyStore<'a> {
    inner: &'a FsObjectStore,
    ok_puts: Cell<usize>,
}

impl ObjectStore for FlakyStore<'_> {
    fn put(&self, folder: &str, upload: &ImageUpload) -> MediaResult<StoredObject> {
        if self.ok_puts.get() == 0 {
            return Err(MediaError::Io(std::io::Error::other("bucket unavailable")));
        }
        self.ok_puts.set(self.ok_puts.get() - 1);
        self.inner.put(folder, upload)
    }

    fn delete(&self, url: &str) -> MediaResult<()> {
        self.inner.delete(url)
    }

    fn get(&self, key: &str) -> MediaResult<ObjectBody> {
        self.inner.get(key)
    }
}

fn category_input(name: &str) -> CategoryInput {
    CategoryInput {
        name: name.to_string(),
        status: RecordStatus::Active,
    }
}

fn product_input(name: &str) -> ProductInput {
    ProductInput {
        name: name.to_string(),
        amount: 1299.0,
        discount: 10,
        available_offers: vec!["Free gift wrap".to_string()],
        highlights: vec!["Hand made".to_string(), "  ".to_string()],
        status: RecordStatus::Active,
    }
}

#[test]
fn category_create_stores_image_and_document() {
    let conn = open_db_in_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let store = FsObjectStore::open(dir.path(), BASE_URL).unwrap();
    let service = CategoryService::new(SqliteCategoryRepository::new(&conn), &store);

    let created = service
        .create_category(&category_input(" Hampers "), &[image("Cover.PNG")])
        .unwrap();

    assert_eq!(created.name, "Hampers");
    assert!(created.image_url.starts_with(BASE_URL));
    assert!(created.image_url.ends_with("-cover.png"));
    assert!(created.created_at > 0);
    assert_eq!(count_objects(dir.path()), 1);

    let loaded = service.get_category(created.id).unwrap();
    assert_eq!(loaded, created);
}

#[test]
fn category_name_and_image_are_required() {
    let conn = open_db_in_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let store = FsObjectStore::open(dir.path(), BASE_URL).unwrap();
    let service = CategoryService::new(SqliteCategoryRepository::new(&conn), &store);

    let blank = service
        .create_category(&category_input("   "), &[image("a.png")])
        .unwrap_err();
    assert!(matches!(blank, ServiceError::Validation(_)));

    let no_image = service
        .create_category(&category_input("Hampers"), &[])
        .unwrap_err();
    assert!(matches!(no_image, ServiceError::Validation(_)));
    assert_eq!(count_objects(dir.path()), 0);
}

#[test]
fn failed_category_write_leaves_no_orphan_blobs() {
    let conn = open_db_in_memory().unwrap();
    reject_inserts(&conn, "categories");
    let dir = tempfile::tempdir().unwrap();
    let store = FsObjectStore::open(dir.path(), BASE_URL).unwrap();
    let service = CategoryService::new(SqliteCategoryRepository::new(&conn), &store);

    let err = service
        .create_category(&category_input("Hampers"), &[image("a.png")])
        .unwrap_err();

    assert!(matches!(err, ServiceError::Repo(_)));
    assert_eq!(count_objects(dir.path()), 0);
}

#[test]
fn category_update_replaces_image_and_removes_stale_blob() {
    let conn = open_db_in_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let store = FsObjectStore::open(dir.path(), BASE_URL).unwrap();
    let service = CategoryService::new(SqliteCategoryRepository::new(&conn), &store);
    let created = service
        .create_category(&category_input("Hampers"), &[image("old.png")])
        .unwrap();

    let renamed = service
        .update_category(created.id, &category_input("Gift Hampers"), &[])
        .unwrap();
    assert_eq!(renamed.name, "Gift Hampers");
    assert_eq!(renamed.image_url, created.image_url);

    let replaced = service
        .update_category(created.id, &category_input("Gift Hampers"), &[image("new.png")])
        .unwrap();
    assert_ne!(replaced.image_url, created.image_url);
    assert!(replaced.image_url.ends_with("-new.png"));
    assert_eq!(count_objects(dir.path()), 1);
    assert!(store.get(&store.key_for_url(&replaced.image_url).unwrap()).is_ok());
    assert!(matches!(
        store.get(&store.key_for_url(&created.image_url).unwrap()),
        Err(MediaError::NotFound(_))
    ));
}

#[test]
fn category_delete_removes_document_and_image() {
    let conn = open_db_in_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let store = FsObjectStore::open(dir.path(), BASE_URL).unwrap();
    let service = CategoryService::new(SqliteCategoryRepository::new(&conn), &store);
    let created = service
        .create_category(&category_input("Hampers"), &[image("a.png")])
        .unwrap();

    let removed = service.delete_category(created.id).unwrap();
    assert_eq!(removed.id, created.id);
    assert_eq!(count_objects(dir.path()), 0);
    assert!(matches!(
        service.get_category(created.id),
        Err(ServiceError::NotFound {
            collection: "category",
            ..
        })
    ));
    assert!(matches!(
        service.delete_category(created.id),
        Err(ServiceError::NotFound { .. })
    ));
}

#[test]
fn category_list_filters_by_status() {
    let conn = open_db_in_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let store = FsObjectStore::open(dir.path(), BASE_URL).unwrap();
    let service = CategoryService::new(SqliteCategoryRepository::new(&conn), &store);
    service
        .create_category(&category_input("Hampers"), &[image("a.png")])
        .unwrap();
    let mut hidden = category_input("Archived");
    hidden.status = RecordStatus::Inactive;
    service.create_category(&hidden, &[image("b.png")]).unwrap();

    let all = service
        .list_categories(&CategoryListQuery::default())
        .unwrap();
    assert_eq!(all.len(), 2);

    let inactive = service
        .list_categories(&CategoryListQuery {
            status: Some(RecordStatus::Inactive),
        })
        .unwrap();
    assert_eq!(inactive.len(), 1);
    assert_eq!(inactive[0].name, "Archived");
}

#[test]
fn product_requires_two_to_four_images() {
    let conn = open_db_in_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let store = FsObjectStore::open(dir.path(), BASE_URL).unwrap();
    let service = ProductService::new(SqliteProductRepository::new(&conn), &store);

    for count in [0, 1, 5] {
        let err = service
            .create_product(&product_input("Candle set"), &images(count))
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)), "count {count}");
    }
    assert_eq!(count_objects(dir.path()), 0);

    let product = service
        .create_product(&product_input("Candle set"), &images(2))
        .unwrap();
    assert_eq!(product.images.len(), 2);
    assert_eq!(product.highlights, vec!["Hand made".to_string()]);
    assert_eq!(count_objects(dir.path()), 2);
}

#[test]
fn failed_upload_midway_removes_earlier_blobs() {
    let conn = open_db_in_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let fs_store = FsObjectStore::open(dir.path(), BASE_URL).unwrap();
    let flaky = FlakyStore {
        inner: &fs_store,
        ok_puts: Cell::new(2),
    };
    let service = ProductService::new(SqliteProductRepository::new(&conn), &flaky);

    let err = service
        .create_product(&product_input("Candle set"), &images(3))
        .unwrap_err();

    assert!(matches!(err, ServiceError::Media(MediaError::Io(_))));
    assert_eq!(count_objects(dir.path()), 0);
    assert!(service.list_products(&Default::default()).unwrap().is_empty());
}

#[test]
fn invalid_upload_is_rejected_before_anything_is_stored() {
    let conn = open_db_in_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let store = FsObjectStore::open(dir.path(), BASE_URL).unwrap();
    let service = ProductService::new(SqliteProductRepository::new(&conn), &store);

    let mut uploads = images(2);
    uploads.push(ImageUpload::new("notes.txt", "text/plain", b"hello".to_vec()));
    let err = service
        .create_product(&product_input("Candle set"), &uploads)
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Media(MediaError::UnsupportedContentType(_))
    ));
    assert_eq!(count_objects(dir.path()), 0);
}

#[test]
fn product_update_keeps_selected_images_and_drops_the_rest() {
    let conn = open_db_in_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let store = FsObjectStore::open(dir.path(), BASE_URL).unwrap();
    let service = ProductService::new(SqliteProductRepository::new(&conn), &store);
    let created = service
        .create_product(&product_input("Candle set"), &images(3))
        .unwrap();

    let keep = vec![created.images[0].clone()];
    let updated = service
        .update_product(
            created.id,
            &product_input("Candle trio"),
            Some(keep.as_slice()),
            &[image("fresh.png")],
        )
        .unwrap();

    assert_eq!(updated.name, "Candle trio");
    assert_eq!(updated.images.len(), 2);
    assert_eq!(updated.images[0], created.images[0]);
    assert!(updated.images[1].ends_with("-fresh.png"));
    assert_eq!(count_objects(dir.path()), 2);
}

#[test]
fn product_update_below_minimum_changes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let store = FsObjectStore::open(dir.path(), BASE_URL).unwrap();
    let service = ProductService::new(SqliteProductRepository::new(&conn), &store);
    let created = service
        .create_product(&product_input("Candle set"), &images(2))
        .unwrap();

    let keep = vec![created.images[0].clone()];
    let err = service
        .update_product(created.id, &product_input("Candle set"), Some(keep.as_slice()), &[])
        .unwrap_err();

    assert!(matches!(err, ServiceError::Validation(_)));
    assert_eq!(service.get_product(created.id).unwrap().images, created.images);
    assert_eq!(count_objects(dir.path()), 2);
}

#[test]
fn product_delete_removes_all_images() {
    let conn = open_db_in_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let store = FsObjectStore::open(dir.path(), BASE_URL).unwrap();
    let service = ProductService::new(SqliteProductRepository::new(&conn), &store);
    let created = service
        .create_product(&product_input("Candle set"), &images(4))
        .unwrap();

    service.delete_product(created.id).unwrap();
    assert_eq!(count_objects(dir.path()), 0);
}

fn offer_input(category_id: Uuid, discount_type: DiscountType, value: f64) -> OfferInput {
    OfferInput {
        category_id,
        discount_type,
        label: "Up to 40% off".to_string(),
        value,
        status: RecordStatus::Active,
    }
}

#[test]
fn offer_requires_existing_category() {
    let conn = open_db_in_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let store = FsObjectStore::open(dir.path(), BASE_URL).unwrap();
    let service = OfferService::new(
        SqliteOfferRepository::new(&conn),
        SqliteCategoryRepository::new(&conn),
        &store,
    );

    let missing = Uuid::new_v4();
    let err = service
        .create_offer(
            &offer_input(missing, DiscountType::Percentage, 40.0),
            &[image("a.png")],
        )
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::MissingReference { collection: "category", id } if id == missing
    ));
    assert_eq!(count_objects(dir.path()), 0);
}

#[test]
fn offer_value_range_depends_on_discount_type() {
    let conn = open_db_in_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let store = FsObjectStore::open(dir.path(), BASE_URL).unwrap();
    let category = CategoryService::new(SqliteCategoryRepository::new(&conn), &store)
        .create_category(&category_input("Hampers"), &[image("c.png")])
        .unwrap();
    let service = OfferService::new(
        SqliteOfferRepository::new(&conn),
        SqliteCategoryRepository::new(&conn),
        &store,
    );

    let too_much = service
        .create_offer(&offer_input(category.id, DiscountType::Percentage, 150.0), &[])
        .unwrap_err();
    assert!(matches!(too_much, ServiceError::Validation(_)));

    let flat = service
        .create_offer(&offer_input(category.id, DiscountType::Flat, 499.0), &[])
        .unwrap();
    assert_eq!(flat.discount_type, DiscountType::Flat);
    assert!(flat.images.is_empty());
}

#[test]
fn offers_list_by_category_and_delete_removes_images() {
    let conn = open_db_in_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let store = FsObjectStore::open(dir.path(), BASE_URL).unwrap();
    let categories = CategoryService::new(SqliteCategoryRepository::new(&conn), &store);
    let hampers = categories
        .create_category(&category_input("Hampers"), &[image("h.png")])
        .unwrap();
    let candles = categories
        .create_category(&category_input("Candles"), &[image("c.png")])
        .unwrap();
    let service = OfferService::new(
        SqliteOfferRepository::new(&conn),
        SqliteCategoryRepository::new(&conn),
        &store,
    );

    let offer = service
        .create_offer(
            &offer_input(hampers.id, DiscountType::Percentage, 40.0),
            &images(3),
        )
        .unwrap();
    service
        .create_offer(&offer_input(candles.id, DiscountType::Percentage, 10.0), &[])
        .unwrap();
    assert!(service
        .create_offer(
            &offer_input(candles.id, DiscountType::Percentage, 10.0),
            &images(4)
        )
        .is_err());

    let listed = service
        .list_offers(&OfferListQuery {
            category_id: Some(hampers.id),
            status: None,
        })
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, offer.id);
    assert_eq!(count_objects(dir.path()), 5);

    service.delete_offer(offer.id).unwrap();
    assert_eq!(count_objects(dir.path()), 2);
}

#[test]
fn offer_update_rechecks_category_and_merges_images() {
    let conn = open_db_in_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let store = FsObjectStore::open(dir.path(), BASE_URL).unwrap();
    let hampers = CategoryService::new(SqliteCategoryRepository::new(&conn), &store)
        .create_category(&category_input("Hampers"), &[image("h.png")])
        .unwrap();
    let service = OfferService::new(
        SqliteOfferRepository::new(&conn),
        SqliteCategoryRepository::new(&conn),
        &store,
    );
    let created = service
        .create_offer(
            &offer_input(hampers.id, DiscountType::Percentage, 40.0),
            &images(2),
        )
        .unwrap();
    assert_eq!(count_objects(dir.path()), 3);

    let missing = Uuid::new_v4();
    let err = service
        .update_offer(
            created.id,
            &offer_input(missing, DiscountType::Percentage, 40.0),
            None,
            &[image("fresh.png")],
        )
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::MissingReference { collection: "category", id } if id == missing
    ));
    assert_eq!(count_objects(dir.path()), 3);

    let keep_both = created.images.clone();
    let too_many = service
        .update_offer(
            created.id,
            &offer_input(hampers.id, DiscountType::Percentage, 40.0),
            Some(keep_both.as_slice()),
            &images(2),
        )
        .unwrap_err();
    assert!(matches!(too_many, ServiceError::Validation(_)));
    assert_eq!(service.get_offer(created.id).unwrap().images, created.images);
    assert_eq!(count_objects(dir.path()), 3);

    let keep = vec![created.images[1].clone()];
    let updated = service
        .update_offer(
            created.id,
            &offer_input(hampers.id, DiscountType::Flat, 250.0),
            Some(keep.as_slice()),
            &[image("fresh.png"), image("bow.png")],
        )
        .unwrap();

    assert_eq!(updated.discount_type, DiscountType::Flat);
    assert_eq!(updated.images.len(), 3);
    assert_eq!(updated.images[0], created.images[1]);
    assert!(updated.images[1].ends_with("-fresh.png"));
    assert!(updated.images[2].ends_with("-bow.png"));
    // one category image plus three offer images; the dropped one is gone
    assert_eq!(count_objects(dir.path()), 4);
    let dropped_key = store.key_for_url(&created.images[0]).unwrap();
    assert!(matches!(store.get(&dropped_key), Err(MediaError::NotFound(_))));
}

#[test]
fn offer_update_without_image_selection_keeps_current_images() {
    let conn = open_db_in_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let store = FsObjectStore::open(dir.path(), BASE_URL).unwrap();
    let hampers = CategoryService::new(SqliteCategoryRepository::new(&conn), &store)
        .create_category(&category_input("Hampers"), &[image("h.png")])
        .unwrap();
    let service = OfferService::new(
        SqliteOfferRepository::new(&conn),
        SqliteCategoryRepository::new(&conn),
        &store,
    );
    let created = service
        .create_offer(
            &offer_input(hampers.id, DiscountType::Percentage, 40.0),
            &images(2),
        )
        .unwrap();

    let updated = service
        .update_offer(
            created.id,
            &offer_input(hampers.id, DiscountType::Percentage, 25.0),
            None,
            &[image("fresh.png")],
        )
        .unwrap();

    assert_eq!(updated.value, 25.0);
    assert_eq!(&updated.images[..2], &created.images[..]);
    assert!(updated.images[2].ends_with("-fresh.png"));
    assert_eq!(count_objects(dir.path()), 4);
}
