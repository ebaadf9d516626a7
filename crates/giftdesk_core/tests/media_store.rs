use giftdesk_core::{FsObjectStore, ImageUpload, MediaError, ObjectStore};

const BASE_URL: &str = "https://cdn.example.com/media";

#[test]
fn put_get_delete_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsObjectStore::open(dir.path().join("objects"), BASE_URL).unwrap();
    let upload = ImageUpload::new("Summer Sale.JPG", "image/jpeg", vec![0xFF, 0xD8, 0xFF]);

    let stored = store.put("offers", &upload).unwrap();
    assert!(stored.key.starts_with("offers/"));
    assert!(stored.key.ends_with("-summer-sale.jpg"));
    assert_eq!(stored.url, format!("{BASE_URL}/{}", stored.key));
    assert_eq!(store.key_for_url(&stored.url).unwrap(), stored.key);

    let body = store.get(&stored.key).unwrap();
    assert_eq!(body.content_type, "image/jpeg");
    assert_eq!(body.bytes, upload.bytes);

    store.delete(&stored.url).unwrap();
    assert!(matches!(store.get(&stored.key), Err(MediaError::NotFound(_))));
    assert!(matches!(store.delete(&stored.url), Err(MediaError::NotFound(_))));
}

#[test]
fn foreign_urls_and_traversal_keys_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsObjectStore::open(dir.path(), BASE_URL).unwrap();

    assert!(matches!(
        store.delete("https://elsewhere.example.com/media/a.png"),
        Err(MediaError::ForeignObject(_))
    ));
    assert!(matches!(
        store.get("../secrets.txt"),
        Err(MediaError::ForeignObject(_))
    ));
    assert!(matches!(
        store.get("/etc/passwd"),
        Err(MediaError::ForeignObject(_))
    ));
}

#[test]
fn uploads_are_validated_by_type_and_size() {
    let ok = ImageUpload::new("a.png", "image/png", vec![1; 10]);
    assert!(ok.validate(10).is_ok());
    assert!(matches!(ok.validate(9), Err(MediaError::TooLarge { .. })));

    let empty = ImageUpload::new("a.png", "image/png", Vec::new());
    assert!(matches!(empty.validate(10), Err(MediaError::EmptyUpload(_))));

    let pdf = ImageUpload::new("a.pdf", "application/pdf", vec![1]);
    assert!(matches!(
        pdf.validate(10),
        Err(MediaError::UnsupportedContentType(_))
    ));
}
