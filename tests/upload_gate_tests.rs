mod test_stores;

use std::time::Duration;

use bandsite_backend::entities::photo::{PhotoId, PhotoRecord, UploadedFile};
use bandsite_backend::errors::{
    ApiError, StoreError, is_bucket_exists_error, is_missing_bucket_error, is_missing_table_error,
};
use bandsite_backend::limiter::rate_limiter::RateLimiterStore;
use bandsite_backend::use_cases::photos::{derive_storage_key, safe_file_name, validate_upload};

use test_stores::image_file;

const MAX_BYTES: usize = 10 * 1024 * 1024;

#[test]
fn safe_file_name_strips_and_collapses() {
    assert_eq!(safe_file_name("stage.jpg"), "stage.jpg");
    assert_eq!(safe_file_name("my photo (1).JPG"), "my-photo-1-.JPG");
    assert_eq!(safe_file_name("--weird   name--"), "weird-name");
    assert_eq!(safe_file_name("über café.png"), "ber-caf-.png");
}

#[test]
fn safe_file_name_defaults_when_nothing_survives() {
    assert_eq!(safe_file_name(""), "photo");
    assert_eq!(safe_file_name("???"), "photo");
    assert_eq!(safe_file_name("---"), "photo");
}

#[test]
fn safe_file_name_caps_length() {
    let long = "a".repeat(500);
    assert_eq!(safe_file_name(&long).len(), 120);
}

#[test]
fn storage_key_has_prefix_stamp_and_extension() {
    let key = derive_storage_key("ev-1", Some("Stage Left.JPG"));

    let (event, rest) = key.split_once('/').unwrap();
    assert_eq!(event, "ev-1");

    // <unix-millis>-<uuid>-<name>.<ext>
    let (stamp, _) = rest.split_once('-').unwrap();
    assert!(stamp.chars().all(|c| c.is_ascii_digit()));
    assert!(rest.ends_with(".jpg"), "extension must be lowercased: {key}");
    // The sanitized name keeps its own extension before the appended one.
    assert!(rest.ends_with("-Stage-Left.JPG.jpg"));
}

#[test]
fn storage_key_without_extension_gets_none_appended() {
    let key = derive_storage_key("ev-1", Some("snapshot"));
    assert!(key.ends_with("-snapshot"), "unexpected key: {key}");

    let key = derive_storage_key("ev-1", None);
    assert!(key.ends_with("-photo"), "unexpected key: {key}");
}

#[test]
fn storage_keys_do_not_collide() {
    let a = derive_storage_key("ev-1", Some("a.jpg"));
    let b = derive_storage_key("ev-1", Some("a.jpg"));
    assert_ne!(a, b);
}

#[test]
fn gate_rejects_non_images() {
    let file = UploadedFile {
        file_name: Some("notes.txt".to_string()),
        content_type: "text/plain".to_string(),
        bytes: vec![0u8; 10],
    };
    assert!(matches!(
        validate_upload(&file, MAX_BYTES),
        Err(ApiError::UnsupportedMediaType)
    ));
}

#[test]
fn gate_rejects_one_byte_over_the_limit() {
    assert!(matches!(
        validate_upload(&image_file("big.jpg", MAX_BYTES + 1), MAX_BYTES),
        Err(ApiError::PayloadTooLarge)
    ));
    assert!(validate_upload(&image_file("ok.jpg", MAX_BYTES), MAX_BYTES).is_ok());
}

#[test]
fn gate_checks_type_before_size() {
    let file = UploadedFile {
        file_name: None,
        content_type: "application/pdf".to_string(),
        bytes: vec![0u8; MAX_BYTES + 1],
    };
    assert!(matches!(
        validate_upload(&file, MAX_BYTES),
        Err(ApiError::UnsupportedMediaType)
    ));
}

#[test]
fn photo_id_is_classified_by_path_separator() {
    assert_eq!(PhotoId::parse("42"), PhotoId::DbId("42".to_string()));
    assert_eq!(
        PhotoId::parse("ev-1/169-abc-a.jpg"),
        PhotoId::StoragePath("ev-1/169-abc-a.jpg".to_string())
    );
}

#[test]
fn photo_id_deserializes_strings_and_numbers() {
    let record: PhotoRecord = serde_json::from_value(serde_json::json!({
        "id": 42,
        "event_id": "ev-1",
        "storage_path": "ev-1/a.jpg",
        "url": "https://cdn.test/a.jpg",
    }))
    .unwrap();
    assert_eq!(record.id, PhotoId::DbId("42".to_string()));

    let record: PhotoRecord = serde_json::from_value(serde_json::json!({
        "id": "ev-1/a.jpg",
        "event_id": "ev-1",
        "storage_path": "ev-1/a.jpg",
        "url": "https://cdn.test/a.jpg",
    }))
    .unwrap();
    assert_eq!(record.id, PhotoId::StoragePath("ev-1/a.jpg".to_string()));

    // Always a string on the way out.
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["id"], "ev-1/a.jpg");
}

#[test]
fn missing_table_is_detected_by_code_or_message() {
    let table = "event_photos";

    let by_code = StoreError::new("anything").with_code("42P01");
    assert!(is_missing_table_error(&by_code, table));

    let by_code = StoreError::new("anything").with_code("pgrst205");
    assert!(is_missing_table_error(&by_code, table));

    let by_message = StoreError::new("relation \"public.event_photos\" does not exist");
    assert!(is_missing_table_error(&by_message, table));

    let by_message =
        StoreError::new("Could not find the table 'public.event_photos' in the schema cache");
    assert!(is_missing_table_error(&by_message, table));

    // Another table's absence is somebody else's problem.
    let other_table = StoreError::new("relation \"public.comments\" does not exist");
    assert!(!is_missing_table_error(&other_table, table));

    let other_error = StoreError::new("permission denied for table event_photos").with_code("42501");
    assert!(!is_missing_table_error(&other_error, table));
}

#[test]
fn missing_bucket_requires_bucket_in_the_message() {
    assert!(is_missing_bucket_error(&StoreError::new("Bucket not found")));
    assert!(is_missing_bucket_error(
        &StoreError::new("bucket does not exist").with_status(400)
    ));
    assert!(is_missing_bucket_error(
        &StoreError::new("the specified bucket is gone").with_code("404")
    ));

    // A plain 404 without bucket wording is an object miss, not a bucket miss.
    assert!(!is_missing_bucket_error(
        &StoreError::new("Object not found").with_code("404")
    ));
}

#[test]
fn bucket_already_exists_is_recognized() {
    assert!(is_bucket_exists_error(&StoreError::new(
        "The resource already exists"
    )));
    assert!(!is_bucket_exists_error(&StoreError::new("Bucket not found")));
}

#[tokio::test]
async fn limiter_allows_the_tenth_and_denies_the_eleventh() {
    let store = RateLimiterStore::new(10, Duration::from_secs(3600));

    for i in 1..=10 {
        let decision = store.check("203.0.113.9");
        assert!(decision.allowed, "request {i} should be allowed");
        assert_eq!(decision.limit, 10);
        assert_eq!(decision.remaining, 10 - i);
    }

    let denied = store.check("203.0.113.9");
    assert!(!denied.allowed);
    assert_eq!(denied.remaining, 0);
    assert!(denied.reset_secs >= 1);
}

#[tokio::test]
async fn limiter_tracks_clients_independently() {
    let store = RateLimiterStore::new(1, Duration::from_secs(3600));

    assert!(store.check("203.0.113.9").allowed);
    assert!(!store.check("203.0.113.9").allowed);
    assert!(store.check("198.51.100.7").allowed);
}

#[tokio::test]
async fn limiter_resets_after_the_window_elapses() {
    let store = RateLimiterStore::new(1, Duration::from_millis(20));

    assert!(store.check("203.0.113.9").allowed);
    assert!(!store.check("203.0.113.9").allowed);

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(store.check("203.0.113.9").allowed);
}
