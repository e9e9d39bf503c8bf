#![allow(dead_code)]

use async_trait::async_trait;
use bandsite_backend::entities::photo::UploadedFile;
use bandsite_backend::errors::StoreError;
use bandsite_backend::repositories::object_store::{ObjectStore, StoredObject};
use bandsite_backend::repositories::relation_store::{OrderBy, RelationStore};
use bandsite_backend::settings::{AppConfig, AppEnvironment};
use mockall::mock;
use serde_json::Value;

mock! {
    pub Objects {}

    #[async_trait]
    impl ObjectStore for Objects {
        async fn upload(
            &self,
            bucket: &str,
            path: &str,
            bytes: Vec<u8>,
            content_type: &str,
        ) -> Result<(), StoreError>;

        fn public_url(&self, bucket: &str, path: &str) -> String;

        async fn list(
            &self,
            bucket: &str,
            prefix: &str,
            limit: u32,
        ) -> Result<Vec<StoredObject>, StoreError>;

        async fn remove(&self, bucket: &str, path: &str) -> Result<(), StoreError>;

        async fn create_bucket(&self, bucket: &str, public: bool) -> Result<(), StoreError>;
    }
}

mock! {
    pub Relations {}

    #[async_trait]
    impl RelationStore for Relations {
        async fn select(
            &self,
            table: &str,
            filters: Vec<(String, String)>,
            order: Option<OrderBy>,
        ) -> Result<Vec<Value>, StoreError>;

        async fn insert(&self, table: &str, row: Value) -> Result<Value, StoreError>;

        async fn update(
            &self,
            table: &str,
            filters: Vec<(String, String)>,
            patch: Value,
        ) -> Result<Option<Value>, StoreError>;

        async fn delete(&self, table: &str, filters: Vec<(String, String)>) -> Result<(), StoreError>;

        async fn count(&self, table: &str, filters: Vec<(String, String)>) -> Result<i64, StoreError>;
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        env: AppEnvironment::Testing,
        name: "bandsite-backend".to_string(),
        port: 0,
        host: "127.0.0.1".to_string(),
        worker_count: 1,
        cors_allowed_origins: vec!["*".to_string()],
        frontend_url: "http://localhost:5173".to_string(),
        api_key: "test-api-key".to_string(),
        admin_password: "test-admin-password".to_string(),
        supabase_url: None,
        supabase_service_key: None,
        photos_bucket: "event-photos".to_string(),
        photo_max_bytes: 10 * 1024 * 1024,
        upload_rate_limit: 10,
        upload_rate_window_secs: 3600,
        smtp_host: None,
        smtp_username: None,
        smtp_password: None,
        booking_recipient: None,
    }
}

pub fn image_file(name: &str, size: usize) -> UploadedFile {
    UploadedFile {
        file_name: Some(name.to_string()),
        content_type: "image/jpeg".to_string(),
        bytes: vec![0u8; size],
    }
}

/// Error shaped like PostgREST reporting an unprovisioned relation.
pub fn missing_table_error() -> StoreError {
    StoreError::new("Could not find the table 'public.event_photos' in the schema cache")
        .with_code("PGRST205")
        .with_status(404)
}

/// Error shaped like the storage API reporting an absent bucket.
pub fn missing_bucket_error() -> StoreError {
    StoreError::new("Bucket not found")
        .with_code("404")
        .with_status(404)
}

pub fn db_error() -> StoreError {
    StoreError::new("permission denied for table event_photos")
        .with_code("42501")
        .with_status(403)
}
