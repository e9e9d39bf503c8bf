use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::Deserialize;

use crate::errors::StoreError;
use crate::supabase::client::{SupabaseClient, SupabaseStorage, encode_path};

/// One entry returned by a prefix listing of the object store.
#[derive(Debug, Clone, Deserialize)]
pub struct StoredObject {
    pub name: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Remote bucket supporting upload, public-URL resolution, listing,
/// deletion and bucket creation.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Writes `bytes` at `path`. Must fail rather than overwrite an
    /// existing object at the same key.
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StoreError>;

    /// Publicly resolvable address for an object. May be empty if the
    /// store cannot produce one.
    fn public_url(&self, bucket: &str, path: &str) -> String;

    /// Lists up to `limit` objects under `prefix`, newest first.
    async fn list(
        &self,
        bucket: &str,
        prefix: &str,
        limit: u32,
    ) -> Result<Vec<StoredObject>, StoreError>;

    async fn remove(&self, bucket: &str, path: &str) -> Result<(), StoreError>;

    async fn create_bucket(&self, bucket: &str, public: bool) -> Result<(), StoreError>;
}

#[async_trait]
impl ObjectStore for SupabaseStorage {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StoreError> {
        let url = self
            .client
            .endpoint(&format!("storage/v1/object/{bucket}/{}", encode_path(path)));

        let response = self
            .client
            .request(Method::POST, url)
            .header("content-type", content_type)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(SupabaseClient::store_error(response).await)
        }
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        self.client.endpoint(&format!(
            "storage/v1/object/public/{bucket}/{}",
            encode_path(path)
        ))
    }

    async fn list(
        &self,
        bucket: &str,
        prefix: &str,
        limit: u32,
    ) -> Result<Vec<StoredObject>, StoreError> {
        let url = self.client.endpoint(&format!("storage/v1/object/list/{bucket}"));

        let response = self
            .client
            .request(Method::POST, url)
            .json(&serde_json::json!({
                "prefix": prefix,
                "limit": limit,
                "sortBy": { "column": "created_at", "order": "desc" },
            }))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(SupabaseClient::store_error(response).await)
        }
    }

    async fn remove(&self, bucket: &str, path: &str) -> Result<(), StoreError> {
        let url = self
            .client
            .endpoint(&format!("storage/v1/object/{bucket}/{}", encode_path(path)));

        let response = self.client.request(Method::DELETE, url).send().await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(SupabaseClient::store_error(response).await)
        }
    }

    async fn create_bucket(&self, bucket: &str, public: bool) -> Result<(), StoreError> {
        let url = self.client.endpoint("storage/v1/bucket");

        let response = self
            .client
            .request(Method::POST, url)
            .json(&serde_json::json!({
                "id": bucket,
                "name": bucket,
                "public": public,
            }))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(SupabaseClient::store_error(response).await)
        }
    }
}
