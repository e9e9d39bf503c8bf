use std::sync::Arc;

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;
use tracing::{error, warn};
use uuid::Uuid;

use crate::{
    entities::photo::{DeletePhotoRequest, PhotoId, PhotoRecord, UploadedFile},
    errors::{
        ApiError, StoreError, is_bucket_exists_error, is_missing_bucket_error,
        is_missing_table_error,
    },
    repositories::{
        object_store::ObjectStore,
        relation_store::{OrderBy, RelationStore},
    },
};

/// Metadata table recording one row per uploaded photo. May not exist yet
/// in a given deployment; every flow here tolerates its absence.
pub const PHOTOS_TABLE: &str = "event_photos";

const CAPTION_MAX_CHARS: usize = 200;
const FILE_NAME_MAX_CHARS: usize = 120;
const FALLBACK_LIST_LIMIT: u32 = 200;

static UNSAFE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z0-9._-]+").unwrap());
static REPEATED_DASHES: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").unwrap());

/// Strips a client-supplied file name down to a safe character set,
/// collapses repeated separators and caps the length.
pub fn safe_file_name(original: &str) -> String {
    let replaced = UNSAFE_CHARS.replace_all(original, "-");
    let collapsed = REPEATED_DASHES.replace_all(&replaced, "-");
    let trimmed = collapsed.trim_matches('-');
    let capped: String = trimmed.chars().take(FILE_NAME_MAX_CHARS).collect();
    if capped.is_empty() {
        "photo".to_string()
    } else {
        capped
    }
}

/// Derives a collision-resistant storage key for an upload:
/// `<event_id>/<unix-millis>-<uuid>-<sanitized-name>[.<ext>]`.
pub fn derive_storage_key(event_id: &str, original_name: Option<&str>) -> String {
    let raw = original_name.unwrap_or("photo");
    let name = safe_file_name(raw);

    let ext = raw
        .rsplit_once('.')
        .map(|(_, e)| {
            e.to_lowercase()
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
        })
        .filter(|e| !e.is_empty());

    let stamp = Utc::now().timestamp_millis();
    let random = Uuid::new_v4();

    match ext {
        Some(ext) => format!("{event_id}/{stamp}-{random}-{name}.{ext}"),
        None => format!("{event_id}/{stamp}-{random}-{name}"),
    }
}

/// Gate checks applied before any store call: declared content type must be
/// an image, size must not exceed the configured ceiling. Rate limiting is
/// enforced upstream of this, so rejected files still consumed quota.
pub fn validate_upload(file: &UploadedFile, max_bytes: usize) -> Result<(), ApiError> {
    if !file.is_image() {
        return Err(ApiError::UnsupportedMediaType);
    }
    if file.bytes.len() > max_bytes {
        return Err(ApiError::PayloadTooLarge);
    }
    Ok(())
}

fn eq(column: &str, value: &str) -> (String, String) {
    (column.to_string(), value.to_string())
}

/// Orchestrates the photo ingestion, listing and deletion flows against
/// the object and relation stores.
pub struct PhotoHandler {
    objects: Arc<dyn ObjectStore>,
    relations: Arc<dyn RelationStore>,
    bucket: String,
}

impl PhotoHandler {
    pub fn new(objects: Arc<dyn ObjectStore>, relations: Arc<dyn RelationStore>, bucket: String) -> Self {
        PhotoHandler {
            objects,
            relations,
            bucket,
        }
    }

    /// Uploads the file, then records its metadata. The object write is
    /// authoritative; metadata persistence is best-effort, and a missing
    /// metadata table still yields a created response. An object that was
    /// stored but whose row insert failed for any other reason is left in
    /// place (no compensation) and the failure is surfaced.
    pub async fn ingest_photo(
        &self,
        event_id: &str,
        file: UploadedFile,
        caption: Option<String>,
        uploader_ip: &str,
    ) -> Result<PhotoRecord, ApiError> {
        let path = derive_storage_key(event_id, file.file_name.as_deref());

        let mut upload_result = self
            .objects
            .upload(&self.bucket, &path, file.bytes.clone(), &file.content_type)
            .await;

        // If the bucket doesn't exist yet, attempt to create it and retry once.
        if let Err(err) = &upload_result {
            if is_missing_bucket_error(err) {
                self.ensure_bucket_exists().await;
                upload_result = self
                    .objects
                    .upload(&self.bucket, &path, file.bytes, &file.content_type)
                    .await;
            }
        }

        if let Err(err) = upload_result {
            error!(%path, error = %err, "object store upload failed");
            return Err(ApiError::UploadFailed(err));
        }

        let url = self.objects.public_url(&self.bucket, &path);
        if url.is_empty() {
            // The object now exists without a resolvable URL; someone has
            // to reconcile it by hand.
            error!(%path, "uploaded object has no public URL");
            return Err(ApiError::UrlMissing);
        }

        let caption = caption
            .map(|c| c.trim().chars().take(CAPTION_MAX_CHARS).collect::<String>())
            .filter(|c| !c.is_empty());

        let row = json!({
            "event_id": event_id,
            "storage_path": path,
            "url": url,
            "caption": caption,
            "uploader_ip": uploader_ip,
        });

        match self.relations.insert(PHOTOS_TABLE, row).await {
            Ok(inserted) => serde_json::from_value(inserted).map_err(|e| {
                ApiError::MetadataPersistFailed(StoreError::new(format!(
                    "unexpected row shape: {e}"
                )))
            }),
            Err(err) if is_missing_table_error(&err, PHOTOS_TABLE) => {
                // DB isn't set up yet; the upload alone still counts.
                Ok(PhotoRecord {
                    id: PhotoId::StoragePath(path.clone()),
                    event_id: event_id.to_string(),
                    storage_path: path,
                    url,
                    caption,
                    uploader_ip: Some(uploader_ip.to_string()),
                    created_at: Some(Utc::now()),
                })
            }
            Err(err) => {
                error!(%path, error = %err, "photo metadata insert failed, object is orphaned");
                Err(ApiError::MetadataPersistFailed(err))
            }
        }
    }

    /// Prefers metadata rows (they carry captions); falls back to a raw
    /// storage listing when the table has not been provisioned.
    pub async fn list_photos(&self, event_id: &str) -> Result<Vec<PhotoRecord>, ApiError> {
        let query = self
            .relations
            .select(
                PHOTOS_TABLE,
                vec![eq("event_id", event_id)],
                Some(OrderBy::desc("created_at")),
            )
            .await;

        match query {
            Ok(rows) => rows
                .into_iter()
                .map(|row| {
                    serde_json::from_value(row).map_err(|e| {
                        ApiError::ListFailed(StoreError::new(format!("unexpected row shape: {e}")))
                    })
                })
                .collect(),
            Err(err) if is_missing_table_error(&err, PHOTOS_TABLE) => {
                self.list_from_storage(event_id).await
            }
            Err(err) => {
                error!(%event_id, error = %err, "photo listing query failed");
                Err(ApiError::ListFailed(err))
            }
        }
    }

    async fn list_from_storage(&self, event_id: &str) -> Result<Vec<PhotoRecord>, ApiError> {
        let objects = self
            .objects
            .list(&self.bucket, event_id, FALLBACK_LIST_LIMIT)
            .await
            .map_err(|err| {
                error!(%event_id, error = %err, "storage fallback listing failed");
                ApiError::ListFailed(err)
            })?;

        let photos = objects
            .into_iter()
            // Pseudo-directory placeholders end in a separator.
            .filter(|o| !o.name.is_empty() && !o.name.ends_with('/'))
            .filter_map(|o| {
                let storage_path = format!("{event_id}/{}", o.name);
                let url = self.objects.public_url(&self.bucket, &storage_path);
                if url.is_empty() {
                    return None;
                }
                Some(PhotoRecord {
                    id: PhotoId::StoragePath(storage_path.clone()),
                    event_id: event_id.to_string(),
                    storage_path,
                    url,
                    caption: None,
                    uploader_ip: None,
                    created_at: o.created_at.or(o.updated_at),
                })
            })
            .collect();

        Ok(photos)
    }

    /// Removes the object first; metadata cleanup only happens once the
    /// object is gone, and a missing metadata table is not an error.
    pub async fn delete_photo(
        &self,
        event_id: &str,
        request: DeletePhotoRequest,
    ) -> Result<(), ApiError> {
        let id = request.id.filter(|s| !s.trim().is_empty());
        let given_path = request.storage_path.filter(|s| !s.trim().is_empty());

        if id.is_none() && given_path.is_none() {
            return Err(ApiError::BadRequest("Missing id or storage_path".to_string()));
        }

        let mut row_id = id.clone();
        let mut storage_path = given_path;
        let mut metadata_cleanup = true;

        if storage_path.is_none() {
            let raw_id = id.expect("id is present when storage_path is not");

            match self
                .relations
                .select(PHOTOS_TABLE, vec![eq("id", &raw_id)], None)
                .await
            {
                Ok(rows) => {
                    storage_path = rows
                        .first()
                        .and_then(|row| row.get("storage_path"))
                        .and_then(|v| v.as_str())
                        .map(str::to_string);
                }
                Err(err) if is_missing_table_error(&err, PHOTOS_TABLE) => {
                    // Without a metadata layer, a path-shaped id is the path
                    // itself and there is no row to clean up afterwards.
                    if let PhotoId::StoragePath(path) = PhotoId::parse(&raw_id) {
                        storage_path = Some(path);
                    }
                    row_id = None;
                    metadata_cleanup = false;
                }
                Err(err) => {
                    error!(%raw_id, error = %err, "photo lookup failed");
                    return Err(ApiError::LookupFailed(err));
                }
            }
        }

        let Some(path) = storage_path else {
            return Err(ApiError::BadRequest(
                "Could not resolve a storage path for the photo".to_string(),
            ));
        };

        if let Err(err) = self.objects.remove(&self.bucket, &path).await {
            // Leaving both object and row intact beats a record pointing at
            // nothing, so metadata is never touched past this point.
            error!(%path, error = %err, "object removal failed");
            return Err(ApiError::DeleteFailed(err));
        }

        if !metadata_cleanup {
            return Ok(());
        }

        let filters = match row_id {
            Some(row_id) => vec![eq("id", &row_id)],
            None => vec![eq("event_id", event_id), eq("storage_path", &path)],
        };

        match self.relations.delete(PHOTOS_TABLE, filters).await {
            Ok(()) => Ok(()),
            Err(err) if is_missing_table_error(&err, PHOTOS_TABLE) => Ok(()),
            Err(err) => {
                warn!(%path, error = %err, "photo record cleanup failed after object removal");
                Err(ApiError::MetadataDeleteFailed(err))
            }
        }
    }

    async fn ensure_bucket_exists(&self) {
        match self.objects.create_bucket(&self.bucket, true).await {
            Ok(()) => {}
            Err(err) if is_bucket_exists_error(&err) => {}
            Err(err) => {
                // Creation may be disallowed for this key; the retried
                // upload will surface the real failure.
                warn!(bucket = %self.bucket, error = %err, "bucket creation failed");
            }
        }
    }
}
