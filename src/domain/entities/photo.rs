use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Identifier of a photo as exposed on the wire.
///
/// When the metadata table exists this is the database-assigned row id;
/// when the subsystem runs in storage-only fallback mode it is the storage
/// path itself. The wire format is a single opaque string either way; the
/// two spaces are told apart by the presence of a path separator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoId {
    DbId(String),
    StoragePath(String),
}

impl PhotoId {
    pub fn parse(raw: &str) -> Self {
        if raw.contains('/') {
            PhotoId::StoragePath(raw.to_string())
        } else {
            PhotoId::DbId(raw.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PhotoId::DbId(s) | PhotoId::StoragePath(s) => s,
        }
    }
}

impl Serialize for PhotoId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PhotoId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Database ids may come back as JSON numbers (bigint keys).
        let value = serde_json::Value::deserialize(deserializer)?;
        let raw = match value {
            serde_json::Value::String(s) => s,
            serde_json::Value::Number(n) => n.to_string(),
            other => {
                return Err(serde::de::Error::custom(format!(
                    "invalid photo id: {other}"
                )));
            }
        };
        Ok(PhotoId::parse(&raw))
    }
}

/// One uploaded image associated with one event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoRecord {
    pub id: PhotoId,
    pub event_id: String,
    pub storage_path: String,
    pub url: String,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploader_ip: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Inbound file as read from the multipart request. Transient, never
/// persisted in this form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}

/// Body of the admin photo-deletion request. At least one of the two
/// identifiers must be present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeletePhotoRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub storage_path: Option<String>,
}
