use serde::{Deserialize, Serialize};
use validator::Validate;

/// Payload for creating or replacing an event. Rows read back from the
/// store are passed through as raw JSON, so only the write side is typed.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EventPayload {
    #[validate(length(min = 1, message = "Name and date are required"))]
    pub name: String,

    #[validate(length(min = 1, message = "Name and date are required"))]
    pub date: String,

    #[serde(default)]
    pub venue: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub ticket_url: Option<String>,
}
