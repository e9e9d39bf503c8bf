use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewCommentRequest {
    #[validate(length(min = 1, message = "event_id is required"))]
    pub event_id: String,

    #[validate(length(min = 1, max = 100, message = "Author name too long (max 100 characters)"))]
    pub author_name: String,

    #[validate(length(min = 1, max = 1000, message = "Message too long (max 1000 characters)"))]
    pub message: String,
}
