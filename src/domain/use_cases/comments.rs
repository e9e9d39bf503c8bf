use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{error, warn};
use validator::Validate;

use crate::{
    entities::comment::NewCommentRequest,
    errors::ApiError,
    repositories::relation_store::{OrderBy, RelationStore},
};

pub const COMMENTS_TABLE: &str = "comments";

pub struct CommentHandler {
    relations: Arc<dyn RelationStore>,
}

impl CommentHandler {
    pub fn new(relations: Arc<dyn RelationStore>) -> Self {
        CommentHandler { relations }
    }

    pub async fn list_for_event(&self, event_id: &str) -> Result<Vec<Value>, ApiError> {
        self.relations
            .select(
                COMMENTS_TABLE,
                vec![("event_id".to_string(), event_id.to_string())],
                Some(OrderBy::desc("created_at")),
            )
            .await
            .map_err(|err| {
                error!(%event_id, error = %err, "comment listing failed");
                ApiError::StoreFailed("fetch comments", err)
            })
    }

    /// Comment counts per event for the listing page badges. A failed
    /// count for one event degrades to zero rather than failing the batch.
    pub async fn counts(&self, event_ids: &[&str]) -> Result<Map<String, Value>, ApiError> {
        let mut counts = Map::new();

        for id in event_ids {
            let count = match self
                .relations
                .count(
                    COMMENTS_TABLE,
                    vec![("event_id".to_string(), id.to_string())],
                )
                .await
            {
                Ok(count) => count,
                Err(err) => {
                    warn!(event_id = %id, error = %err, "comment count failed");
                    0
                }
            };
            counts.insert(id.to_string(), Value::from(count));
        }

        Ok(counts)
    }

    pub async fn create_comment(&self, request: NewCommentRequest) -> Result<Value, ApiError> {
        request.validate()?;

        let row = serde_json::to_value(&request)
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;

        self.relations
            .insert(COMMENTS_TABLE, row)
            .await
            .map_err(|err| {
                error!(error = %err, "comment insert failed");
                ApiError::StoreFailed("post comment", err)
            })
    }

    pub async fn delete_comment(&self, id: &str) -> Result<(), ApiError> {
        self.relations
            .delete(
                COMMENTS_TABLE,
                vec![("id".to_string(), id.to_string())],
            )
            .await
            .map_err(|err| {
                error!(%id, error = %err, "comment delete failed");
                ApiError::StoreFailed("delete comment", err)
            })
    }
}
