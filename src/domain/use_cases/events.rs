use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info};
use validator::Validate;

use crate::{
    entities::event::EventPayload,
    errors::ApiError,
    repositories::relation_store::{OrderBy, RelationStore},
};

pub const EVENTS_TABLE: &str = "events";

/// Straight pass-through CRUD over the events table. Rows travel as raw
/// JSON; the schema is owned by the hosted store.
pub struct EventHandler {
    relations: Arc<dyn RelationStore>,
}

impl EventHandler {
    pub fn new(relations: Arc<dyn RelationStore>) -> Self {
        EventHandler { relations }
    }

    pub async fn list_events(&self) -> Result<Vec<Value>, ApiError> {
        self.relations
            .select(EVENTS_TABLE, vec![], Some(OrderBy::asc("date")))
            .await
            .map_err(|err| {
                error!(error = %err, "event listing failed");
                ApiError::StoreFailed("fetch events", err)
            })
    }

    pub async fn create_event(&self, payload: EventPayload) -> Result<Value, ApiError> {
        payload
            .validate()
            .map_err(|_| ApiError::BadRequest("Name and date are required".to_string()))?;

        let row = serde_json::to_value(&payload)
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;

        let created = self
            .relations
            .insert(EVENTS_TABLE, row)
            .await
            .map_err(|err| {
                error!(error = %err, "event insert failed");
                ApiError::StoreFailed("create event", err)
            })?;

        info!(name = %payload.name, "admin created new event");
        Ok(created)
    }

    pub async fn update_event(&self, id: &str, payload: EventPayload) -> Result<Value, ApiError> {
        let patch = serde_json::to_value(&payload)
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;

        let updated = self
            .relations
            .update(EVENTS_TABLE, vec![("id".to_string(), id.to_string())], patch)
            .await
            .map_err(|err| {
                error!(%id, error = %err, "event update failed");
                ApiError::StoreFailed("update event", err)
            })?;

        match updated {
            Some(row) => {
                info!(%id, name = %payload.name, "admin updated event");
                Ok(row)
            }
            None => Err(ApiError::BadRequest("Event not found".to_string())),
        }
    }

    pub async fn delete_event(&self, id: &str) -> Result<(), ApiError> {
        self.relations
            .delete(EVENTS_TABLE, vec![("id".to_string(), id.to_string())])
            .await
            .map_err(|err| {
                error!(%id, error = %err, "event delete failed");
                ApiError::StoreFailed("delete event", err)
            })?;

        info!(%id, "admin deleted event");
        Ok(())
    }
}
