use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use crate::errors::StoreError;
use crate::supabase::client::{SupabaseClient, SupabasePostgrest};

#[derive(Debug, Clone)]
pub struct OrderBy {
    pub column: String,
    pub ascending: bool,
}

impl OrderBy {
    pub fn asc(column: &str) -> Self {
        OrderBy {
            column: column.to_string(),
            ascending: true,
        }
    }

    pub fn desc(column: &str) -> Self {
        OrderBy {
            column: column.to_string(),
            ascending: false,
        }
    }
}

/// Remote relational table accessed through a query-builder-style client.
/// Rows travel as raw JSON; this service is a thin proxy and does not own
/// the schema. Filters are equality-only, which is all the routes need.
#[async_trait]
pub trait RelationStore: Send + Sync {
    async fn select(
        &self,
        table: &str,
        filters: Vec<(String, String)>,
        order: Option<OrderBy>,
    ) -> Result<Vec<Value>, StoreError>;

    /// Inserts one row and returns its stored representation.
    async fn insert(&self, table: &str, row: Value) -> Result<Value, StoreError>;

    /// Patches the rows matching `filters`, returning the first updated row
    /// if any.
    async fn update(
        &self,
        table: &str,
        filters: Vec<(String, String)>,
        patch: Value,
    ) -> Result<Option<Value>, StoreError>;

    async fn delete(&self, table: &str, filters: Vec<(String, String)>) -> Result<(), StoreError>;

    async fn count(&self, table: &str, filters: Vec<(String, String)>) -> Result<i64, StoreError>;
}

fn filter_query(filters: &[(String, String)]) -> Vec<(String, String)> {
    filters
        .iter()
        .map(|(column, value)| (column.clone(), format!("eq.{value}")))
        .collect()
}

#[async_trait]
impl RelationStore for SupabasePostgrest {
    async fn select(
        &self,
        table: &str,
        filters: Vec<(String, String)>,
        order: Option<OrderBy>,
    ) -> Result<Vec<Value>, StoreError> {
        let url = self.client.endpoint(&format!("rest/v1/{table}"));

        let mut query = filter_query(&filters);
        query.push(("select".to_string(), "*".to_string()));
        if let Some(order) = order {
            let direction = if order.ascending { "asc" } else { "desc" };
            query.push(("order".to_string(), format!("{}.{direction}", order.column)));
        }

        let response = self
            .client
            .request(Method::GET, url)
            .query(&query)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(SupabaseClient::store_error(response).await)
        }
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value, StoreError> {
        let url = self.client.endpoint(&format!("rest/v1/{table}"));

        let response = self
            .client
            .request(Method::POST, url)
            .header("prefer", "return=representation")
            .json(&serde_json::json!([row]))
            .send()
            .await?;

        if response.status().is_success() {
            let mut rows: Vec<Value> = response.json().await?;
            if rows.is_empty() {
                Err(StoreError::new("insert returned no rows"))
            } else {
                Ok(rows.remove(0))
            }
        } else {
            Err(SupabaseClient::store_error(response).await)
        }
    }

    async fn update(
        &self,
        table: &str,
        filters: Vec<(String, String)>,
        patch: Value,
    ) -> Result<Option<Value>, StoreError> {
        let url = self.client.endpoint(&format!("rest/v1/{table}"));

        let response = self
            .client
            .request(Method::PATCH, url)
            .header("prefer", "return=representation")
            .query(&filter_query(&filters))
            .json(&patch)
            .send()
            .await?;

        if response.status().is_success() {
            let mut rows: Vec<Value> = response.json().await?;
            if rows.is_empty() {
                Ok(None)
            } else {
                Ok(Some(rows.remove(0)))
            }
        } else {
            Err(SupabaseClient::store_error(response).await)
        }
    }

    async fn delete(&self, table: &str, filters: Vec<(String, String)>) -> Result<(), StoreError> {
        let url = self.client.endpoint(&format!("rest/v1/{table}"));

        let response = self
            .client
            .request(Method::DELETE, url)
            .query(&filter_query(&filters))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(SupabaseClient::store_error(response).await)
        }
    }

    async fn count(&self, table: &str, filters: Vec<(String, String)>) -> Result<i64, StoreError> {
        let url = self.client.endpoint(&format!("rest/v1/{table}"));

        let mut query = filter_query(&filters);
        query.push(("select".to_string(), "*".to_string()));

        // HEAD with an exact count keeps the body off the wire; the total
        // comes back in the content-range header as "<range>/<total>".
        let response = self
            .client
            .request(Method::HEAD, url)
            .header("prefer", "count=exact")
            .query(&query)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SupabaseClient::store_error(response).await);
        }

        response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.rsplit('/').next())
            .and_then(|total| total.parse::<i64>().ok())
            .ok_or_else(|| StoreError::new("count response missing content-range total"))
    }
}
