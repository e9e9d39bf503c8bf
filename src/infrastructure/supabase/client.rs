use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Response};
use url::Url;

use crate::errors::StoreError;

/// Shared plumbing for the hosted Postgres/storage service. Both the
/// storage and PostgREST wrappers authenticate with the service-role key,
/// which bypasses row level security; this client must never be handed to
/// untrusted code paths.
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl SupabaseClient {
    pub fn new(base_url: &str, service_key: &str) -> Result<Self, url::ParseError> {
        // Validate early; a malformed base URL should fail at startup, not
        // on the first request.
        Url::parse(base_url)?;

        Ok(SupabaseClient {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
        })
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    pub(crate) fn request(&self, method: Method, url: String) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    /// Decodes an error response body into a [`StoreError`], preserving the
    /// vendor code so callers can classify the failure.
    pub(crate) async fn store_error(response: Response) -> StoreError {
        let status = response.status().as_u16();
        let body: serde_json::Value = response.json().await.unwrap_or_default();

        let message = body
            .get("message")
            .or_else(|| body.get("msg"))
            .or_else(|| body.get("error"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("request failed with status {status}"));

        let code = body
            .get("code")
            .or_else(|| body.get("statusCode"))
            .and_then(|v| match v {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            });

        let mut err = StoreError::new(message).with_status(status);
        if let Some(code) = code {
            err = err.with_code(code);
        }
        err
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        let mut store_err = StoreError::new(err.to_string());
        if let Some(status) = err.status() {
            store_err = store_err.with_status(status.as_u16());
        }
        store_err
    }
}

/// Percent-encodes each segment of a storage key while keeping the
/// separators, so keys survive embedding in a URL path.
pub(crate) fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Object-store wrapper over the storage API.
#[derive(Clone)]
pub struct SupabaseStorage {
    pub(crate) client: Arc<SupabaseClient>,
}

impl SupabaseStorage {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        SupabaseStorage { client }
    }
}

/// Relation-store wrapper over the PostgREST API.
#[derive(Clone)]
pub struct SupabasePostgrest {
    pub(crate) client: Arc<SupabaseClient>,
}

impl SupabasePostgrest {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        SupabasePostgrest { client }
    }
}
