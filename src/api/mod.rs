//! HTTP transport shared by every service wrapper: one configured reqwest
//! client with the base URL, the fixed request timeout, bearer-token
//! attachment, and the mapping from transport/HTTP failures to [`AppError`].
//! No retries anywhere; a failed request surfaces directly to the caller.

use crate::errors::{AppError, AppResult};
use crate::models::ClientConfig;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

pub mod endpoints {
    pub const KPIS: &str = "/kpis";
    pub const AUTH_TOKEN: &str = "/auth/token";
    pub const USERS_ME: &str = "/users/me";
    pub const INVENTORY_CATEGORIES: &str = "/inventory/categories";
    pub const INVENTORY_PRODUCTS: &str = "/inventory/products";
    pub const INVENTORY_TRANSACTIONS: &str = "/inventory/transactions";
}

/// In-memory bearer token shared between the auth service (which writes it)
/// and the client (which attaches it). Platform secure-storage is the
/// embedding application's concern.
#[derive(Clone, Default)]
pub struct TokenStore {
    inner: Arc<RwLock<Option<String>>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, token: String) {
        *self.inner.write().await = Some(token);
    }

    pub async fn clear(&self) {
        *self.inner.write().await = None;
    }

    pub async fn get(&self) -> Option<String> {
        self.inner.read().await.clone()
    }
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: TokenStore,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|err| AppError::Internal(err.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tokens: TokenStore::new(),
        })
    }

    pub fn tokens(&self) -> TokenStore {
        self.tokens.clone()
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> AppResult<T> {
        let request = self.http.get(self.url(path)).query(query);
        let response = self.send(request, "GET", path).await?;
        Ok(response.json().await?)
    }

    pub async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> AppResult<T> {
        let request = self.http.post(self.url(path)).json(body);
        let response = self.send(request, "POST", path).await?;
        Ok(response.json().await?)
    }

    pub async fn delete(&self, path: &str) -> AppResult<()> {
        let request = self.http.delete(self.url(path));
        self.send(request, "DELETE", path).await?;
        Ok(())
    }

    /// Form-encoded POST, used by the OAuth2 password login endpoint.
    pub async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> AppResult<T> {
        let request = self.http.post(self.url(path)).form(form);
        let response = self.send(request, "POST", path).await?;
        Ok(response.json().await?)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(
        &self,
        mut request: reqwest::RequestBuilder,
        method: &str,
        path: &str,
    ) -> AppResult<reqwest::Response> {
        if let Some(token) = self.tokens.get().await {
            request = request.bearer_auth(token);
        }

        let request_id = Uuid::new_v4();
        tracing::debug!(request_id = %request_id, method, path, "dispatching request");

        let response = request.send().await.map_err(AppError::from)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = extract_detail(&body, status);
        tracing::warn!(request_id = %request_id, method, path, status = status.as_u16(), "request failed");

        Err(match status.as_u16() {
            401 => {
                // Expired or invalid session: drop the stored token before
                // surfacing the error.
                self.tokens.clear().await;
                AppError::Auth(message)
            }
            404 => AppError::NotFound(message),
            code => AppError::Api {
                status: code,
                message,
            },
        })
    }
}

/// Pulls the `detail` field out of a FastAPI error envelope, falling back to
/// the raw body or the status reason when the body is not that shape.
fn extract_detail(body: &str, status: reqwest::StatusCode) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(detail) = value.get("detail").and_then(|detail| detail.as_str()) {
            return detail.to_string();
        }
    }
    if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{extract_detail, ApiClient, TokenStore};
    use crate::models::ClientConfig;
    use reqwest::StatusCode;

    #[test]
    fn detail_field_is_extracted_from_error_envelopes() {
        let body = r#"{"detail": "KPI not found"}"#;
        assert_eq!(extract_detail(body, StatusCode::NOT_FOUND), "KPI not found");
    }

    #[test]
    fn non_envelope_bodies_pass_through() {
        assert_eq!(
            extract_detail("gateway exploded", StatusCode::BAD_GATEWAY),
            "gateway exploded"
        );
        assert_eq!(
            extract_detail("", StatusCode::BAD_GATEWAY),
            "Bad Gateway"
        );
    }

    #[test]
    fn trailing_slash_in_base_url_is_trimmed() {
        let client = ApiClient::new(&ClientConfig {
            base_url: "http://localhost:8000/api/v1/".to_string(),
            ..ClientConfig::default()
        })
        .expect("client");
        assert_eq!(client.url("/kpis"), "http://localhost:8000/api/v1/kpis");
    }

    #[tokio::test]
    async fn token_store_round_trips() {
        let store = TokenStore::new();
        assert!(store.get().await.is_none());
        store.set("abc".to_string()).await;
        assert_eq!(store.get().await.as_deref(), Some("abc"));
        store.clear().await;
        assert!(store.get().await.is_none());
    }
}
