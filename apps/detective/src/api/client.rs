//! # Detective HTTP Client
//!
//! Wrapper around the Office Detective REST API.
//!
//! Every request carries `Authorization: Bearer <token>` while the shared
//! token slot holds a token. Non-success responses become
//! [`ApiError::Http`] with the backend's `detail` message.

use super::error::{ApiError, error_detail, status_reason};
use super::types::{
    Case, CaseListResponse, ChatRequest, ChatResponse, DocumentListResponse, DocumentWithChunks,
    EntityListResponse, GraphStats, HintRequest, HintResponse, LoginRequest, PathRequest,
    RegisterRequest, SearchRequest, SearchResponse, SyncResponse, TokenResponse, User, UserUpdate,
};
use detective_core::{DocType, Entity, EntityType, HubsResponse, NeighborsResponse, PathResponse};
use reqwest::Url;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Bearer token shared between the client and the auth store.
pub type TokenSlot = Arc<RwLock<Option<String>>>;

/// Page and filter of a document listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentQuery {
    pub skip: usize,
    pub limit: usize,
    pub doc_type: Option<DocType>,
}

impl Default for DocumentQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: 20,
            doc_type: None,
        }
    }
}

/// HTTP client for the backend REST API.
#[derive(Debug, Clone)]
pub struct DetectiveClient {
    http: reqwest::Client,
    base_url: String,
    base: Url,
    token: TokenSlot,
}

impl DetectiveClient {
    /// Create a client for `base_url` with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Config(format!("cannot build HTTP client: {e}")))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let base = Url::parse(&base_url)
            .map_err(|e| ApiError::Config(format!("invalid API URL '{base_url}': {e}")))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::Config(format!("invalid API URL '{base_url}'")));
        }
        Ok(Self {
            http,
            base_url,
            base,
            token: Arc::new(RwLock::new(None)),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The slot the bearer token is read from.
    #[must_use]
    pub fn token_slot(&self) -> TokenSlot {
        Arc::clone(&self.token)
    }

    pub async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }

    pub async fn has_token(&self) -> bool {
        self.token.read().await.is_some()
    }

    // =========================================================================
    // TRANSPORT
    // =========================================================================

    /// URL of an endpoint. Every segment is percent-encoded on its own, so
    /// ids containing `/`, `?` or `#` stay inside their segment.
    #[must_use]
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Build a request with optional Bearer auth.
    async fn request(&self, method: reqwest::Method, segments: &[&str]) -> reqwest::RequestBuilder {
        let mut req = self.http.request(method, self.endpoint(segments));
        if let Some(token) = self.token.read().await.as_deref() {
            req = req.bearer_auth(token);
        }
        req
    }

    /// Send a request and handle connection errors.
    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        req.send().await.map_err(|e| ApiError::Network {
            url: self.base_url.clone(),
            message: e.to_string(),
        })
    }

    /// Check the status and parse the JSON body.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let detail = error_detail(&body).unwrap_or_else(|| status_reason(status));
            tracing::debug!(status = status.as_u16(), %detail, "backend error");
            return Err(ApiError::Http {
                status: status.as_u16(),
                detail,
            });
        }
        resp.json::<T>()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let req = self.request(reqwest::Method::GET, segments).await.query(query);
        let resp = self.send(req).await?;
        self.handle_response(resp).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, ApiError> {
        let req = self.request(reqwest::Method::POST, segments).await.json(body);
        let resp = self.send(req).await?;
        self.handle_response(resp).await
    }

    async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, ApiError> {
        let req = self.request(reqwest::Method::PATCH, segments).await.json(body);
        let resp = self.send(req).await?;
        self.handle_response(resp).await
    }

    // =========================================================================
    // AUTH
    // =========================================================================

    /// POST /api/auth/login
    pub async fn login(&self, request: &LoginRequest) -> Result<TokenResponse, ApiError> {
        self.post(&["api", "auth", "login"], request).await
    }

    /// POST /api/auth/register
    pub async fn register(&self, request: &RegisterRequest) -> Result<TokenResponse, ApiError> {
        self.post(&["api", "auth", "register"], request).await
    }

    /// PATCH /api/auth/me
    pub async fn update_me(&self, update: &UserUpdate) -> Result<User, ApiError> {
        self.patch(&["api", "auth", "me"], update).await
    }

    // =========================================================================
    // CASES, DOCUMENTS, ENTITIES
    // =========================================================================

    /// GET /api/cases
    pub async fn list_cases(&self, skip: usize, limit: usize) -> Result<CaseListResponse, ApiError> {
        let query = [("skip", skip.to_string()), ("limit", limit.to_string())];
        self.get(&["api", "cases"], &query).await
    }

    /// GET /api/cases/{id}
    pub async fn get_case(&self, case_id: &str) -> Result<Case, ApiError> {
        self.get(&["api", "cases", case_id], &[]).await
    }

    /// GET /api/cases/{id}/documents?skip&limit&doc_type
    pub async fn list_documents(
        &self,
        case_id: &str,
        page: DocumentQuery,
    ) -> Result<DocumentListResponse, ApiError> {
        let mut query = vec![
            ("skip", page.skip.to_string()),
            ("limit", page.limit.to_string()),
        ];
        if let Some(doc_type) = page.doc_type {
            query.push(("doc_type", doc_type.as_str().to_string()));
        }
        self.get(&["api", "cases", case_id, "documents"], &query)
            .await
    }

    /// GET /api/cases/{id}/documents/{doc_id}/full
    pub async fn get_document(
        &self,
        case_id: &str,
        doc_id: &str,
    ) -> Result<DocumentWithChunks, ApiError> {
        self.get(&["api", "cases", case_id, "documents", doc_id, "full"], &[])
            .await
    }

    /// GET /api/cases/{id}/entities?entity_type
    pub async fn list_entities(
        &self,
        case_id: &str,
        entity_type: Option<EntityType>,
        limit: usize,
    ) -> Result<EntityListResponse, ApiError> {
        let mut query = vec![("skip", "0".to_string()), ("limit", limit.to_string())];
        if let Some(entity_type) = entity_type {
            query.push(("entity_type", entity_type.as_str().to_string()));
        }
        self.get(&["api", "cases", case_id, "entities"], &query)
            .await
    }

    /// GET /api/cases/{id}/entities/{entity_id}
    pub async fn get_entity(&self, case_id: &str, entity_id: &str) -> Result<Entity, ApiError> {
        self.get(&["api", "cases", case_id, "entities", entity_id], &[])
            .await
    }

    /// POST /api/cases/{id}/search
    pub async fn search(
        &self,
        case_id: &str,
        request: &SearchRequest,
    ) -> Result<SearchResponse, ApiError> {
        self.post(&["api", "cases", case_id, "search"], request)
            .await
    }

    // =========================================================================
    // CHAT
    // =========================================================================

    /// POST /api/cases/{id}/chat
    pub async fn chat(&self, case_id: &str, request: &ChatRequest) -> Result<ChatResponse, ApiError> {
        self.post(&["api", "cases", case_id, "chat"], request)
            .await
    }

    /// POST /api/cases/{id}/chat/hint
    pub async fn hint(&self, case_id: &str, request: &HintRequest) -> Result<HintResponse, ApiError> {
        self.post(&["api", "cases", case_id, "chat", "hint"], request)
            .await
    }

    // =========================================================================
    // GRAPH
    // =========================================================================

    /// POST /api/cases/{id}/graph/sync
    pub async fn sync_graph(&self, case_id: &str) -> Result<SyncResponse, ApiError> {
        self.post(
            &["api", "cases", case_id, "graph", "sync"],
            &serde_json::json!({}),
        )
        .await
    }

    /// POST /api/cases/{id}/graph/path
    pub async fn find_path(
        &self,
        case_id: &str,
        request: &PathRequest,
    ) -> Result<PathResponse, ApiError> {
        self.post(&["api", "cases", case_id, "graph", "path"], request)
            .await
    }

    /// GET /api/cases/{id}/graph/neighbors/{entity_id}?depth=N
    pub async fn neighbors(
        &self,
        case_id: &str,
        entity_id: &str,
        depth: u32,
    ) -> Result<NeighborsResponse, ApiError> {
        self.get(
            &["api", "cases", case_id, "graph", "neighbors", entity_id],
            &[("depth", depth.to_string())],
        )
        .await
    }

    /// GET /api/cases/{id}/graph/hubs?limit=N
    pub async fn hubs(&self, case_id: &str, limit: u32) -> Result<HubsResponse, ApiError> {
        self.get(
            &["api", "cases", case_id, "graph", "hubs"],
            &[("limit", limit.to_string())],
        )
        .await
    }

    /// GET /api/cases/{id}/graph/stats
    pub async fn graph_stats(&self, case_id: &str) -> Result<GraphStats, ApiError> {
        self.get(&["api", "cases", case_id, "graph", "stats"], &[])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let client =
            DetectiveClient::new("http://127.0.0.1:8000/", Duration::from_secs(5)).expect("client");
        assert_eq!(client.base_url(), "http://127.0.0.1:8000");
    }

    #[test]
    fn ids_are_escaped_inside_their_segment() {
        let client =
            DetectiveClient::new("http://127.0.0.1:8000/", Duration::from_secs(5)).expect("client");
        let url = client.endpoint(&["api", "cases", "c/1?x#y", "documents"]);
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8000/api/cases/c%2F1%3Fx%23y/documents"
        );
        assert_eq!(url.query(), None);
    }

    #[test]
    fn base_path_is_kept() {
        let client =
            DetectiveClient::new("https://host/backend/", Duration::from_secs(5)).expect("client");
        assert_eq!(
            client.endpoint(&["api", "cases"]).as_str(),
            "https://host/backend/api/cases"
        );
    }

    #[test]
    fn unparsable_base_url_is_rejected() {
        let err = DetectiveClient::new("not a url", Duration::from_secs(5)).expect_err("bad url");
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[tokio::test]
    async fn token_slot_is_shared() {
        let client =
            DetectiveClient::new("http://127.0.0.1:8000", Duration::from_secs(5)).expect("client");
        let slot = client.token_slot();
        assert!(!client.has_token().await);

        *slot.write().await = Some("t0k3n".into());
        assert!(client.has_token().await);

        client.set_token(None).await;
        assert!(slot.read().await.is_none());
    }
}
