//! # Case Resources
//!
//! Loaders for the read-only case data: the case list, paged documents,
//! entities and semantic search. Each loader keeps its last good result and
//! a [`RequestTracker`]; failures return `None` and are kept as the
//! tracker's error.

use crate::api::{
    ApiError, Case, DetectiveClient, DocumentQuery, DocumentWithChunks, SearchRequest,
    SearchResult,
};
use detective_core::{DocType, Document, Entity, EntityType, RequestTracker};

// =============================================================================
// CASES
// =============================================================================

#[derive(Debug)]
pub struct CaseCatalog {
    client: DetectiveClient,
    cases: Vec<Case>,
    total: usize,
    tracker: RequestTracker<ApiError>,
}

impl CaseCatalog {
    #[must_use]
    pub fn new(client: DetectiveClient) -> Self {
        Self {
            client,
            cases: Vec::new(),
            total: 0,
            tracker: RequestTracker::new(),
        }
    }

    pub async fn load(&mut self, skip: usize, limit: usize) -> Option<&[Case]> {
        let ticket = self.tracker.begin();
        let result = self.client.list_cases(skip, limit).await;
        let response = self.tracker.complete(ticket, result)?;
        self.cases = response.cases;
        self.total = response.total;
        Some(&self.cases)
    }

    /// Fetch one case.
    pub async fn get(&mut self, case_id: &str) -> Option<Case> {
        let ticket = self.tracker.begin();
        let result = self.client.get_case(case_id).await;
        self.tracker.complete(ticket, result)
    }

    #[must_use]
    pub fn cases(&self) -> &[Case] {
        &self.cases
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    #[must_use]
    pub fn error(&self) -> Option<&ApiError> {
        self.tracker.error()
    }

    pub fn take_error(&mut self) -> Option<ApiError> {
        self.tracker.take_error()
    }
}

// =============================================================================
// DOCUMENTS
// =============================================================================

/// Paged document listing of one case.
///
/// Pages are appended by [`load_more`](Self::load_more) until `total` is
/// reached; changing the filter starts over.
#[derive(Debug)]
pub struct DocumentFeed {
    client: DetectiveClient,
    case_id: String,
    doc_type: Option<DocType>,
    limit: usize,
    documents: Vec<Document>,
    total: usize,
    offset: usize,
    list: RequestTracker<ApiError>,
    detail: RequestTracker<ApiError>,
}

impl DocumentFeed {
    #[must_use]
    pub fn new(client: DetectiveClient, case_id: impl Into<String>, limit: usize) -> Self {
        Self {
            client,
            case_id: case_id.into(),
            doc_type: None,
            limit: limit.max(1),
            documents: Vec::new(),
            total: 0,
            offset: 0,
            list: RequestTracker::new(),
            detail: RequestTracker::new(),
        }
    }

    /// Restrict the listing to one document type and reload from the start.
    pub async fn set_filter(&mut self, doc_type: Option<DocType>) -> Option<&[Document]> {
        self.doc_type = doc_type;
        self.refresh().await
    }

    /// Reload the first page.
    pub async fn refresh(&mut self) -> Option<&[Document]> {
        self.documents.clear();
        self.offset = 0;
        self.total = 0;
        self.fetch(0, false).await
    }

    /// Append the next page. No-op once everything is loaded.
    pub async fn load_more(&mut self) -> Option<&[Document]> {
        if !self.has_more() || self.list.is_loading() {
            return None;
        }
        self.fetch(self.offset, true).await
    }

    async fn fetch(&mut self, skip: usize, append: bool) -> Option<&[Document]> {
        let page = DocumentQuery {
            skip,
            limit: self.limit,
            doc_type: self.doc_type,
        };
        let ticket = self.list.begin();
        let result = self.client.list_documents(&self.case_id, page).await;
        let response = self.list.complete(ticket, result)?;

        self.offset = skip + response.documents.len();
        self.total = response.total;
        if append {
            self.documents.extend(response.documents);
        } else {
            self.documents = response.documents;
        }
        Some(&self.documents)
    }

    /// Fetch one document with its chunks.
    pub async fn open(&mut self, doc_id: &str) -> Option<DocumentWithChunks> {
        let ticket = self.detail.begin();
        let result = self.client.get_document(&self.case_id, doc_id).await;
        self.detail.complete(ticket, result)
    }

    #[must_use]
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    #[must_use]
    pub fn has_more(&self) -> bool {
        self.offset < self.total
    }

    #[must_use]
    pub fn error(&self) -> Option<&ApiError> {
        self.list.error().or_else(|| self.detail.error())
    }

    pub fn take_error(&mut self) -> Option<ApiError> {
        self.list.take_error().or_else(|| self.detail.take_error())
    }
}

// =============================================================================
// ENTITIES
// =============================================================================

/// Entities of one case, optionally filtered by type.
#[derive(Debug)]
pub struct EntityIndex {
    client: DetectiveClient,
    case_id: String,
    limit: usize,
    entities: Vec<Entity>,
    tracker: RequestTracker<ApiError>,
}

impl EntityIndex {
    #[must_use]
    pub fn new(client: DetectiveClient, case_id: impl Into<String>, limit: usize) -> Self {
        Self {
            client,
            case_id: case_id.into(),
            limit: limit.max(1),
            entities: Vec::new(),
            tracker: RequestTracker::new(),
        }
    }

    pub async fn load(&mut self, entity_type: Option<EntityType>) -> Option<&[Entity]> {
        let ticket = self.tracker.begin();
        let result = self
            .client
            .list_entities(&self.case_id, entity_type, self.limit)
            .await;
        let response = self.tracker.complete(ticket, result)?;
        self.entities = response.entities;
        Some(&self.entities)
    }

    /// Cached entity, or fetch it from the backend.
    pub async fn get(&mut self, entity_id: &str) -> Option<Entity> {
        if let Some(entity) = self.entities.iter().find(|e| e.entity_id == entity_id) {
            return Some(entity.clone());
        }
        let ticket = self.tracker.begin();
        let result = self.client.get_entity(&self.case_id, entity_id).await;
        self.tracker.complete(ticket, result)
    }

    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    #[must_use]
    pub fn error(&self) -> Option<&ApiError> {
        self.tracker.error()
    }

    pub fn take_error(&mut self) -> Option<ApiError> {
        self.tracker.take_error()
    }
}

// =============================================================================
// SEARCH
// =============================================================================

/// Semantic search over the chunks of one case.
#[derive(Debug)]
pub struct SearchSession {
    client: DetectiveClient,
    case_id: String,
    query: String,
    results: Vec<SearchResult>,
    total: usize,
    tracker: RequestTracker<ApiError>,
}

impl SearchSession {
    /// Results returned when the caller does not choose `k`.
    pub const DEFAULT_K: u32 = 10;

    #[must_use]
    pub fn new(client: DetectiveClient, case_id: impl Into<String>) -> Self {
        Self {
            client,
            case_id: case_id.into(),
            query: String::new(),
            results: Vec::new(),
            total: 0,
            tracker: RequestTracker::new(),
        }
    }

    /// Run a search. A blank query clears the results without a request.
    pub async fn search(&mut self, mut request: SearchRequest) -> Option<&[SearchResult]> {
        if request.query.trim().is_empty() {
            self.clear();
            return Some(&self.results);
        }
        request.k = request.k.or(Some(Self::DEFAULT_K));
        request.doc_types = request.doc_types.filter(|types| !types.is_empty());

        let ticket = self.tracker.begin();
        let result = self.client.search(&self.case_id, &request).await;
        match self.tracker.complete(ticket, result) {
            Some(response) => {
                self.query = response.query;
                self.total = response.total;
                self.results = response.results;
                Some(&self.results)
            }
            None => {
                self.results.clear();
                None
            }
        }
    }

    pub fn clear(&mut self) {
        self.tracker.invalidate();
        self.tracker.clear_error();
        self.query.clear();
        self.results.clear();
        self.total = 0;
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    #[must_use]
    pub fn error(&self) -> Option<&ApiError> {
        self.tracker.error()
    }

    pub fn take_error(&mut self) -> Option<ApiError> {
        self.tracker.take_error()
    }
}
