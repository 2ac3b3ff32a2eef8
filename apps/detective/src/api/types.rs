//! # API Request/Response Types
//!
//! JSON structures exchanged with the backend REST API. Graph records and
//! the entity/document models live in `detective-core`; this module holds
//! the rest of the wire contract.

use detective_core::primitives::{DEFAULT_PATH_DEPTH, MAX_PATH_DEPTH};
use detective_core::{DocType, Document, Entity, JsonMap};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// AUTH
// =============================================================================

/// UI language of a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Es,
}

impl Language {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Es => "es",
        }
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" => Ok(Self::En),
            "es" => Ok(Self::Es),
            other => Err(format!("unsupported language '{other}' (expected en or es)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub preferred_language: Language,
    pub created_at: String,
}

/// `POST /api/auth/login` and `/register` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_language: Option<Language>,
}

/// `PATCH /api/auth/me` body. Absent fields stay unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_language: Option<Language>,
}

// =============================================================================
// CASES, DOCUMENTS, ENTITIES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub case_id: String,
    pub title: String,
    pub scenario_type: String,
    pub difficulty: u8,
    #[serde(default)]
    pub seed: i64,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub document_count: usize,
    #[serde(default)]
    pub entity_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseListResponse {
    pub cases: Vec<Case>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentListResponse {
    pub documents: Vec<Document>,
    pub total: usize,
}

/// A retrieval chunk of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocChunk {
    pub chunk_id: String,
    pub doc_id: String,
    pub case_id: String,
    pub chunk_index: u32,
    pub text: String,
    #[serde(default)]
    pub meta_json: JsonMap,
}

/// `GET .../documents/{doc_id}/full` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentWithChunks {
    #[serde(flatten)]
    pub document: Document,
    #[serde(default)]
    pub chunks: Vec<DocChunk>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityListResponse {
    pub entities: Vec<Entity>,
    pub total: usize,
}

// =============================================================================
// SEARCH
// =============================================================================

/// `POST .../search` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_types: Option<Vec<DocType>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f64>,
}

impl SearchRequest {
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            k: None,
            doc_types: None,
            min_score: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub chunk_id: String,
    pub doc_id: String,
    pub text: String,
    pub score: f64,
    pub chunk_index: u32,
    pub doc_type: DocType,
    #[serde(default)]
    pub subject: Option<String>,
    pub ts: String,
    #[serde(default)]
    pub meta_json: JsonMap,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub query: String,
    pub total: usize,
}

// =============================================================================
// CHAT
// =============================================================================

/// Evidence quoted by the assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub doc_id: String,
    #[serde(default)]
    pub chunk_id: Option<String>,
    pub quote: String,
    pub relevance: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub message: String,
    #[serde(default)]
    pub citations: Vec<Citation>,
    pub conversation_id: String,
    #[serde(default)]
    pub suggested_actions: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HintRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HintResponse {
    pub hint: String,
    pub hints_remaining: u32,
    #[serde(default)]
    pub related_docs: Vec<String>,
}

// =============================================================================
// GRAPH
// =============================================================================

/// `POST .../graph/path` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathRequest {
    pub from_entity_id: String,
    pub to_entity_id: String,
    pub max_depth: u32,
}

impl PathRequest {
    /// Build a request, clamping the depth to what the backend accepts.
    #[must_use]
    pub fn new(from: impl Into<String>, to: impl Into<String>, max_depth: Option<u32>) -> Self {
        Self {
            from_entity_id: from.into(),
            to_entity_id: to.into(),
            max_depth: max_depth
                .unwrap_or(DEFAULT_PATH_DEPTH)
                .clamp(1, MAX_PATH_DEPTH),
        }
    }
}

/// `POST .../graph/sync` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncResponse {
    pub case_id: String,
    pub nodes_created: u64,
    pub relationships_created: u64,
    #[serde(default)]
    pub status: String,
}

/// `GET .../graph/stats` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphStats {
    pub case_id: String,
    pub total_nodes: u64,
    pub total_edges: u64,
    #[serde(default)]
    pub node_types: BTreeMap<String, u64>,
    #[serde(default)]
    pub relationship_types: BTreeMap<String, u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_fields_are_omitted() {
        let json = serde_json::to_value(SearchRequest::new("wire transfer")).expect("serialize");
        assert_eq!(json, serde_json::json!({"query": "wire transfer"}));

        let json = serde_json::to_value(UserUpdate::default()).expect("serialize");
        assert_eq!(json, serde_json::json!({}));
    }

    #[test]
    fn path_depth_is_clamped() {
        assert_eq!(PathRequest::new("a", "b", None).max_depth, 6);
        assert_eq!(PathRequest::new("a", "b", Some(0)).max_depth, 1);
        assert_eq!(PathRequest::new("a", "b", Some(50)).max_depth, 10);
    }

    #[test]
    fn full_document_flattens() {
        let json = serde_json::json!({
            "doc_id": "d1",
            "case_id": "c1",
            "doc_type": "email",
            "ts": "2024-03-01T09:00:00",
            "author_entity_id": null,
            "subject": "Re: invoice",
            "body": "Please approve.",
            "metadata_json": {},
            "chunks": [{
                "chunk_id": "k1",
                "doc_id": "d1",
                "case_id": "c1",
                "chunk_index": 0,
                "text": "Please approve."
            }]
        });
        let doc: DocumentWithChunks = serde_json::from_value(json).expect("deserialize");
        assert_eq!(doc.document.title(), "Re: invoice");
        assert_eq!(doc.chunks.len(), 1);
    }

    #[test]
    fn language_parses() {
        assert_eq!("es".parse::<Language>(), Ok(Language::Es));
        assert!("fr".parse::<Language>().is_err());
    }
}
