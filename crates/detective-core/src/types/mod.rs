//! # Core Type Definitions
//!
//! This module contains the data model shared by the store, the board and the
//! app layer:
//! - Evidence records owned by the store (`PinnedItem`, `BoardItem`)
//! - Board geometry (`Position`, `BoardKind`)
//! - Read-only records fetched from the backend (`Entity`, `Document`,
//!   `GraphNode`, `GraphEdge`, `Hub`, ...)
//! - Error types (`DetectiveError`)
//!
//! ## Wire Compatibility
//!
//! Store records keep the camelCase field names of the persisted browser
//! state (`caseId`, `type`). Backend records keep the snake_case names of the
//! REST API.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Free-form JSON object attached to records (`data`, `attrs_json`, ...).
pub type JsonMap = serde_json::Map<String, serde_json::Value>;

// =============================================================================
// ITEM KINDS
// =============================================================================

/// What a pinned item refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Document,
    Entity,
    Chunk,
}

impl ItemKind {
    /// The board node kind mirrored by a pin of this kind.
    ///
    /// Chunks are never placed on the board.
    #[must_use]
    pub const fn board_kind(self) -> Option<BoardKind> {
        match self {
            Self::Document => Some(BoardKind::Document),
            Self::Entity => Some(BoardKind::Entity),
            Self::Chunk => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Entity => "entity",
            Self::Chunk => "chunk",
        }
    }
}

impl std::str::FromStr for ItemKind {
    type Err = DetectiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "document" | "doc" => Ok(Self::Document),
            "entity" => Ok(Self::Entity),
            "chunk" => Ok(Self::Chunk),
            other => Err(DetectiveError::InvalidInput(format!(
                "unknown item kind '{other}' (expected document, entity or chunk)"
            ))),
        }
    }
}

/// Kind of a node on the investigation board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardKind {
    Entity,
    Document,
}

impl BoardKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Entity => "entity",
            Self::Document => "document",
        }
    }

    /// Derive the board id for a raw record id: `entity-<id>` / `document-<id>`.
    #[must_use]
    pub fn node_id(self, raw_id: &str) -> String {
        format!("{}-{}", self.as_str(), raw_id)
    }
}

// =============================================================================
// POSITION
// =============================================================================

/// A point on the board canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Both coordinates are finite. JSON has no encoding for `NaN` or
    /// infinity, so only finite positions may be stored.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

// =============================================================================
// STORE RECORDS
// =============================================================================

/// Evidence a player has flagged as relevant.
///
/// Unique by `id` within a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinnedItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub case_id: String,
    pub label: String,
    #[serde(default)]
    pub data: JsonMap,
}

impl PinnedItem {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        kind: ItemKind,
        case_id: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            case_id: case_id.into(),
            label: label.into(),
            data: JsonMap::new(),
        }
    }

    /// Attach a data payload.
    #[must_use]
    pub fn with_data(mut self, data: JsonMap) -> Self {
        self.data = data;
        self
    }

    /// Board id this pin is mirrored to, if any.
    #[must_use]
    pub fn board_id(&self) -> Option<String> {
        self.kind.board_kind().map(|kind| kind.node_id(&self.id))
    }
}

/// A node placed on the investigation board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: BoardKind,
    pub case_id: String,
    pub label: String,
    pub position: Position,
    #[serde(default)]
    pub data: JsonMap,
}

/// A board item that has not been placed yet.
///
/// `addToBoard` computes the position itself.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardDraft {
    pub id: String,
    pub kind: BoardKind,
    pub case_id: String,
    pub label: String,
    pub data: JsonMap,
}

impl BoardDraft {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        kind: BoardKind,
        case_id: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            case_id: case_id.into(),
            label: label.into(),
            data: JsonMap::new(),
        }
    }

    /// Place the draft at a position.
    #[must_use]
    pub fn place(self, position: Position) -> BoardItem {
        BoardItem {
            id: self.id,
            kind: self.kind,
            case_id: self.case_id,
            label: self.label,
            position,
            data: self.data,
        }
    }
}

// =============================================================================
// BACKEND RECORDS (read-only)
// =============================================================================

/// Entity categories extracted from case documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Person,
    Org,
    Account,
    Sku,
    Ip,
    Location,
    Order,
    Ticket,
    #[serde(other)]
    Other,
}

impl EntityType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Org => "org",
            Self::Account => "account",
            Self::Sku => "sku",
            Self::Ip => "ip",
            Self::Location => "location",
            Self::Order => "order",
            Self::Ticket => "ticket",
            Self::Other => "other",
        }
    }
}

impl std::str::FromStr for EntityType {
    type Err = DetectiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "person" => Ok(Self::Person),
            "org" => Ok(Self::Org),
            "account" => Ok(Self::Account),
            "sku" => Ok(Self::Sku),
            "ip" => Ok(Self::Ip),
            "location" => Ok(Self::Location),
            "order" => Ok(Self::Order),
            "ticket" => Ok(Self::Ticket),
            other => Err(DetectiveError::InvalidInput(format!(
                "unknown entity type '{other}'"
            ))),
        }
    }
}

/// Document categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocType {
    Email,
    Chat,
    Ticket,
    Invoice,
    Csv,
    Note,
    Report,
    #[serde(other)]
    Other,
}

impl DocType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Chat => "chat",
            Self::Ticket => "ticket",
            Self::Invoice => "invoice",
            Self::Csv => "csv",
            Self::Note => "note",
            Self::Report => "report",
            Self::Other => "other",
        }
    }
}

impl std::str::FromStr for DocType {
    type Err = DetectiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(Self::Email),
            "chat" => Ok(Self::Chat),
            "ticket" => Ok(Self::Ticket),
            "invoice" => Ok(Self::Invoice),
            "csv" => Ok(Self::Csv),
            "note" => Ok(Self::Note),
            "report" => Ok(Self::Report),
            other => Err(DetectiveError::InvalidInput(format!(
                "unknown document type '{other}'"
            ))),
        }
    }
}

/// A person, organisation, account, ... extracted from case documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub entity_id: String,
    pub case_id: String,
    pub entity_type: EntityType,
    pub name: String,
    #[serde(default)]
    pub attrs_json: JsonMap,
}

impl Entity {
    /// Only people can be accused.
    #[must_use]
    pub fn is_person(&self) -> bool {
        self.entity_type == EntityType::Person
    }
}

/// A case document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub doc_id: String,
    pub case_id: String,
    pub doc_type: DocType,
    pub ts: String,
    #[serde(default)]
    pub author_entity_id: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    pub body: String,
    #[serde(default)]
    pub metadata_json: JsonMap,
}

impl Document {
    /// Subject line, or the document type when there is none.
    #[must_use]
    pub fn title(&self) -> String {
        self.subject
            .clone()
            .unwrap_or_else(|| format!("({})", self.doc_type.as_str()))
    }
}

/// A node returned by graph queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub entity_id: String,
    pub name: String,
    pub entity_type: EntityType,
    #[serde(default)]
    pub properties: JsonMap,
}

/// A relationship returned by graph queries. Never mutated locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source_id: String,
    pub target_id: String,
    pub relationship_type: String,
    #[serde(default)]
    pub properties: JsonMap,
}

/// A high-degree entity surfaced by graph analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hub {
    pub entity_id: String,
    pub name: String,
    pub entity_type: EntityType,
    pub degree: u64,
}

/// `GET /graph/hubs` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubsResponse {
    pub hubs: Vec<Hub>,
    pub total: usize,
}

/// `GET /graph/neighbors/{id}` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborsResponse {
    pub entity_id: String,
    pub neighbors: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub total: usize,
}

fn default_found() -> bool {
    true
}

/// `POST /graph/path` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathResponse {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub length: usize,
    #[serde(default = "default_found")]
    pub found: bool,
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors raised by the fallible edges of the core.
///
/// Store mutations themselves never fail; these come from persistence,
/// storage backends and input parsing.
#[derive(Debug, Error)]
pub enum DetectiveError {
    /// State could not be encoded.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Persisted bytes could not be decoded.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// Persisted envelope carries a version this build cannot read.
    #[error("Unsupported state version: {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    /// Persisted payload exceeds the restore limit.
    #[error("Payload size {size} bytes exceeds maximum allowed {max} bytes")]
    PayloadTooLarge { size: usize, max: usize },

    /// The storage backend failed.
    #[error("Storage error: {0}")]
    StorageError(String),

    /// User input could not be interpreted.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A submission draft broke one or more rules.
    #[error("Invalid submission: {0}")]
    InvalidSubmission(String),
}

// =============================================================================
// TESTS
// =============================================================================
