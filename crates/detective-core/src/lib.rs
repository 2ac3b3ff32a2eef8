//! # detective-core
//!
//! Client-side investigation state for Office Detective.
//!
//! This crate holds everything the game client decides locally:
//! - `store`: per-case evidence state (opened documents, pins, suspects,
//!   board items, hints) behind a reducer
//! - `board`: the node/edge board reconciling pins, search and backend
//!   graph responses
//! - `layout` / `palette`: board geometry and colors
//! - `formats` / `storage`: versioned JSON snapshots in durable storage
//! - `generation`: stale-response guard for async fetches
//! - `submission`: draft validation for the final accusation
//!
//! ## Architectural Constraints
//!
//! - No async, no network dependencies (pure Rust)
//! - Store mutations are total; only persistence and parsing can fail
//! - Randomness only through an injected, seedable RNG

// =============================================================================
// MODULES
// =============================================================================

pub mod board;
pub mod formats;
pub mod generation;
pub mod layout;
pub mod palette;
pub mod primitives;
pub mod storage;
pub mod store;
pub mod submission;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    BoardDraft, BoardItem, BoardKind, DetectiveError, DocType, Document, Entity, EntityType,
    GraphEdge, GraphNode, Hub, HubsResponse, ItemKind, JsonMap, NeighborsResponse, PathResponse,
    PinnedItem, Position,
};

// =============================================================================
// RE-EXPORTS: Store & Board
// =============================================================================

pub use board::{BoardChange, BoardEdge, BoardNode, EvidenceBoard};
pub use generation::{Generation, RequestTracker};
pub use store::{GameAction, GameState, GameStore};
pub use submission::{SubmissionDraft, SubmissionIssue};

// =============================================================================
// RE-EXPORTS: Persistence
// =============================================================================

pub use formats::{PersistenceHeader, decode_state, encode_state, persist_state, restore_or_default};
pub use storage::{MemoryStorage, RedbStorage, SharedStorage, StateStorage};
