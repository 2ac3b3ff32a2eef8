//! # Game Store
//!
//! Per-case investigation state and the reducer that mutates it.
//!
//! `GameState` is plain data: opened documents, pinned evidence, suspected
//! entities, board items and the hint counter, all scoped to
//! `current_case_id`. `GameStore` owns the state and is the only way to
//! change it: every mutation is a `GameAction` applied through
//! [`GameStore::dispatch`].
//!
//! ## Guarantees
//!
//! - Mutations are total: they never fail and never panic
//! - At most one pinned item and one board item per id
//! - Switching the active case empties every per-case collection
//! - Pinning a document or entity mirrors it onto the board; chunks stay
//!   off the board
//!
//! ## Persistence
//!
//! A store built with [`GameStore::with_storage`] restores its snapshot from
//! `GAME_STATE_KEY` and writes it back after every state-changing dispatch.
//! Both directions are best-effort; failures are logged, never surfaced.

use crate::formats::{persist_state, restore_or_default};
use crate::layout::{pin_grid_position, random_position};
use crate::primitives::GAME_STATE_KEY;
use crate::storage::SharedStorage;
use crate::{BoardDraft, BoardItem, BoardKind, PinnedItem, Position};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// STATE
// =============================================================================

/// Snapshot of the investigation for the active case.
///
/// Fields are private; read them through the accessors and change them
/// through [`GameStore::dispatch`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameState {
    current_case_id: Option<String>,
    opened_docs: BTreeSet<String>,
    pinned_items: Vec<PinnedItem>,
    suspected_entities: BTreeSet<String>,
    board_items: Vec<BoardItem>,
    hints_used: u32,
}

impl GameState {
    #[must_use]
    pub fn current_case_id(&self) -> Option<&str> {
        self.current_case_id.as_deref()
    }

    #[must_use]
    pub fn opened_docs(&self) -> &BTreeSet<String> {
        &self.opened_docs
    }

    #[must_use]
    pub fn pinned_items(&self) -> &[PinnedItem] {
        &self.pinned_items
    }

    #[must_use]
    pub fn suspected_entities(&self) -> &BTreeSet<String> {
        &self.suspected_entities
    }

    #[must_use]
    pub fn board_items(&self) -> &[BoardItem] {
        &self.board_items
    }

    #[must_use]
    pub fn hints_used(&self) -> u32 {
        self.hints_used
    }

    /// True when no per-case collection holds anything.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.opened_docs.is_empty()
            && self.pinned_items.is_empty()
            && self.suspected_entities.is_empty()
            && self.board_items.is_empty()
            && self.hints_used == 0
    }

    fn clear_case_data(&mut self) {
        self.opened_docs.clear();
        self.pinned_items.clear();
        self.suspected_entities.clear();
        self.board_items.clear();
        self.hints_used = 0;
    }

    /// Apply one action. Returns whether the state changed.
    fn apply<R: Rng + ?Sized>(&mut self, action: GameAction, rng: &mut R) -> bool {
        match action {
            GameAction::SetCurrentCase(case_id) => {
                if self.current_case_id.as_deref() == Some(case_id.as_str()) {
                    return false;
                }
                self.clear_case_data();
                self.current_case_id = Some(case_id);
                true
            }
            GameAction::OpenDoc(doc_id) => self.opened_docs.insert(doc_id),
            GameAction::PinItem(item) => self.pin(item),
            GameAction::UnpinItem(item_id) => {
                let pins_before = self.pinned_items.len();
                let board_before = self.board_items.len();
                let document_id = BoardKind::Document.node_id(&item_id);
                let entity_id = BoardKind::Entity.node_id(&item_id);

                self.pinned_items.retain(|p| p.id != item_id);
                self.board_items
                    .retain(|b| b.id != document_id && b.id != entity_id);

                pins_before != self.pinned_items.len() || board_before != self.board_items.len()
            }
            GameAction::ToggleSuspect(entity_id) => {
                if !self.suspected_entities.remove(&entity_id) {
                    self.suspected_entities.insert(entity_id);
                }
                true
            }
            GameAction::AddToBoard(draft) => {
                if self.board_items.iter().any(|b| b.id == draft.id) {
                    return false;
                }
                let position = random_position(rng);
                self.board_items.push(draft.place(position));
                true
            }
            GameAction::RemoveFromBoard(id) => {
                let before = self.board_items.len();
                self.board_items.retain(|b| b.id != id);
                before != self.board_items.len()
            }
            GameAction::UpdateBoardPosition { id, position } => {
                if !position.is_finite() {
                    return false;
                }
                match self.board_items.iter_mut().find(|b| b.id == id) {
                    Some(item) if item.position != position => {
                        item.position = position;
                        true
                    }
                    _ => false,
                }
            }
            GameAction::ClearBoard => {
                let changed = !self.board_items.is_empty();
                self.board_items.clear();
                changed
            }
            GameAction::UseHint => {
                self.hints_used = self.hints_used.saturating_add(1);
                true
            }
            GameAction::ResetCase => {
                let changed = !self.is_blank();
                self.clear_case_data();
                changed
            }
        }
    }

    fn pin(&mut self, item: PinnedItem) -> bool {
        if self.pinned_items.iter().any(|p| p.id == item.id) {
            return false;
        }

        if let Some(kind) = item.kind.board_kind() {
            let board_id = kind.node_id(&item.id);
            if !self.board_items.iter().any(|b| b.id == board_id) {
                let position = pin_grid_position(&self.board_items, kind);
                self.board_items.push(BoardItem {
                    id: board_id,
                    kind,
                    case_id: item.case_id.clone(),
                    label: item.label.clone(),
                    position,
                    data: item.data.clone(),
                });
            }
        }

        self.pinned_items.push(item);
        true
    }
}

// =============================================================================
// ACTIONS
// =============================================================================

/// Every mutation the store accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum GameAction {
    SetCurrentCase(String),
    OpenDoc(String),
    PinItem(PinnedItem),
    UnpinItem(String),
    ToggleSuspect(String),
    AddToBoard(BoardDraft),
    RemoveFromBoard(String),
    UpdateBoardPosition { id: String, position: Position },
    ClearBoard,
    UseHint,
    ResetCase,
}

impl GameAction {
    fn name(&self) -> &'static str {
        match self {
            Self::SetCurrentCase(_) => "set_current_case",
            Self::OpenDoc(_) => "open_doc",
            Self::PinItem(_) => "pin_item",
            Self::UnpinItem(_) => "unpin_item",
            Self::ToggleSuspect(_) => "toggle_suspect",
            Self::AddToBoard(_) => "add_to_board",
            Self::RemoveFromBoard(_) => "remove_from_board",
            Self::UpdateBoardPosition { .. } => "update_board_position",
            Self::ClearBoard => "clear_board",
            Self::UseHint => "use_hint",
            Self::ResetCase => "reset_case",
        }
    }
}

// =============================================================================
// STORE
// =============================================================================

/// Sole mutable owner of the investigation state.
pub struct GameStore {
    state: GameState,
    rng: StdRng,
    storage: Option<SharedStorage>,
}

impl std::fmt::Debug for GameStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameStore")
            .field("state", &self.state)
            .field("persistent", &self.storage.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for GameStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStore {
    /// Create an empty, volatile store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: GameState::default(),
            rng: StdRng::from_os_rng(),
            storage: None,
        }
    }

    /// Create an empty, volatile store with deterministic random placement.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            state: GameState::default(),
            rng: StdRng::seed_from_u64(seed),
            storage: None,
        }
    }

    /// Create a store backed by `storage`, restoring any persisted snapshot.
    ///
    /// An unreadable snapshot is discarded and the store starts empty.
    #[must_use]
    pub fn with_storage(storage: SharedStorage) -> Self {
        let state: GameState = restore_or_default(storage.as_ref(), GAME_STATE_KEY);
        tracing::debug!(
            case = ?state.current_case_id(),
            pins = state.pinned_items().len(),
            "restored game state"
        );
        Self {
            state,
            rng: StdRng::from_os_rng(),
            storage: Some(storage),
        }
    }

    /// Replace the placement RNG (tests use a seeded one).
    #[must_use]
    pub fn seeded(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Read-only view of the state.
    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Apply an action. Returns whether the state changed.
    ///
    /// Changed state is written to storage before returning.
    pub fn dispatch(&mut self, action: GameAction) -> bool {
        let name = action.name();
        let changed = self.state.apply(action, &mut self.rng);
        tracing::debug!(action = name, changed, "dispatch");
        if changed {
            self.persist();
        }
        changed
    }

    fn persist(&self) {
        let Some(storage) = &self.storage else {
            return;
        };
        if let Err(e) = persist_state(storage.as_ref(), GAME_STATE_KEY, &self.state) {
            tracing::warn!(error = %e, "failed to persist game state");
        }
    }

    // =========================================================================
    // ACTIONS
    // =========================================================================

    /// Switch the active case. A different case empties every collection.
    pub fn set_current_case(&mut self, case_id: impl Into<String>) -> bool {
        self.dispatch(GameAction::SetCurrentCase(case_id.into()))
    }

    /// Mark a document as read.
    pub fn open_doc(&mut self, doc_id: impl Into<String>) -> bool {
        self.dispatch(GameAction::OpenDoc(doc_id.into()))
    }

    /// Pin evidence; documents and entities are mirrored onto the board.
    pub fn pin_item(&mut self, item: PinnedItem) -> bool {
        self.dispatch(GameAction::PinItem(item))
    }

    /// Unpin evidence and drop its board mirror.
    pub fn unpin_item(&mut self, item_id: impl Into<String>) -> bool {
        self.dispatch(GameAction::UnpinItem(item_id.into()))
    }

    /// Flip whether an entity is suspected.
    pub fn toggle_suspect(&mut self, entity_id: impl Into<String>) -> bool {
        self.dispatch(GameAction::ToggleSuspect(entity_id.into()))
    }

    /// Place a board-only item at a random position.
    pub fn add_to_board(&mut self, draft: BoardDraft) -> bool {
        self.dispatch(GameAction::AddToBoard(draft))
    }

    pub fn remove_from_board(&mut self, id: impl Into<String>) -> bool {
        self.dispatch(GameAction::RemoveFromBoard(id.into()))
    }

    pub fn update_board_position(&mut self, id: impl Into<String>, position: Position) -> bool {
        self.dispatch(GameAction::UpdateBoardPosition {
            id: id.into(),
            position,
        })
    }

    /// Empty the board; pins and suspects are untouched.
    pub fn clear_board(&mut self) -> bool {
        self.dispatch(GameAction::ClearBoard)
    }

    pub fn use_hint(&mut self) -> bool {
        self.dispatch(GameAction::UseHint)
    }

    /// Empty every per-case collection, keeping the active case.
    pub fn reset_case(&mut self) -> bool {
        self.dispatch(GameAction::ResetCase)
    }

    // =========================================================================
    // SELECTORS
    // =========================================================================

    #[must_use]
    pub fn current_case_id(&self) -> Option<&str> {
        self.state.current_case_id()
    }

    #[must_use]
    pub fn is_pinned(&self, item_id: &str) -> bool {
        self.state.pinned_items.iter().any(|p| p.id == item_id)
    }

    #[must_use]
    pub fn is_suspected(&self, entity_id: &str) -> bool {
        self.state.suspected_entities.contains(entity_id)
    }

    #[must_use]
    pub fn is_on_board(&self, board_id: &str) -> bool {
        self.state.board_items.iter().any(|b| b.id == board_id)
    }

    #[must_use]
    pub fn is_opened(&self, doc_id: &str) -> bool {
        self.state.opened_docs.contains(doc_id)
    }

    #[must_use]
    pub fn pinned_items(&self) -> &[PinnedItem] {
        self.state.pinned_items()
    }

    #[must_use]
    pub fn board_items(&self) -> &[BoardItem] {
        self.state.board_items()
    }

    #[must_use]
    pub fn suspected_entities(&self) -> &BTreeSet<String> {
        self.state.suspected_entities()
    }

    #[must_use]
    pub fn opened_docs(&self) -> &BTreeSet<String> {
        self.state.opened_docs()
    }

    #[must_use]
    pub fn hints_used(&self) -> u32 {
        self.state.hints_used()
    }
}

// =============================================================================
// TESTS
// =============================================================================
