//! # Board Controller
//!
//! Drives the evidence board from backend graph queries.
//!
//! Each query kind has its own [`RequestTracker`]; a failed query records
//! its error there, returns `None` and leaves the board untouched.

use crate::api::{ApiError, DetectiveClient, GraphStats, PathRequest, SyncResponse};
use detective_core::primitives::DEFAULT_NEIGHBOR_DEPTH;
use detective_core::{
    BoardChange, BoardDraft, EvidenceBoard, GameStore, PathResponse, RequestTracker,
};

/// The graph queries issued by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphRequest {
    Sync,
    Hubs,
    Neighbors,
    Path,
    Stats,
}

/// Board session bound to one case and one client.
#[derive(Debug)]
pub struct BoardController {
    client: DetectiveClient,
    case_id: String,
    board: EvidenceBoard,
    sync: RequestTracker<ApiError>,
    hubs: RequestTracker<ApiError>,
    neighbors: RequestTracker<ApiError>,
    path: RequestTracker<ApiError>,
    stats: RequestTracker<ApiError>,
}

impl BoardController {
    /// Take over `board`. A board of another case is replaced by an empty one.
    #[must_use]
    pub fn new(client: DetectiveClient, case_id: impl Into<String>, board: EvidenceBoard) -> Self {
        let case_id = case_id.into();
        let board = if board.case_id() == Some(case_id.as_str()) {
            board
        } else {
            EvidenceBoard::for_case(case_id.clone())
        };
        Self {
            client,
            case_id,
            board,
            sync: RequestTracker::new(),
            hubs: RequestTracker::new(),
            neighbors: RequestTracker::new(),
            path: RequestTracker::new(),
            stats: RequestTracker::new(),
        }
    }

    #[must_use]
    pub fn case_id(&self) -> &str {
        &self.case_id
    }

    #[must_use]
    pub fn board(&self) -> &EvidenceBoard {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut EvidenceBoard {
        &mut self.board
    }

    #[must_use]
    pub fn into_board(self) -> EvidenceBoard {
        self.board
    }

    #[must_use]
    pub fn tracker(&self, request: GraphRequest) -> &RequestTracker<ApiError> {
        match request {
            GraphRequest::Sync => &self.sync,
            GraphRequest::Hubs => &self.hubs,
            GraphRequest::Neighbors => &self.neighbors,
            GraphRequest::Path => &self.path,
            GraphRequest::Stats => &self.stats,
        }
    }

    /// Hand out the recorded error of one query kind.
    pub fn take_error(&mut self, request: GraphRequest) -> Option<ApiError> {
        match request {
            GraphRequest::Sync => self.sync.take_error(),
            GraphRequest::Hubs => self.hubs.take_error(),
            GraphRequest::Neighbors => self.neighbors.take_error(),
            GraphRequest::Path => self.path.take_error(),
            GraphRequest::Stats => self.stats.take_error(),
        }
    }

    /// Ask the backend to (re)build the case graph.
    pub async fn sync_graph(&mut self) -> Option<SyncResponse> {
        let ticket = self.sync.begin();
        let result = self.client.sync_graph(&self.case_id).await;
        let response = self.sync.complete(ticket, result)?;
        tracing::info!(
            nodes = response.nodes_created,
            relationships = response.relationships_created,
            "graph synced"
        );
        Some(response)
    }

    /// Place the `limit` best connected entities on the board.
    pub async fn load_hubs(&mut self, limit: u32) -> Option<BoardChange> {
        let ticket = self.hubs.begin();
        let result = self.client.hubs(&self.case_id, limit).await;
        let response = self.hubs.complete(ticket, result)?;
        Some(self.board.apply_hubs(&response))
    }

    /// Add the neighbors of an entity.
    ///
    /// An entity already expanded in this board session is not fetched
    /// again; the call reports an empty change.
    pub async fn expand(&mut self, entity_id: &str) -> Option<BoardChange> {
        if !self.board.needs_expansion(entity_id) {
            tracing::debug!(entity_id, "already expanded");
            return Some(BoardChange::default());
        }

        let ticket = self.neighbors.begin();
        let result = self
            .client
            .neighbors(&self.case_id, entity_id, DEFAULT_NEIGHBOR_DEPTH)
            .await;
        let response = self.neighbors.complete(ticket, result)?;
        Some(self.board.apply_neighbors(&response))
    }

    /// Find the shortest path between two entities and draw it.
    pub async fn find_path(
        &mut self,
        from: &str,
        to: &str,
        max_depth: Option<u32>,
    ) -> Option<PathResponse> {
        let request = PathRequest::new(from, to, max_depth);
        let ticket = self.path.begin();
        let result = self.client.find_path(&self.case_id, &request).await;
        let response = self.path.complete(ticket, result)?;
        self.board.apply_path(&response);
        Some(response)
    }

    pub async fn stats(&mut self) -> Option<GraphStats> {
        let ticket = self.stats.begin();
        let result = self.client.graph_stats(&self.case_id).await;
        self.stats.complete(ticket, result)
    }
}

/// Register board nodes the store does not know yet, keeping their position.
///
/// Board-only nodes (hubs, neighbors, search matches) become store board
/// items so the store's board selectors see them. Returns how many were added.
pub fn mirror_board_into_store(board: &EvidenceBoard, store: &mut GameStore) -> usize {
    let Some(case_id) = store.current_case_id().map(str::to_string) else {
        return 0;
    };

    let mut added = 0;
    for node in board.nodes() {
        if store.is_on_board(&node.id) {
            continue;
        }
        let mut draft = BoardDraft::new(node.id.clone(), node.kind, case_id.clone(), node.label.clone());
        draft.data = node.data.clone();
        if store.add_to_board(draft) {
            store.update_board_position(node.id.clone(), node.position);
            added += 1;
        }
    }
    added
}

/// Copy board positions onto matching store items (after a layout change).
pub fn sync_positions_into_store(board: &EvidenceBoard, store: &mut GameStore) {
    for node in board.nodes() {
        store.update_board_position(node.id.clone(), node.position);
    }
}
