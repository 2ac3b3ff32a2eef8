//! # Evidence Board
//!
//! The node/edge graph shown on the investigation board.
//!
//! The board reconciles three sources of nodes:
//! - board items of the game store (pins and board-only additions),
//! - local entity search,
//! - backend graph queries (hubs, neighbor expansion, paths).
//!
//! ## Rules
//!
//! - Nodes are keyed by their derived id (`entity-<id>`, `document-<id>`);
//!   adding a present node is a no-op.
//! - Edges are keyed by `(source, relationship_type, target)` and only kept
//!   while both endpoints are on the board.
//! - An entity is expanded at most once per board session. `clear` resets
//!   the expanded set; removing a node forgets its expansion.
//! - Every response is applied as one batch: new nodes and edges are
//!   computed first, then committed together.

use crate::layout::{
    circle_positions, grid_positions, path_row_position, random_position, search_row_position,
};
use crate::palette::{edge_color, node_color};
use crate::primitives::{HUB_CENTER_X, HUB_CENTER_Y, HUB_RADIUS, NEIGHBOR_RADIUS, SEARCH_MATCH_LIMIT};
use crate::store::GameState;
use crate::{
    BoardKind, Document, Entity, GraphEdge, GraphNode, HubsResponse, JsonMap, NeighborsResponse,
    PathResponse, Position,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// NODES & EDGES
// =============================================================================

/// A node on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardNode {
    /// Derived id: `entity-<id>` or `document-<id>`.
    pub id: String,
    pub kind: BoardKind,
    pub label: String,
    pub position: Position,
    #[serde(default)]
    pub data: JsonMap,
}

impl BoardNode {
    fn new(kind: BoardKind, raw_id: &str, label: impl Into<String>, data: JsonMap) -> Self {
        Self {
            id: kind.node_id(raw_id),
            kind,
            label: label.into(),
            position: Position::default(),
            data,
        }
    }

    fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    /// Record id without the kind prefix.
    #[must_use]
    pub fn raw_id(&self) -> &str {
        self.id
            .strip_prefix(self.kind.as_str())
            .and_then(|rest| rest.strip_prefix('-'))
            .unwrap_or(&self.id)
    }

    #[must_use]
    pub fn color(&self) -> &'static str {
        node_color(self.kind)
    }

    fn matches(&self, id: &str) -> bool {
        matches_suffix(&self.id, id)
    }
}

/// A relationship drawn between two board nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub relationship_type: String,
    #[serde(default)]
    pub properties: JsonMap,
}

impl BoardEdge {
    fn from_graph(edge: &GraphEdge) -> Self {
        let source = BoardKind::Entity.node_id(&edge.source_id);
        let target = BoardKind::Entity.node_id(&edge.target_id);
        Self {
            id: format!("{source}-{}-{target}", edge.relationship_type),
            source,
            target,
            relationship_type: edge.relationship_type.clone(),
            properties: edge.properties.clone(),
        }
    }

    #[must_use]
    pub fn color(&self) -> &'static str {
        edge_color(&self.relationship_type)
    }

    fn same_relation(&self, other: &Self) -> bool {
        self.source == other.source
            && self.target == other.target
            && self.relationship_type == other.relationship_type
    }

    fn touches(&self, id: &str) -> bool {
        matches_suffix(&self.source, id) || matches_suffix(&self.target, id)
    }
}

/// `entity-e1` matches `entity-e1` and `e1`, never `e11`.
fn matches_suffix(derived: &str, id: &str) -> bool {
    derived == id
        || derived
            .strip_suffix(id)
            .is_some_and(|prefix| prefix.ends_with('-'))
}

/// What one batch added to the board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BoardChange {
    pub nodes_added: usize,
    pub edges_added: usize,
}

impl BoardChange {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes_added == 0 && self.edges_added == 0
    }
}

/// Pending additions, validated against the board before commit.
#[derive(Default)]
struct Batch {
    nodes: Vec<BoardNode>,
    edges: Vec<BoardEdge>,
}

impl Batch {
    fn has_node(&self, board: &EvidenceBoard, id: &str) -> bool {
        board.contains(id) || self.nodes.iter().any(|n| n.id == id)
    }

    fn push_node(&mut self, board: &EvidenceBoard, node: BoardNode) -> bool {
        if self.has_node(board, &node.id) {
            return false;
        }
        self.nodes.push(node);
        true
    }

    fn push_edge(&mut self, board: &EvidenceBoard, edge: BoardEdge) {
        let duplicate = board.edges.iter().any(|e| e.same_relation(&edge))
            || self.edges.iter().any(|e| e.same_relation(&edge));
        if !duplicate {
            self.edges.push(edge);
        }
    }
}

// =============================================================================
// BOARD
// =============================================================================

fn fresh_rng() -> StdRng {
    StdRng::from_os_rng()
}

/// Board session for one case.
#[derive(Serialize, Deserialize)]
pub struct EvidenceBoard {
    #[serde(default)]
    case_id: Option<String>,
    #[serde(default)]
    nodes: Vec<BoardNode>,
    #[serde(default)]
    edges: Vec<BoardEdge>,
    #[serde(default)]
    expanded: BTreeSet<String>,
    #[serde(skip, default = "fresh_rng")]
    rng: StdRng,
}

impl std::fmt::Debug for EvidenceBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvidenceBoard")
            .field("case_id", &self.case_id)
            .field("nodes", &self.nodes.len())
            .field("edges", &self.edges.len())
            .field("expanded", &self.expanded)
            .finish_non_exhaustive()
    }
}

impl Default for EvidenceBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl EvidenceBoard {
    /// Empty board not yet bound to a case.
    #[must_use]
    pub fn new() -> Self {
        Self {
            case_id: None,
            nodes: Vec::new(),
            edges: Vec::new(),
            expanded: BTreeSet::new(),
            rng: fresh_rng(),
        }
    }

    /// Empty board for `case_id`.
    #[must_use]
    pub fn for_case(case_id: impl Into<String>) -> Self {
        let mut board = Self::new();
        board.case_id = Some(case_id.into());
        board
    }

    /// Replace the placement RNG (tests use a seeded one).
    #[must_use]
    pub fn seeded(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    #[must_use]
    pub fn case_id(&self) -> Option<&str> {
        self.case_id.as_deref()
    }

    #[must_use]
    pub fn nodes(&self) -> &[BoardNode] {
        &self.nodes
    }

    #[must_use]
    pub fn edges(&self) -> &[BoardEdge] {
        &self.edges
    }

    #[must_use]
    pub fn node(&self, id: &str) -> Option<&BoardNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Whether a node with this derived id is on the board.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn is_expanded(&self, entity_id: &str) -> bool {
        self.expanded.contains(entity_id)
    }

    /// Whether the neighbors of `entity_id` still have to be fetched.
    #[must_use]
    pub fn needs_expansion(&self, entity_id: &str) -> bool {
        !self.is_expanded(entity_id)
    }

    #[must_use]
    pub fn expanded(&self) -> &BTreeSet<String> {
        &self.expanded
    }

    // =========================================================================
    // DIRECT ADDITIONS
    // =========================================================================

    /// Add an entity node; `None` places it at random.
    pub fn add_entity(&mut self, entity: &Entity, position: Option<Position>) -> bool {
        let node = BoardNode::new(
            BoardKind::Entity,
            &entity.entity_id,
            &entity.name,
            entity_data(entity),
        );
        self.add_node(node, position)
    }

    /// Add a document node; `None` places it at random.
    pub fn add_document(&mut self, document: &Document, position: Option<Position>) -> bool {
        let mut data = JsonMap::new();
        data.insert("doc_type".into(), document.doc_type.as_str().into());
        data.insert("ts".into(), document.ts.clone().into());
        let node = BoardNode::new(BoardKind::Document, &document.doc_id, document.title(), data);
        self.add_node(node, position)
    }

    /// Add a node returned by a graph query; `None` places it at random.
    pub fn add_graph_node(&mut self, node: &GraphNode, position: Option<Position>) -> bool {
        self.add_node(graph_node(node), position)
    }

    fn add_node(&mut self, node: BoardNode, position: Option<Position>) -> bool {
        if self.contains(&node.id) {
            return false;
        }
        let position = position.unwrap_or_else(|| random_position(&mut self.rng));
        self.nodes.push(node.at(position));
        true
    }

    /// Mirror the store's board items onto the board.
    ///
    /// A store bound to another case resets the board first. Present nodes
    /// keep their position.
    pub fn sync_from_store(&mut self, state: &GameState) -> BoardChange {
        if state.current_case_id() != self.case_id() {
            tracing::debug!(
                from = ?self.case_id,
                to = ?state.current_case_id(),
                "board follows case switch"
            );
            self.clear();
            self.case_id = state.current_case_id().map(str::to_string);
        }

        let mut batch = Batch::default();
        for item in state.board_items() {
            batch.push_node(
                self,
                BoardNode {
                    id: item.id.clone(),
                    kind: item.kind,
                    label: item.label.clone(),
                    position: item.position,
                    data: item.data.clone(),
                },
            );
        }
        self.commit(batch, "store")
    }

    // =========================================================================
    // BACKEND RESPONSES
    // =========================================================================

    /// Place hubs on a circle around the board centre.
    ///
    /// Slots follow the order of the response; hubs already on the board
    /// keep their position and leave their slot empty.
    pub fn apply_hubs(&mut self, response: &HubsResponse) -> BoardChange {
        let center = Position::new(HUB_CENTER_X, HUB_CENTER_Y);
        let slots = circle_positions(center, HUB_RADIUS, response.hubs.len());

        let mut batch = Batch::default();
        for (hub, position) in response.hubs.iter().zip(slots) {
            let mut data = JsonMap::new();
            data.insert("entity_type".into(), hub.entity_type.as_str().into());
            data.insert("degree".into(), hub.degree.into());
            let node = BoardNode::new(BoardKind::Entity, &hub.entity_id, &hub.name, data);
            batch.push_node(self, node.at(position));
        }
        self.commit(batch, "hubs")
    }

    /// Place the neighbors of an expanded entity on a circle around it.
    ///
    /// The entity counts as expanded only when its own node is on the
    /// board, even if nothing new came back. Without the centre node its
    /// edges cannot be drawn, so a later expansion has to fetch again.
    pub fn apply_neighbors(&mut self, response: &NeighborsResponse) -> BoardChange {
        let center_id = BoardKind::Entity.node_id(&response.entity_id);
        let center = self.node(&center_id).map(|n| n.position);
        let has_center = center.is_some();
        let center = center.unwrap_or(Position::new(HUB_CENTER_X, HUB_CENTER_Y));

        let mut batch = Batch::default();
        for neighbor in &response.neighbors {
            batch.push_node(self, graph_node(neighbor));
        }
        let slots = circle_positions(center, NEIGHBOR_RADIUS, batch.nodes.len());
        for (node, position) in batch.nodes.iter_mut().zip(slots) {
            node.position = position;
        }
        for edge in &response.edges {
            batch.push_edge(self, BoardEdge::from_graph(edge));
        }

        if has_center {
            self.expanded.insert(response.entity_id.clone());
        }
        self.commit(batch, "neighbors")
    }

    /// Lay a found path out as a row and draw its edges.
    pub fn apply_path(&mut self, response: &PathResponse) -> BoardChange {
        if !response.found {
            return BoardChange::default();
        }

        let mut batch = Batch::default();
        for (index, node) in response.nodes.iter().enumerate() {
            batch.push_node(self, graph_node(node).at(path_row_position(index)));
        }
        for edge in &response.edges {
            batch.push_edge(self, BoardEdge::from_graph(edge));
        }
        self.commit(batch, "path")
    }

    /// Add up to five entities whose name or type contains `query`.
    ///
    /// Matching is case-insensitive; matches are placed in a row along the
    /// top of the board.
    pub fn search(&mut self, query: &str, entities: &[Entity]) -> BoardChange {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return BoardChange::default();
        }

        let mut batch = Batch::default();
        let matches = entities
            .iter()
            .filter(|e| {
                e.name.to_lowercase().contains(&needle)
                    || e.entity_type.as_str().contains(&needle)
            })
            .take(SEARCH_MATCH_LIMIT);
        for (index, entity) in matches.enumerate() {
            let node = BoardNode::new(
                BoardKind::Entity,
                &entity.entity_id,
                &entity.name,
                entity_data(entity),
            );
            batch.push_node(self, node.at(search_row_position(index)));
        }
        self.commit(batch, "search")
    }

    fn commit(&mut self, batch: Batch, source: &'static str) -> BoardChange {
        let Batch { nodes, edges } = batch;
        let nodes_added = nodes.len();
        self.nodes.extend(nodes);

        let before = self.edges.len();
        for edge in edges {
            if self.contains(&edge.source) && self.contains(&edge.target) {
                self.edges.push(edge);
            }
        }

        let change = BoardChange {
            nodes_added,
            edges_added: self.edges.len() - before,
        };
        tracing::debug!(
            source,
            nodes = change.nodes_added,
            edges = change.edges_added,
            "board batch committed"
        );
        change
    }

    // =========================================================================
    // LAYOUT & REMOVAL
    // =========================================================================

    /// Re-place every node on a uniform grid in insertion order.
    pub fn auto_layout(&mut self) {
        let positions = grid_positions(self.nodes.len());
        for (node, position) in self.nodes.iter_mut().zip(positions) {
            node.position = position;
        }
    }

    /// Move one node. Returns false when it is not on the board or the
    /// position is not finite.
    pub fn move_node(&mut self, id: &str, position: Position) -> bool {
        if !position.is_finite() {
            return false;
        }
        match self.nodes.iter_mut().find(|n| n.id == id) {
            Some(node) => {
                node.position = position;
                true
            }
            None => false,
        }
    }

    /// Remove every node matching `id` and the edges touching it.
    ///
    /// `id` may be a derived id or a raw record id. Returns the derived ids
    /// of the removed nodes.
    pub fn remove(&mut self, id: &str) -> Vec<String> {
        let (removed, kept): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.nodes).into_iter().partition(|n| n.matches(id));
        self.nodes = kept;
        if removed.is_empty() {
            return Vec::new();
        }

        for node in &removed {
            if node.kind == BoardKind::Entity {
                self.expanded.remove(node.raw_id());
            }
            self.edges.retain(|e| !e.touches(&node.id));
        }
        removed.into_iter().map(|n| n.id).collect()
    }

    /// Remove every node and edge and forget all expansions.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.expanded.clear();
    }
}

/// Node data of a backend entity: its fields as a JSON object.
fn entity_data(entity: &Entity) -> JsonMap {
    serde_json::to_value(entity)
        .ok()
        .and_then(|v| v.as_object().cloned())
        .unwrap_or_default()
}

fn graph_node(node: &GraphNode) -> BoardNode {
    let mut data = node.properties.clone();
    data.insert("entity_type".into(), node.entity_type.as_str().into());
    BoardNode::new(BoardKind::Entity, &node.entity_id, &node.name, data)
}

// =============================================================================
// TESTS
// =============================================================================
