//! # Game Primitives
//!
//! Fixed constants for the Office Detective client.
//!
//! These are compiled into the binary and immutable at runtime:
//! storage keys, the persistence format version, and the board geometry
//! used by the layout functions.

// =============================================================================
// PERSISTENCE
// =============================================================================

/// Storage key of the persisted game/evidence state.
pub const GAME_STATE_KEY: &str = "office-detective-game";

/// Storage key of the persisted authentication session.
pub const AUTH_STATE_KEY: &str = "office-detective-auth";

/// Current version of the persisted state envelope.
///
/// Increment this when making breaking changes to the persisted shape.
pub const STATE_FORMAT_VERSION: u32 = 1;

/// Storage key of the persisted board session (nodes, edges, expansions).
pub const BOARD_STATE_KEY: &str = "office-detective-board";

/// Maximum persisted payload accepted on restore (16 MiB).
///
/// Checked before any JSON parsing takes place.
pub const MAX_STATE_PAYLOAD_SIZE: usize = 16 * 1024 * 1024;

// =============================================================================
// PIN GRID (pin-created board items)
// =============================================================================

/// Grid origin x for documents (left side of the board).
pub const PIN_GRID_DOCUMENT_X: f64 = 100.0;

/// Grid origin x for entities (right side of the board).
pub const PIN_GRID_ENTITY_X: f64 = 500.0;

/// Grid origin y for both kinds.
pub const PIN_GRID_Y: f64 = 100.0;

/// Distance between grid slots.
pub const PIN_GRID_SPACING: f64 = 140.0;

/// Slots per row before wrapping.
pub const PIN_GRID_COLUMNS: usize = 3;

// =============================================================================
// RANDOM PLACEMENT
// =============================================================================

/// Bounded region for randomized placement: `x ∈ [MIN_X, MIN_X + WIDTH)`.
pub const RANDOM_REGION_MIN_X: f64 = 100.0;
pub const RANDOM_REGION_WIDTH: f64 = 400.0;

/// Bounded region for randomized placement: `y ∈ [MIN_Y, MIN_Y + HEIGHT)`.
pub const RANDOM_REGION_MIN_Y: f64 = 100.0;
pub const RANDOM_REGION_HEIGHT: f64 = 300.0;

// =============================================================================
// AUTO LAYOUT / CIRCLES / SEARCH ROW
// =============================================================================

/// Spacing of the uniform auto-layout grid.
pub const AUTO_LAYOUT_SPACING: f64 = 180.0;

/// Origin of the auto-layout grid (both axes).
pub const AUTO_LAYOUT_ORIGIN: f64 = 100.0;

/// Centre of the hub circle.
pub const HUB_CENTER_X: f64 = 400.0;
pub const HUB_CENTER_Y: f64 = 300.0;

/// Radius of the hub circle.
pub const HUB_RADIUS: f64 = 200.0;

/// Radius of the circle placed around an expanded entity.
pub const NEIGHBOR_RADIUS: f64 = 220.0;

/// Maximum number of entities a local board search adds.
pub const SEARCH_MATCH_LIMIT: usize = 5;

/// Row placement of search matches: `x = ORIGIN_X + i * SPACING`, `y = ROW_Y`.
pub const SEARCH_ROW_ORIGIN_X: f64 = 100.0;
pub const SEARCH_ROW_SPACING: f64 = 150.0;
pub const SEARCH_ROW_Y: f64 = 100.0;

/// Row placement of path nodes: `x = SEARCH_ROW_ORIGIN_X + i * SEARCH_ROW_SPACING`.
pub const PATH_ROW_Y: f64 = 300.0;

// =============================================================================
// GRAPH QUERY DEFAULTS
// =============================================================================

/// Default number of hubs requested.
pub const DEFAULT_HUB_LIMIT: u32 = 10;

/// Default neighbor depth.
pub const DEFAULT_NEIGHBOR_DEPTH: u32 = 1;

/// Default and maximum path search depth accepted by the backend.
pub const DEFAULT_PATH_DEPTH: u32 = 6;
pub const MAX_PATH_DEPTH: u32 = 10;

// =============================================================================
// CHAT & SUBMISSION
// =============================================================================

/// Hint budget before the backend reports the real remaining count.
pub const INITIAL_HINTS: u32 = 3;

/// Minimum trimmed explanation length for a submission.
pub const MIN_EXPLANATION_LENGTH: usize = 20;

/// Minimum number of evidence items for a submission.
pub const MIN_EVIDENCE_COUNT: usize = 1;
