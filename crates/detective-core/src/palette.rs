//! # Board Palette
//!
//! Fixed colors for relationship types and node kinds.
//! Relationship types are matched case-insensitively; anything unknown gets
//! `DEFAULT_EDGE_COLOR`.

use crate::BoardKind;

/// Color used for relationship types without a palette entry.
pub const DEFAULT_EDGE_COLOR: &str = "#94a3b8";

/// Relationship type -> edge color.
const EDGE_PALETTE: &[(&str, &str)] = &[
    ("SENT", "#3b82f6"),
    ("RECEIVED", "#0ea5e9"),
    ("MENTIONS", "#a855f7"),
    ("WORKS_FOR", "#22c55e"),
    ("REPORTS_TO", "#14b8a6"),
    ("APPROVED", "#f59e0b"),
    ("PAID", "#ef4444"),
    ("OWNS", "#ec4899"),
    ("LOCATED_AT", "#84cc16"),
    ("RELATED_TO", "#64748b"),
];

/// Color for an edge of the given relationship type.
#[must_use]
pub fn edge_color(relationship_type: &str) -> &'static str {
    EDGE_PALETTE
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(relationship_type))
        .map(|(_, color)| *color)
        .unwrap_or(DEFAULT_EDGE_COLOR)
}

/// Minimap color of a node kind.
#[must_use]
pub const fn node_color(kind: BoardKind) -> &'static str {
    match kind {
        BoardKind::Entity => "#3b82f6",
        BoardKind::Document => "#6b7280",
    }
}
