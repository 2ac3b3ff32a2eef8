//! # Board Layout
//!
//! Pure placement functions used by the store and the board.
//!
//! - Pin grid: documents on the left, entities on the right, three columns
//!   per kind.
//! - Random placement: uniform inside a bounded region.
//! - Circles: hub discovery and neighbor expansion.
//! - Rows: search matches along the top, path nodes through the middle.
//! - Auto layout: uniform grid over all nodes in insertion order.

use crate::primitives::{
    AUTO_LAYOUT_ORIGIN, AUTO_LAYOUT_SPACING, PIN_GRID_COLUMNS, PIN_GRID_DOCUMENT_X,
    PIN_GRID_ENTITY_X, PIN_GRID_SPACING, PIN_GRID_Y, RANDOM_REGION_HEIGHT, RANDOM_REGION_MIN_X,
    RANDOM_REGION_MIN_Y, RANDOM_REGION_WIDTH, SEARCH_ROW_ORIGIN_X, SEARCH_ROW_SPACING,
    PATH_ROW_Y, SEARCH_ROW_Y,
};
use crate::{BoardItem, BoardKind, Position};
use rand::Rng;
use std::f64::consts::TAU;

/// Next free grid slot for a pin-created board item of `kind`.
///
/// The slot index is the number of existing items of the same kind, so
/// documents and entities fill independent grids.
#[must_use]
pub fn pin_grid_position(existing: &[BoardItem], kind: BoardKind) -> Position {
    let base_x = match kind {
        BoardKind::Document => PIN_GRID_DOCUMENT_X,
        BoardKind::Entity => PIN_GRID_ENTITY_X,
    };
    let slot = existing.iter().filter(|b| b.kind == kind).count();
    let col = slot % PIN_GRID_COLUMNS;
    let row = slot / PIN_GRID_COLUMNS;

    Position::new(
        base_x + col as f64 * PIN_GRID_SPACING,
        PIN_GRID_Y + row as f64 * PIN_GRID_SPACING,
    )
}

/// Uniform random position inside the placement region.
pub fn random_position<R: Rng + ?Sized>(rng: &mut R) -> Position {
    Position::new(
        rng.random::<f64>() * RANDOM_REGION_WIDTH + RANDOM_REGION_MIN_X,
        rng.random::<f64>() * RANDOM_REGION_HEIGHT + RANDOM_REGION_MIN_Y,
    )
}

/// `count` positions evenly spaced on a circle, starting at angle 0.
#[must_use]
pub fn circle_positions(center: Position, radius: f64, count: usize) -> Vec<Position> {
    (0..count)
        .map(|index| {
            let angle = TAU * index as f64 / count as f64;
            Position::new(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
            )
        })
        .collect()
}

/// Number of columns of the auto-layout grid: `ceil(sqrt(count))`.
#[must_use]
pub fn grid_columns(count: usize) -> usize {
    let mut cols = 1;
    while cols * cols < count {
        cols += 1;
    }
    cols
}

/// Uniform grid positions for `count` nodes in insertion order.
#[must_use]
pub fn grid_positions(count: usize) -> Vec<Position> {
    let cols = grid_columns(count);
    (0..count)
        .map(|index| {
            Position::new(
                (index % cols) as f64 * AUTO_LAYOUT_SPACING + AUTO_LAYOUT_ORIGIN,
                (index / cols) as f64 * AUTO_LAYOUT_SPACING + AUTO_LAYOUT_ORIGIN,
            )
        })
        .collect()
}

/// Position of the `index`-th match of a board search.
#[must_use]
pub fn search_row_position(index: usize) -> Position {
    Position::new(
        SEARCH_ROW_ORIGIN_X + index as f64 * SEARCH_ROW_SPACING,
        SEARCH_ROW_Y,
    )
}

/// Position of the `index`-th node of a found path.
#[must_use]
pub fn path_row_position(index: usize) -> Position {
    Position::new(
        SEARCH_ROW_ORIGIN_X + index as f64 * SEARCH_ROW_SPACING,
        PATH_ROW_Y,
    )
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::JsonMap;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn board_item(id: &str, kind: BoardKind) -> BoardItem {
        BoardItem {
            id: id.to_string(),
            kind,
            case_id: "c1".to_string(),
            label: id.to_string(),
            position: Position::default(),
            data: JsonMap::new(),
        }
    }

    #[test]
    fn pin_grid_separates_kinds() {
        let existing = vec![
            board_item("document-1", BoardKind::Document),
            board_item("document-2", BoardKind::Document),
        ];

        assert_eq!(
            pin_grid_position(&existing, BoardKind::Document),
            Position::new(380.0, 100.0)
        );
        assert_eq!(
            pin_grid_position(&existing, BoardKind::Entity),
            Position::new(500.0, 100.0)
        );
    }

    #[test]
    fn pin_grid_wraps_after_three_columns() {
        let existing: Vec<_> = (0..3)
            .map(|i| board_item(&format!("entity-{i}"), BoardKind::Entity))
            .collect();

        assert_eq!(
            pin_grid_position(&existing, BoardKind::Entity),
            Position::new(500.0, 240.0)
        );
    }

    #[test]
    fn random_positions_stay_in_region() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let p = random_position(&mut rng);
            assert!((100.0..500.0).contains(&p.x), "x out of range: {}", p.x);
            assert!((100.0..400.0).contains(&p.y), "y out of range: {}", p.y);
        }
    }

    #[test]
    fn circle_starts_at_angle_zero() {
        let positions = circle_positions(Position::new(400.0, 300.0), 200.0, 4);
        assert_eq!(positions.len(), 4);
        assert!((positions[0].x - 600.0).abs() < 1e-9);
        assert!((positions[0].y - 300.0).abs() < 1e-9);
        assert!((positions[2].x - 200.0).abs() < 1e-9);
    }

    #[test]
    fn circle_of_zero_is_empty() {
        assert!(circle_positions(Position::default(), 10.0, 0).is_empty());
    }

    #[test]
    fn grid_columns_is_ceil_sqrt() {
        assert_eq!(grid_columns(0), 1);
        assert_eq!(grid_columns(1), 1);
        assert_eq!(grid_columns(4), 2);
        assert_eq!(grid_columns(5), 3);
        assert_eq!(grid_columns(10), 4);
    }

    #[test]
    fn grid_positions_fill_rows() {
        let positions = grid_positions(5);
        assert_eq!(positions[0], Position::new(100.0, 100.0));
        assert_eq!(positions[2], Position::new(460.0, 100.0));
        assert_eq!(positions[3], Position::new(100.0, 280.0));
    }

    #[test]
    fn search_row_is_horizontal() {
        assert_eq!(search_row_position(0), Position::new(100.0, 100.0));
        assert_eq!(search_row_position(2), Position::new(400.0, 100.0));
        assert_eq!(path_row_position(1), Position::new(250.0, 300.0));
    }
}
