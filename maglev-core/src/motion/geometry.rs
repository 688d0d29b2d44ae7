//! Table geometry
//!
//! The table surface is a grid of square tiles. Placing a mover on any
//! multiple of half a tile pitch aligns it within or across tiles, so the
//! usable area is the surface inset by half a tile on every side.

use super::position::Position;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tile pitch of the standard table (m)
pub const TILE_PITCH_M: f32 = 0.120;

/// Corners of the usable area of the standard 6 × 8 table
pub const OUTER_CORNERS: [Position; 4] = [
    Position::new(0.060, 0.060),
    Position::new(0.060, 0.900),
    Position::new(0.660, 0.900),
    Position::new(0.660, 0.060),
];

/// Test stations along the outer edge of the standard table
pub const TEST_STATIONS: [Position; 6] = [
    Position::new(0.060, 0.060),
    Position::new(0.660, 0.060),
    Position::new(0.060, 0.450),
    Position::new(0.660, 0.450),
    Position::new(0.060, 0.900),
    Position::new(0.660, 0.900),
];

/// Tolerance for boundary checks (m)
const EDGE_TOLERANCE_M: f32 = 1e-4;

/// Tile grid dimensions
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TableGeometry {
    /// Tiles along X
    pub columns: u8,
    /// Tiles along Y
    pub rows: u8,
    /// Tile pitch (m)
    pub tile_m: f32,
}

impl Default for TableGeometry {
    fn default() -> Self {
        Self {
            columns: 6,
            rows: 8,
            tile_m: TILE_PITCH_M,
        }
    }
}

impl TableGeometry {
    /// Surface width (m)
    pub fn width_m(&self) -> f32 {
        self.columns as f32 * self.tile_m
    }

    /// Surface height (m)
    pub fn height_m(&self) -> f32 {
        self.rows as f32 * self.tile_m
    }

    /// Inset from the surface edge to the usable area (m)
    pub fn margin_m(&self) -> f32 {
        self.tile_m / 2.0
    }

    /// Center of a tile, or None if outside the grid
    pub fn tile_center(&self, column: u8, row: u8) -> Option<Position> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        Some(Position::new(
            column as f32 * self.tile_m + self.margin_m(),
            row as f32 * self.tile_m + self.margin_m(),
        ))
    }

    /// Corners of the usable area, counter-clockwise from the origin corner
    pub fn corners(&self) -> [Position; 4] {
        let low = self.margin_m();
        let x_max = self.width_m() - low;
        let y_max = self.height_m() - low;
        [
            Position::new(low, low),
            Position::new(low, y_max),
            Position::new(x_max, y_max),
            Position::new(x_max, low),
        ]
    }

    /// Check if a position lies inside the usable area
    pub fn contains(&self, position: Position) -> bool {
        if !position.is_finite() {
            return false;
        }
        let low = self.margin_m() - EDGE_TOLERANCE_M;
        let x_max = self.width_m() - self.margin_m() + EDGE_TOLERANCE_M;
        let y_max = self.height_m() - self.margin_m() + EDGE_TOLERANCE_M;
        position.x >= low && position.x <= x_max && position.y >= low && position.y <= y_max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Position, b: Position) -> bool {
        let dx = a.x - b.x;
        let dy = a.y - b.y;
        dx < 1e-5 && dx > -1e-5 && dy < 1e-5 && dy > -1e-5
    }

    #[test]
    fn test_standard_corners() {
        let table = TableGeometry::default();
        for (computed, listed) in table.corners().iter().zip(OUTER_CORNERS.iter()) {
            assert!(close(*computed, *listed));
        }
    }

    #[test]
    fn test_tile_centers() {
        let table = TableGeometry::default();
        assert!(close(table.tile_center(0, 0).unwrap(), Position::new(0.060, 0.060)));
        assert!(close(table.tile_center(5, 7).unwrap(), Position::new(0.660, 0.900)));
        assert_eq!(table.tile_center(6, 0), None);
        assert_eq!(table.tile_center(0, 8), None);
    }

    #[test]
    fn test_stations_on_table() {
        let table = TableGeometry::default();
        for station in TEST_STATIONS {
            assert!(table.contains(station));
        }
    }

    #[test]
    fn test_contains_rejects_edges_and_nan() {
        let table = TableGeometry::default();
        assert!(!table.contains(Position::new(0.0, 0.0)));
        assert!(!table.contains(Position::new(0.700, 0.400)));
        assert!(!table.contains(Position::new(0.300, 0.950)));
        assert!(!table.contains(Position::new(f32::NAN, 0.300)));
        assert!(table.contains(Position::new(0.300, 0.300)));
    }
}
