//! Position types for mover motion
//!
//! Positions are absolute table coordinates in meters unless a command
//! explicitly asks for relative positioning.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 2D table coordinate (m)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    /// Create a position
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Position shifted by a relative offset
    pub fn offset(self, by: Position) -> Self {
        Self::new(self.x + by.x, self.y + by.y)
    }

    /// Straight-line distance to another position (m)
    pub fn distance_to(self, other: Position) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        sqrt(dx * dx + dy * dy)
    }

    /// Check both coordinates are finite
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Newton iteration; core has no float sqrt
fn sqrt(value: f32) -> f32 {
    if value <= 0.0 {
        return 0.0;
    }
    let mut guess = if value > 1.0 { value } else { 1.0 };
    for _ in 0..32 {
        let next = 0.5 * (guess + value / guess);
        let step = if next > guess { next - guess } else { guess - next };
        if step <= f32::EPSILON * next {
            return next;
        }
        guess = next;
    }
    guess
}

/// How a target position is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PositionMode {
    /// Target is an absolute table coordinate
    #[default]
    Absolute,
    /// Target is an offset from the mover's current position
    Relative,
}

/// Path interpolation between the current and target position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PathType {
    /// Straight line
    #[default]
    Direct,
    /// Travel along X first, then Y
    XThenY,
    /// Travel along Y first, then X
    YThenX,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        let diff = a - b;
        diff < 1e-5 && diff > -1e-5
    }

    #[test]
    fn test_offset() {
        let p = Position::new(0.060, 0.060).offset(Position::new(0.120, -0.030));
        assert!(close(p.x, 0.180));
        assert!(close(p.y, 0.030));
    }

    #[test]
    fn test_distance() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(0.3, 0.4);
        assert!(close(a.distance_to(b), 0.5));
        assert_eq!(a.distance_to(a), 0.0);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(PositionMode::default(), PositionMode::Absolute);
        assert_eq!(PathType::default(), PathType::Direct);
    }

    #[test]
    fn test_non_finite() {
        assert!(Position::new(0.1, 0.2).is_finite());
        assert!(!Position::new(f32::NAN, 0.2).is_finite());
        assert!(!Position::new(0.1, f32::INFINITY).is_finite());
    }
}
