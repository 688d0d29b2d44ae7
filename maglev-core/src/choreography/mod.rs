//! Choreography routines
//!
//! A routine gives each mover a cyclic list of waypoints. Every beat sends
//! each mover to its next waypoint; a cycle lasts as many beats as the
//! longest route, and shorter routes wrap around within the cycle.

use heapless::Vec;

use crate::motion::{Position, TableGeometry};
use crate::traits::{MoverId, MAX_MOVERS};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum waypoints per route
pub const MAX_WAYPOINTS: usize = 16;

/// Cyclic waypoint list for one mover
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Route {
    pub mover: MoverId,
    pub waypoints: Vec<Position, MAX_WAYPOINTS>,
}

impl Route {
    /// Build a route; None if there are more than `MAX_WAYPOINTS` waypoints
    pub fn new(mover: MoverId, waypoints: &[Position]) -> Option<Self> {
        Some(Self {
            mover,
            waypoints: Vec::from_slice(waypoints).ok()?,
        })
    }

    /// Waypoint for a beat, wrapping around the route
    pub fn waypoint(&self, beat: u32) -> Option<Position> {
        if self.waypoints.is_empty() {
            return None;
        }
        let index = beat as usize % self.waypoints.len();
        Some(self.waypoints[index])
    }
}

/// Routine validation error
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum RoutineError {
    #[error("routine has no routes")]
    NoRoutes,
    #[error("routine repeats zero times")]
    ZeroCycles,
    #[error("route for mover {0} has no waypoints")]
    EmptyRoute(MoverId),
    #[error("mover {0} has more than one route")]
    DuplicateMover(MoverId),
    #[error("waypoint ({x}, {y}) for mover {mover} is off the table")]
    OffTable { mover: MoverId, x: f32, y: f32 },
}

/// A repeated multi-mover routine
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Routine {
    /// Times the whole routine repeats
    pub cycles: u16,
    /// Shared delay after each beat (ms)
    pub dwell_ms: u32,
    pub routes: Vec<Route, MAX_MOVERS>,
}

impl Routine {
    /// Create an empty routine
    pub fn new(cycles: u16, dwell_ms: u32) -> Self {
        Self {
            cycles,
            dwell_ms,
            routes: Vec::new(),
        }
    }

    /// Add a route; hands it back if the routine is full
    pub fn push(&mut self, route: Route) -> Result<(), Route> {
        self.routes.push(route)
    }

    /// Beats in one cycle: the length of the longest route
    pub fn beats_per_cycle(&self) -> u32 {
        self.routes
            .iter()
            .map(|r| r.waypoints.len() as u32)
            .max()
            .unwrap_or(0)
    }

    /// Beats over all cycles
    pub fn total_beats(&self) -> u32 {
        self.beats_per_cycle() * self.cycles as u32
    }

    /// Targets for a beat, in route order
    pub fn targets(&self, beat: u32) -> impl Iterator<Item = (MoverId, Position)> + '_ {
        let within = match self.beats_per_cycle() {
            0 => 0,
            per_cycle => beat % per_cycle,
        };
        self.routes
            .iter()
            .filter_map(move |route| route.waypoint(within).map(|p| (route.mover, p)))
    }

    /// Check the routine can run on the given table
    pub fn validate(&self, table: &TableGeometry) -> Result<(), RoutineError> {
        if self.routes.is_empty() {
            return Err(RoutineError::NoRoutes);
        }
        if self.cycles == 0 {
            return Err(RoutineError::ZeroCycles);
        }
        for (index, route) in self.routes.iter().enumerate() {
            if route.waypoints.is_empty() {
                return Err(RoutineError::EmptyRoute(route.mover));
            }
            if self.routes[..index].iter().any(|r| r.mover == route.mover) {
                return Err(RoutineError::DuplicateMover(route.mover));
            }
            if let Some(p) = route.waypoints.iter().find(|p| !table.contains(**p)) {
                return Err(RoutineError::OffTable {
                    mover: route.mover,
                    x: p.x,
                    y: p.y,
                });
            }
        }
        Ok(())
    }
}
