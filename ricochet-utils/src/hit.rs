// Ricochet: hit events
//
// A hit is one detected contact between the element and a container edge.
// Every hit triggers a direction reversal and the hooks for that edge.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geometry::{Axis, Edge};

/// Contact between the animated element and one container edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitEvent {
    pub edge: Edge,
    /// Offset along the edge's axis written in the frame that detected the hit
    pub offset: f64,
    /// Scheduler timestamp of that frame, in milliseconds
    pub timestamp: f64,
}

impl HitEvent {
    pub fn new(edge: Edge, offset: f64, timestamp: f64) -> Self {
        Self {
            edge,
            offset,
            timestamp,
        }
    }

    pub fn axis(&self) -> Axis {
        self.edge.axis()
    }
}

impl fmt::Display for HitEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hit {} at offset {:.2} (t={:.1}ms)",
            self.edge, self.offset, self.timestamp
        )
    }
}

/// Running tally of hits per edge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitCounts {
    pub top: usize,
    pub bottom: usize,
    pub left: usize,
    pub right: usize,
}

impl HitCounts {
    pub fn record(&mut self, edge: Edge) {
        match edge {
            Edge::Top => self.top += 1,
            Edge::Bottom => self.bottom += 1,
            Edge::Left => self.left += 1,
            Edge::Right => self.right += 1,
        }
    }

    pub fn get(&self, edge: Edge) -> usize {
        match edge {
            Edge::Top => self.top,
            Edge::Bottom => self.bottom,
            Edge::Left => self.left,
            Edge::Right => self.right,
        }
    }

    pub fn total(&self) -> usize {
        self.top + self.bottom + self.left + self.right
    }
}
