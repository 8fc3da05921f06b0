// Ricochet: axis controller
//
// One controller per axis. Each frame it integrates the offset at constant
// speed, writes it to the element, and checks the edge it is travelling
// toward. A hit flips the travel direction for the next frame.

use ricochet_utils::{Axis, Direction, Edge, HitEvent};

use crate::host::FrameHandle;
use crate::probe::GeometryProbe;

/// Travel state of one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Travel {
    Positive,
    Negative,
}

impl Travel {
    /// Transition taken after a frame: reverse on a hit, carry on otherwise
    pub fn next(self, hit: bool) -> Self {
        if hit {
            self.direction().flipped().into()
        } else {
            self
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            Travel::Positive => Direction::Positive,
            Travel::Negative => Direction::Negative,
        }
    }
}

impl From<Direction> for Travel {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Positive => Travel::Positive,
            Direction::Negative => Travel::Negative,
        }
    }
}

/// Motion state for a single axis
#[derive(Debug, Clone)]
pub struct AxisController {
    axis: Axis,
    /// Units per second, never changed by collisions
    speed: f64,
    travel: Travel,
    /// Position along the axis relative to the container's near edge
    offset: f64,
    /// Timestamp (ms) the next frame's elapsed time is measured from
    last_timestamp: f64,
    pending: Option<FrameHandle>,
    /// Bumped whenever a frame is scheduled or cancelled; callbacks carrying
    /// an older ticket are stale
    ticket: u64,
}

impl AxisController {
    pub fn new(axis: Axis, speed: f64, travel: Travel, started_at: f64) -> Self {
        Self {
            axis,
            speed,
            travel,
            offset: 0.0,
            last_timestamp: started_at,
            pending: None,
            ticket: 0,
        }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn travel(&self) -> Travel {
        self.travel
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn last_timestamp(&self) -> f64 {
        self.last_timestamp
    }

    /// Edge the current travel direction moves toward
    pub fn target_edge(&self) -> Edge {
        self.travel.direction().edge_on(self.axis)
    }

    pub fn velocity(&self) -> f64 {
        self.speed * self.travel.direction().sign()
    }

    /// Advance one frame.
    ///
    /// Elapsed time is measured from the previous frame (or the last clock
    /// restart) and clamped at zero, so a scheduler timestamp slightly older
    /// than the recorded one never moves the element backwards.
    pub fn step(&mut self, timestamp: f64, probe: &GeometryProbe) -> Option<HitEvent> {
        let elapsed = (timestamp - self.last_timestamp).max(0.0) / 1000.0;
        self.last_timestamp = timestamp;

        self.offset += self.velocity() * elapsed;
        probe.item().set_offset(self.axis, self.offset);

        let edge = self.target_edge();
        let hit = probe.hits(edge);
        self.travel = self.travel.next(hit);

        hit.then(|| HitEvent::new(edge, self.offset, timestamp))
    }

    /// Measure the next frame from `now` instead of the last frame
    pub fn restart_clock(&mut self, now: f64) {
        self.last_timestamp = now;
    }

    pub fn is_scheduled(&self) -> bool {
        self.pending.is_some()
    }

    pub(crate) fn issue_ticket(&mut self) -> u64 {
        self.ticket += 1;
        self.ticket
    }

    pub(crate) fn set_pending(&mut self, handle: FrameHandle) {
        self.pending = Some(handle);
    }

    /// Accept a frame callback if it carries the current ticket
    pub(crate) fn begin_frame(&mut self, ticket: u64) -> bool {
        if ticket != self.ticket || self.pending.is_none() {
            return false;
        }
        self.pending = None;
        true
    }

    /// Take the pending handle for cancellation and invalidate its callback
    pub(crate) fn take_pending(&mut self) -> Option<FrameHandle> {
        self.ticket += 1;
        self.pending.take()
    }
}
