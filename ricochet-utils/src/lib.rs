// Ricochet: shared types
//
// Value types used by the bounce engine and its hosts: geometry, session
// options, hit events and error types.

pub mod errors;
pub mod geometry;
pub mod hit;
pub mod options;

pub use errors::{ConfigError, ConfigResult, HookError, HookResult};
pub use geometry::{Axis, Direction, Edge, Rect};
pub use hit::{HitCounts, HitEvent};
pub use options::{InitialDirection, RicochetOptions};
