// Ricochet: bounce engine
//
// Moves an element around inside its container, one independent controller
// per axis, reversing on each edge contact and pausing while the host is
// hidden.
//
// ```text
//   RicochetSession ──► AxisController (horizontal) ──┐
//         │        └──► AxisController (vertical)   ──┼──► GeometryProbe
//         │                                           │
//         ▼                                           ▼
//   Host: FrameScheduler + Clock + VisibilitySource   Element (container, item)
// ```
//
// # Usage
//
// ```ignore
// let params = RicochetParams::new(container, item)
//     .with_options(RicochetOptions::default().with_speeds(300.0, 180.0))
//     .with_hooks(Hooks::new().on_hit_border(Hook::new(|hit| println!("{}", hit))));
// let session = start_ricochet(host, params);
// // ...
// session.teardown();
// ```

pub mod axis;
pub mod hooks;
pub mod host;
pub mod probe;
pub mod session;
pub mod simulated;

pub use axis::{AxisController, Travel};
pub use hooks::{ErrorReporter, Hook, Hooks};
pub use host::{
    Clock, Element, FrameCallback, FrameHandle, FrameScheduler, Host, Positioning, Visibility,
    VisibilityListener, VisibilitySource, VisibilitySubscription,
};
pub use probe::{GeometryProbe, Placement};
pub use session::{
    start_ricochet, AxisSnapshot, RicochetParams, RicochetSession, SessionSnapshot, SessionState,
};
pub use simulated::{SimulatedElement, SimulatedHost};
