// Ricochet: session lifecycle
//
// Starts both axis controllers, pauses and resumes them when the host's
// visibility changes, and tears everything down when the session handle is
// consumed or dropped.
//
//   start ──► Running ◄──► Paused
//                 │            │
//                 └────┬───────┘
//                      ▼
//                  TornDown

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use log::{debug, trace};
use ricochet_utils::{Axis, RicochetOptions};

use crate::axis::{AxisController, Travel};
use crate::hooks::Hooks;
use crate::host::{Element, Host, Positioning, Visibility, VisibilityListener, VisibilitySubscription};
use crate::probe::GeometryProbe;

/// Everything needed to start a session
pub struct RicochetParams {
    /// Bounding region; marked as the positioning reference on start
    pub container: Rc<dyn Element>,
    /// Element to animate
    pub item: Rc<dyn Element>,
    pub options: RicochetOptions,
    pub hooks: Hooks,
}

impl RicochetParams {
    pub fn new(container: Rc<dyn Element>, item: Rc<dyn Element>) -> Self {
        Self {
            container,
            item,
            options: RicochetOptions::default(),
            hooks: Hooks::default(),
        }
    }

    pub fn with_options(mut self, options: RicochetOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }
}

/// Lifecycle state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Running,
    Paused,
    /// Terminal
    TornDown,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Running => write!(f, "running"),
            SessionState::Paused => write!(f, "paused"),
            SessionState::TornDown => write!(f, "torn down"),
        }
    }
}

/// Point-in-time view of one axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisSnapshot {
    pub offset: f64,
    pub travel: Travel,
    pub scheduled: bool,
}

impl From<&AxisController> for AxisSnapshot {
    fn from(controller: &AxisController) -> Self {
        Self {
            offset: controller.offset(),
            travel: controller.travel(),
            scheduled: controller.is_scheduled(),
        }
    }
}

/// Point-in-time view of a session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub horizontal: AxisSnapshot,
    pub vertical: AxisSnapshot,
}

struct SessionInner {
    host: Rc<dyn Host>,
    probe: GeometryProbe,
    hooks: Hooks,
    horizontal: AxisController,
    vertical: AxisController,
    state: SessionState,
    subscription: Option<VisibilitySubscription>,
}

impl SessionInner {
    fn axis(&self, axis: Axis) -> &AxisController {
        match axis {
            Axis::Horizontal => &self.horizontal,
            Axis::Vertical => &self.vertical,
        }
    }

    fn axis_mut(&mut self, axis: Axis) -> &mut AxisController {
        match axis {
            Axis::Horizontal => &mut self.horizontal,
            Axis::Vertical => &mut self.vertical,
        }
    }
}

type Shared = Rc<RefCell<SessionInner>>;

/// A running ricochet animation.
///
/// The session stops when [`teardown`](Self::teardown) is called or the
/// handle is dropped. Frame callbacks and the visibility listener only hold
/// weak references, so nothing keeps animating once the handle is gone.
///
/// Hooks run while no internal borrow is held; a hook may pause, resume or
/// tear down the session it belongs to.
pub struct RicochetSession {
    inner: Shared,
}

/// Start animating `params.item` inside `params.container`.
///
/// Parameters are not validated: speeds are used as given and the elements
/// are measured as the host reports them.
pub fn start_ricochet(host: Rc<dyn Host>, params: RicochetParams) -> RicochetSession {
    let RicochetParams {
        container,
        item,
        options,
        hooks,
    } = params;

    container.set_positioning(Positioning::Relative);
    item.set_positioning(Positioning::Absolute);

    let (horizontal, vertical) = options.initial_direction.directions();
    let started_at = host.now();

    let inner = Rc::new(RefCell::new(SessionInner {
        host: host.clone(),
        probe: GeometryProbe::new(container, item),
        hooks,
        horizontal: AxisController::new(
            Axis::Horizontal,
            options.horizontal_speed,
            horizontal.into(),
            started_at,
        ),
        vertical: AxisController::new(
            Axis::Vertical,
            options.vertical_speed,
            vertical.into(),
            started_at,
        ),
        state: SessionState::Running,
        subscription: None,
    }));

    debug!(
        "Ricochet: starting toward {} at {}/{} units/s",
        options.initial_direction, options.horizontal_speed, options.vertical_speed
    );

    schedule(&inner, Axis::Horizontal);
    schedule(&inner, Axis::Vertical);

    let weak = Rc::downgrade(&inner);
    let listener: VisibilityListener = Rc::new(move || {
        if let Some(inner) = weak.upgrade() {
            on_visibility_change(&inner);
        }
    });
    let subscription = host.subscribe(listener);
    inner.borrow_mut().subscription = Some(subscription);

    RicochetSession { inner }
}

impl RicochetSession {
    pub fn state(&self) -> SessionState {
        self.inner.borrow().state
    }

    pub fn is_paused(&self) -> bool {
        self.state() == SessionState::Paused
    }

    /// Suspend both axes. Returns `false` if the session was not running.
    pub fn pause(&self) -> bool {
        pause(&self.inner)
    }

    /// Continue both axes from where they stopped. Returns `false` if the
    /// session was not paused.
    pub fn resume(&self) -> bool {
        resume(&self.inner)
    }

    /// Current (horizontal, vertical) offsets
    pub fn offsets(&self) -> (f64, f64) {
        let inner = self.inner.borrow();
        (inner.horizontal.offset(), inner.vertical.offset())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let inner = self.inner.borrow();
        SessionSnapshot {
            state: inner.state,
            horizontal: AxisSnapshot::from(&inner.horizontal),
            vertical: AxisSnapshot::from(&inner.vertical),
        }
    }

    /// Stop all motion and release the visibility subscription
    pub fn teardown(self) {
        drop(self);
    }
}

impl Drop for RicochetSession {
    fn drop(&mut self) {
        teardown(&self.inner);
    }
}

impl fmt::Debug for RicochetSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RicochetSession")
            .field("snapshot", &self.snapshot())
            .finish()
    }
}

fn schedule(inner: &Shared, axis: Axis) {
    let (host, ticket) = {
        let mut session = inner.borrow_mut();
        let ticket = session.axis_mut(axis).issue_ticket();
        (session.host.clone(), ticket)
    };

    let weak = Rc::downgrade(inner);
    let handle = host.request_frame(Box::new(move |timestamp| {
        if let Some(inner) = weak.upgrade() {
            run_frame(&inner, axis, ticket, timestamp);
        }
    }));

    inner.borrow_mut().axis_mut(axis).set_pending(handle);
}

fn run_frame(inner: &Shared, axis: Axis, ticket: u64, timestamp: f64) {
    let (hit, hooks) = {
        let mut guard = inner.borrow_mut();
        let session = &mut *guard;
        if session.state != SessionState::Running {
            return;
        }
        let controller = match axis {
            Axis::Horizontal => &mut session.horizontal,
            Axis::Vertical => &mut session.vertical,
        };
        if !controller.begin_frame(ticket) {
            return;
        }
        let hit = controller.step(timestamp, &session.probe);
        (hit, hit.map(|_| session.hooks.clone()))
    };

    if let (Some(event), Some(hooks)) = (hit, hooks) {
        trace!("Ricochet: {}", event);
        hooks.dispatch(&event);
    }

    // hooks may have paused, resumed or torn down the session
    let reschedule = {
        let session = inner.borrow();
        session.state == SessionState::Running && !session.axis(axis).is_scheduled()
    };
    if reschedule {
        schedule(inner, axis);
    }
}

fn pause(inner: &Shared) -> bool {
    let (host, handles) = {
        let mut session = inner.borrow_mut();
        if session.state != SessionState::Running {
            return false;
        }
        session.state = SessionState::Paused;
        let handles = [
            session.horizontal.take_pending(),
            session.vertical.take_pending(),
        ];
        (session.host.clone(), handles)
    };

    for handle in handles.into_iter().flatten() {
        host.cancel_frame(handle);
    }
    debug!("Ricochet: paused");
    true
}

fn resume(inner: &Shared) -> bool {
    {
        let mut session = inner.borrow_mut();
        if session.state != SessionState::Paused {
            return false;
        }
        session.state = SessionState::Running;
        let now = session.host.now();
        session.horizontal.restart_clock(now);
        session.vertical.restart_clock(now);
    }

    schedule(inner, Axis::Horizontal);
    schedule(inner, Axis::Vertical);
    debug!("Ricochet: resumed");
    true
}

fn teardown(inner: &Shared) {
    let (host, handles, subscription) = {
        let mut session = inner.borrow_mut();
        if session.state == SessionState::TornDown {
            return;
        }
        session.state = SessionState::TornDown;
        let handles = [
            session.horizontal.take_pending(),
            session.vertical.take_pending(),
        ];
        (session.host.clone(), handles, session.subscription.take())
    };

    for handle in handles.into_iter().flatten() {
        host.cancel_frame(handle);
    }
    drop(subscription);
    debug!("Ricochet: torn down");
}

fn on_visibility_change(inner: &Shared) {
    let host = inner.borrow().host.clone();
    match host.visibility() {
        Visibility::Hidden => {
            pause(inner);
        }
        Visibility::Visible => {
            resume(inner);
        }
    }
}
