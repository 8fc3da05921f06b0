// Ricochet: simulated host
//
// Deterministic in-memory host for tests and headless runs. The clock only
// moves when told to, frames only fire when `run_frame` is called, and
// visibility changes are driven by hand.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use ricochet_utils::{Axis, Rect};

use crate::host::{
    Clock, Element, FrameCallback, FrameHandle, FrameScheduler, Positioning, Visibility,
    VisibilityListener, VisibilitySource, VisibilitySubscription,
};

struct ScheduledFrame {
    handle: FrameHandle,
    callback: FrameCallback,
}

type Listeners = Rc<RefCell<Vec<(u64, VisibilityListener)>>>;

/// In-memory host with a manual clock and frame loop.
///
/// # Example
///
/// ```ignore
/// let host = Rc::new(SimulatedHost::new());
/// let session = start_ricochet(host.clone(), params);
///
/// // 60 frames at ~60fps
/// for _ in 0..60 {
///     host.step(16.0);
/// }
///
/// host.set_visibility(Visibility::Hidden); // session pauses
/// ```
pub struct SimulatedHost {
    /// Virtual time in milliseconds
    now: Cell<f64>,
    queue: RefCell<Vec<ScheduledFrame>>,
    next_handle: Cell<u64>,
    visibility: Cell<Visibility>,
    listeners: Listeners,
    next_listener: Cell<u64>,
    /// When false, `cancel_frame` is ignored and cancelled callbacks still fire
    honor_cancel: bool,
    cancel_count: Cell<usize>,
    frame_count: Cell<u64>,
}

impl SimulatedHost {
    pub fn new() -> Self {
        Self {
            now: Cell::new(0.0),
            queue: RefCell::new(Vec::new()),
            next_handle: Cell::new(1),
            visibility: Cell::new(Visibility::Visible),
            listeners: Rc::new(RefCell::new(Vec::new())),
            next_listener: Cell::new(1),
            honor_cancel: true,
            cancel_count: Cell::new(0),
            frame_count: Cell::new(0),
        }
    }

    /// Simulate a scheduler that keeps firing callbacks after they were
    /// cancelled
    pub fn ignoring_cancellation(mut self) -> Self {
        self.honor_cancel = false;
        self
    }

    /// Move the clock forward without running a frame
    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }

    /// Fire every callback that was queued before this call, stamped with the
    /// current time. Callbacks requested while the frame runs wait for the
    /// next one. Returns the number of callbacks fired.
    pub fn run_frame(&self) -> usize {
        let timestamp = self.now.get();
        let due: Vec<FrameHandle> = self.queue.borrow().iter().map(|f| f.handle).collect();
        self.frame_count.set(self.frame_count.get() + 1);

        let mut fired = 0;
        for handle in due {
            let frame = {
                let mut queue = self.queue.borrow_mut();
                queue
                    .iter()
                    .position(|f| f.handle == handle)
                    .map(|index| queue.remove(index))
            };
            // cancelled by an earlier callback in this same frame
            let Some(frame) = frame else { continue };
            (frame.callback)(timestamp);
            fired += 1;
        }
        fired
    }

    /// Advance the clock by `ms` and run one frame
    pub fn step(&self, ms: f64) -> usize {
        self.advance(ms);
        self.run_frame()
    }

    /// Run frames every `frame_ms` until `duration_ms` has elapsed. Returns the
    /// number of frames run.
    pub fn run_for(&self, duration_ms: f64, frame_ms: f64) -> u64 {
        let frame_ms = frame_ms.max(f64::EPSILON);
        let mut frames = 0;
        let mut elapsed = 0.0;
        while elapsed + frame_ms <= duration_ms {
            self.step(frame_ms);
            elapsed += frame_ms;
            frames += 1;
        }
        frames
    }

    /// Change visibility, notifying listeners if it actually changed
    pub fn set_visibility(&self, visibility: Visibility) {
        if self.visibility.replace(visibility) != visibility {
            self.notify_visibility();
        }
    }

    /// Notify every listener of the current visibility, changed or not
    pub fn notify_visibility(&self) {
        let listeners: Vec<VisibilityListener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener();
        }
    }

    pub fn pending_frames(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn cancel_count(&self) -> usize {
        self.cancel_count.get()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count.get()
    }
}

impl Default for SimulatedHost {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameScheduler for SimulatedHost {
    fn request_frame(&self, callback: FrameCallback) -> FrameHandle {
        let handle = FrameHandle(self.next_handle.get());
        self.next_handle.set(handle.0 + 1);
        self.queue
            .borrow_mut()
            .push(ScheduledFrame { handle, callback });
        handle
    }

    fn cancel_frame(&self, handle: FrameHandle) {
        self.cancel_count.set(self.cancel_count.get() + 1);
        if self.honor_cancel {
            self.queue.borrow_mut().retain(|f| f.handle != handle);
        }
    }
}

impl Clock for SimulatedHost {
    fn now(&self) -> f64 {
        self.now.get()
    }
}

impl VisibilitySource for SimulatedHost {
    fn visibility(&self) -> Visibility {
        self.visibility.get()
    }

    fn subscribe(&self, listener: VisibilityListener) -> VisibilitySubscription {
        let id = self.next_listener.get();
        self.next_listener.set(id + 1);
        self.listeners.borrow_mut().push((id, listener));

        let listeners = Rc::downgrade(&self.listeners);
        VisibilitySubscription::new(move || {
            if let Some(listeners) = listeners.upgrade() {
                listeners.borrow_mut().retain(|(other, _)| *other != id);
            }
        })
    }
}

/// In-memory element.
///
/// A container has its own bounds. An item is laid out inside a parent
/// container at the offsets written to it.
pub struct SimulatedElement {
    bounds: Cell<Rect>,
    parent: Option<Rc<SimulatedElement>>,
    left: Cell<f64>,
    top: Cell<f64>,
    positioning: Cell<Option<Positioning>>,
    writes: Cell<usize>,
}

impl SimulatedElement {
    pub fn container(bounds: Rect) -> Rc<Self> {
        Rc::new(Self {
            bounds: Cell::new(bounds),
            parent: None,
            left: Cell::new(0.0),
            top: Cell::new(0.0),
            positioning: Cell::new(None),
            writes: Cell::new(0),
        })
    }

    pub fn item(parent: &Rc<SimulatedElement>, width: f64, height: f64) -> Rc<Self> {
        Rc::new(Self {
            bounds: Cell::new(Rect::new(0.0, 0.0, width, height)),
            parent: Some(parent.clone()),
            left: Cell::new(0.0),
            top: Cell::new(0.0),
            positioning: Cell::new(None),
            writes: Cell::new(0),
        })
    }

    pub fn resize(&self, width: f64, height: f64) {
        let mut bounds = self.bounds.get();
        bounds.width = width;
        bounds.height = height;
        self.bounds.set(bounds);
    }

    /// Move a container, e.g. to simulate page scrolling
    pub fn move_to(&self, x: f64, y: f64) {
        let mut bounds = self.bounds.get();
        bounds.x = x;
        bounds.y = y;
        self.bounds.set(bounds);
    }

    pub fn offset(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.left.get(),
            Axis::Vertical => self.top.get(),
        }
    }

    pub fn positioning(&self) -> Option<Positioning> {
        self.positioning.get()
    }

    /// Number of offset writes received
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl Element for SimulatedElement {
    fn bounding_rect(&self) -> Rect {
        let bounds = self.bounds.get();
        match &self.parent {
            Some(parent) => {
                let origin = parent.bounding_rect();
                Rect::new(
                    origin.x + self.left.get(),
                    origin.y + self.top.get(),
                    bounds.width,
                    bounds.height,
                )
            }
            None => bounds,
        }
    }

    fn set_offset(&self, axis: Axis, value: f64) {
        match axis {
            Axis::Horizontal => self.left.set(value),
            Axis::Vertical => self.top.set(value),
        }
        self.writes.set(self.writes.get() + 1);
    }

    fn set_positioning(&self, positioning: Positioning) {
        self.positioning.set(Some(positioning));
    }
}
