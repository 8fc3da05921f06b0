// Ricochet: host environment interface
//
// Everything the engine needs from its host: a frame scheduler, a monotonic
// clock, a visibility signal and elements it can measure and position.

use std::fmt;
use std::rc::Rc;

use ricochet_utils::{Axis, Rect};

/// Callback run once on the next rendered frame, given the frame timestamp in
/// milliseconds
pub type FrameCallback = Box<dyn FnOnce(f64)>;

/// Token identifying a scheduled frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Rendering-loop scheduler
pub trait FrameScheduler {
    /// Schedule `callback` for the next frame.
    ///
    /// Implementations must never run the callback from inside this call.
    fn request_frame(&self, callback: FrameCallback) -> FrameHandle;

    /// Cancel a scheduled callback. Once this returns the callback must not
    /// run. Cancelling an unknown or already-run handle is a no-op.
    fn cancel_frame(&self, handle: FrameHandle);
}

/// Monotonic clock in milliseconds, on the same timeline as frame timestamps
pub trait Clock {
    fn now(&self) -> f64;
}

/// Whether the hosting surface is currently shown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Visible => write!(f, "visible"),
            Visibility::Hidden => write!(f, "hidden"),
        }
    }
}

/// Listener notified when visibility changes; reads the new state from
/// `VisibilitySource::visibility`
pub type VisibilityListener = Rc<dyn Fn()>;

/// Source of visibility-change notifications
pub trait VisibilitySource {
    fn visibility(&self) -> Visibility;

    /// Register `listener`. It stays registered until the returned
    /// subscription is dropped.
    fn subscribe(&self, listener: VisibilityListener) -> VisibilitySubscription;
}

/// Owned registration of a visibility listener.
///
/// Dropping the subscription unregisters the listener, exactly once.
pub struct VisibilitySubscription {
    unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl VisibilitySubscription {
    pub fn new(unsubscribe: impl FnOnce() + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// Unregister now
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for VisibilitySubscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl fmt::Debug for VisibilitySubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisibilitySubscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

/// Everything a session needs from its host
pub trait Host: FrameScheduler + Clock + VisibilitySource {}

impl<T: FrameScheduler + Clock + VisibilitySource> Host for T {}

/// How an element is placed relative to its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Positioning {
    /// Reference frame for absolutely positioned children
    Relative,
    /// Placed by explicit offsets from the reference frame
    Absolute,
}

/// A host-owned visual node.
///
/// Elements are shared with the rest of the host, so all methods take `&self`
/// and implementations use interior mutability.
pub trait Element {
    /// Current rendered bounds in host coordinates
    fn bounding_rect(&self) -> Rect;

    /// Write the offset along `axis`, relative to the positioning parent
    fn set_offset(&self, axis: Axis, value: f64);

    fn set_positioning(&self, positioning: Positioning);
}
