// Ricochet: collision hooks
//
// Caller-supplied callbacks run when the element hits an edge. Hooks are
// fire-and-forget: the frame loop never waits on them and never sees their
// failures.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use log::warn;
use ricochet_utils::{Edge, HitEvent, HookError, HookResult};
use tokio::runtime::Handle;

/// A single collision callback.
///
/// # Error Isolation
///
/// A hook that returns `Err` or panics does not interrupt the animation. The
/// failure is logged and passed to the reporter installed with
/// [`Hooks::on_error`], if any.
#[derive(Clone)]
pub struct Hook(Rc<dyn Fn(&HitEvent) -> HookResult>);

impl Hook {
    /// Wrap an infallible callback
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&HitEvent) + 'static,
    {
        Self(Rc::new(move |event| {
            f(event);
            Ok(())
        }))
    }

    /// Wrap a callback that can report failure
    pub fn fallible<F>(f: F) -> Self
    where
        F: Fn(&HitEvent) -> HookResult + 'static,
    {
        Self(Rc::new(f))
    }

    /// Wrap an asynchronous callback.
    ///
    /// Each hit spawns the future returned by `f` on `handle` and returns
    /// immediately. Errors from the future are logged from the spawned task
    /// and are not forwarded to the session's error reporter.
    pub fn spawn<F, Fut>(handle: Handle, f: F) -> Self
    where
        F: Fn(HitEvent) -> Fut + 'static,
        Fut: Future<Output = HookResult> + Send + 'static,
    {
        Self::new(move |event| {
            let edge = event.edge;
            let future = f(*event);
            handle.spawn(async move {
                if let Err(err) = future.await {
                    warn!("Ricochet: async {} hook failed: {}", edge, err);
                }
            });
        })
    }

    pub fn call(&self, event: &HitEvent) -> HookResult {
        (self.0)(event)
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Hook(..)")
    }
}

/// Receives failures of synchronous hooks
pub type ErrorReporter = Rc<dyn Fn(&HitEvent, &HookError)>;

/// The full set of optional hooks for a session
#[derive(Clone, Default)]
pub struct Hooks {
    on_hit_border: Option<Hook>,
    on_hit_left: Option<Hook>,
    on_hit_right: Option<Hook>,
    on_hit_top: Option<Hook>,
    on_hit_bottom: Option<Hook>,
    on_error: Option<ErrorReporter>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called on every hit, before the edge-specific hook
    pub fn on_hit_border(mut self, hook: Hook) -> Self {
        self.on_hit_border = Some(hook);
        self
    }

    pub fn on_hit_left(mut self, hook: Hook) -> Self {
        self.on_hit_left = Some(hook);
        self
    }

    pub fn on_hit_right(mut self, hook: Hook) -> Self {
        self.on_hit_right = Some(hook);
        self
    }

    pub fn on_hit_top(mut self, hook: Hook) -> Self {
        self.on_hit_top = Some(hook);
        self
    }

    pub fn on_hit_bottom(mut self, hook: Hook) -> Self {
        self.on_hit_bottom = Some(hook);
        self
    }

    /// Install a reporter for hook failures
    pub fn on_error<F>(mut self, reporter: F) -> Self
    where
        F: Fn(&HitEvent, &HookError) + 'static,
    {
        self.on_error = Some(Rc::new(reporter));
        self
    }

    pub fn for_edge(&self, edge: Edge) -> Option<&Hook> {
        match edge {
            Edge::Left => self.on_hit_left.as_ref(),
            Edge::Right => self.on_hit_right.as_ref(),
            Edge::Top => self.on_hit_top.as_ref(),
            Edge::Bottom => self.on_hit_bottom.as_ref(),
        }
    }

    /// Run the border hook, then the hook for the hit edge
    pub fn dispatch(&self, event: &HitEvent) {
        if let Some(hook) = &self.on_hit_border {
            self.invoke("border", hook, event);
        }
        if let Some(hook) = self.for_edge(event.edge) {
            self.invoke(event.edge, hook, event);
        }
    }

    fn invoke(&self, name: impl fmt::Display, hook: &Hook, event: &HitEvent) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| hook.call(event)))
            .unwrap_or_else(|payload| Err(HookError::Panicked(panic_message(payload.as_ref()))));

        if let Err(err) = outcome {
            warn!("Ricochet: {} hook failed on {}: {}", name, event, err);
            if let Some(report) = &self.on_error {
                report(event, &err);
            }
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("on_hit_border", &self.on_hit_border.is_some())
            .field("on_hit_left", &self.on_hit_left.is_some())
            .field("on_hit_right", &self.on_hit_right.is_some())
            .field("on_hit_top", &self.on_hit_top.is_some())
            .field("on_hit_bottom", &self.on_hit_bottom.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn recorder(log: &Rc<RefCell<Vec<String>>>, name: &'static str) -> Hook {
        let log = log.clone();
        Hook::new(move |_| log.borrow_mut().push(name.to_string()))
    }

    fn all_hooks(log: &Rc<RefCell<Vec<String>>>) -> Hooks {
        Hooks::new()
            .on_hit_border(recorder(log, "border"))
            .on_hit_left(recorder(log, "left"))
            .on_hit_right(recorder(log, "right"))
            .on_hit_top(recorder(log, "top"))
            .on_hit_bottom(recorder(log, "bottom"))
    }

    #[test]
    fn test_border_then_edge() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let hooks = all_hooks(&log);

        hooks.dispatch(&HitEvent::new(Edge::Right, 450.0, 16.0));
        hooks.dispatch(&HitEvent::new(Edge::Top, 0.0, 32.0));

        assert_eq!(*log.borrow(), vec!["border", "right", "border", "top"]);
    }

    #[test]
    fn test_missing_hooks_are_skipped() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let hooks = Hooks::new().on_hit_bottom(recorder(&log, "bottom"));

        hooks.dispatch(&HitEvent::new(Edge::Left, 0.0, 16.0));
        hooks.dispatch(&HitEvent::new(Edge::Bottom, 250.0, 32.0));

        assert_eq!(*log.borrow(), vec!["bottom"]);
    }

    #[test]
    fn test_failures_are_isolated_and_reported() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let errors = Rc::new(RefCell::new(Vec::new()));
        let sink = errors.clone();

        let hooks = Hooks::new()
            .on_hit_border(Hook::fallible(|_| Err(HookError::failed("sound unavailable"))))
            .on_hit_left(Hook::new(|_| panic!("left hook exploded")))
            .on_hit_right(recorder(&log, "right"))
            .on_error(move |event, err| sink.borrow_mut().push((event.edge, err.clone())));

        hooks.dispatch(&HitEvent::new(Edge::Left, 0.0, 16.0));
        hooks.dispatch(&HitEvent::new(Edge::Right, 450.0, 32.0));

        assert_eq!(*log.borrow(), vec!["right"]);
        assert_eq!(
            *errors.borrow(),
            vec![
                (Edge::Left, HookError::failed("sound unavailable")),
                (Edge::Left, HookError::Panicked("left hook exploded".to_string())),
                (Edge::Right, HookError::failed("sound unavailable")),
            ]
        );
    }

    #[tokio::test]
    async fn test_async_hook_is_not_awaited() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let hook = Hook::spawn(Handle::current(), move |event| {
            let tx = tx.clone();
            async move {
                tokio::task::yield_now().await;
                tx.send(event.edge).ok();
                Ok(())
            }
        });
        let hooks = Hooks::new().on_hit_top(hook);

        hooks.dispatch(&HitEvent::new(Edge::Top, 0.0, 16.0));

        // dispatch returned before the spawned hook had a chance to run
        assert!(rx.try_recv().is_err());
        assert_eq!(rx.recv().await, Some(Edge::Top));
    }

    #[tokio::test]
    async fn test_async_hook_failure_stays_in_task() {
        let errors = Rc::new(RefCell::new(0));
        let sink = errors.clone();
        let hooks = Hooks::new()
            .on_hit_border(Hook::spawn(Handle::current(), |_| async {
                Err(HookError::failed("network down"))
            }))
            .on_error(move |_, _| *sink.borrow_mut() += 1);

        hooks.dispatch(&HitEvent::new(Edge::Bottom, 250.0, 16.0));
        tokio::task::yield_now().await;

        assert_eq!(*errors.borrow(), 0);
    }
}
