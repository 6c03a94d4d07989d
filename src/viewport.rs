//! Viewport classification state.
//!
//! The ambient "current breakpoint" signal is re-architected as an
//! explicitly owned controller: each owner constructs one against an
//! injected environment and disposes it, releasing the environment
//! registration. There is no process-wide singleton.

use std::cell::RefCell;
use std::rc::Rc;

/// Binary classification of the display environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewportClass {
    Compact,
    Regular,
}

impl ViewportClass {
    #[must_use]
    pub fn from_compact(is_compact: bool) -> Self {
        if is_compact {
            Self::Compact
        } else {
            Self::Regular
        }
    }
}

/// Listener invoked by the environment with the new compact match.
pub type ViewportListener = Rc<dyn Fn(bool)>;

/// RAII guard for one environment registration; unregisters on drop.
pub struct ViewportRegistration {
    unregister: Option<Box<dyn FnOnce()>>,
}

impl ViewportRegistration {
    #[must_use]
    pub fn new(unregister: impl FnOnce() + 'static) -> Self {
        Self {
            unregister: Some(Box::new(unregister)),
        }
    }
}

impl Drop for ViewportRegistration {
    fn drop(&mut self) {
        if let Some(unregister) = self.unregister.take() {
            unregister();
        }
    }
}

/// Environment query capability for one compact/regular breakpoint
/// predicate. Implementations deliver change notifications synchronously on
/// the single logical execution context.
pub trait ViewportEnvironment {
    /// Current match for the breakpoint predicate.
    fn is_compact(&self) -> bool;

    /// Registers a change listener; the returned guard unregisters it.
    fn register(&self, listener: ViewportListener) -> ViewportRegistration;
}

pub type SubscriptionId = u64;

struct ControllerState {
    current: ViewportClass,
    subscribers: Vec<(SubscriptionId, Box<dyn FnMut(ViewportClass)>)>,
    next_id: SubscriptionId,
}

/// Owns the current viewport class and a subscriber list.
///
/// Reads the classification synchronously at construction; on each
/// environment notification that changes the class, notifies subscribers in
/// subscription order. Dropping the controller unregisters from the
/// environment so no callback can fire into a disposed owner.
pub struct ViewportClassController {
    state: Rc<RefCell<ControllerState>>,
    _registration: ViewportRegistration,
}

impl ViewportClassController {
    #[must_use]
    pub fn new(environment: &dyn ViewportEnvironment) -> Self {
        let state = Rc::new(RefCell::new(ControllerState {
            current: ViewportClass::from_compact(environment.is_compact()),
            subscribers: Vec::new(),
            next_id: 1,
        }));

        let weak = Rc::downgrade(&state);
        let registration = environment.register(Rc::new(move |is_compact| {
            if let Some(state) = weak.upgrade() {
                apply_environment_change(&state, is_compact);
            }
        }));

        Self {
            state,
            _registration: registration,
        }
    }

    #[must_use]
    pub fn current(&self) -> ViewportClass {
        self.state.borrow().current
    }

    /// Registers a change callback; callbacks fire synchronously, in
    /// subscription order, once per effective class change.
    pub fn on_change(&self, callback: impl FnMut(ViewportClass) + 'static) -> SubscriptionId {
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        state.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.state
            .borrow_mut()
            .subscribers
            .retain(|(existing, _)| *existing != id);
    }
}

fn apply_environment_change(state: &Rc<RefCell<ControllerState>>, is_compact: bool) {
    let class = ViewportClass::from_compact(is_compact);
    // Subscribers are moved out for the dispatch so a callback that
    // subscribes does not alias the borrow. Unsubscribing from inside a
    // callback takes effect after this dispatch.
    let mut subscribers = {
        let mut guard = state.borrow_mut();
        if guard.current == class {
            return;
        }
        guard.current = class;
        std::mem::take(&mut guard.subscribers)
    };

    for (_, callback) in subscribers.iter_mut() {
        callback(class);
    }

    let mut guard = state.borrow_mut();
    let added = std::mem::take(&mut guard.subscribers);
    subscribers.extend(added);
    guard.subscribers = subscribers;
}

#[derive(Default)]
struct SharedViewportState {
    compact: bool,
    listeners: Vec<(u64, ViewportListener)>,
    next_id: u64,
}

/// Deterministic in-process environment backed by shared state.
///
/// Stands in for a real breakpoint query in tests and local runs; toggling
/// it notifies registered listeners synchronously.
#[derive(Clone, Default)]
pub struct SharedViewportEnvironment {
    inner: Rc<RefCell<SharedViewportState>>,
}

impl SharedViewportEnvironment {
    #[must_use]
    pub fn new(compact: bool) -> Self {
        let environment = Self::default();
        environment.inner.borrow_mut().compact = compact;
        environment
    }

    /// Updates the classification; listeners fire only on an actual change.
    pub fn set_compact(&self, compact: bool) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.compact == compact {
                return;
            }
            inner.compact = compact;
        }
        let listeners: Vec<ViewportListener> = self
            .inner
            .borrow()
            .listeners
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener(compact);
        }
    }

    /// Number of live registrations; used to verify disposal.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }
}

impl ViewportEnvironment for SharedViewportEnvironment {
    fn is_compact(&self) -> bool {
        self.inner.borrow().compact
    }

    fn register(&self, listener: ViewportListener) -> ViewportRegistration {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.listeners.push((id, listener));
            id
        };
        let inner = Rc::clone(&self.inner);
        ViewportRegistration::new(move || {
            inner
                .borrow_mut()
                .listeners
                .retain(|(existing, _)| *existing != id);
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::{SharedViewportEnvironment, ViewportClass, ViewportClassController};

    #[test]
    fn construction_reads_environment_synchronously() {
        let environment = SharedViewportEnvironment::new(true);
        let controller = ViewportClassController::new(&environment);
        assert_eq!(controller.current(), ViewportClass::Compact);
    }

    #[test]
    fn toggle_updates_class_and_fires_one_notification_per_toggle() {
        let environment = SharedViewportEnvironment::new(false);
        let controller = ViewportClassController::new(&environment);
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        controller.on_change(move |class| sink.borrow_mut().push(class));

        environment.set_compact(true);
        assert_eq!(controller.current(), ViewportClass::Compact);
        environment.set_compact(false);
        assert_eq!(controller.current(), ViewportClass::Regular);

        assert_eq!(
            *seen.borrow(),
            vec![ViewportClass::Compact, ViewportClass::Regular]
        );
    }

    #[test]
    fn redundant_environment_value_fires_no_notification() {
        let environment = SharedViewportEnvironment::new(false);
        let controller = ViewportClassController::new(&environment);
        let count = Rc::new(RefCell::new(0usize));

        let sink = Rc::clone(&count);
        controller.on_change(move |_| *sink.borrow_mut() += 1);

        environment.set_compact(false);
        assert_eq!(*count.borrow(), 0);
    }

    #[test]
    fn subscribers_fire_in_subscription_order() {
        let environment = SharedViewportEnvironment::new(false);
        let controller = ViewportClassController::new(&environment);
        let order = Rc::new(RefCell::new(Vec::new()));

        let first = Rc::clone(&order);
        controller.on_change(move |_| first.borrow_mut().push("first"));
        let second = Rc::clone(&order);
        controller.on_change(move |_| second.borrow_mut().push("second"));

        environment.set_compact(true);
        assert_eq!(*order.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let environment = SharedViewportEnvironment::new(false);
        let controller = ViewportClassController::new(&environment);
        let count = Rc::new(RefCell::new(0usize));

        let sink = Rc::clone(&count);
        let id = controller.on_change(move |_| *sink.borrow_mut() += 1);
        controller.unsubscribe(id);

        environment.set_compact(true);
        assert_eq!(*count.borrow(), 0);
    }

    #[test]
    fn dropping_controller_releases_environment_registration() {
        let environment = SharedViewportEnvironment::new(false);
        let controller = ViewportClassController::new(&environment);
        assert_eq!(environment.listener_count(), 1);

        drop(controller);
        assert_eq!(environment.listener_count(), 0);

        // A late toggle must not fire into the disposed controller.
        environment.set_compact(true);
    }

    #[test]
    fn controllers_are_independent() {
        let first_env = SharedViewportEnvironment::new(true);
        let second_env = SharedViewportEnvironment::new(false);
        let first = ViewportClassController::new(&first_env);
        let second = ViewportClassController::new(&second_env);

        assert_eq!(first.current(), ViewportClass::Compact);
        assert_eq!(second.current(), ViewportClass::Regular);

        second_env.set_compact(true);
        assert_eq!(first.current(), ViewportClass::Compact);
        assert_eq!(second.current(), ViewportClass::Compact);
    }
}
