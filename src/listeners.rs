use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

/// Handle returned when a listener is registered; used to remove it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

type Notification<L> = Box<dyn Fn(&L)>;

/// Ordered set of listeners with copy-before-dispatch semantics.
///
/// A dispatch requested while another one is running is queued and delivered
/// after the running one finishes, so listeners are never invoked nested and
/// notifications arrive in the order they were raised. Listeners added or
/// removed during a dispatch take effect from the next notification.
pub struct Multicaster<L: ?Sized> {
    listeners: RefCell<Vec<(ListenerId, Rc<L>)>>,
    next_id: Cell<u64>,
    queue: RefCell<VecDeque<Notification<L>>>,
    dispatching: Cell<bool>,
}

impl<L: ?Sized> Default for Multicaster<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: ?Sized> Multicaster<L> {
    pub fn new() -> Self {
        Self {
            listeners: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
            queue: RefCell::new(VecDeque::new()),
            dispatching: Cell::new(false),
        }
    }

    pub fn add(&self, listener: Rc<L>) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, listener));
        id
    }

    pub fn remove(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }

    pub fn clear(&self) {
        self.listeners.borrow_mut().clear();
        self.queue.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.borrow().is_empty()
    }

    pub fn dispatch(&self, notify: impl Fn(&L) + 'static) {
        self.queue.borrow_mut().push_back(Box::new(notify));
        if self.dispatching.replace(true) {
            return;
        }

        let _guard = DispatchGuard {
            dispatching: &self.dispatching,
            queue: &self.queue,
        };
        loop {
            let Some(notify) = self.queue.borrow_mut().pop_front() else {
                break;
            };
            let snapshot = self
                .listeners
                .borrow()
                .iter()
                .map(|(_, listener)| listener.clone())
                .collect::<Vec<_>>();
            for listener in snapshot {
                notify(&listener);
            }
        }
    }
}

struct DispatchGuard<'a, L: ?Sized> {
    dispatching: &'a Cell<bool>,
    queue: &'a RefCell<VecDeque<Notification<L>>>,
}

impl<L: ?Sized> Drop for DispatchGuard<'_, L> {
    fn drop(&mut self) {
        // A panicking listener must not wedge the caster in the dispatching state.
        if std::thread::panicking() {
            self.queue.borrow_mut().clear();
        }
        self.dispatching.set(false);
    }
}
