//! In-process broadcast channel.
//!
//! Many publishers, many subscribers, no persistence: a signal published while
//! nobody listens is lost. Delivery is synchronous. A publish issued from inside
//! a handler is queued and delivered once the current signal has reached every
//! subscriber, so handlers never run re-entrantly.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use tracing::trace;

use crate::signal::Signal;

type Handler = Rc<RefCell<Box<dyn FnMut(&Signal)>>>;

#[derive(Default)]
struct BusInner {
    next_id: u64,
    subscribers: Vec<(u64, Handler)>,
    pending: VecDeque<Signal>,
    dispatching: bool,
}

impl BusInner {
    fn contains(&self, id: u64) -> bool {
        self.subscribers.iter().any(|(sid, _)| *sid == id)
    }
}

/// Shared handle to the bus. Clones refer to the same channel.
#[derive(Clone, Default)]
pub struct SignalBus {
    inner: Rc<RefCell<BusInner>>,
}

impl std::fmt::Debug for SignalBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("SignalBus")
            .field("subscribers", &inner.subscribers.len())
            .field("pending", &inner.pending.len())
            .finish()
    }
}

impl PartialEq for SignalBus {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl SignalBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler`. It stays registered until the returned
    /// [`Subscription`] is dropped.
    pub fn subscribe(&self, handler: impl FnMut(&Signal) + 'static) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner
            .subscribers
            .push((id, Rc::new(RefCell::new(Box::new(handler)))));
        Subscription {
            bus: Rc::downgrade(&self.inner),
            id,
        }
    }

    pub fn publish(&self, signal: Signal) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.pending.push_back(signal);
            if inner.dispatching {
                return;
            }
            inner.dispatching = true;
        }

        loop {
            let (signal, subscribers) = {
                let mut inner = self.inner.borrow_mut();
                let Some(signal) = inner.pending.pop_front() else {
                    inner.dispatching = false;
                    return;
                };
                (signal, inner.subscribers.clone())
            };

            if subscribers.is_empty() {
                trace!(signal = signal.name(), "no subscriber, signal dropped");
                continue;
            }
            trace!(signal = signal.name(), subscribers = subscribers.len(), "dispatch");

            for (id, handler) in subscribers {
                // Unsubscribed by an earlier handler of this same signal.
                if !self.inner.borrow().contains(id) {
                    continue;
                }
                if let Ok(mut handler) = handler.try_borrow_mut() {
                    (*handler)(&signal);
                }
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    pub fn downgrade(&self) -> WeakSignalBus {
        WeakSignalBus {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

/// Non-owning reference to a bus, for handlers that need to publish without
/// keeping the bus alive.
#[derive(Clone, Default)]
pub struct WeakSignalBus {
    inner: Weak<RefCell<BusInner>>,
}

impl WeakSignalBus {
    pub fn upgrade(&self) -> Option<SignalBus> {
        self.inner.upgrade().map(|inner| SignalBus { inner })
    }
}

/// Keeps a handler registered. Dropping it unregisters the handler.
#[must_use = "dropping a Subscription unregisters its handler immediately"]
pub struct Subscription {
    bus: Weak<RefCell<BusInner>>,
    id: u64,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(bus) = self.bus.upgrade() else {
            return;
        };
        // Drop the handler outside the borrow; its captures may own subscriptions too.
        let removed = {
            let mut inner = bus.borrow_mut();
            let pos = inner.subscribers.iter().position(|(id, _)| *id == self.id);
            pos.map(|pos| inner.subscribers.remove(pos))
        };
        drop(removed);
    }
}
