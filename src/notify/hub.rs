use std::sync::{Arc, PoisonError, RwLock};

use log::{debug, warn};

use super::event::UpdateEvent;
use super::observer::Observer;

/// Outcome of one dispatch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Observers that handled the event.
    pub delivered: usize,
    /// Observers that were handed the event and reported a failure.
    pub failed: usize,
}

/// Subject side of the observer protocol.
///
/// Routing is decided by the event's [`Route`](super::Route): threshold-alert
/// events reach threshold-alert observers only, all other events reach every
/// observer except the threshold-alert ones.
#[derive(Default)]
pub struct NotificationHub {
    observers: RwLock<Vec<Arc<dyn Observer>>>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an observer. Returns false if it was already attached.
    pub fn attach(&self, observer: Arc<dyn Observer>) -> bool {
        // The observer list has no invariant a panicking writer could break.
        let mut observers = self.observers.write().unwrap_or_else(PoisonError::into_inner);
        if observers.iter().any(|known| same_observer(known, &observer)) {
            return false;
        }
        debug!("attached observer {}", observer.name());
        observers.push(observer);
        true
    }

    /// Unregisters an observer. Returns false if it was not attached.
    pub fn detach<O: Observer + ?Sized>(&self, observer: &Arc<O>) -> bool {
        let mut observers = self.observers.write().unwrap_or_else(PoisonError::into_inner);
        let before = observers.len();
        observers.retain(|known| !same_observer(known, observer));
        before != observers.len()
    }

    pub fn len(&self) -> usize {
        self.observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Delivers `event` to every observer whose category accepts its route,
    /// in registration order. Observer failures are logged and isolated.
    pub fn dispatch(&self, event: &UpdateEvent) -> DispatchReport {
        let observers: Vec<Arc<dyn Observer>> = self
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let mut report = DispatchReport::default();
        for observer in observers
            .iter()
            .filter(|observer| observer.category().accepts(event.route()))
        {
            match observer.update(event) {
                Ok(()) => report.delivered += 1,
                Err(err) => {
                    warn!(
                        "{} {} update dropped by {}: {}",
                        event.entity_type(),
                        event.primary_key(),
                        observer.name(),
                        err
                    );
                    report.failed += 1;
                }
            }
        }

        debug!(
            "dispatched {:?} update of {} {} to {} observers",
            event.route(),
            event.entity_type(),
            event.primary_key(),
            report.delivered
        );
        report
    }
}

fn same_observer<A: ?Sized, B: ?Sized>(a: &Arc<A>, b: &Arc<B>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}
